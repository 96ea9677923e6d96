//! # Renderable entities
//!
//! Anything a handler returns can be rendered as long as it can produce its
//! JSON form. [`HalEntity`] is that contract, with two provided methods
//! that entities override only when they need to:
//!
//! - [`HalEntity::to_hal`] runs after the route's `prepare` hook and may add
//!   links and embeds of its own. The default does nothing.
//! - [`HalEntity::embedded`] supplies typed children for an embed path,
//!   so those children can carry their own `to_hal`. The default returns
//!   `None` and the engine reads the property from the JSON form instead.
//!
//! `serde_json::Value` implements the trait, so plain JSON renders as-is.

use crate::error::HookError;
use crate::representation::Representation;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Shared handle to an entity being rendered.
pub type EntityRef = Arc<dyn HalEntity>;

/// Entities found at an embed path.
pub enum Extracted {
    One(EntityRef),
    Many(Vec<EntityRef>),
}

impl Extracted {
    /// Split a JSON property into embeddable entities. Arrays yield one entity
    /// per element; objects yield one; anything else is not embeddable.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Extracted::Many(
                items.iter().map(|v| Arc::new(v.clone()) as EntityRef).collect(),
            )),
            Value::Object(_) => Some(Extracted::One(Arc::new(value.clone()))),
            _ => None,
        }
    }
}

#[async_trait]
pub trait HalEntity: Send + Sync {
    /// The entity's fields. Only objects contribute fields to the document.
    fn to_value(&self) -> Value;

    /// Typed children at `path`, overriding the JSON property of that name.
    fn embedded(&self, _path: &str) -> Option<Extracted> {
        None
    }

    /// Entity-level hook, invoked once after the route's `prepare` hook.
    async fn to_hal(&self, _rep: &mut Representation) -> Result<(), HookError> {
        Ok(())
    }
}

#[async_trait]
impl HalEntity for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}
