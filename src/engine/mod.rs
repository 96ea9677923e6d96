//! # Rendering engine
//!
//! [`HalEngine`] turns a handler's result into a HAL document. It owns the
//! registries (namespaces, route names) and every route's [`HalConfig`],
//! all supplied through [`HalEngineBuilder`] rather than held globally.
//!
//! ## Phases
//!
//! For each entity, top-level or embedded, rendering runs in a fixed order:
//!
//! 1. **Self**: the self link is the request path (or, for embedded items,
//!    the evaluated embed href). Nothing later can replace it.
//! 2. **Links** then **Embeds**: the declarative config, in declaration order.
//! 3. **Prepare**: the route's `prepare` hook (or the bare procedure), awaited.
//! 4. **ToHal**: the entity's own [`HalEntity::to_hal`], awaited.
//! 5. **Embedded entities**: each embedded item goes through the same phases,
//!    in source order.
//! 6. **Finalize**: curies for every namespace used anywhere in the response
//!    are added to the top-level `_links` only.
//!
//! A failing or timed-out hook aborts the whole response; no partial
//! document is produced.

mod render;

use crate::config::HalOptions;
use crate::entity::{EntityRef, HalEntity};
use crate::error::{HalError, RenderError};
use crate::hal_config::{HalConfig, HalRoute};
use crate::namespace::{Namespace, NamespaceRegistry, NamespaceSpec, Relation, RelationQuery};
use crate::routes::RouteIndex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

/// State every representation needs to resolve links and curies.
pub(crate) struct Shared {
    pub namespaces: Arc<NamespaceRegistry>,
    pub routes: RouteIndex,
    pub options: HalOptions,
}

/// Collects registries, options and routes, then freezes them into a
/// [`HalEngine`].
#[derive(Default)]
pub struct HalEngineBuilder {
    namespaces: Option<Arc<NamespaceRegistry>>,
    routes: RouteIndex,
    paths: BTreeSet<String>,
    configs: BTreeMap<String, HalConfig>,
    options: HalOptions,
}

impl HalEngineBuilder {
    /// Share an existing namespace registry. A fresh one is created otherwise.
    pub fn namespaces(mut self, registry: Arc<NamespaceRegistry>) -> Self {
        self.namespaces = Some(registry);
        self
    }

    pub fn options(mut self, options: HalOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a route: its name (if any) goes into the route index and its
    /// hal config is kept for [`HalEngine::render_route`].
    pub fn route(mut self, route: HalRoute) -> Result<Self, HalError> {
        if self.paths.contains(&route.path) {
            return Err(HalError::InvalidConfig(format!("route {} registered twice", route.path)));
        }
        if let Some(name) = &route.name {
            self.routes.register(name.clone(), &route.path)?;
        }
        self.paths.insert(route.path.clone());
        if let Some(hal) = route.hal {
            self.configs.insert(route.path, hal);
        }
        Ok(self)
    }

    pub fn build(self) -> HalEngine {
        let namespaces = self.namespaces.unwrap_or_default();
        info!(
            routes = self.paths.len(),
            named_routes = self.routes.len(),
            namespaces = namespaces.namespaces().len(),
            "Hal engine ready"
        );
        HalEngine {
            shared: Arc::new(Shared {
                namespaces,
                routes: self.routes,
                options: self.options,
            }),
            configs: Arc::new(self.configs),
        }
    }
}

/// Renders entities into HAL documents. Cheap to clone and safe to share
/// between request tasks.
#[derive(Clone)]
pub struct HalEngine {
    shared: Arc<Shared>,
    configs: Arc<BTreeMap<String, HalConfig>>,
}

impl HalEngine {
    pub fn builder() -> HalEngineBuilder {
        HalEngineBuilder::default()
    }

    pub fn options(&self) -> &HalOptions {
        &self.shared.options
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.shared.namespaces
    }

    /// Register a namespace at runtime.
    pub fn add_namespace(&self, spec: NamespaceSpec) -> Result<Arc<Namespace>, HalError> {
        self.shared.namespaces.add(spec)
    }

    pub fn namespace(&self, name: &str) -> Option<Arc<Namespace>> {
        self.shared.namespaces.namespace(name)
    }

    pub fn relation(&self, query: impl Into<RelationQuery>) -> Option<Arc<Relation>> {
        self.shared.namespaces.relation(query)
    }

    pub fn routes(&self) -> &RouteIndex {
        &self.shared.routes
    }

    /// Path of the route registered as `name`.
    pub fn route(&self, name: &str, params: &HashMap<String, String>) -> Result<String, HalError> {
        self.shared.routes.resolve(name, params)
    }

    /// The hal config registered for a route path template.
    pub fn hal_config(&self, route_path: &str) -> Option<&HalConfig> {
        self.configs.get(route_path)
    }

    /// Render `entity` served at `request_path` using an explicit config.
    pub async fn render<E: HalEntity + 'static>(
        &self,
        entity: E,
        hal: Option<&HalConfig>,
        request_path: &str,
    ) -> Result<Value, RenderError> {
        self.render_shared(Arc::new(entity), hal, request_path).await
    }

    /// Render `entity` with the config of the route registered at `route_path`.
    pub async fn render_route<E: HalEntity + 'static>(
        &self,
        route_path: &str,
        request_path: &str,
        entity: E,
    ) -> Result<Value, RenderError> {
        self.render_shared(Arc::new(entity), self.hal_config(route_path), request_path)
            .await
    }

    pub async fn render_shared(
        &self,
        entity: EntityRef,
        hal: Option<&HalConfig>,
        request_path: &str,
    ) -> Result<Value, RenderError> {
        render::render_document(self, entity, hal, request_path).await
    }
}
