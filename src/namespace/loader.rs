//! The seam for bulk-loaded namespaces.
//!
//! Reading relation documents from a directory is the host's job. Whatever
//! does it hands the registry a [`NamespaceSpec`] through [`RelationSource`].

use super::NamespaceSpec;
use crate::error::HalError;

/// Produces a namespace declaration, typically from files on disk.
pub trait RelationSource {
    fn load(&self) -> Result<NamespaceSpec, HalError>;
}

impl RelationSource for NamespaceSpec {
    fn load(&self) -> Result<NamespaceSpec, HalError> {
        Ok(self.clone())
    }
}

/// A namespace declaration held as JSON text:
///
/// ```json
/// { "name": "mycompany", "prefix": "mco",
///   "rels": [ { "name": "boss", "description": "An employees boss" } ] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonRelationSource {
    raw: String,
}

impl JsonRelationSource {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl RelationSource for JsonRelationSource {
    fn load(&self) -> Result<NamespaceSpec, HalError> {
        serde_json::from_str(&self.raw).map_err(|e| HalError::Loader(e.to_string()))
    }
}
