use super::{Namespace, NamespaceSpec, Relation, RelationSource};
use crate::error::HalError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Key accepted by [`NamespaceRegistry::relation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationQuery {
    /// `prefix:name`
    Curie { prefix: String, name: String },
    /// `(namespace name, relation name)`
    Qualified { namespace: String, name: String },
    /// A key without a prefix. Never matches a namespaced relation.
    Plain(String),
}

impl From<&str> for RelationQuery {
    fn from(key: &str) -> Self {
        match key.split_once(':') {
            Some((prefix, name)) => RelationQuery::Curie {
                prefix: prefix.to_string(),
                name: name.to_string(),
            },
            None => RelationQuery::Plain(key.to_string()),
        }
    }
}

impl From<(&str, &str)> for RelationQuery {
    fn from((namespace, name): (&str, &str)) -> Self {
        RelationQuery::Qualified {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Default)]
struct Index {
    by_name: BTreeMap<String, Arc<Namespace>>,
    by_prefix: BTreeMap<String, Arc<Namespace>>,
}

/// All namespaces known to a server, indexed by name and by prefix.
#[derive(Default)]
pub struct NamespaceRegistry {
    index: RwLock<Index>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace together with the relations listed in `spec`.
    ///
    /// Fails with [`HalError::DuplicateNamespace`] if the name or the prefix
    /// is taken; the existing namespace is left untouched.
    pub fn add(&self, spec: NamespaceSpec) -> Result<Arc<Namespace>, HalError> {
        let mut index = self.index.write();
        if index.by_name.contains_key(&spec.name) || index.by_prefix.contains_key(&spec.prefix) {
            warn!(name = %spec.name, prefix = %spec.prefix, "Duplicate namespace rejected");
            return Err(HalError::DuplicateNamespace {
                name: spec.name,
                prefix: spec.prefix,
            });
        }

        let ns = Namespace::new(&spec);
        for rel in spec.rels {
            ns.add_relation(rel);
        }
        index.by_name.insert(ns.name.clone(), ns.clone());
        index.by_prefix.insert(ns.prefix.clone(), ns.clone());
        info!(name = %ns.name, prefix = %ns.prefix, rels = ns.rels().len(), "Namespace registered");
        Ok(ns)
    }

    /// Register whatever namespace `source` produces.
    pub fn add_from(&self, source: &dyn RelationSource) -> Result<Arc<Namespace>, HalError> {
        self.add(source.load()?)
    }

    pub fn namespace(&self, name: &str) -> Option<Arc<Namespace>> {
        self.index.read().by_name.get(name).cloned()
    }

    pub fn namespace_by_prefix(&self, prefix: &str) -> Option<Arc<Namespace>> {
        self.index.read().by_prefix.get(prefix).cloned()
    }

    /// Namespace named by the prefix of a compact relation key (`mco:boss`).
    pub fn curie_namespace(&self, rel_key: &str) -> Option<Arc<Namespace>> {
        let (prefix, _) = rel_key.split_once(':')?;
        self.namespace_by_prefix(prefix)
    }

    /// Look up a relation by `"prefix:name"` or `(namespace, name)`.
    ///
    /// ```
    /// use hal_render::{NamespaceRegistry, NamespaceSpec, RelationSpec};
    ///
    /// let registry = NamespaceRegistry::new();
    /// registry
    ///     .add(NamespaceSpec::new("mcoormer", "mco").rel(RelationSpec::new("datasources")))
    ///     .unwrap();
    /// let a = registry.relation("mco:datasources").unwrap();
    /// let b = registry.relation(("mcoormer", "datasources")).unwrap();
    /// assert!(std::sync::Arc::ptr_eq(&a, &b));
    /// ```
    pub fn relation(&self, query: impl Into<RelationQuery>) -> Option<Arc<Relation>> {
        match query.into() {
            RelationQuery::Curie { prefix, name } => self.namespace_by_prefix(&prefix)?.relation(&name),
            RelationQuery::Qualified { namespace, name } => self.namespace(&namespace)?.relation(&name),
            RelationQuery::Plain(_) => None,
        }
    }

    /// All namespaces, ordered by name.
    pub fn namespaces(&self) -> Vec<Arc<Namespace>> {
        self.index.read().by_name.values().cloned().collect()
    }
}
