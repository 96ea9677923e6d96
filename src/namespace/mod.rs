//! # Link-relation namespaces
//!
//! A [`Namespace`] groups documented [`Relation`]s under a short prefix, so a
//! response can use the compact key `mco:boss` and advertise one curie for
//! `mco` instead of a full URI per link.
//!
//! The [`NamespaceRegistry`] is built at startup and shared with the engine.
//! Lookups take a read lock; registration (rare, usually startup) takes the
//! write lock.

mod loader;
mod registry;

pub use loader::{JsonRelationSource, RelationSource};
pub use registry::{NamespaceRegistry, RelationQuery};

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Declaration of a single relation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl RelationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Declaration of a namespace and, optionally, its relations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamespaceSpec {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rels: Vec<RelationSpec>,
}

impl NamespaceSpec {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            description: None,
            rels: Vec::new(),
        }
    }

    pub fn rel(mut self, rel: RelationSpec) -> Self {
        self.rels.push(rel);
        self
    }
}

/// A documented link relation. Its compact identity is `prefix:name`.
#[derive(Debug)]
pub struct Relation {
    pub name: String,
    pub description: String,
    prefix: String,
    namespace: Weak<Namespace>,
}

impl Relation {
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.prefix, self.name)
    }

    /// The owning namespace, if it is still alive.
    pub fn namespace(&self) -> Option<Arc<Namespace>> {
        self.namespace.upgrade()
    }
}

/// A named, prefixed set of relations. Name and prefix never change; the
/// relation table grows through [`Namespace::rel`].
#[derive(Debug)]
pub struct Namespace {
    pub name: String,
    pub prefix: String,
    pub description: Option<String>,
    rels: RwLock<BTreeMap<String, Arc<Relation>>>,
    me: Weak<Namespace>,
}

impl Namespace {
    pub(crate) fn new(spec: &NamespaceSpec) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            name: spec.name.clone(),
            prefix: spec.prefix.clone(),
            description: spec.description.clone(),
            rels: RwLock::new(BTreeMap::new()),
            me: me.clone(),
        })
    }

    /// Register a relation (given a [`RelationSpec`] or a `(name, description)`
    /// pair) or look one up (given a `&str`).
    ///
    /// ```
    /// use hal_render::{NamespaceRegistry, NamespaceSpec, RelationSpec};
    ///
    /// let registry = NamespaceRegistry::new();
    /// let ns = registry.add(NamespaceSpec::new("mycompany", "mco")).unwrap();
    /// let boss = ns.rel(RelationSpec::new("boss").description("An employees boss"));
    /// assert_eq!(ns.rel("boss").unwrap().description, boss.description);
    /// assert!(ns.rel("intern").is_none());
    /// ```
    pub fn rel<A: RelArg>(&self, arg: A) -> A::Output {
        arg.apply(self)
    }

    /// Registers `spec`, replacing any relation with the same name.
    pub fn add_relation(&self, spec: RelationSpec) -> Arc<Relation> {
        let rel = Arc::new(Relation {
            name: spec.name,
            description: spec.description,
            prefix: self.prefix.clone(),
            namespace: self.me.clone(),
        });
        debug!(namespace = %self.name, rel = %rel.name, "Relation registered");
        self.rels.write().insert(rel.name.clone(), rel.clone());
        rel
    }

    pub fn relation(&self, name: &str) -> Option<Arc<Relation>> {
        self.rels.read().get(name).cloned()
    }

    /// All relations, ordered by name.
    pub fn rels(&self) -> Vec<Arc<Relation>> {
        self.rels.read().values().cloned().collect()
    }
}

/// Argument accepted by [`Namespace::rel`]. Registration forms return the new
/// relation; the lookup form returns an `Option`.
pub trait RelArg {
    type Output;

    fn apply(self, ns: &Namespace) -> Self::Output;
}

impl RelArg for RelationSpec {
    type Output = Arc<Relation>;

    fn apply(self, ns: &Namespace) -> Arc<Relation> {
        ns.add_relation(self)
    }
}

impl RelArg for (&str, &str) {
    type Output = Arc<Relation>;

    fn apply(self, ns: &Namespace) -> Arc<Relation> {
        ns.add_relation(RelationSpec::new(self.0).description(self.1))
    }
}

impl RelArg for &str {
    type Output = Option<Arc<Relation>>;

    fn apply(self, ns: &Namespace) -> Option<Arc<Relation>> {
        ns.relation(self)
    }
}
