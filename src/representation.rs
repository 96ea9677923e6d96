//! # Representation builder
//!
//! A [`Representation`] is the document being built for one entity. The
//! engine seeds it with the self link and the route's static links and
//! embeds, then hands it to the `prepare` and `to_hal` hooks, which use the
//! same builder methods:
//!
//! ```ignore
//! rep.link("mco:boss", "./boss")                       // /people/100/boss
//!    .link("mco:team", LinkSpec::with_attr("/teams/{teamId}", "title", "Team"))
//!    .embed("mco:reports", "reports", "./reports/{item.id}");
//! ```
//!
//! Hrefs are expanded against the entity (and, inside an embed, the item)
//! and resolved relative to the self href. Adding a second link or embed
//! under the same relation turns the entry into an array.

use crate::engine::Shared;
use crate::entity::{EntityRef, Extracted, HalEntity};
use crate::error::HalError;
use crate::hal_config::EmbedConfig;
use crate::link::{Link, LinkSpec};
use crate::uri::{expand_template, resolve_link_value, TemplateContext};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

const LINKS: &str = "_links";
const EMBEDDED: &str = "_embedded";

/// Relation keys the engine owns.
fn is_reserved_rel(rel: &str) -> bool {
    matches!(rel, "self" | "curies")
}

pub(crate) struct EmbedItem {
    pub self_link: Link,
    pub entity: EntityRef,
    pub config: Option<Arc<EmbedConfig>>,
}

pub(crate) struct EmbedEntry {
    pub rel: String,
    pub items: Vec<EmbedItem>,
    pub many: bool,
}

pub struct Representation {
    shared: Arc<Shared>,
    entity: EntityRef,
    body: Value,
    self_link: Link,
    links: Vec<(String, Vec<Link>)>,
    embeds: Vec<EmbedEntry>,
    ignored: BTreeSet<String>,
    consumed: BTreeSet<String>,
}

impl Representation {
    pub(crate) fn new(shared: Arc<Shared>, entity: EntityRef, self_link: Link) -> Self {
        let body = entity.to_value();
        Self {
            shared,
            entity,
            body,
            self_link,
            links: Vec::new(),
            embeds: Vec::new(),
            ignored: BTreeSet::new(),
            consumed: BTreeSet::new(),
        }
    }

    pub fn self_href(&self) -> &str {
        &self.self_link.href
    }

    /// The source entity's JSON form.
    pub fn entity(&self) -> &Value {
        &self.body
    }

    /// Add a link under `rel`. `self` and `curies` are managed by the engine
    /// and cannot be set here.
    pub fn link(&mut self, rel: &str, spec: impl Into<LinkSpec>) -> &mut Self {
        if is_reserved_rel(rel) {
            warn!(rel, href = %self.self_link.href, "Reserved relation ignored");
            return self;
        }
        let ctx = TemplateContext::new(&self.body);
        let link = resolve_link_value(&spec.into(), &self.self_link.href, &ctx);
        self.push_link(rel, link);
        self
    }

    /// Replace whatever is linked under `rel`.
    pub fn set_link(&mut self, rel: &str, spec: impl Into<LinkSpec>) -> &mut Self {
        self.remove_link(rel);
        self.link(rel, spec)
    }

    pub fn remove_link(&mut self, rel: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|(r, _)| r != rel);
        before != self.links.len()
    }

    /// Link to a named route. Parameter values may use `{self.x}` placeholders.
    pub fn link_route(
        &mut self,
        rel: &str,
        route: &str,
        params: &HashMap<String, String>,
    ) -> Result<&mut Self, HalError> {
        let ctx = TemplateContext::new(&self.body);
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.clone(), expand_template(v, &ctx)))
            .collect();
        let path = self.shared.routes.resolve(route, &params)?;
        if is_reserved_rel(rel) {
            warn!(rel, href = %self.self_link.href, "Reserved relation ignored");
        } else {
            self.push_link(rel, Link::new(path));
        }
        Ok(self)
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.links.iter().any(|(r, _)| r == rel)
    }

    /// Links currently recorded under `rel`.
    pub fn links(&self, rel: &str) -> &[Link] {
        self.links
            .iter()
            .find(|(r, _)| r == rel)
            .map(|(_, links)| links.as_slice())
            .unwrap_or_default()
    }

    /// Embed the entity or entities found at `path`, each with its own self
    /// link evaluated from `href`.
    pub fn embed(&mut self, rel: &str, path: &str, href: impl Into<LinkSpec>) -> &mut Self {
        self.embed_with(rel, EmbedConfig::new(path, href))
    }

    /// Like [`Representation::embed`], with nested links and embeds applied to
    /// every embedded item.
    pub fn embed_with(&mut self, rel: &str, config: EmbedConfig) -> &mut Self {
        self.embed_config(rel, Arc::new(config))
    }

    pub(crate) fn embed_config(&mut self, rel: &str, config: Arc<EmbedConfig>) -> &mut Self {
        let Some(found) = self.extract(&config.path) else {
            debug!(rel, path = %config.path, href = %self.self_link.href, "Nothing to embed");
            return self;
        };
        let (entities, many) = match found {
            Extracted::One(entity) => (vec![entity], false),
            Extracted::Many(entities) => (entities, true),
        };
        let items = entities
            .into_iter()
            .map(|entity| {
                let item = entity.to_value();
                let ctx = TemplateContext::with_item(&self.body, &item);
                EmbedItem {
                    self_link: resolve_link_value(&config.href, &self.self_link.href, &ctx),
                    entity,
                    config: Some(config.clone()),
                }
            })
            .collect();
        self.push_embed(rel, items, many);
        self
    }

    /// Embed an entity that is not part of the source, e.g. one fetched by a hook.
    pub fn embed_entity(
        &mut self,
        rel: &str,
        href: impl Into<LinkSpec>,
        entity: impl HalEntity + 'static,
    ) -> &mut Self {
        let entity: EntityRef = Arc::new(entity);
        let item = entity.to_value();
        let ctx = TemplateContext::with_item(&self.body, &item);
        let self_link = resolve_link_value(&href.into(), &self.self_link.href, &ctx);
        self.push_embed(
            rel,
            vec![EmbedItem {
                self_link,
                entity,
                config: None,
            }],
            false,
        );
        self
    }

    pub fn has_embed(&self, rel: &str) -> bool {
        self.embeds.iter().any(|e| e.rel == rel)
    }

    /// Leave `field` out of the emitted document.
    pub fn ignore(&mut self, field: &str) -> &mut Self {
        self.ignored.insert(field.to_string());
        self
    }

    fn extract(&mut self, path: &str) -> Option<Extracted> {
        let found = self
            .entity
            .embedded(path)
            .or_else(|| self.body.get(path).and_then(Extracted::from_json));
        if found.is_some() {
            self.consumed.insert(path.to_string());
        }
        found
    }

    fn push_link(&mut self, rel: &str, link: Link) {
        match self.links.iter_mut().find(|(r, _)| r == rel) {
            Some((_, links)) => links.push(link),
            None => self.links.push((rel.to_string(), vec![link])),
        }
    }

    fn push_embed(&mut self, rel: &str, items: Vec<EmbedItem>, many: bool) {
        match self.embeds.iter_mut().find(|e| e.rel == rel) {
            Some(entry) => {
                entry.items.extend(items);
                entry.many = true;
            }
            None => self.embeds.push(EmbedEntry {
                rel: rel.to_string(),
                items,
                many,
            }),
        }
    }

    /// Namespaces behind the `prefix:name` keys currently held, prefix to
    /// name. Only meaningful after the hooks have run.
    pub(crate) fn used_namespaces(&self) -> BTreeMap<String, String> {
        let rels = self
            .links
            .iter()
            .map(|(rel, _)| rel.as_str())
            .chain(self.embeds.iter().map(|e| e.rel.as_str()));
        let mut used = BTreeMap::new();
        for rel in rels {
            match self.shared.namespaces.curie_namespace(rel) {
                Some(ns) => {
                    used.entry(ns.prefix.clone()).or_insert_with(|| ns.name.clone());
                }
                None if rel.contains(':') => debug!(rel, "No namespace for relation prefix"),
                None => {}
            }
        }
        used
    }

    pub(crate) fn take_embeds(&mut self) -> Vec<EmbedEntry> {
        std::mem::take(&mut self.embeds)
    }

    /// Assemble `_links`, the entity's own fields and `_embedded`.
    pub(crate) fn finish(self, curies: Vec<Value>, embedded: Map<String, Value>) -> Value {
        let mut links = Map::new();
        links.insert("self".into(), self.self_link.to_value());
        if !curies.is_empty() {
            links.insert("curies".into(), Value::Array(curies));
        }
        for (rel, mut rel_links) in self.links {
            let value = if rel_links.len() == 1 {
                rel_links.remove(0).to_value()
            } else {
                Value::Array(rel_links.iter().map(Link::to_value).collect())
            };
            links.insert(rel, value);
        }

        let mut doc = Map::new();
        doc.insert(LINKS.into(), Value::Object(links));
        if let Value::Object(fields) = self.body {
            for (key, value) in fields {
                if key == LINKS || key == EMBEDDED || self.ignored.contains(&key) || self.consumed.contains(&key) {
                    continue;
                }
                doc.insert(key, value);
            }
        }
        if !embedded.is_empty() {
            doc.insert(EMBEDDED.into(), Value::Object(embedded));
        }
        Value::Object(doc)
    }
}
