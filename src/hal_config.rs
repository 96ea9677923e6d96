//! # Per-route hal configuration
//!
//! A route's `hal` setting is either declarative (links and embeds written
//! as data, plus an optional `prepare` hook) or a single procedure that is
//! treated as the `prepare` hook. [`HalConfig`] captures both and is built
//! once, when the route is registered.
//!
//! Declarative config can also be read from JSON:
//!
//! ```json
//! {
//!   "links": { "mco:boss": "./boss", "mco:team": { "href": "/teams/{teamId}", "title": "Team" } },
//!   "embed": { "mco:person": { "path": "items", "href": "./{item.id}" } }
//! }
//! ```
//!
//! Map order is declaration order, and that is the order links are emitted in.

use crate::error::{HalError, HookError};
use crate::hooks::{FnHook, HalPopulatable};
use crate::link::LinkSpec;
use crate::representation::Representation;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// How to embed the entities found at `path`.
///
/// `href` is evaluated once per extracted item with `{self.x}` bound to the
/// parent entity and `{item.x}` to the item. `links` and `embed` apply to
/// every item's own representation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    pub path: String,
    pub href: LinkSpec,
    pub links: Vec<(String, LinkSpec)>,
    pub embed: Vec<(String, Arc<EmbedConfig>)>,
}

impl EmbedConfig {
    pub fn new(path: impl Into<String>, href: impl Into<LinkSpec>) -> Self {
        Self {
            path: path.into(),
            href: href.into(),
            links: Vec::new(),
            embed: Vec::new(),
        }
    }

    pub fn link(mut self, rel: impl Into<String>, spec: impl Into<LinkSpec>) -> Self {
        self.links.push((rel.into(), spec.into()));
        self
    }

    pub fn embed(mut self, rel: impl Into<String>, config: EmbedConfig) -> Self {
        self.embed.push((rel.into(), Arc::new(config)));
        self
    }

    fn from_json(rel: &str, value: &Value) -> Result<Self, HalError> {
        let obj = value
            .as_object()
            .ok_or_else(|| HalError::InvalidConfig(format!("embed {rel} must be an object")))?;
        let path = obj
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| HalError::InvalidConfig(format!("embed {rel} needs a string path")))?;
        let href = obj
            .get("href")
            .ok_or_else(|| HalError::InvalidConfig(format!("embed {rel} needs an href")))?;
        Ok(Self {
            path: path.to_string(),
            href: serde_json::from_value(href.clone())?,
            links: links_from_json(obj.get("links"))?,
            embed: embeds_from_json(obj.get("embed"))?,
        })
    }
}

/// Links, embeds and an optional `prepare` hook.
#[derive(Clone, Default)]
pub struct Declarative {
    pub links: Vec<(String, LinkSpec)>,
    pub embed: Vec<(String, Arc<EmbedConfig>)>,
    pub prepare: Option<Arc<dyn HalPopulatable>>,
}

impl fmt::Debug for Declarative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declarative")
            .field("links", &self.links)
            .field("embed", &self.embed)
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}

/// A route's hal configuration.
#[derive(Clone)]
pub enum HalConfig {
    Declarative(Declarative),
    /// A bare procedure, run as the `prepare` hook. No declarative phases.
    Procedure(Arc<dyn HalPopulatable>),
}

impl fmt::Debug for HalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalConfig::Declarative(d) => fmt::Debug::fmt(d, f),
            HalConfig::Procedure(_) => f.write_str("Procedure"),
        }
    }
}

impl Default for HalConfig {
    fn default() -> Self {
        HalConfig::Declarative(Declarative::default())
    }
}

impl HalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config consisting of a synchronous procedure only.
    pub fn procedure<F>(f: F) -> Self
    where
        F: Fn(&mut Representation) -> Result<(), HookError> + Send + Sync + 'static,
    {
        HalConfig::Procedure(Arc::new(FnHook(f)))
    }

    /// Config consisting of an arbitrary (possibly async) hook only.
    pub fn procedure_hook(hook: impl HalPopulatable + 'static) -> Self {
        HalConfig::Procedure(Arc::new(hook))
    }

    /// Parse declarative config. Unknown top-level keys are rejected.
    pub fn from_json(value: &Value) -> Result<Self, HalError> {
        let obj = value
            .as_object()
            .ok_or_else(|| HalError::InvalidConfig("hal config must be an object".into()))?;
        if let Some(key) = obj.keys().find(|k| !matches!(k.as_str(), "links" | "embed")) {
            return Err(HalError::InvalidConfig(format!("unknown hal config key {key}")));
        }
        Ok(HalConfig::Declarative(Declarative {
            links: links_from_json(obj.get("links"))?,
            embed: embeds_from_json(obj.get("embed"))?,
            prepare: None,
        }))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, HalError> {
        Self::from_json(&serde_json::from_str(raw)?)
    }

    /// Add a static link. A procedure config is turned into a declarative one
    /// that keeps the procedure as its `prepare` hook.
    pub fn link(self, rel: impl Into<String>, spec: impl Into<LinkSpec>) -> Self {
        let mut d = self.into_declarative();
        d.links.push((rel.into(), spec.into()));
        HalConfig::Declarative(d)
    }

    pub fn embed(self, rel: impl Into<String>, config: EmbedConfig) -> Self {
        let mut d = self.into_declarative();
        d.embed.push((rel.into(), Arc::new(config)));
        HalConfig::Declarative(d)
    }

    pub fn prepare<F>(self, f: F) -> Self
    where
        F: Fn(&mut Representation) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.prepare_hook(FnHook(f))
    }

    pub fn prepare_hook(self, hook: impl HalPopulatable + 'static) -> Self {
        let mut d = self.into_declarative();
        d.prepare = Some(Arc::new(hook));
        HalConfig::Declarative(d)
    }

    fn into_declarative(self) -> Declarative {
        match self {
            HalConfig::Declarative(d) => d,
            HalConfig::Procedure(p) => Declarative {
                prepare: Some(p),
                ..Declarative::default()
            },
        }
    }
}

/// A route as the engine sees it: the router's path template, an optional
/// name for link building and an optional hal configuration.
#[derive(Debug, Clone)]
pub struct HalRoute {
    pub path: String,
    pub name: Option<String>,
    pub hal: Option<HalConfig>,
}

impl HalRoute {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            hal: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn hal(mut self, hal: HalConfig) -> Self {
        self.hal = Some(hal);
        self
    }
}

fn object_entries<'v>(value: Option<&'v Value>, what: &str) -> Result<Option<&'v Map<String, Value>>, HalError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(HalError::InvalidConfig(format!("{what} must be an object"))),
    }
}

fn links_from_json(value: Option<&Value>) -> Result<Vec<(String, LinkSpec)>, HalError> {
    let Some(map) = object_entries(value, "links")? else {
        return Ok(Vec::new());
    };
    map.iter()
        .map(|(rel, spec)| -> Result<_, HalError> { Ok((rel.clone(), serde_json::from_value(spec.clone())?)) })
        .collect()
}

fn embeds_from_json(value: Option<&Value>) -> Result<Vec<(String, Arc<EmbedConfig>)>, HalError> {
    let Some(map) = object_entries(value, "embed")? else {
        return Ok(Vec::new());
    };
    map.iter()
        .map(|(rel, cfg)| -> Result<_, HalError> { Ok((rel.clone(), Arc::new(EmbedConfig::from_json(rel, cfg)?))) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declarative(cfg: HalConfig) -> Declarative {
        match cfg {
            HalConfig::Declarative(d) => d,
            HalConfig::Procedure(_) => panic!("expected declarative config"),
        }
    }

    #[test]
    fn parses_links_in_declaration_order() {
        let cfg = HalConfig::from_json(&json!({
            "links": {
                "mco:boss": "./boss",
                "alpha": { "href": "../{bossId}", "title": "Boss" },
                "mco:aaa": "/a"
            }
        }))
        .unwrap();
        let d = declarative(cfg);
        let rels: Vec<&str> = d.links.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(rels, ["mco:boss", "alpha", "mco:aaa"]);
        assert_eq!(d.links[1].1, LinkSpec::with_attr("../{bossId}", "title", "Boss"));
    }

    #[test]
    fn parses_nested_embeds() {
        let cfg = HalConfig::from_json(&json!({
            "embed": {
                "mco:person": {
                    "path": "items",
                    "href": "./{item.id}",
                    "links": { "mco:boss": "./boss" },
                    "embed": { "mco:pet": { "path": "pet", "href": "./pet" } }
                }
            }
        }))
        .unwrap();
        let d = declarative(cfg);
        let expected = EmbedConfig::new("items", "./{item.id}")
            .link("mco:boss", "./boss")
            .embed("mco:pet", EmbedConfig::new("pet", "./pet"));
        assert_eq!(d.embed, vec![("mco:person".to_string(), Arc::new(expected))]);
    }

    #[test]
    fn rejects_malformed_config() {
        assert!(HalConfig::from_json(&json!("nope")).is_err());
        assert!(HalConfig::from_json(&json!({ "links": [] })).is_err());
        assert!(HalConfig::from_json(&json!({ "lnks": {} })).is_err());
        assert!(HalConfig::from_json(&json!({ "embed": { "x": { "href": "./x" } } })).is_err());
        assert!(HalConfig::from_json(&json!({ "links": { "x": 5 } })).is_err());
        assert!(HalConfig::from_json_str("{").is_err());
    }

    #[test]
    fn builder_on_a_procedure_keeps_it_as_prepare() {
        let cfg = HalConfig::procedure(|_rep| Ok(())).link("mco:boss", "./boss");
        let d = declarative(cfg);
        assert!(d.prepare.is_some());
        assert_eq!(d.links.len(), 1);
    }
}
