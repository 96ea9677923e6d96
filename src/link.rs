//! Link values as configured and as emitted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A configured link: either a bare href or an object carrying an href plus
/// extra attributes (`title`, `name`, `templated`, ...).
///
/// Both forms may contain `{self.x}` / `{item.x}` placeholders and may be
/// relative to the self href of the representation they end up in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkSpec {
    Href(String),
    Object {
        href: String,
        #[serde(flatten)]
        attrs: Map<String, Value>,
    },
}

impl LinkSpec {
    /// Link object with one extra attribute. Chain [`LinkSpec::attr`] for more.
    pub fn with_attr(href: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        LinkSpec::Href(href.into()).attr(key, value)
    }

    pub fn attr(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (href, mut attrs) = match self {
            LinkSpec::Href(href) => (href, Map::new()),
            LinkSpec::Object { href, attrs } => (href, attrs),
        };
        attrs.insert(key.into(), value.into());
        LinkSpec::Object { href, attrs }
    }

    pub fn href(&self) -> &str {
        match self {
            LinkSpec::Href(href) | LinkSpec::Object { href, .. } => href,
        }
    }

    /// Declared RFC 6570 templates are handed to the client untouched.
    pub fn is_templated(&self) -> bool {
        match self {
            LinkSpec::Href(_) => false,
            LinkSpec::Object { attrs, .. } => attrs.get("templated") == Some(&Value::Bool(true)),
        }
    }
}

impl From<&str> for LinkSpec {
    fn from(href: &str) -> Self {
        LinkSpec::Href(href.to_string())
    }
}

impl From<String> for LinkSpec {
    fn from(href: String) -> Self {
        LinkSpec::Href(href)
    }
}

/// A resolved link object as it appears under `_links`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub attrs: Map<String, Value>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            attrs: Map::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("href".into(), Value::String(self.href.clone()));
        for (k, v) in &self.attrs {
            if k != "href" {
                obj.insert(k.clone(), v.clone());
            }
        }
        Value::Object(obj)
    }
}
