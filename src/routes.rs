//! # Named routes
//!
//! Routes may carry a name. The [`RouteIndex`] remembers the path template
//! behind each name so links can be built from `("person", {id: "7"})`
//! instead of hard-coded paths.
//!
//! Templates are `/`-separated. A segment is either literal, a required
//! parameter `{id}` or an optional parameter `{page?}` that is dropped when
//! no value is supplied.

use crate::error::HalError;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
}

/// A parsed route path such as `/people/{id}/reports/{year?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(inner) => match inner.strip_suffix('?') {
                    Some(name) => Segment::Param {
                        name: name.to_string(),
                        optional: true,
                    },
                    None => Segment::Param {
                        name: inner.to_string(),
                        optional: false,
                    },
                },
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in path order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute `params` into the template. `route` only labels errors.
    pub fn expand(&self, route: &str, params: &HashMap<String, String>) -> Result<String, HalError> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => {
                    out.push('/');
                    out.push_str(lit);
                }
                Segment::Param { name, optional } => match params.get(name) {
                    Some(value) => {
                        out.push('/');
                        out.push_str(value);
                    }
                    None if *optional => {}
                    None => {
                        return Err(HalError::MissingParameter {
                            route: route.to_string(),
                            param: name.clone(),
                        })
                    }
                },
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

/// Route name to path template. Filled while routes are registered, then
/// shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    routes: BTreeMap<String, PathTemplate>,
}

impl RouteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, path: &str) -> Result<(), HalError> {
        let name = name.into();
        if self.routes.contains_key(&name) {
            return Err(HalError::DuplicateRouteName(name));
        }
        info!(route = %name, path, "Route name registered");
        self.routes.insert(name, PathTemplate::parse(path));
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<&PathTemplate> {
        self.routes.get(name)
    }

    /// Concrete path for the route registered as `name`.
    pub fn resolve(&self, name: &str, params: &HashMap<String, String>) -> Result<String, HalError> {
        let template = self
            .routes
            .get(name)
            .ok_or_else(|| HalError::UnknownRouteName(name.to_string()))?;
        let path = template.expand(name, params)?;
        debug!(route = name, %path, "Route resolved");
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Build a parameter map from string pairs.
pub fn params<K, V, I>(pairs: I) -> HashMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
