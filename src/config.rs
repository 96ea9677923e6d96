//! Engine options.

use serde::Deserialize;
use std::time::Duration;

/// Base path under which relation documentation is served.
pub const DEFAULT_RELS_PATH: &str = "/rels";

/// Options shared by every render.
///
/// ```
/// use hal_render::HalOptions;
///
/// let opts = HalOptions::from_json(r#"{ "rels_path": "/docs/rels", "hook_timeout_ms": 250 }"#).unwrap();
/// assert_eq!(opts.curie_href("mycompany"), "/docs/rels/mycompany/{rel}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HalOptions {
    /// Prefix of every curie href.
    pub rels_path: String,
    /// Upper bound for a single `prepare` or `to_hal` hook. Unset waits forever.
    pub hook_timeout_ms: Option<u64>,
}

impl Default for HalOptions {
    fn default() -> Self {
        Self {
            rels_path: DEFAULT_RELS_PATH.to_string(),
            hook_timeout_ms: None,
        }
    }
}

impl HalOptions {
    pub fn from_json(raw: &str) -> Result<Self, crate::HalError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }

    /// Curie href template for a namespace, e.g. `/rels/mycompany/{rel}`.
    pub fn curie_href(&self, namespace: &str) -> String {
        format!("{}/{}/{{rel}}", self.rels_path.trim_end_matches('/'), namespace)
    }
}
