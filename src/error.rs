//! # Errors
//!
//! Configuration problems (duplicate names, unknown routes) surface as
//! [`HalError`] at registration time. Rendering a response can only fail
//! through a hook, which is reported as a [`RenderError`].

use std::time::Duration;
use thiserror::Error;

/// Configuration and integrity errors raised while registering namespaces,
/// relations or routes, or while resolving a named route.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HalError {
    /// A namespace with the same name or prefix is already registered.
    #[error("Namespace already registered: {name} (prefix {prefix})")]
    DuplicateNamespace { name: String, prefix: String },

    /// Two routes declared the same name.
    #[error("Route name already registered: {0}")]
    DuplicateRouteName(String),

    /// No route was registered under this name.
    #[error("Unknown route name: {0}")]
    UnknownRouteName(String),

    /// A required `{param}` segment had no value.
    #[error("Route {route} is missing parameter {param}")]
    MissingParameter { route: String, param: String },

    /// Declarative configuration could not be interpreted.
    #[error("Invalid hal configuration: {0}")]
    InvalidConfig(String),

    /// A relation source failed to produce a namespace spec.
    #[error("Relation loader error: {0}")]
    Loader(String),
}

impl From<serde_json::Error> for HalError {
    fn from(e: serde_json::Error) -> Self {
        HalError::InvalidConfig(e.to_string())
    }
}

/// Failure signalled by a `prepare` or `to_hal` hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),
}

impl From<String> for HookError {
    fn from(msg: String) -> Self {
        HookError::Failed(msg)
    }
}

impl From<&str> for HookError {
    fn from(msg: &str) -> Self {
        HookError::Failed(msg.to_string())
    }
}

impl From<HalError> for HookError {
    fn from(e: HalError) -> Self {
        HookError::Failed(e.to_string())
    }
}

/// The hook phase that was running when rendering stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Prepare,
    ToHal,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookPhase::Prepare => write!(f, "prepare"),
            HookPhase::ToHal => write!(f, "to_hal"),
        }
    }
}

/// Outcome of a failed render. Hosts map every variant to an internal error.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{phase} hook failed for {href}: {source}")]
    Hook {
        phase: HookPhase,
        href: String,
        #[source]
        source: HookError,
    },

    #[error("{phase} hook for {href} did not complete within {timeout:?}")]
    HookTimeout {
        phase: HookPhase,
        href: String,
        timeout: Duration,
    },

    #[error(transparent)]
    Config(#[from] HalError),
}
