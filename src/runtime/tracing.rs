//! # Observability & Tracing
//!
//! The engine logs through `tracing` with structured fields; hosts decide
//! where the events go. [`setup_tracing`] is the default subscriber used by
//! the demo binary.
//!
//! ## What Gets Traced
//!
//! - **Registration** (`info`): namespaces, route names, engine startup
//! - **Rendering** (`debug`): render start/finish per request path, embeds
//!   that found nothing, relation keys with an unknown prefix
//! - **Degraded outcomes** (`warn`): attempts to override `self` or
//!   `curies`, duplicate namespaces, failed or timed-out hooks
//!
//! ## Usage Examples
//!
//! ```bash
//! # Registration and failures only
//! RUST_LOG=info cargo run --bin hal-demo
//!
//! # Every render phase
//! RUST_LOG=hal_render=debug cargo run --bin hal-demo
//! ```
//!
//! With `RUST_LOG=debug` a render looks like:
//!
//! ```text
//! INFO Namespace registered name="mycompany" prefix="mco" rels=1
//! INFO Hal engine ready routes=2 named_routes=2 namespaces=1
//! DEBUG Render started href="/people/100"
//! DEBUG Render finished href="/people/100" curies=1
//! ```

/// Initializes the tracing subscriber.
///
/// Filtering follows `RUST_LOG`. Output is compact and omits module paths.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
