#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # HAL Render
//!
//! > **Hypermedia (HAL) responses for JSON APIs, configured per route.**
//!
//! A handler returns a plain entity. The engine turns it into a HAL
//! document: a `_links` object with `self`, relation links and curies,
//! the entity's own fields, and an `_embedded` object with sub-resources that
//! are rendered the same way.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Configuration, not plumbing
//!
//! Links and embeds are declared next to the route as data
//! ([`HalConfig`]), with hooks for whatever cannot be declared:
//! - **Declarative**: `links` and `embed` maps, href templates such as
//!   `../{bossId}` or `/people/{self.id}/{item.id}`.
//! - **Procedural**: a `prepare` hook on the route and a `to_hal` hook on the
//!   entity type ([`HalEntity`]), both async.
//!
//! ### Documented relations
//!
//! Relation keys like `mco:boss` belong to a [`Namespace`]. Every namespace
//! used anywhere in a response is advertised once, as a curie on the
//! top-level document.
//!
//! ## 🚀 Core Concepts
//!
//! ### Explicit registries
//! Namespaces and route names live in a [`NamespaceRegistry`] and a
//! [`RouteIndex`] owned by the [`HalEngine`]. Nothing is global; two engines
//! in one process never see each other's names.
//!
//! ### Deterministic output
//! `_links` comes first, then the entity's fields, then `_embedded`. Links
//! and embeds keep their declaration order and curies are sorted by prefix,
//! so the same input always serializes to the same bytes.
//!
//! ### Mocking: Testing without Pain
//! Hooks are the only asynchronous part of a render. [`MockHook`] scripts
//! them. See the [`mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Registration problems are [`HalError`]s. A render can only fail through a
//! hook and reports a [`RenderError`] that names the phase and the resource.
//! No partial document is ever returned.
//!
//! ### 2. Observability
//! Everything logs through `tracing`. See [`runtime::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`engine`], [`representation`])
//! - **Role**: Runs the render phases and assembles the document.
//! - **Key items**: [`HalEngine`], [`HalEngineBuilder`], [`Representation`].
//!
//! ### 2. The Vocabulary ([`namespace`], [`routes`])
//! - **Role**: Registries for link relations and named routes.
//! - **Key items**: [`NamespaceRegistry`], [`Namespace`], [`Relation`], [`RouteIndex`].
//!
//! ### 3. The Configuration ([`hal_config`], [`config`], [`link`])
//! - **Role**: What a route renders and how the engine behaves.
//! - **Key items**: [`HalConfig`], [`EmbedConfig`], [`LinkSpec`], [`HalOptions`].
//!
//! ### 4. The Hooks ([`entity`], [`hooks`])
//! - **Role**: Extension points for entities and routes.
//! - **Key items**: [`HalEntity`], [`HalPopulatable`].
//!
//! ### 5. The Helpers ([`uri`], [`mock`], [`runtime`])
//! - **Role**: Href templating and resolution, test doubles, logging setup.
//!
//! ## 🚀 Quick Start
//!
//! ```
//! use hal_render::{HalConfig, HalEngine, NamespaceSpec, RelationSpec};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = HalEngine::builder().build();
//! engine.add_namespace(NamespaceSpec::new("mycompany", "mco").rel(RelationSpec::new("boss")))?;
//!
//! let hal = HalConfig::new().link("mco:boss", "./boss");
//! let doc = engine.render(json!({ "name": "Bob" }), Some(&hal), "/people/100").await?;
//!
//! assert_eq!(doc["_links"]["mco:boss"]["href"], "/people/100/boss");
//! assert_eq!(doc["_links"]["curies"][0]["href"], "/rels/mycompany/{rel}");
//! assert_eq!(doc["name"], "Bob");
//! # Ok(())
//! # }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin hal-demo
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod hal_config;
pub mod hooks;
pub mod link;
pub mod mock;
pub mod namespace;
pub mod representation;
pub mod routes;
pub mod runtime;
pub mod uri;

pub use config::HalOptions;
pub use engine::{HalEngine, HalEngineBuilder};
pub use entity::{EntityRef, Extracted, HalEntity};
pub use error::{HalError, HookError, HookPhase, RenderError};
pub use hal_config::{Declarative, EmbedConfig, HalConfig, HalRoute};
pub use hooks::{FnHook, HalPopulatable};
pub use link::{Link, LinkSpec};
pub use mock::MockHook;
pub use namespace::{
    JsonRelationSource, Namespace, NamespaceRegistry, NamespaceSpec, RelArg, Relation, RelationQuery,
    RelationSource, RelationSpec,
};
pub use representation::Representation;
pub use routes::{params, PathTemplate, RouteIndex};
pub use runtime::setup_tracing;
pub use uri::{expand_template, resolve_link_value, resolve_relative, TemplateContext};
