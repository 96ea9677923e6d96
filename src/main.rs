//! # HAL Render demo
//!
//! Renders the two resources of a tiny people API and prints the documents.
//!
//! - `/people/{id}`: a person with a link to their boss and the boss embedded.
//! - `/people`: a collection whose items are embedded one by one.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin hal-demo
//! ```

use hal_render::{
    params, setup_tracing, EmbedConfig, HalConfig, HalEngine, HalRoute, LinkSpec, NamespaceSpec, RelationSpec,
};
use serde_json::json;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let person = HalConfig::new()
        .link("mco:boss", LinkSpec::with_attr("../{bossId}", "title", "Boss"))
        .embed("mco:boss", EmbedConfig::new("boss", "../{item.id}"))
        .prepare(|rep| {
            rep.link_route("mco:team", "team", &params([("team", "{self.team}")]))?;
            Ok(())
        });
    let people = HalConfig::new().embed(
        "mco:person",
        EmbedConfig::new("items", "./{item.id}").link("mco:boss", "../{bossId}"),
    );

    let engine = HalEngine::builder()
        .route(HalRoute::new("/people/{id}").name("person").hal(person))
        .and_then(|b| b.route(HalRoute::new("/people").name("people").hal(people)))
        .and_then(|b| b.route(HalRoute::new("/teams/{team}").name("team")))
        .map_err(|e| e.to_string())?
        .build();

    engine
        .add_namespace(
            NamespaceSpec::new("mycompany", "mco")
                .rel(RelationSpec::new("boss").description("An employee's boss"))
                .rel(RelationSpec::new("person").description("A member of staff"))
                .rel(RelationSpec::new("team").description("The team someone works in")),
        )
        .map_err(|e| e.to_string())?;

    let bob = json!({
        "id": 100,
        "name": "Bob",
        "bossId": 200,
        "team": "platform",
        "boss": { "id": 200, "name": "Alice" }
    });
    let doc = engine
        .render_route("/people/{id}", "/people/100", bob)
        .instrument(tracing::info_span!("person"))
        .await
        .map_err(|e| e.to_string())?;
    info!("Rendered person");
    println!("{}", serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?);

    let staff = json!({
        "count": 2,
        "items": [
            { "id": 100, "name": "Bob", "bossId": 200 },
            { "id": 200, "name": "Alice", "bossId": 300 }
        ]
    });
    let doc = engine
        .render_route("/people", "/people", staff)
        .instrument(tracing::info_span!("people"))
        .await
        .map_err(|e| e.to_string())?;
    info!("Rendered people");
    println!("{}", serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?);

    Ok(())
}
