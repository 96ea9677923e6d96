use async_trait::async_trait;
use hal_render::{
    params, EmbedConfig, EntityRef, Extracted, HalConfig, HalEngine, HalEntity, HalError, HalOptions, HalRoute,
    HookError, HookPhase, LinkSpec, MockHook, NamespaceSpec, RelationSpec, RenderError, Representation,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn mco_curie() -> Value {
    json!({ "name": "mco", "href": "/rels/mycompany/{rel}", "templated": true })
}

fn engine() -> HalEngine {
    engine_with(HalOptions::default())
}

fn engine_with(options: HalOptions) -> HalEngine {
    let engine = HalEngine::builder()
        .options(options)
        .route(HalRoute::new("/teams/{team}").name("team"))
        .expect("Failed to register route")
        .build();
    engine
        .add_namespace(NamespaceSpec::new("mycompany", "mco").rel(RelationSpec::new("boss")))
        .expect("Failed to add namespace");
    engine
}

fn bob() -> Value {
    json!({ "firstName": "Bob", "lastName": "Smith", "bossId": "1234" })
}

/// Asserts structure and key order.
fn assert_doc(actual: &Value, expected: Value) {
    assert_eq!(actual, &expected);
    assert_eq!(
        serde_json::to_string(actual).unwrap(),
        serde_json::to_string(&expected).unwrap()
    );
}

#[tokio::test]
async fn test_self_and_simple_link() {
    let hal = HalConfig::new().link("mco:boss", "./boss");
    let doc = engine()
        .render(json!({ "firstName": "Bob", "lastName": "Smith" }), Some(&hal), "/people/100")
        .await
        .expect("Render failed");

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people/100" },
                "curies": [mco_curie()],
                "mco:boss": { "href": "/people/100/boss" }
            },
            "firstName": "Bob",
            "lastName": "Smith"
        }),
    );
}

#[tokio::test]
async fn test_templated_link_with_title() {
    let hal = HalConfig::new().link("mco:boss", LinkSpec::with_attr("../{bossId}", "title", "Boss"));
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people/100" },
                "curies": [mco_curie()],
                "mco:boss": { "href": "/people/1234", "title": "Boss" }
            },
            "firstName": "Bob",
            "lastName": "Smith",
            "bossId": "1234"
        }),
    );
}

#[tokio::test]
async fn test_prepare_hook_adds_links() {
    let hal = HalConfig::new().prepare(|rep| {
        rep.link("mco:boss", "http://www.whitehouse.gov");
        Ok(())
    });
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["mco:boss"], json!({ "href": "http://www.whitehouse.gov" }));
    assert_eq!(doc["_links"]["curies"], json!([mco_curie()]));
    assert_eq!(doc["bossId"], "1234");
}

#[tokio::test]
async fn test_bare_procedure_is_the_prepare_hook() {
    let hal = HalConfig::procedure(|rep| {
        rep.link("mco:boss", "http://www.whitehouse.gov");
        Ok(())
    });
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people/100" },
                "curies": [mco_curie()],
                "mco:boss": { "href": "http://www.whitehouse.gov" }
            },
            "firstName": "Bob",
            "lastName": "Smith",
            "bossId": "1234"
        }),
    );
}

#[tokio::test]
async fn test_embed_object_property() {
    let hal = HalConfig::new().embed("mco:boss", EmbedConfig::new("boss", "./boss"));
    let entity = json!({
        "firstName": "Bob",
        "lastName": "Smith",
        "boss": { "firstName": "Boss", "lastName": "Man" }
    });
    let doc = engine().render(entity, Some(&hal), "/people/100").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people/100" },
                "curies": [mco_curie()]
            },
            "firstName": "Bob",
            "lastName": "Smith",
            "_embedded": {
                "mco:boss": {
                    "_links": { "self": { "href": "/people/100/boss" } },
                    "firstName": "Boss",
                    "lastName": "Man"
                }
            }
        }),
    );
}

#[tokio::test]
async fn test_embedded_url_templates() {
    let hal = HalConfig::new().embed("mco:boss", EmbedConfig::new("boss", "/people/{self.id}/{item.id}"));
    let entity = json!({
        "id": 100,
        "firstName": "Bob",
        "lastName": "Smith",
        "boss": { "id": 200, "firstName": "Boss", "lastName": "Man" }
    });
    let doc = engine().render(entity, Some(&hal), "/people/100").await.unwrap();

    assert_eq!(
        doc["_embedded"]["mco:boss"]["_links"]["self"],
        json!({ "href": "/people/100/200" })
    );
    assert_eq!(doc["_embedded"]["mco:boss"]["id"], 200);
    assert!(doc.get("boss").is_none());
}

#[tokio::test]
async fn test_embedded_collection() {
    let hal = HalConfig::from_json(&json!({
        "embed": { "mco:person": { "path": "items", "href": "./{item.id}" } }
    }))
    .unwrap();
    let entity = json!({
        "start": 0,
        "count": 2,
        "total": 2,
        "items": [
            { "id": 100, "firstName": "Bob", "lastName": "Smith" },
            { "id": 200, "firstName": "Boss", "lastName": "Man" }
        ]
    });
    let doc = engine().render(entity, Some(&hal), "/people").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people" },
                "curies": [mco_curie()]
            },
            "start": 0,
            "count": 2,
            "total": 2,
            "_embedded": {
                "mco:person": [
                    {
                        "_links": { "self": { "href": "/people/100" } },
                        "id": 100,
                        "firstName": "Bob",
                        "lastName": "Smith"
                    },
                    {
                        "_links": { "self": { "href": "/people/200" } },
                        "id": 200,
                        "firstName": "Boss",
                        "lastName": "Man"
                    }
                ]
            }
        }),
    );
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: u32,
    first_name: String,
    boss_id: Option<u32>,
}

impl Person {
    fn new(id: u32, first_name: &str, boss_id: Option<u32>) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            boss_id,
        }
    }
}

#[async_trait]
impl HalEntity for Person {
    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    async fn to_hal(&self, rep: &mut Representation) -> Result<(), HookError> {
        rep.ignore("bossId");
        if self.boss_id.is_some() {
            rep.link("mco:boss", "../{bossId}");
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_entity_to_hal_hook() {
    let doc = engine()
        .render(Person::new(100, "Bob", Some(1234)), None, "/people/100")
        .await
        .unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/people/100" },
                "curies": [mco_curie()],
                "mco:boss": { "href": "/people/1234" }
            },
            "id": 100,
            "firstName": "Bob"
        }),
    );
}

#[tokio::test]
async fn test_to_hal_runs_after_prepare() {
    let hal = HalConfig::procedure(|rep| {
        assert!(!rep.has_link("mco:boss"));
        rep.link("mco:boss", "/first");
        Ok(())
    });
    let doc = engine()
        .render(Person::new(100, "Bob", Some(1234)), Some(&hal), "/people/100")
        .await
        .unwrap();

    assert_eq!(
        doc["_links"]["mco:boss"],
        json!([{ "href": "/first" }, { "href": "/people/1234" }])
    );
}

struct Team {
    name: String,
    members: Vec<Person>,
}

#[async_trait]
impl HalEntity for Team {
    fn to_value(&self) -> Value {
        json!({ "name": self.name, "members": self.members.len() })
    }

    fn embedded(&self, path: &str) -> Option<Extracted> {
        (path == "members").then(|| {
            Extracted::Many(
                self.members
                    .iter()
                    .map(|p| Arc::new(p.clone()) as EntityRef)
                    .collect(),
            )
        })
    }
}

#[tokio::test]
async fn test_typed_children_run_their_own_to_hal() {
    let team = Team {
        name: "platform".into(),
        members: vec![Person::new(100, "Bob", Some(200)), Person::new(200, "Alice", None)],
    };
    let hal = HalConfig::new().embed("mco:person", EmbedConfig::new("members", "/people/{item.id}"));
    let doc = engine().render(team, Some(&hal), "/teams/platform").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": {
                "self": { "href": "/teams/platform" },
                "curies": [mco_curie()]
            },
            "name": "platform",
            "_embedded": {
                "mco:person": [
                    {
                        "_links": {
                            "self": { "href": "/people/100" },
                            "mco:boss": { "href": "/people/200" }
                        },
                        "id": 100,
                        "firstName": "Bob"
                    },
                    {
                        "_links": { "self": { "href": "/people/200" } },
                        "id": 200,
                        "firstName": "Alice"
                    }
                ]
            }
        }),
    );
}

#[tokio::test]
async fn test_nested_embed_config() {
    let hal = HalConfig::new().embed(
        "mco:person",
        EmbedConfig::new("items", "./{item.id}")
            .link("mco:boss", "../{bossId}")
            .embed("mco:pet", EmbedConfig::new("pet", "./pet")),
    );
    let entity = json!({
        "items": [
            { "id": 100, "bossId": 200, "pet": { "name": "Rex" } },
            { "id": 200 }
        ]
    });
    let doc = engine().render(entity, Some(&hal), "/people").await.unwrap();

    let first = &doc["_embedded"]["mco:person"][0];
    assert_eq!(first["_links"]["self"]["href"], "/people/100");
    assert_eq!(first["_links"]["mco:boss"]["href"], "/people/200");
    assert!(first["_links"].get("curies").is_none());
    assert_eq!(
        first["_embedded"]["mco:pet"],
        json!({ "_links": { "self": { "href": "/people/100/pet" } }, "name": "Rex" })
    );
    assert!(first.get("pet").is_none());

    let second = &doc["_embedded"]["mco:person"][1];
    assert_eq!(second["_links"]["mco:boss"]["href"], "/people/");
    assert!(second.get("_embedded").is_none());
}

#[tokio::test]
async fn test_curies_collected_from_embedded_documents() {
    let engine = engine();
    engine
        .add_namespace(NamespaceSpec::new("zoo", "z").rel(RelationSpec::new("keeper")))
        .unwrap();
    let hal = HalConfig::new()
        .link("z:keeper", "/keepers/1")
        .embed("mco:person", EmbedConfig::new("items", "./{item.id}").link("mco:boss", "./boss"));
    let doc = engine
        .render(json!({ "items": [{ "id": 1 }] }), Some(&hal), "/people")
        .await
        .unwrap();

    assert_eq!(
        doc["_links"]["curies"],
        json!([
            mco_curie(),
            { "name": "z", "href": "/rels/zoo/{rel}", "templated": true }
        ])
    );
    assert!(doc["_embedded"]["mco:person"][0]["_links"].get("curies").is_none());
}

#[tokio::test]
async fn test_unknown_prefix_emits_link_without_curie() {
    let hal = HalConfig::new().link("xyz:thing", "./thing").link("next", "/people/101");
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["xyz:thing"]["href"], "/people/100/thing");
    assert_eq!(doc["_links"]["next"]["href"], "/people/101");
    assert!(doc["_links"].get("curies").is_none());
}

#[tokio::test]
async fn test_self_cannot_be_overridden() {
    let hal = HalConfig::new().link("self", "/elsewhere").prepare(|rep| {
        rep.link("self", "/nowhere");
        rep.set_link("curies", "/bogus");
        Ok(())
    });
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"], json!({ "self": { "href": "/people/100" } }));
}

#[tokio::test]
async fn test_set_and_remove_link() {
    let hal = HalConfig::new()
        .link("mco:boss", "/a")
        .link("mco:boss", "/b")
        .link("prev", "/people/99")
        .prepare(|rep| {
            assert_eq!(rep.links("mco:boss").len(), 2);
            rep.set_link("mco:boss", "/c");
            assert!(rep.remove_link("prev"));
            assert!(!rep.remove_link("prev"));
            Ok(())
        });
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["mco:boss"], json!({ "href": "/c" }));
    assert!(doc["_links"].get("prev").is_none());
}

#[tokio::test]
async fn test_removed_link_leaves_no_curie() {
    let hal = HalConfig::new().link("mco:boss", "./boss").prepare(|rep| {
        assert!(rep.remove_link("mco:boss"));
        Ok(())
    });
    let doc = engine().render(json!({ "a": 1 }), Some(&hal), "/people/100").await.unwrap();

    assert_doc(
        &doc,
        json!({
            "_links": { "self": { "href": "/people/100" } },
            "a": 1
        }),
    );
}

#[tokio::test]
async fn test_replaced_link_curie_follows_the_new_key() {
    let engine = engine();
    engine.add_namespace(NamespaceSpec::new("zoo", "z")).unwrap();
    let hal = HalConfig::new().link("z:keeper", "/keepers/1").prepare(|rep| {
        rep.remove_link("z:keeper");
        rep.link("mco:boss", "./boss");
        Ok(())
    });
    let doc = engine.render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["curies"], json!([mco_curie()]));
    assert!(doc["_links"].get("z:keeper").is_none());
}

#[tokio::test]
async fn test_declared_rfc6570_template_is_left_alone() {
    let hal = HalConfig::new().link(
        "search",
        LinkSpec::with_attr("./search{?q}", "templated", true),
    );
    let doc = engine().render(bob(), Some(&hal), "/people").await.unwrap();

    assert_eq!(
        doc["_links"]["search"],
        json!({ "href": "/people/search{?q}", "templated": true })
    );
}

#[tokio::test]
async fn test_link_to_named_route() {
    let hal = HalConfig::procedure(|rep| {
        rep.link_route("mco:team", "team", &params([("team", "{self.team}")]))?;
        Ok(())
    });
    let doc = engine()
        .render(json!({ "team": "platform" }), Some(&hal), "/people/100")
        .await
        .unwrap();

    assert_eq!(doc["_links"]["mco:team"]["href"], "/teams/platform");
    assert_eq!(doc["_links"]["curies"], json!([mco_curie()]));
}

#[tokio::test]
async fn test_link_to_unknown_route_fails_the_render() {
    let hal = HalConfig::procedure(|rep| {
        rep.link_route("mco:team", "nope", &params::<&str, &str, _>([]))?;
        Ok(())
    });
    let err = engine().render(bob(), Some(&hal), "/people/100").await.unwrap_err();

    match err {
        RenderError::Hook { phase, href, source } => {
            assert_eq!(phase, HookPhase::Prepare);
            assert_eq!(href, "/people/100");
            assert_eq!(source, HookError::from(HalError::UnknownRouteName("nope".into())));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_hook_embeds_a_fetched_entity() {
    let hal = HalConfig::procedure(|rep| {
        rep.embed_entity("mco:boss", "../{bossId}", json!({ "firstName": "Boss" }));
        Ok(())
    });
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(
        doc["_embedded"]["mco:boss"],
        json!({ "_links": { "self": { "href": "/people/1234" } }, "firstName": "Boss" })
    );
    assert_eq!(doc["bossId"], "1234");
}

#[tokio::test]
async fn test_empty_and_missing_embeds() {
    let hal = HalConfig::new()
        .embed("mco:person", EmbedConfig::new("items", "./{item.id}"))
        .embed("mco:boss", EmbedConfig::new("boss", "./boss"));
    let doc = engine()
        .render(json!({ "items": [], "boss": null }), Some(&hal), "/people")
        .await
        .unwrap();

    assert_eq!(doc["_embedded"], json!({ "mco:person": [] }));
    assert_eq!(doc["boss"], Value::Null);
    assert!(doc.get("items").is_none());
}

#[tokio::test]
async fn test_failing_hook_produces_no_document() {
    let hal = HalConfig::procedure(|_rep| Err("database unavailable".into()));
    let err = engine().render(bob(), Some(&hal), "/people/100").await.unwrap_err();

    assert!(matches!(
        err,
        RenderError::Hook { phase: HookPhase::Prepare, ref source, .. }
            if *source == HookError::Failed("database unavailable".into())
    ));
}

struct Broken;

#[async_trait]
impl HalEntity for Broken {
    fn to_value(&self) -> Value {
        json!({})
    }

    async fn to_hal(&self, _rep: &mut Representation) -> Result<(), HookError> {
        Err("no links today".into())
    }
}

#[tokio::test]
async fn test_failing_embedded_to_hal_fails_the_whole_render() {
    let team = Team {
        name: "x".into(),
        members: Vec::new(),
    };
    let hal = HalConfig::procedure(|rep| {
        rep.embed_entity("mco:person", "./broken", Broken);
        Ok(())
    });
    let err = engine().render(team, Some(&hal), "/teams/x").await.unwrap_err();

    match err {
        RenderError::Hook { phase, href, .. } => {
            assert_eq!(phase, HookPhase::ToHal);
            assert_eq!(href, "/teams/x/broken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_async_hook_with_mock() {
    let hook = MockHook::new();
    hook.expect_call()
        .link("mco:boss", "./boss")
        .after(Duration::from_millis(10))
        .return_ok();

    let hal = HalConfig::procedure_hook(hook.clone());
    let doc = engine().render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["mco:boss"]["href"], "/people/100/boss");
    assert_eq!(hook.calls(), 1);
    hook.verify();
}

#[tokio::test]
async fn test_mock_hook_error() {
    let hook = MockHook::new();
    hook.expect_call().return_err("scripted failure");

    let hal = HalConfig::new().link("mco:boss", "./boss").prepare_hook(hook.clone());
    let err = engine().render(bob(), Some(&hal), "/people/100").await.unwrap_err();

    assert!(matches!(err, RenderError::Hook { phase: HookPhase::Prepare, .. }));
    assert_eq!(err.to_string(), "prepare hook failed for /people/100: scripted failure");
    hook.verify();
}

#[tokio::test]
async fn test_hook_timeout() {
    let hook = MockHook::new();
    hook.expect_call().after(Duration::from_secs(5)).return_ok();

    let engine = engine_with(HalOptions {
        hook_timeout_ms: Some(20),
        ..HalOptions::default()
    });
    let hal = HalConfig::procedure_hook(hook.clone());
    let err = engine.render(bob(), Some(&hal), "/people/100").await.unwrap_err();

    match err {
        RenderError::HookTimeout { phase, href, timeout } => {
            assert_eq!(phase, HookPhase::Prepare);
            assert_eq!(href, "/people/100");
            assert_eq!(timeout, Duration::from_millis(20));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[should_panic(expected = "Not all hook expectations were met")]
async fn test_mock_verify_panics_on_unmet_expectations() {
    let hook = MockHook::new();
    hook.expect_call().return_ok();
    hook.verify();
}

#[tokio::test]
async fn test_custom_rels_path() {
    let engine = engine_with(HalOptions::from_json(r#"{ "rels_path": "/docs/rels/" }"#).unwrap());
    let hal = HalConfig::new().link("mco:boss", "./boss");
    let doc = engine.render(bob(), Some(&hal), "/people/100").await.unwrap();

    assert_eq!(doc["_links"]["curies"][0]["href"], "/docs/rels/mycompany/{rel}");
}

#[tokio::test]
async fn test_render_route_uses_registered_config() {
    let engine = HalEngine::builder()
        .route(
            HalRoute::new("/people/{id}")
                .name("person")
                .hal(HalConfig::new().link("mco:boss", "../{bossId}")),
        )
        .unwrap()
        .build();
    engine.add_namespace(NamespaceSpec::new("mycompany", "mco")).unwrap();

    let doc = engine.render_route("/people/{id}", "/people/100", bob()).await.unwrap();
    assert_eq!(doc["_links"]["mco:boss"]["href"], "/people/1234");

    let plain = engine.render_route("/other", "/other", bob()).await.unwrap();
    assert_eq!(plain["_links"], json!({ "self": { "href": "/other" } }));

    assert_eq!(engine.route("person", &params([("id", "7")])).unwrap(), "/people/7");
}

#[tokio::test]
async fn test_rendering_is_deterministic() {
    let engine = engine();
    let hal = HalConfig::new()
        .link("mco:boss", LinkSpec::with_attr("../{bossId}", "title", "Boss"))
        .link("alpha", "./alpha")
        .embed("mco:person", EmbedConfig::new("items", "./{item.id}"));
    let entity = json!({ "bossId": "1", "items": [{ "id": 3 }, { "id": 2 }, { "id": 1 }] });

    let first = engine.render(entity.clone(), Some(&hal), "/people").await.unwrap();
    let second = engine.render(entity, Some(&hal), "/people").await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let ids: Vec<&Value> = first["_embedded"]["mco:person"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| &item["id"])
        .collect();
    assert_eq!(ids, [&json!(3), &json!(2), &json!(1)]);
}

#[tokio::test]
async fn test_concurrent_renders_do_not_interfere() {
    let engine = engine();
    let hal = Arc::new(HalConfig::new().link("mco:boss", "./boss"));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            let hal = hal.clone();
            tokio::spawn(async move {
                engine
                    .render(json!({ "id": i }), Some(hal.as_ref()), &format!("/people/{i}"))
                    .await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let doc = task.await.unwrap().unwrap();
        assert_eq!(doc["_links"]["mco:boss"]["href"], format!("/people/{i}/boss"));
        assert_eq!(doc["id"], i);
    }
}
