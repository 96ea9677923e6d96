use super::HalEngine;
use crate::entity::EntityRef;
use crate::error::{HookError, HookPhase, RenderError};
use crate::hal_config::{EmbedConfig, HalConfig};
use crate::hooks::HalPopulatable;
use crate::link::{Link, LinkSpec};
use crate::representation::Representation;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

type RenderFuture<'a> = Pin<Box<dyn Future<Output = Result<Rendered, RenderError>> + Send + 'a>>;

/// What to apply to one entity.
#[derive(Clone, Copy, Default)]
struct Plan<'c> {
    links: &'c [(String, LinkSpec)],
    embed: &'c [(String, Arc<EmbedConfig>)],
    prepare: Option<&'c Arc<dyn HalPopulatable>>,
}

impl<'c> Plan<'c> {
    fn for_route(hal: Option<&'c HalConfig>) -> Self {
        match hal {
            None => Plan::default(),
            Some(HalConfig::Declarative(d)) => Plan {
                links: &d.links,
                embed: &d.embed,
                prepare: d.prepare.as_ref(),
            },
            Some(HalConfig::Procedure(p)) => Plan {
                prepare: Some(p),
                ..Plan::default()
            },
        }
    }

    fn for_embed(config: Option<&'c EmbedConfig>) -> Self {
        match config {
            None => Plan::default(),
            Some(c) => Plan {
                links: &c.links,
                embed: &c.embed,
                prepare: None,
            },
        }
    }
}

struct Rendered {
    doc: Value,
    /// prefix -> namespace name
    used: BTreeMap<String, String>,
}

pub(super) async fn render_document(
    engine: &HalEngine,
    entity: EntityRef,
    hal: Option<&HalConfig>,
    request_path: &str,
) -> Result<Value, RenderError> {
    debug!(href = request_path, "Render started");
    let rendered = render_node(engine, entity, Plan::for_route(hal), Link::new(request_path), true).await?;
    debug!(href = request_path, curies = rendered.used.len(), "Render finished");
    Ok(rendered.doc)
}

fn render_node<'a>(
    engine: &'a HalEngine,
    entity: EntityRef,
    plan: Plan<'a>,
    self_link: Link,
    top_level: bool,
) -> RenderFuture<'a> {
    Box::pin(async move {
        let href = self_link.href.clone();
        let mut rep = Representation::new(engine.shared.clone(), entity.clone(), self_link);

        for (rel, spec) in plan.links {
            rep.link(rel, spec.clone());
        }
        for (rel, config) in plan.embed {
            rep.embed_config(rel, config.clone());
        }
        if let Some(prepare) = plan.prepare {
            await_hook(engine, HookPhase::Prepare, &href, prepare.populate(&mut rep)).await?;
        }
        await_hook(engine, HookPhase::ToHal, &href, entity.to_hal(&mut rep)).await?;

        let mut used = rep.used_namespaces();
        let mut embedded = Map::new();
        for entry in rep.take_embeds() {
            let mut docs = Vec::with_capacity(entry.items.len());
            for item in entry.items {
                let child = render_node(
                    engine,
                    item.entity,
                    Plan::for_embed(item.config.as_deref()),
                    item.self_link,
                    false,
                )
                .await?;
                for (prefix, name) in child.used {
                    used.entry(prefix).or_insert(name);
                }
                docs.push(child.doc);
            }
            let value = if entry.many {
                Value::Array(docs)
            } else {
                docs.into_iter().next().unwrap_or(Value::Null)
            };
            embedded.insert(entry.rel, value);
        }

        let curies = if top_level {
            used.iter()
                .map(|(prefix, name)| {
                    json!({
                        "name": prefix,
                        "href": engine.shared.options.curie_href(name),
                        "templated": true,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Rendered {
            doc: rep.finish(curies, embedded),
            used,
        })
    })
}

/// Wait for a hook, bounded by the configured timeout.
async fn await_hook<F>(engine: &HalEngine, phase: HookPhase, href: &str, hook: F) -> Result<(), RenderError>
where
    F: Future<Output = Result<(), HookError>> + Send,
{
    let outcome = match engine.shared.options.hook_timeout() {
        Some(limit) => match tokio::time::timeout(limit, hook).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%phase, href, ?limit, "Hook timed out");
                return Err(RenderError::HookTimeout {
                    phase,
                    href: href.to_string(),
                    timeout: limit,
                });
            }
        },
        None => hook.await,
    };
    outcome.map_err(|source| {
        warn!(%phase, href, error = %source, "Hook failed");
        RenderError::Hook {
            phase,
            href: href.to_string(),
            source,
        }
    })
}
