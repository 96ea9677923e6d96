use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").ok());

/// Objects a template placeholder can read from.
///
/// `{self.x}` reads the entity being rendered, `{item.x}` the element
/// currently being embedded. A path with neither root reads the entity.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub entity: &'a Value,
    pub item: Option<&'a Value>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(entity: &'a Value) -> Self {
        Self { entity, item: None }
    }

    pub fn with_item(entity: &'a Value, item: &'a Value) -> Self {
        Self {
            entity,
            item: Some(item),
        }
    }

    /// Walk a dotted path. Numeric segments index into arrays. `item.*`
    /// resolves to nothing outside an embed.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let segments: Vec<&str> = path.trim().split('.').collect();
        let (root, rest) = match segments.split_first() {
            Some((&"self", rest)) => (self.entity, rest),
            Some((&"item", rest)) => (self.item?, rest),
            _ => (self.entity, segments.as_slice()),
        };
        rest.iter().try_fold(root, |value, seg| match value {
            Value::Object(map) => map.get(*seg),
            Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

/// Replace every `{path}` placeholder with the value found in `ctx`.
///
/// Strings are inserted verbatim, numbers and booleans in their JSON form.
/// Missing paths, nulls, objects and arrays become the empty string.
pub fn expand_template(template: &str, ctx: &TemplateContext<'_>) -> String {
    let Some(re) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &Captures<'_>| {
        ctx.lookup(&caps[1]).map(scalar_text).unwrap_or_default()
    })
    .into_owned()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
