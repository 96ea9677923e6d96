//! # URI Resolution
//!
//! Pure functions turning configured hrefs into concrete ones:
//!
//! 1. [`expand_template`] substitutes `{path.to.value}` placeholders from a
//!    [`TemplateContext`].
//! 2. [`resolve_relative`] resolves the result against the self href of the
//!    representation being built.
//! 3. [`resolve_link_value`] applies both to a [`LinkSpec`].
//!
//! The self href is treated as a directory: `./boss` against `/people/100`
//! is `/people/100/boss`, and `../200` is `/people/200`.

mod relative;
mod template;

pub use relative::resolve_relative;
pub use template::{expand_template, TemplateContext};

use crate::link::{Link, LinkSpec};

/// Expand and resolve a configured link against `base`.
///
/// Only the href is rewritten; other attributes are copied as-is. Links
/// flagged `templated: true` skip expansion.
pub fn resolve_link_value(value: &LinkSpec, base: &str, ctx: &TemplateContext<'_>) -> Link {
    let href = if value.is_templated() {
        value.href().to_string()
    } else {
        expand_template(value.href(), ctx)
    };
    let href = resolve_relative(base, &href);
    match value {
        LinkSpec::Href(_) => Link::new(href),
        LinkSpec::Object { attrs, .. } => Link {
            href,
            attrs: attrs.clone(),
        },
    }
}
