//! Templates embedded into the mdpack binary, rendered with `tera`.
use std::collections::HashMap;

/// Title, description and generation comments opening an aggregate.
pub const HEADER_TEMPLATE: &str = include_str!("../templates/header.md");
/// Aggregate-level table of contents, one entry per section title.
pub const TOC_TEMPLATE: &str = include_str!("../templates/toc.md");
/// Generation details and the source file inventory.
pub const FOOTER_TEMPLATE: &str = include_str!("../templates/footer.md");

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("header.md", HEADER_TEMPLATE);
  templates.insert("toc.md", TOC_TEMPLATE);
  templates.insert("footer.md", FOOTER_TEMPLATE);
  templates
}
