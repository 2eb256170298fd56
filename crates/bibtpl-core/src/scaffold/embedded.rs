//! Starter files embedded from the repository's `templates/starters/` directory.
//!
//! Paths are relative to this file; a moved or renamed starter fails the build.

pub const HTML_TEMPLATE: &str = include_str!("../../../../templates/starters/html.tpl.hbs");
pub const MARKDOWN_TEMPLATE: &str = include_str!("../../../../templates/starters/markdown.tpl.hbs");
pub const PLAIN_TEMPLATE: &str = include_str!("../../../../templates/starters/plain.tpl.hbs");

/// Sample BibTeX source, copied verbatim.
pub const SAMPLE_SOURCE: &str = include_str!("../../../../templates/starters/references.bib");
