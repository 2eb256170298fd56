//! Starter files written by `bibtpl init`.
//!
//! The starter templates are embedded at compile time by [`embedded`] and
//! rendered with [Handlebars](https://handlebarsjs.com/) through
//! [`renderer::TemplateRenderer`] before they are written to disk.
//!
//! ## Handlebars variables
//!
//! - `{{project_name}}`: name of the project directory
//! - `{{lang}}`: locale id chosen at init time
//! - `{{style}}`: starter style (`html`, `markdown`, `plain`)
//!
//! Handlebars only reacts to `{{`, so the `@...@` directives of the
//! starters pass through untouched and are evaluated later by the
//! conversion itself.

pub mod embedded;
pub mod renderer;
