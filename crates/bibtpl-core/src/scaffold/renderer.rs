//! Handlebars renderer for starter files.
//!
//! Strict mode is on: a `{{variable}}` missing from the data context is an
//! error instead of an empty string, so a starter never ships with a hole.

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::{BibTplError, Result};

pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        Self { hbs }
    }

    /// Render a starter with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        self.hbs
            .render_template(template, data)
            .map_err(|e| BibTplError::TemplateRender(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
