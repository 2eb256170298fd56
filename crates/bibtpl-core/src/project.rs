//! Project directory creation and options loading.
//!
//! ## Directory layout
//!
//! ```text
//! <project>/
//! ├── bibtpl.config.json     # ConvertOptions
//! ├── references.bib         # sample source
//! └── templates/
//!     └── <style>.tpl        # starter template
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{ConvertOptions, CONFIG_FILE};
use crate::error::{BibTplError, Result};
use crate::scaffold::embedded;
use crate::scaffold::renderer::TemplateRenderer;

pub const TEMPLATES_DIR: &str = "templates";
pub const SAMPLE_SOURCE_FILE: &str = "references.bib";

/// Output flavour of the starter template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarterStyle {
    #[default]
    Html,
    Markdown,
    Plain,
}

impl StarterStyle {
    pub const ALL: [StarterStyle; 3] = [Self::Html, Self::Markdown, Self::Plain];

    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Plain => "plain",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Html => "HTML page with one section per group",
            Self::Markdown => "Markdown document with numbered lists",
            Self::Plain => "Plain text, one line per entry",
        }
    }

    fn starter(self) -> &'static str {
        match self {
            Self::Html => embedded::HTML_TEMPLATE,
            Self::Markdown => embedded::MARKDOWN_TEMPLATE,
            Self::Plain => embedded::PLAIN_TEMPLATE,
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.tpl", self.name())
    }
}

impl fmt::Display for StarterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StarterStyle {
    type Err = BibTplError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| BibTplError::UnknownOption {
                option: "style",
                value: s.to_string(),
            })
    }
}

/// Paths of a freshly scaffolded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldedProject {
    pub root: PathBuf,
    pub config: PathBuf,
    pub template: PathBuf,
    pub source: PathBuf,
}

/// Create a new project directory with an options file, a starter template
/// and a sample source.
pub fn create_project(project_dir: &Path, style: StarterStyle, options: &ConvertOptions) -> Result<ScaffoldedProject> {
    if project_dir.exists() {
        return Err(BibTplError::ProjectExists(project_dir.to_path_buf()));
    }

    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bibliography".to_string());

    let data = json!({
        "project_name": project_name,
        "lang": options.lang,
        "style": style.name(),
    });
    let starter = TemplateRenderer::new().render(style.starter(), &data)?;

    std::fs::create_dir_all(project_dir.join(TEMPLATES_DIR))?;

    let project = ScaffoldedProject {
        root: project_dir.to_path_buf(),
        config: project_dir.join(CONFIG_FILE),
        template: project_dir.join(TEMPLATES_DIR).join(style.file_name()),
        source: project_dir.join(SAMPLE_SOURCE_FILE),
    };

    options.save(&project.config)?;
    std::fs::write(&project.template, starter)?;
    std::fs::write(&project.source, embedded::SAMPLE_SOURCE)?;

    tracing::debug!("scaffolded {} project at {}", style, project_dir.display());
    Ok(project)
}

/// Load the options file at `path`, or the defaults when it does not exist.
pub fn load_options(path: &Path) -> Result<ConvertOptions> {
    if !path.exists() {
        tracing::debug!("no options file at {}, using defaults", path.display());
        return Ok(ConvertOptions::default());
    }
    ConvertOptions::load(path)
}
