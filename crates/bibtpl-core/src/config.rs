//! Conversion options and their JSON options file (`bibtpl.config.json`).

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BibTplError, Result};

/// Conventional options file name.
pub const CONFIG_FILE: &str = "bibtpl.config.json";

/// Sort direction for groups (`group-order`) and entries (`order`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    None,
}

impl FromStr for SortOrder {
    type Err = BibTplError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            "none" => Ok(Self::None),
            other => Err(BibTplError::UnknownOption {
                option: "order",
                value: other.to_string(),
            }),
        }
    }
}

/// How display keys are assigned after grouping and sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// Collection-wide counter `1..N`.
    #[default]
    Numeric,
    /// Copy of the entry's citation key.
    Cite,
    /// Any other format: a literal `?`.
    #[serde(other)]
    Placeholder,
}

impl FromStr for KeyFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "numeric" => Self::Numeric,
            "cite" => Self::Cite,
            _ => Self::Placeholder,
        })
    }
}

/// Entry filters; an empty pattern disables the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlyFilter {
    /// Case-insensitive pattern matched against the rendered author list.
    pub author: String,
    /// Case-insensitive pattern matched against the entry type.
    pub entrytype: String,
}

/// All options of one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub only: OnlyFilter,
    /// `none`, `year`, `firstauthor`, `entrytype` or any field name.
    pub group: String,
    #[serde(rename = "group-order")]
    pub group_order: SortOrder,
    /// `none` or a field name.
    pub sort: String,
    pub order: SortOrder,
    pub lang: String,
    pub key_format: KeyFormat,
    #[serde(rename = "anonymous-whole")]
    pub anonymous_whole: bool,
    /// Caller-injected template globals.
    pub globals: BTreeMap<String, String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            only: OnlyFilter::default(),
            group: "year".into(),
            group_order: SortOrder::Desc,
            sort: "none".into(),
            order: SortOrder::None,
            lang: "en".into(),
            key_format: KeyFormat::Numeric,
            anonymous_whole: false,
            globals: BTreeMap::new(),
        }
    }
}

impl ConvertOptions {
    /// Load options from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| BibTplError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| BibTplError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write options as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| BibTplError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Grouping field, or `None` when grouping is disabled.
    pub fn grouping(&self) -> Option<&str> {
        match self.group.as_str() {
            "" | "none" => None,
            field => Some(field),
        }
    }

    /// Entry sort field, or `None` when entries keep their filtered order.
    pub fn sorting(&self) -> Option<&str> {
        match self.sort.as_str() {
            "" | "none" => None,
            field => Some(field),
        }
    }

    pub fn with_author_filter(mut self, pattern: impl Into<String>) -> Self {
        self.only.author = pattern.into();
        self
    }

    pub fn with_entrytype_filter(mut self, pattern: impl Into<String>) -> Self {
        self.only.entrytype = pattern.into();
        self
    }

    pub fn with_group(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.group = field.into();
        self.group_order = order;
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = field.into();
        self.order = order;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_key_format(mut self, format: KeyFormat) -> Self {
        self.key_format = format;
        self
    }

    pub fn with_anonymous_whole(mut self, anonymous: bool) -> Self {
        self.anonymous_whole = anonymous;
        self
    }

    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }
}
