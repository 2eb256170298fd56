//! Translations for entry-type labels and the "all" group label.
//!
//! Built-in locales are embedded at compile time from `locales/<id>.json`.
//! Lookups never fail on an unknown locale id: they fall back to English,
//! which is always present.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Locale id used when the requested one is unavailable.
pub const DEFAULT_LOCALE: &str = "en";

/// Reserved entry-type key for types without a translation.
pub const UNKNOWN_ENTRY_TYPE: &str = "unknown";

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.json")),
    ("de", include_str!("../locales/de.json")),
    ("fr", include_str!("../locales/fr.json")),
];

/// A read-only label mapping for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub id: String,
    /// Label of the single bucket produced when grouping is disabled.
    pub all: String,
    /// Conjunction placed before the last name of an author list.
    pub and: String,
    /// Entry type -> display label. Always contains [`UNKNOWN_ENTRY_TYPE`].
    pub entrytypes: BTreeMap<String, String>,
}

impl Locale {
    /// Load a built-in locale, falling back to English for unknown ids.
    pub fn load(id: &str) -> Result<Self> {
        let source = match EMBEDDED.iter().find(|(name, _)| *name == id) {
            Some((_, json)) => json,
            None => {
                tracing::warn!("locale '{id}' not available, falling back to '{DEFAULT_LOCALE}'");
                default_source()
            }
        };
        Self::from_json(source)
    }

    /// Load a locale from a JSON file, falling back to English if it is unreadable.
    pub fn from_file(path: &Path) -> Result<Self> {
        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<Self>(&s).map_err(anyhow::Error::from));

        match parsed {
            Ok(locale) => Ok(locale.with_unknown_label()),
            Err(e) => {
                tracing::warn!(
                    "locale file {} unreadable ({e}), falling back to '{DEFAULT_LOCALE}'",
                    path.display()
                );
                Self::load(DEFAULT_LOCALE)
            }
        }
    }

    /// Parse a locale from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let locale: Self = serde_json::from_str(json).context("invalid locale definition")?;
        Ok(locale.with_unknown_label())
    }

    /// Ids of all embedded locales.
    pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
        EMBEDDED.iter().map(|(id, _)| *id)
    }

    /// Label for an entry type, if this locale translates it.
    pub fn entry_type_label(&self, entry_type: &str) -> Option<&str> {
        self.entrytypes.get(entry_type).map(String::as_str)
    }

    /// Display label for a (possibly relabeled) entry type.
    pub fn display_entry_type<'a>(&'a self, entry_type: &'a str) -> &'a str {
        self.entry_type_label(entry_type)
            .or_else(|| self.entry_type_label(UNKNOWN_ENTRY_TYPE))
            .unwrap_or(entry_type)
    }

    fn with_unknown_label(mut self) -> Self {
        self.entrytypes
            .entry(UNKNOWN_ENTRY_TYPE.to_string())
            .or_insert_with(|| "Unknown".to_string());
        self
    }
}

fn default_source() -> &'static str {
    EMBEDDED
        .iter()
        .find(|(id, _)| *id == DEFAULT_LOCALE)
        .map(|(_, json)| *json)
        .unwrap_or(EMBEDDED[0].1)
}
