//! CLI command implementations for bibtpl.
//!
//! Each module corresponds to a subcommand (`bibtpl <command>`).

pub mod init;
pub mod inspect;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use bibtpl_bibtex::BibtexParser;
use bibtpl_core::config::{ConvertOptions, KeyFormat};
use bibtpl_core::locale::Locale;
use bibtpl_core::project;
use bibtpl_core::renderer::Converter;

use crate::OrderChoice;

/// Flags overriding values from the options file.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionOverrides {
    /// Keep entries whose authors match this pattern (case-insensitive)
    #[arg(long)]
    only_author: Option<String>,

    /// Keep entries whose type matches this pattern (case-insensitive)
    #[arg(long)]
    only_entrytype: Option<String>,

    /// Grouping field: none, year, firstauthor, entrytype or any field name
    #[arg(long)]
    group: Option<String>,

    /// Group order
    #[arg(long, value_enum)]
    group_order: Option<OrderChoice>,

    /// Field to sort entries by within each group, or none
    #[arg(long)]
    sort: Option<String>,

    /// Entry order
    #[arg(long, value_enum)]
    order: Option<OrderChoice>,

    /// Built-in locale id
    #[arg(long)]
    lang: Option<String>,

    /// Locale definition file, takes precedence over --lang
    #[arg(long)]
    locale_file: Option<PathBuf>,

    /// Display keys: numeric or cite (anything else yields "?")
    #[arg(long)]
    key_format: Option<String>,

    /// Key the single group of an ungrouped conversion with an empty string
    /// (`--anonymous-whole=false` turns it off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    anonymous_whole: Option<bool>,

    /// Template global, repeatable
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_global)]
    globals: Vec<(String, String)>,
}

impl OptionOverrides {
    pub fn apply(&self, mut options: ConvertOptions) -> ConvertOptions {
        if let Some(pattern) = &self.only_author {
            options.only.author = pattern.clone();
        }
        if let Some(pattern) = &self.only_entrytype {
            options.only.entrytype = pattern.clone();
        }
        if let Some(group) = &self.group {
            options.group = group.clone();
        }
        if let Some(order) = self.group_order {
            options.group_order = order.into();
        }
        if let Some(sort) = &self.sort {
            options.sort = sort.clone();
        }
        if let Some(order) = self.order {
            options.order = order.into();
        }
        if let Some(lang) = &self.lang {
            options.lang = lang.clone();
        }
        if let Some(format) = &self.key_format {
            options.key_format = format.parse().unwrap_or(KeyFormat::Placeholder);
        }
        if let Some(anonymous) = self.anonymous_whole {
            options.anonymous_whole = anonymous;
        }
        for (name, value) in &self.globals {
            options.globals.insert(name.clone(), value.clone());
        }
        options
    }
}

fn parse_global(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}

/// Load the options file, apply `overrides` and build a BibTeX converter.
pub fn load_converter(config_path: &Path, overrides: &OptionOverrides) -> Result<Converter<BibtexParser>> {
    let options = project::load_options(config_path)
        .with_context(|| format!("failed to load options from {}", config_path.display()))?;
    let options = overrides.apply(options);
    tracing::debug!(?options, "effective options");

    let converter = Converter::new(BibtexParser::new(), options)?;
    Ok(match &overrides.locale_file {
        Some(path) => converter.with_locale(Locale::from_file(path)?),
        None => converter,
    })
}

pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read source {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibtpl_core::config::SortOrder;

    #[test]
    fn test_parse_global() {
        assert_eq!(
            parse_global("title=My papers").unwrap(),
            ("title".to_string(), "My papers".to_string())
        );
        assert_eq!(parse_global("empty=").unwrap(), ("empty".to_string(), String::new()));
        assert!(parse_global("novalue").is_err());
        assert!(parse_global("=x").is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let overrides = OptionOverrides {
            group: Some("entrytype".into()),
            group_order: Some(OrderChoice::Asc),
            key_format: Some("cite".into()),
            globals: vec![("owner".into(), "Lab".into())],
            ..OptionOverrides::default()
        };
        let base = ConvertOptions::default().with_lang("de");
        let options = overrides.apply(base);

        assert_eq!(options.group, "entrytype");
        assert_eq!(options.group_order, SortOrder::Asc);
        assert_eq!(options.key_format, KeyFormat::Cite);
        assert_eq!(options.lang, "de");
        assert_eq!(options.globals.get("owner").map(String::as_str), Some("Lab"));
    }

    #[test]
    fn test_anonymous_whole_override_both_ways() {
        let from_file = ConvertOptions::default().with_anonymous_whole(true);

        let off = OptionOverrides {
            anonymous_whole: Some(false),
            ..OptionOverrides::default()
        };
        assert!(!off.apply(from_file.clone()).anonymous_whole);

        let unset = OptionOverrides::default();
        assert!(unset.apply(from_file).anonymous_whole);

        let on = OptionOverrides {
            anonymous_whole: Some(true),
            ..OptionOverrides::default()
        };
        assert!(on.apply(ConvertOptions::default()).anonymous_whole);
    }

    #[test]
    fn test_anonymous_whole_flag_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            overrides: OptionOverrides,
        }

        let parse = |args: &[&str]| {
            Harness::try_parse_from(std::iter::once("bibtpl").chain(args.iter().copied()))
                .unwrap()
                .overrides
                .anonymous_whole
        };
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["--anonymous-whole"]), Some(true));
        assert_eq!(parse(&["--anonymous-whole=false"]), Some(false));
    }

    #[test]
    fn test_load_converter_without_options_file() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = load_converter(&tmp.path().join("missing.json"), &OptionOverrides::default()).unwrap();
        assert_eq!(converter.options(), &ConvertOptions::default());
        assert_eq!(converter.locale().id, "en");
    }
}
