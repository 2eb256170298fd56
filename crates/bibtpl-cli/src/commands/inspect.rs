use std::path::Path;

use anyhow::Result;

use crate::commands::{self, OptionOverrides};
use crate::output;

/// Print the grouped, sorted and keyed collection as pretty JSON.
///
/// A summary goes to stderr; stdout carries only the JSON.
pub async fn run(config_path: &Path, source_path: &Path, overrides: OptionOverrides) -> Result<()> {
    let converter = commands::load_converter(config_path, &overrides)?;
    let source = commands::read_source(source_path)?;
    let data = converter.group(&source)?;

    output::print_header("bibtpl inspect");
    output::print_key_value("Groups", &data.len().to_string());
    output::print_key_value("Entries", &data.entry_count().to_string());
    output::print_key_value("Locale", &converter.locale().id);

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
