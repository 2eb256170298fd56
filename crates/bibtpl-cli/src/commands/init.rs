use std::path::Path;

use anyhow::Result;
use dialoguer::Select;

use bibtpl_core::config::ConvertOptions;
use bibtpl_core::locale::Locale;
use bibtpl_core::project::{self, StarterStyle};

use crate::output;
use crate::StyleChoice;

/// Initialize a new bibtpl project.
///
/// Writes the options file, a starter template rendered for the project and a
/// sample BibTeX source. Prompts for the starter style when none is given.
pub async fn run(name: &str, style: Option<StyleChoice>, lang: &str) -> Result<()> {
    output::print_header(&format!("bibtpl init: {name}"));

    let style = match style {
        Some(choice) => StarterStyle::from(choice),
        None => {
            let descriptions: Vec<String> = StarterStyle::ALL
                .iter()
                .map(|s| format!("{}: {}", s.name(), s.description()))
                .collect();

            let selection = Select::new()
                .with_prompt("Select starter template")
                .items(&descriptions)
                .default(0)
                .interact()?;

            StarterStyle::ALL[selection]
        }
    };

    if !Locale::builtin_ids().any(|id| id == lang) {
        output::print_warning(&format!("'{lang}' is not a built-in locale, conversions will fall back to English"));
    }

    output::print_step(1, 2, &format!("Creating project directory: {name}/"));
    let options = ConvertOptions::default().with_lang(lang);
    let created = project::create_project(Path::new(name), style, &options)?;

    output::print_step(2, 2, "Wrote options, starter template and sample source");
    output::print_path("Options", &created.config);
    output::print_path("Template", &created.template);
    output::print_path("Source", &created.source);

    output::print_success(&format!("Project '{name}' created with the {style} starter"));
    println!();
    println!("  Next steps:");
    println!("    cd {name}");
    println!(
        "    bibtpl render --source {} --template {}/{}",
        project::SAMPLE_SOURCE_FILE,
        project::TEMPLATES_DIR,
        style.file_name()
    );
    println!("    bibtpl inspect --source {}", project::SAMPLE_SOURCE_FILE);
    println!();

    Ok(())
}
