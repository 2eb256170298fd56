use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use bibtpl_core::renderer::Conversion;

use crate::commands::{self, OptionOverrides};
use crate::output;

/// Extension of files written for each template.
const OUTPUT_EXTENSION: &str = "out";

/// Render `source` through every template.
///
/// Each template is an independent conversion on the blocking pool, sharing
/// only the read-only converter and source text. A single template without
/// `--output` prints to stdout; otherwise each result is written to a file.
/// A failing template does not stop the others: every job is awaited and
/// the command fails afterwards if any of them did.
pub async fn run(
    config_path: &Path,
    source_path: &Path,
    templates: &[PathBuf],
    output_path: Option<&Path>,
    overrides: OptionOverrides,
) -> Result<()> {
    let converter = Arc::new(commands::load_converter(config_path, &overrides)?);
    let source: Arc<str> = commands::read_source(source_path)?.into();

    if let [template_path] = templates {
        if output_path.is_none() {
            let template = read_template(template_path)?;
            let conversion = converter.convert(&source, &template)?;
            print!("{}", conversion.text);
            return Ok(());
        }
    }

    output::print_header("bibtpl render");
    output::print_path("Source", source_path);
    output::print_key_value("Templates", &templates.len().to_string());

    let progress = ProgressBar::new(templates.len() as u64);
    progress.set_style(ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?);

    let loaded = templates
        .iter()
        .map(|path| read_template(path).map(|text| (path, text)))
        .collect::<Result<Vec<_>>>()?;

    let mut jobs = Vec::with_capacity(loaded.len());
    for (template_path, template) in loaded {
        let converter = Arc::clone(&converter);
        let source = Arc::clone(&source);
        let job = tokio::task::spawn_blocking(move || converter.convert(&source, &template));
        jobs.push((template_path, job));
    }

    let mut written = Vec::with_capacity(jobs.len());
    let mut failed = Vec::new();
    for (template_path, job) in jobs {
        progress.set_message(template_path.display().to_string());
        let outcome = match job.await {
            Ok(conversion) => write_conversion(template_path, conversion, output_path, templates.len(), &progress),
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(path) => written.push(path),
            Err(e) => {
                progress.suspend(|| output::print_error(&format!("{}: {e:#}", template_path.display())));
                failed.push(template_path);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    for path in &written {
        output::print_success(&format!("Wrote {}", path.display()));
    }

    if !failed.is_empty() {
        anyhow::bail!("{} of {} templates failed to render", failed.len(), templates.len());
    }
    Ok(())
}

/// Check one finished conversion and write its text to its destination.
fn write_conversion(
    template_path: &Path,
    conversion: bibtpl_core::error::Result<Conversion>,
    output_path: Option<&Path>,
    template_count: usize,
    progress: &ProgressBar,
) -> Result<PathBuf> {
    let conversion = conversion.with_context(|| format!("failed to render {}", template_path.display()))?;

    if conversion.data.entry_count() == 0 {
        progress.suspend(|| {
            output::print_warning(&format!("{}: no entries left after filtering", template_path.display()))
        });
    }

    let destination = destination(template_path, output_path, template_count);
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&destination, &conversion.text)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    Ok(destination)
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read template {}", path.display()))
}

/// With one template `--output` names the file; with several it names the
/// directory receiving `<template stem>.out`.
fn destination(template_path: &Path, output_path: Option<&Path>, template_count: usize) -> PathBuf {
    match output_path {
        Some(path) if template_count == 1 => path.to_path_buf(),
        _ => {
            let stem = template_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "template".to_string());
            output_path
                .unwrap_or(Path::new("."))
                .join(format!("{stem}.{OUTPUT_EXTENSION}"))
        }
    }
}
