//! Unified error types for the bibtpl toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur during a bibtpl conversion.
///
/// Every variant is terminal for the conversion that raised it. The Display
/// message names the stage that failed (parsing, configuration, template
/// structure, evaluation).
#[derive(Error, Debug)]
pub enum BibTplError {
    // --- Source ---

    /// The bibliographic source could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    // --- Configuration ---

    /// An `only.author` / `only.entrytype` filter is not a valid regular expression.
    #[error("invalid filter pattern for {option}: {pattern}")]
    InvalidFilter {
        option: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An option carries a value outside its enumerated set.
    #[error("invalid value for option {option}: {value}")]
    UnknownOption { option: &'static str, value: String },

    /// The options file was not found or could not be read.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Template structure ---

    /// A template mentions sub-template regions but lacks `@{marker@ ... @}marker@`.
    #[error("template structure: missing @{{{marker}@ ... @}}{marker}@ region")]
    MissingRegion { marker: String },

    /// A region was opened but never closed (or closed without being opened).
    #[error("template structure: unterminated @{{{marker}@ region")]
    UnterminatedRegion { marker: String },

    /// More than one region with the same marker.
    #[error("template structure: ambiguous @{{{marker}@ region ({count} markers found)")]
    AmbiguousRegion { marker: String, count: usize },

    /// The entry region is not nested inside the group region.
    #[error("template structure: @{{{inner}@ region must be nested inside @{{{outer}@")]
    MisplacedRegion { inner: String, outer: String },

    // --- Scaffolding ---

    /// Handlebars rendering of a starter template failed.
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    /// Attempted to create a project in a directory that already exists.
    #[error("project directory already exists: {0}")]
    ProjectExists(PathBuf),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, BibTplError>`.
pub type Result<T> = std::result::Result<T, BibTplError>;
