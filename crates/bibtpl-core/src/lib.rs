//! Core library for bibtpl.
//!
//! Renders bibliographic records through the `@...@` directive template
//! language. A conversion runs the [`pipeline`] (filter, annotate, group,
//! sort, key) to build a [`entry::GroupedCollection`], then evaluates the
//! template against it with the [`template`] interpreter.
//!
//! Parsing the source is not part of this crate. Source formats implement
//! [`source::SourceParser`] in their own crates:
//! - [`bibtpl_bibtex`](https://docs.rs/bibtpl-bibtex): BibTeX
//!
//! ```ignore
//! use bibtpl_core::{config::ConvertOptions, renderer::Converter};
//!
//! let converter = Converter::new(bibtpl_bibtex::BibtexParser::new(), ConvertOptions::default())?;
//! let out = converter.convert(&bib, "@{group@<h2>@groupkey@</h2>@{entry@<p>@title@</p>@}entry@@}group@")?;
//! println!("{}", out.text);
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod locale;
pub mod names;
pub mod pipeline;
pub mod project;
pub mod renderer;
pub mod scaffold;
pub mod source;
pub mod template;
