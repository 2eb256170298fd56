//! BibTeX source for bibtpl.
//!
//! Reads `.bib` text into [`Record`]s: entry types and field names are
//! lower-cased, values lose their outer delimiters and inner braces, and
//! whitespace runs collapse to a single space. `@string` macros, `#`
//! concatenation and the month abbreviations (`jan` .. `dec`) are expanded;
//! `@comment` and `@preamble` are skipped.
//!
//! Malformed input fails with [`BibTplError::Parse`](bibtpl_core::error::BibTplError::Parse)
//! carrying the 1-based line of the problem.

mod macros;
mod parser;

use std::collections::HashMap;

use bibtpl_core::entry::Record;
use bibtpl_core::error::Result;
use bibtpl_core::source::SourceParser;

/// BibTeX implementation of [`SourceParser`].
#[derive(Debug, Clone, Default)]
pub struct BibtexParser {
    macros: HashMap<String, String>,
}

impl BibtexParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefine a macro, as a `.bst` style would. Names are case-insensitive.
    pub fn with_macro(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.macros.insert(name.into().to_lowercase(), value.into());
        self
    }
}

impl SourceParser for BibtexParser {
    fn name(&self) -> &'static str {
        "bibtex"
    }

    fn parse(&self, source: &str) -> Result<Vec<Record>> {
        let records = parser::Parser::new(source).with_macros(&self.macros).parse()?;
        tracing::debug!("read {} bibtex entries", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibtpl_core::config::{ConvertOptions, SortOrder};
    use bibtpl_core::error::BibTplError;
    use bibtpl_core::renderer::Converter;
    use bibtpl_core::scaffold::embedded;

    const TWO_YEARS: &str = r#"
        @article{old, title = {Old}, year = 2019}
        @article{new, title = {New}, year = 2020}
    "#;

    fn converter(options: ConvertOptions) -> Converter<BibtexParser> {
        Converter::new(BibtexParser::new(), options).unwrap()
    }

    #[test]
    fn test_year_groups_descending() {
        let out = converter(ConvertOptions::default())
            .convert(TWO_YEARS, "@{group@[@groupkey@]@{entry@(@year@)@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "[2020](2020)[2019](2019)");
    }

    #[test]
    fn test_flat_template() {
        let out = converter(ConvertOptions::default())
            .convert("@misc{k, year = 2019}", "@?year=2020@MATCH@:@NOMATCH@;@")
            .unwrap();
        assert_eq!(out.text, "NOMATCH");
    }

    #[test]
    fn test_anonymous_whole() {
        let options = ConvertOptions::default()
            .with_group("none", SortOrder::None)
            .with_anonymous_whole(true);
        let out = converter(options)
            .convert("@misc{k, year = 2019}", "@{group@<@groupkey@>@{entry@@cite@@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "<>k");
        assert_eq!(out.data.groups()[0].key, "");
    }

    #[test]
    fn test_sample_source_end_to_end() {
        let options = ConvertOptions::default()
            .with_group("entrytype", SortOrder::Asc)
            .with_sort("year", SortOrder::Asc);
        let template = "@globalcount@@{group@\n@groupkey@:@{entry@ @key@=@author:last@/@year@@}entry@@}group@";
        let out = converter(options).convert(embedded::SAMPLE_SOURCE, template).unwrap();

        assert_eq!(
            out.text,
            "5\nJournal Articles: 1=Dijkstra/1968 2=Codd/1970\
             \nBooks: 3=Knuth/1984\
             \nConference Papers: 4=Lamport/1978\
             \nTechnical Reports: 5=Hoare and Wirth/1969"
        );
    }

    #[test]
    fn test_sample_source_fields() {
        let records = BibtexParser::new().parse(embedded::SAMPLE_SOURCE).unwrap();
        let codd = records.iter().find(|r| r.cite == "codd70").unwrap();
        let get = |name: &str| {
            codd.fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("journal"), Some("Communications of the ACM"));
        assert_eq!(get("month"), Some("June"));
        assert_eq!(get("pages"), Some("377--387"));
    }

    #[test]
    fn test_parse_error_aborts_conversion() {
        let err = converter(ConvertOptions::default())
            .convert("@article{k,\n  title = {unterminated", "@title@")
            .unwrap_err();
        assert!(matches!(err, BibTplError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unknown_entry_type_is_relabeled() {
        let options = ConvertOptions::default()
            .with_group("entrytype", SortOrder::None)
            .with_lang("fr");
        let out = converter(options)
            .convert(
                "@dataset{d, year = 2021} @book{b, year = 2020}",
                "@{group@[@groupkey@]@{entry@@entrytype@@}entry@@}group@",
            )
            .unwrap();
        assert_eq!(out.text, "[Inconnu]unknown[Livres]book");
    }

    #[test]
    fn test_predefined_macro() {
        let records = BibtexParser::new()
            .with_macro("ACM", "Association for Computing Machinery")
            .parse("@misc{k, publisher = acm}")
            .unwrap();
        assert_eq!(records[0].fields[0].1, "Association for Computing Machinery");
    }
}
