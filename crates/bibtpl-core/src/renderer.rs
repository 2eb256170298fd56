//! Conversion entry points.
//!
//! A conversion runs the entry pipeline once, substitutes the collection-wide
//! placeholders, splits the template into its loop bodies and evaluates the
//! top level. Nothing survives between conversions: every call builds its own
//! collection and [`RenderContext`], so a [`Converter`] can be shared across
//! threads and used concurrently.

use serde::Serialize;

use crate::config::ConvertOptions;
use crate::entry::{Entry, GroupedCollection, Record};
use crate::error::Result;
use crate::locale::Locale;
use crate::pipeline;
use crate::source::SourceParser;
use crate::template::{split_template, Evaluator, Globals, RenderContext};

/// Total number of entries after filtering.
pub const GLOBAL_COUNT: &str = "@globalcount@";
/// Total number of groups.
pub const GLOBAL_GROUP_COUNT: &str = "@globalgroupcount@";

/// Result of one conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The rendered text.
    pub text: String,
    /// The grouped, sorted and keyed collection the text was rendered from.
    #[serde(rename = "groupedData")]
    pub data: GroupedCollection,
}

/// Render `entries` through `template` without a source parser.
pub fn render(entries: Vec<Entry>, template: &str, options: &ConvertOptions, locale: &Locale) -> Result<Conversion> {
    let data = pipeline::build(entries, options, locale)?;
    let text = render_collection(&data, template, &options.globals, locale)?;
    Ok(Conversion { text, data })
}

/// Render an already built collection.
pub fn render_collection(
    collection: &GroupedCollection,
    template: &str,
    globals: &Globals,
    locale: &Locale,
) -> Result<String> {
    let template = substitute_globals(template, collection);
    let (outer, subs) = split_template(&template)?;

    let mut evaluator = Evaluator::new(collection, &subs, locale);
    let mut ctx = RenderContext::new(globals.clone());
    evaluator.evaluate(&outer, &mut ctx)
}

/// Replace `@globalcount@` and `@globalgroupcount@` throughout the template.
pub fn substitute_globals(template: &str, collection: &GroupedCollection) -> String {
    template
        .replace(GLOBAL_COUNT, &collection.entry_count().to_string())
        .replace(GLOBAL_GROUP_COUNT, &collection.len().to_string())
}

/// A source parser bound to the options and locale of a series of conversions.
#[derive(Debug, Clone)]
pub struct Converter<P> {
    parser: P,
    options: ConvertOptions,
    locale: Locale,
}

impl<P: SourceParser> Converter<P> {
    /// Create a converter, loading the locale named by `options.lang`.
    pub fn new(parser: P, options: ConvertOptions) -> Result<Self> {
        let locale = Locale::load(&options.lang)?;
        Ok(Self {
            parser,
            options,
            locale,
        })
    }

    /// Replace the locale, e.g. with one loaded by [`Locale::from_file`].
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Inject a global variable visible to every template of this converter.
    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.globals.insert(name.into(), value.into());
    }

    /// Parse `source` and render it through `template`.
    pub fn convert(&self, source: &str, template: &str) -> Result<Conversion> {
        let records = self.parser.parse(source)?;
        tracing::debug!("{} parsed {} records", self.parser.name(), records.len());
        self.display(records, template)
    }

    /// Render already parsed records through `template`.
    pub fn display(&self, records: Vec<Record>, template: &str) -> Result<Conversion> {
        let entries = records.into_iter().map(Entry::from).collect();
        render(entries, template, &self.options, &self.locale)
    }

    /// Parse `source` and build the grouped collection without rendering.
    pub fn group(&self, source: &str) -> Result<GroupedCollection> {
        let records = self.parser.parse(source)?;
        let entries = records.into_iter().map(Entry::from).collect();
        pipeline::build(entries, &self.options, &self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyFormat, SortOrder};
    use crate::error::BibTplError;

    /// Ignores its input and returns a fixed record list.
    struct FixedParser(Vec<Record>);

    impl SourceParser for FixedParser {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn parse(&self, _source: &str) -> Result<Vec<Record>> {
            Ok(self.0.clone())
        }
    }

    struct FailingParser;

    impl SourceParser for FailingParser {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn parse(&self, _source: &str) -> Result<Vec<Record>> {
            Err(BibTplError::Parse {
                line: 3,
                message: "unexpected end of input".into(),
            })
        }
    }

    fn record(ty: &str, cite: &str, year: &str, title: &str) -> Record {
        Record::new(ty, cite).with_field("year", year).with_field("title", title)
    }

    fn library() -> Vec<Record> {
        vec![
            record("article", "a19", "2019", "Graphs").with_field("author", "Ada Lovelace"),
            record("book", "b20", "2020", "Engines").with_field("author", "Charles Babbage"),
            record("article", "c20", "2020", "Looms").with_field("author", "Ada Lovelace and Charles Babbage"),
            record("misc", "d18", "2018", "Notes"),
        ]
    }

    fn converter(records: Vec<Record>, options: ConvertOptions) -> Converter<FixedParser> {
        Converter::new(FixedParser(records), options).unwrap()
    }

    #[test]
    fn test_groups_by_year_descending() {
        let conv = converter(
            vec![record("article", "x", "2019", "X"), record("article", "y", "2020", "Y")],
            ConvertOptions::default(),
        );
        let out = conv
            .convert("", "@{group@[@groupkey@]@{entry@(@year@)@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "[2020](2020)[2019](2019)");
    }

    #[test]
    fn test_flat_template_conditional() {
        let conv = converter(vec![record("article", "x", "2019", "X")], ConvertOptions::default());
        let out = conv.convert("", "@?year=2020@MATCH@:@NOMATCH@;@").unwrap();
        assert_eq!(out.text, "NOMATCH");
    }

    #[test]
    fn test_anonymous_whole_uses_empty_key() {
        let options = ConvertOptions::default()
            .with_group("none", SortOrder::Desc)
            .with_anonymous_whole(true);
        let conv = converter(vec![record("article", "x", "2019", "X")], options);
        let out = conv.convert("", "@{group@[@groupkey@]@{entry@@title@@}entry@@}group@").unwrap();
        assert_eq!(out.text, "[]X");
        assert_eq!(out.data.groups()[0].key, "");
    }

    #[test]
    fn test_grouping_disabled_uses_all_label() {
        let options = ConvertOptions::default()
            .with_group("none", SortOrder::None)
            .with_lang("de");
        let conv = converter(library(), options);
        let out = conv.convert("", "@{group@@groupkey@:@groupcount@@{entry@@}entry@@}group@").unwrap();
        assert_eq!(out.text, "Alle:4");
    }

    #[test]
    fn test_numeric_keys_are_sequential_across_groups() {
        let conv = converter(library(), ConvertOptions::default());
        let out = conv.convert("", "@{group@@{entry@@key@,@}entry@@}group@").unwrap();
        assert_eq!(out.text, "1,2,3,4,");

        let keys: Vec<_> = out.data.entries().filter_map(|e| e.key.clone()).collect();
        assert_eq!(keys, ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_cite_and_placeholder_keys() {
        let cite = converter(library(), ConvertOptions::default().with_key_format(KeyFormat::Cite));
        let out = cite.convert("", "@{group@@{entry@@key@ @}entry@@}group@").unwrap();
        assert_eq!(out.text, "b20 c20 a19 d18 ");

        let other = converter(library(), ConvertOptions::default().with_key_format(KeyFormat::Placeholder));
        let out = other.convert("", "@{group@@{entry@@key@@}entry@@}group@").unwrap();
        assert_eq!(out.text, "????");
    }

    #[test]
    fn test_partition_covers_filtered_entries() {
        let conv = converter(library(), ConvertOptions::default());
        let data = conv.group("").unwrap();
        let mut cites: Vec<_> = data.entries().map(|e| e.cite.as_str()).collect();
        cites.sort_unstable();
        assert_eq!(cites, ["a19", "b20", "c20", "d18"]);
        assert_eq!(data.entry_count(), 4);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_entrytype_filter_excludes_output() {
        let options = ConvertOptions::default().with_entrytype_filter("^article$");
        let conv = converter(library(), options);
        let out = conv.convert("", "@{group@@{entry@@title@;@}entry@@}group@").unwrap();
        assert_eq!(out.text, "Looms;Graphs;");
        assert!(out.data.entries().all(|e| e.entry_type == "article"));
    }

    #[test]
    fn test_author_filter_and_firstauthor_grouping() {
        let options = ConvertOptions::default()
            .with_author_filter("lovelace")
            .with_group("firstauthor", SortOrder::Asc);
        let conv = converter(library(), options);
        let out = conv
            .convert("", "@{group@<@groupkey@>@{entry@ @title@@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "<Ada Lovelace> Graphs Looms");
    }

    #[test]
    fn test_entrytype_groups_are_localized() {
        let options = ConvertOptions::default()
            .with_group("entrytype", SortOrder::None)
            .with_lang("de");
        let conv = converter(library(), options);
        let out = conv.convert("", "@{group@@groupkey@|@{entry@@}entry@@}group@").unwrap();
        assert_eq!(out.text, "Zeitschriftenartikel|Bücher|Sonstiges|");
    }

    #[test]
    fn test_global_placeholders_and_injected_globals() {
        let mut conv = converter(library(), ConvertOptions::default());
        conv.set_global("title", "Publications");
        let out = conv
            .convert("", "@title@: @globalcount@ in @globalgroupcount@@{group@@{entry@@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "Publications: 4 in 3");
    }

    #[test]
    fn test_entry_fields_shadow_globals() {
        let mut conv = converter(library(), ConvertOptions::default().with_group("none", SortOrder::None));
        conv.set_global("title", "Publications");
        let out = conv
            .convert("", "@title@:@{group@@{entry@ @title@@}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "Publications: Graphs Engines Looms Notes");
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let conv = converter(library(), ConvertOptions::default().with_sort("title", SortOrder::Asc));
        let template = "@{group@@groupid@@{entry@@key@@author:short@@title@@}entry@@}group@";
        let first = conv.convert("", template).unwrap();
        let second = conv.convert("", template).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_errors_are_terminal() {
        let conv = converter(library(), ConvertOptions::default());
        assert!(matches!(
            conv.convert("", "@{group@no entry region@}group@"),
            Err(BibTplError::MissingRegion { .. })
        ));

        let bad_filter = converter(library(), ConvertOptions::default().with_author_filter("(unclosed"));
        assert!(matches!(
            bad_filter.convert("", "text"),
            Err(BibTplError::InvalidFilter { option: "only.author", .. })
        ));

        let failing = Converter::new(FailingParser, ConvertOptions::default()).unwrap();
        assert!(matches!(
            failing.convert("@article{", "text"),
            Err(BibTplError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn test_display_renders_records_directly() {
        let conv = converter(Vec::new(), ConvertOptions::default());
        let out = conv
            .display(library(), "@{group@@{entry@@cite@ @}entry@@}group@")
            .unwrap();
        assert_eq!(out.text, "b20 c20 a19 d18 ");
    }

    #[test]
    fn test_conversion_serializes_grouped_data() {
        let conv = converter(vec![record("article", "x", "2019", "X")], ConvertOptions::default());
        let out = conv.convert("", "@{group@@{entry@@}entry@@}group@").unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["groupedData"][0]["key"], "2019");
        assert_eq!(json["groupedData"][0]["entries"][0]["cite"], "x");
    }
}
