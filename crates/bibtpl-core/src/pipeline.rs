//! Entry pipeline: filter, annotate, group, sort and key a flat entry list.
//!
//! ```text
//! entries -> filter -> annotate -> group -> sort_groups -> sort_entries -> assign_keys
//! ```
//!
//! Each stage is a plain function so it can be exercised on its own; [`build`]
//! runs them in order with the options of one conversion.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::config::{ConvertOptions, KeyFormat, OnlyFilter, SortOrder};
use crate::entry::{Entry, Group, GroupedCollection};
use crate::error::{BibTplError, Result};
use crate::locale::{Locale, UNKNOWN_ENTRY_TYPE};
use crate::names::AuthorStyle;

/// Year assigned to entries that have none.
pub const MISSING_YEAR: &str = "0000";

/// Key given to every entry under [`KeyFormat::Placeholder`].
pub const PLACEHOLDER_KEY: &str = "?";

/// Run every pipeline stage and return the grouped, sorted, keyed collection.
pub fn build(entries: Vec<Entry>, options: &ConvertOptions, locale: &Locale) -> Result<GroupedCollection> {
    let total = entries.len();
    let mut entries = filter(entries, &options.only, locale)?;
    tracing::debug!("filter kept {} of {total} entries", entries.len());

    annotate(&mut entries);

    let mut collection = group(entries, options.grouping(), options.anonymous_whole, locale);
    tracing::debug!("grouped into {} groups", collection.len());

    sort_groups(&mut collection, options.group_order);
    sort_entries(&mut collection, options.sorting(), options.order, locale);
    assign_keys(&mut collection, options.key_format);

    Ok(collection)
}

/// Compiled `only.*` filters.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    author: Option<Regex>,
    entrytype: Option<Regex>,
}

impl EntryFilter {
    /// Compile the patterns; empty patterns match everything.
    pub fn compile(only: &OnlyFilter) -> Result<Self> {
        Ok(Self {
            author: compile_filter("only.author", &only.author)?,
            entrytype: compile_filter("only.entrytype", &only.entrytype)?,
        })
    }

    pub fn matches(&self, entry: &Entry, locale: &Locale) -> bool {
        let author_ok = self
            .author
            .as_ref()
            .is_none_or(|re| re.is_match(&entry.author_text(&locale.and)));
        let type_ok = self
            .entrytype
            .as_ref()
            .is_none_or(|re| re.is_match(&entry.entry_type));
        author_ok && type_ok
    }
}

fn compile_filter(option: &'static str, pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| BibTplError::InvalidFilter {
            option,
            pattern: pattern.to_string(),
            source: e,
        })
}

/// Keep entries matching `only`, preserving order.
///
/// Kept entries get a default year of [`MISSING_YEAR`], and entry types the
/// locale cannot label are replaced by [`UNKNOWN_ENTRY_TYPE`].
pub fn filter(entries: Vec<Entry>, only: &OnlyFilter, locale: &Locale) -> Result<Vec<Entry>> {
    let criteria = EntryFilter::compile(only)?;

    Ok(entries
        .into_iter()
        .filter(|entry| criteria.matches(entry, locale))
        .map(|mut entry| {
            if entry.year.as_deref().is_none_or(str::is_empty) {
                entry.year = Some(MISSING_YEAR.to_string());
            }
            if locale.entry_type_label(&entry.entry_type).is_none() {
                entry.entry_type = UNKNOWN_ENTRY_TYPE.to_string();
            }
            entry
        })
        .collect())
}

/// Set `firstauthor` and the sequential `entryid`.
pub fn annotate(entries: &mut [Entry]) {
    for (id, entry) in entries.iter_mut().enumerate() {
        entry.firstauthor = entry.authors.first().cloned();
        entry.entryid = Some(id);
    }
}

/// Bucket entries by `field` in first-seen order.
///
/// With grouping disabled (`field == None`) everything lands in one bucket,
/// keyed by the empty string when `anonymous_whole` is set and by the
/// locale's "all" label otherwise.
pub fn group(
    entries: Vec<Entry>,
    field: Option<&str>,
    anonymous_whole: bool,
    locale: &Locale,
) -> GroupedCollection {
    let mut collection = GroupedCollection::new();

    let Some(field) = field else {
        let key = if anonymous_whole { String::new() } else { locale.all.clone() };
        let mut whole = Group::new(key.clone(), key);
        whole.entries = entries;
        collection.insert(whole);
        return collection;
    };

    for entry in entries {
        let key = field_text(&entry, field, locale);
        let label = || group_label(&key, field, locale);
        collection.push(&key, label, entry);
    }

    collection
}

fn field_text(entry: &Entry, field: &str, locale: &Locale) -> String {
    match field {
        "firstauthor" => entry
            .firstauthor
            .as_ref()
            .map(|a| a.format(AuthorStyle::Full))
            .unwrap_or_default(),
        "author" => entry.author_text(&locale.and),
        other => entry.get(other).map(|v| v.into_owned()).unwrap_or_default(),
    }
}

fn group_label(key: &str, field: &str, locale: &Locale) -> String {
    match field {
        "entrytype" => locale.display_entry_type(key).to_string(),
        _ => key.to_string(),
    }
}

/// Reorder groups by key. `SortOrder::None` keeps first-seen order.
pub fn sort_groups(collection: &mut GroupedCollection, order: SortOrder) {
    if order == SortOrder::None {
        return;
    }
    collection
        .groups_mut()
        .sort_by(|a, b| directed(compare_keys(&a.key, &b.key), order));
}

/// Reorder the entries of every group by `field`.
///
/// Sorting is ascending unless `order` is [`SortOrder::Desc`].
pub fn sort_entries(collection: &mut GroupedCollection, field: Option<&str>, order: SortOrder, locale: &Locale) {
    let Some(field) = field else {
        return;
    };
    for group in collection.groups_mut() {
        let mut keyed: Vec<(String, Entry)> = group
            .entries
            .drain(..)
            .map(|e| (field_text(&e, field, locale), e))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| directed(compare_keys(a, b), order));
        group.entries = keyed.into_iter().map(|(_, e)| e).collect();
    }
}

/// Assign `key` to every entry in final traversal order.
pub fn assign_keys(collection: &mut GroupedCollection, format: KeyFormat) {
    let mut counter = 0usize;
    for group in collection.groups_mut() {
        for entry in &mut group.entries {
            counter += 1;
            entry.key = Some(match format {
                KeyFormat::Numeric => counter.to_string(),
                KeyFormat::Cite => entry.cite.clone(),
                KeyFormat::Placeholder => PLACEHOLDER_KEY.to_string(),
            });
        }
    }
}

/// Total order over group and sort keys.
///
/// Numeric keys compare by value and sort before every non-numeric key;
/// non-numeric keys compare lexicographically. Numerically equal keys
/// ("1" and "1.0") fall back to their text.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Desc => ordering.reverse(),
        _ => ordering,
    }
}

fn numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
