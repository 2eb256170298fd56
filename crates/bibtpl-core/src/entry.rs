//! Bibliographic records and the two-level grouped collection built from them.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::names::{self, Author, AuthorStyle};

/// One record as produced by a [`crate::source::SourceParser`].
///
/// Field names are lower-case; values have their outer delimiters removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub entry_type: String,
    pub cite: String,
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(entry_type: impl Into<String>, cite: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            cite: cite.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// A bibliographic entry: well-known fields plus an open extension map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_type: String,
    pub cite: String,
    pub year: Option<String>,
    pub authors: Vec<Author>,
    /// Set by the pipeline: first element of `authors`.
    pub firstauthor: Option<Author>,
    /// Set by the pipeline: 0-based index in filtered order.
    pub entryid: Option<usize>,
    /// Set by the pipeline: display key assigned after grouping and sorting.
    pub key: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl From<Record> for Entry {
    fn from(record: Record) -> Self {
        let mut entry = Entry {
            entry_type: record.entry_type.to_lowercase(),
            cite: record.cite,
            ..Entry::default()
        };

        for (name, value) in record.fields {
            match name.as_str() {
                "author" => entry.authors = names::split_authors(&value),
                "year" => entry.year = Some(value),
                _ => {
                    entry.fields.insert(name, value);
                }
            }
        }

        entry
    }
}

impl Entry {
    /// Look up any field by template name. Derived and well-known fields come first.
    ///
    /// `author` is not a plain field: its text depends on the locale's
    /// conjunction, see [`Entry::author_text`].
    pub fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "firstauthor" => self
                .firstauthor
                .as_ref()
                .map(|a| Cow::Owned(a.format(AuthorStyle::Full))),
            "entrytype" => Some(Cow::Borrowed(&self.entry_type)),
            "cite" => Some(Cow::Borrowed(&self.cite)),
            "year" => self.year.as_deref().map(Cow::Borrowed),
            "entryid" => self.entryid.map(|id| Cow::Owned(id.to_string())),
            "key" => self.key.as_deref().map(Cow::Borrowed),
            other => self.fields.get(other).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    /// The full author list joined with `and`, empty when there are no authors.
    pub fn author_text(&self, and: &str) -> String {
        names::format_authors(&self.authors, AuthorStyle::Full, and)
    }
}

/// Entries sharing one grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    /// Display form bound as `groupkey` in templates.
    pub label: String,
    pub entries: Vec<Entry>,
}

impl Group {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered groups with unique keys; insertion order is first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedCollection {
    groups: Vec<Group>,
}

impl GroupedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the group keyed `key`, creating the group if needed.
    pub fn push(&mut self, key: &str, label: impl FnOnce() -> String, entry: Entry) {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.entries.push(entry),
            None => {
                let mut group = Group::new(key, label());
                group.entries.push(entry);
                self.groups.push(group);
            }
        }
    }

    /// Insert a whole group. An existing group with the same key absorbs its entries.
    pub fn insert(&mut self, group: Group) {
        match self.groups.iter_mut().find(|g| g.key == group.key) {
            Some(existing) => existing.entries.extend(group.entries),
            None => self.groups.push(group),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// All entries in group order, then entry order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of entries across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}
