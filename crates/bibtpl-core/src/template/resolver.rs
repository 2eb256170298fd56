//! Variable and condition resolution against a [`RenderContext`].

use std::borrow::Cow;
use std::collections::hash_map::Entry as Slot;
use std::collections::HashMap;

use regex::Regex;

use super::context::RenderContext;
use super::scanner::{Condition, Operator, VarRef};
use crate::locale::Locale;
use crate::names::{self, AuthorStyle};

/// Resolves `name[:modifier]` references.
///
/// Lookup order: the bound entry's author list (rendered), the bound entry's
/// fields, then globals. Anything else resolves to the empty string.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'l> {
    locale: &'l Locale,
}

impl<'l> VariableResolver<'l> {
    pub fn new(locale: &'l Locale) -> Self {
        Self { locale }
    }

    pub fn resolve<'c>(&self, var: &VarRef<'_>, ctx: &'c RenderContext<'_>) -> Cow<'c, str> {
        if let Some(entry) = ctx.entry() {
            if var.name == "author" {
                let style = AuthorStyle::from_modifier(var.modifier);
                return Cow::Owned(names::format_authors(&entry.authors, style, &self.locale.and));
            }
            if let Some(value) = entry.get(var.name) {
                return value;
            }
        }

        match ctx.global(var.name) {
            Some(value) => Cow::Borrowed(value),
            None => {
                tracing::trace!("unresolved variable '{}'", var.name);
                Cow::Borrowed("")
            }
        }
    }

    /// Evaluate a conditional expression.
    ///
    /// A `~` pattern that is not a valid regular expression never matches.
    pub fn test(&self, condition: &Condition<'_>, ctx: &RenderContext<'_>, patterns: &mut PatternCache) -> bool {
        let value = self.resolve(
            &VarRef {
                name: condition.name,
                modifier: None,
            },
            ctx,
        );

        match condition.op {
            Operator::Truthy => !value.is_empty(),
            Operator::Equals(expected) => value == expected,
            Operator::Matches(pattern) => patterns.get(pattern).is_some_and(|re| re.is_match(&value)),
        }
    }
}

/// Compiled `~` patterns, kept for the duration of one conversion.
///
/// Patterns that fail to compile are cached as `None` so each is reported once.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, pattern: &str) -> Option<&Regex> {
        let compiled = match self.compiled.entry(pattern.to_string()) {
            Slot::Occupied(slot) => slot.into_mut(),
            Slot::Vacant(slot) => {
                let re = Regex::new(pattern)
                    .inspect_err(|e| tracing::warn!("invalid condition pattern '{pattern}', treated as false: {e}"))
                    .ok();
                slot.insert(re)
            }
        };
        compiled.as_ref()
    }
}
