//! Sub-template extraction and incremental directive tokenizing.
//!
//! Directives are delimited by `@...@`. The text after a directive up to the
//! next `@` is its *trailing literal* and is emitted only under the
//! condition the directive leaves behind:
//!
//! ```text
//! @?name@      open conditional (truthy test)
//! @?name=v@    open conditional (equality)
//! @?name~re@   open conditional (regex search)
//! @:@          else
//! @;@          close conditional
//! @#group@     group loop
//! @#entry@     entry loop
//! @name@       variable reference, optionally @name:modifier@
//! ```
//!
//! Loop bodies live in bracketed regions `@{group@ ... @}group@` with a nested
//! `@{entry@ ... @}entry@`. [`split_template`] cuts them out and leaves a loop
//! token in their place.

use crate::error::{BibTplError, Result};

pub const GROUP_MARKER: &str = "group";
pub const ENTRY_MARKER: &str = "entry";

const DELIMITER: char = '@';

/// An extracted region and the template it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Text between the region markers.
    pub inner: String,
    /// The template with the region replaced by its loop token.
    pub outer: String,
}

/// Loop bodies of a template. Both are absent for a flat template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubTemplates {
    pub group: Option<String>,
    pub entry: Option<String>,
}

/// `@#marker@`
pub fn loop_token(marker: &str) -> String {
    format!("@#{marker}@")
}

fn region_markers(marker: &str) -> (String, String) {
    (format!("@{{{marker}@"), format!("@}}{marker}@"))
}

/// Whether the template mentions the opening or closing marker of a region.
pub fn mentions_region(template: &str, marker: &str) -> bool {
    let (open, close) = region_markers(marker);
    template.contains(&open) || template.contains(&close)
}

/// Cut the unique `@{marker@ ... @}marker@` region out of `template`.
pub fn extract_subtemplate(template: &str, marker: &str) -> Result<Extracted> {
    let (open, close) = region_markers(marker);
    let opens = template.matches(open.as_str()).count();
    let closes = template.matches(close.as_str()).count();

    if opens == 0 && closes == 0 {
        return Err(BibTplError::MissingRegion {
            marker: marker.to_string(),
        });
    }
    if opens > 1 || closes > 1 {
        return Err(BibTplError::AmbiguousRegion {
            marker: marker.to_string(),
            count: opens.max(closes),
        });
    }

    let unterminated = || BibTplError::UnterminatedRegion {
        marker: marker.to_string(),
    };
    let start = template.find(open.as_str()).ok_or_else(unterminated)?;
    let inner_start = start + open.len();
    let end = template[inner_start..]
        .find(close.as_str())
        .map(|i| inner_start + i)
        .ok_or_else(unterminated)?;

    let outer = format!(
        "{}{}{}",
        &template[..start],
        loop_token(marker),
        &template[end + close.len()..]
    );

    Ok(Extracted {
        inner: template[inner_start..end].to_string(),
        outer,
    })
}

/// Split a template into its top level and its loop bodies.
///
/// A template that mentions neither region is returned unchanged with no
/// loop bodies. Otherwise both regions must be present and the entry region
/// must sit inside the group region.
pub fn split_template(template: &str) -> Result<(String, SubTemplates)> {
    if !mentions_region(template, GROUP_MARKER) && !mentions_region(template, ENTRY_MARKER) {
        tracing::debug!("flat template, no loop regions");
        return Ok((template.to_string(), SubTemplates::default()));
    }

    let entry = extract_subtemplate(template, ENTRY_MARKER)?;
    let group = extract_subtemplate(&entry.outer, GROUP_MARKER)?;

    if !group.inner.contains(&loop_token(ENTRY_MARKER)) {
        return Err(BibTplError::MisplacedRegion {
            inner: ENTRY_MARKER.to_string(),
            outer: GROUP_MARKER.to_string(),
        });
    }

    tracing::debug!(
        group_len = group.inner.len(),
        entry_len = entry.inner.len(),
        "extracted loop regions"
    );

    Ok((
        group.outer,
        SubTemplates {
            group: Some(group.inner),
            entry: Some(entry.inner),
        },
    ))
}

/// Comparison operator of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator<'a> {
    /// `?name`: resolved value is non-empty.
    Truthy,
    /// `?name=value`: exact string equality.
    Equals(&'a str),
    /// `?name~pattern`: unanchored, case-sensitive regex search.
    Matches(&'a str),
}

/// The expression of a conditional-open directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'a> {
    pub name: &'a str,
    pub op: Operator<'a>,
}

impl<'a> Condition<'a> {
    fn parse(expr: &'a str) -> Self {
        match expr.find(['=', '~']) {
            Some(i) => {
                let (name, rest) = expr.split_at(i);
                let value = &rest[1..];
                let op = if rest.starts_with('=') {
                    Operator::Equals(value)
                } else {
                    Operator::Matches(value)
                };
                Self { name, op }
            }
            None => Self {
                name: expr,
                op: Operator::Truthy,
            },
        }
    }
}

/// `name` or `name:modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarRef<'a> {
    pub name: &'a str,
    pub modifier: Option<&'a str>,
}

impl<'a> VarRef<'a> {
    pub fn parse(head: &'a str) -> Self {
        match head.split_once(':') {
            Some((name, modifier)) if !name.is_empty() => Self {
                name,
                modifier: Some(modifier),
            },
            _ => Self {
                name: head,
                modifier: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind<'a> {
    Open(Condition<'a>),
    Else,
    Close,
    GroupLoop,
    EntryLoop,
    Variable(VarRef<'a>),
}

impl<'a> DirectiveKind<'a> {
    fn parse(head: &'a str) -> Self {
        if let Some(expr) = head.strip_prefix('?') {
            return Self::Open(Condition::parse(expr));
        }
        if head.starts_with(':') {
            return Self::Else;
        }
        if head.starts_with(';') {
            return Self::Close;
        }
        match head.strip_prefix('#') {
            Some(GROUP_MARKER) => Self::GroupLoop,
            Some(ENTRY_MARKER) => Self::EntryLoop,
            _ => Self::Variable(VarRef::parse(head)),
        }
    }
}

/// A directive and the literal text that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: DirectiveKind<'a>,
    pub trailing: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text not owned by any directive: a leading prefix or a stray `@`.
    Literal(&'a str),
    Directive(Directive<'a>),
}

/// Lazy tokenizer over template text. Cloning or [`Scanner::restart`] replays it.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

/// Tokenize `text`.
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner { text, pos: 0 }
}

impl Scanner<'_> {
    /// Rewind to the beginning of the text.
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let at = match rest.find(DELIMITER) {
            None => {
                self.pos = self.text.len();
                return Some(Token::Literal(rest));
            }
            Some(0) => 0,
            Some(i) => {
                self.pos += i;
                return Some(Token::Literal(&rest[..i]));
            }
        };

        let after_open = at + DELIMITER.len_utf8();
        match rest[after_open..].find(DELIMITER) {
            // No closing delimiter: the remainder is plain text.
            None => {
                self.pos = self.text.len();
                Some(Token::Literal(rest))
            }
            // `@@`: the first `@` is literal, scanning resumes at the second.
            Some(0) => {
                self.pos += after_open;
                Some(Token::Literal(&rest[..after_open]))
            }
            Some(len) => {
                let head = &rest[after_open..after_open + len];
                let body_start = after_open + len + DELIMITER.len_utf8();
                let body = &rest[body_start..];
                let trailing = &body[..body.find(DELIMITER).unwrap_or(body.len())];
                self.pos += body_start + trailing.len();
                Some(Token::Directive(Directive {
                    kind: DirectiveKind::parse(head),
                    trailing,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<DirectiveKind<'_>> {
        scan(text)
            .filter_map(|t| match t {
                Token::Directive(d) => Some(d.kind),
                Token::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_scan_directive_grammar() {
        let found = kinds("@?year@@?type=book@@?title~^A@@:@@;@@#group@@#entry@@author:short@@title@");
        assert_eq!(
            found,
            vec![
                DirectiveKind::Open(Condition { name: "year", op: Operator::Truthy }),
                DirectiveKind::Open(Condition { name: "type", op: Operator::Equals("book") }),
                DirectiveKind::Open(Condition { name: "title", op: Operator::Matches("^A") }),
                DirectiveKind::Else,
                DirectiveKind::Close,
                DirectiveKind::GroupLoop,
                DirectiveKind::EntryLoop,
                DirectiveKind::Variable(VarRef { name: "author", modifier: Some("short") }),
                DirectiveKind::Variable(VarRef { name: "title", modifier: None }),
            ]
        );
    }

    #[test]
    fn test_scan_trailing_literals() {
        let tokens: Vec<Token<'_>> = scan("Intro @title@, by @author@.").collect();
        assert_eq!(tokens[0], Token::Literal("Intro "));
        match tokens[1] {
            Token::Directive(d) => assert_eq!(d.trailing, ", by "),
            Token::Literal(_) => panic!("expected directive"),
        }
        match tokens[2] {
            Token::Directive(d) => assert_eq!(d.trailing, "."),
            Token::Literal(_) => panic!("expected directive"),
        }
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_scan_stray_delimiters_are_literal() {
        let tokens: Vec<Token<'_>> = scan("mail me@@host@x@ tail@").collect();
        assert_eq!(tokens[0], Token::Literal("mail me"));
        assert_eq!(tokens[1], Token::Literal("@"));
        match tokens[2] {
            Token::Directive(d) => {
                assert_eq!(d.kind, DirectiveKind::Variable(VarRef { name: "host", modifier: None }));
                assert_eq!(d.trailing, "x");
            }
            Token::Literal(_) => panic!("expected directive"),
        }
        assert_eq!(tokens[3], Token::Directive(Directive {
            kind: DirectiveKind::Variable(VarRef { name: " tail", modifier: None }),
            trailing: "",
        }));
    }

    #[test]
    fn test_scan_unterminated_directive_is_literal() {
        let tokens: Vec<Token<'_>> = scan("50@ off").collect();
        assert_eq!(tokens, vec![Token::Literal("50"), Token::Literal("@ off")]);
    }

    #[test]
    fn test_scanner_restart() {
        let mut scanner = scan("@a@1@b@2");
        assert_eq!(scanner.by_ref().count(), 2);
        assert!(scanner.next().is_none());
        scanner.restart();
        assert_eq!(scanner.count(), 2);
    }

    #[test]
    fn test_extract_subtemplate() {
        let extracted = extract_subtemplate("<ul>@{entry@<li>@title@</li>@}entry@</ul>", "entry").unwrap();
        assert_eq!(extracted.inner, "<li>@title@</li>");
        assert_eq!(extracted.outer, "<ul>@#entry@</ul>");
    }

    #[test]
    fn test_extract_errors() {
        assert!(matches!(
            extract_subtemplate("plain", "group"),
            Err(BibTplError::MissingRegion { .. })
        ));
        assert!(matches!(
            extract_subtemplate("@{group@ never closed", "group"),
            Err(BibTplError::UnterminatedRegion { .. })
        ));
        assert!(matches!(
            extract_subtemplate("@}group@ before @{group@", "group"),
            Err(BibTplError::UnterminatedRegion { .. })
        ));
        assert!(matches!(
            extract_subtemplate("@{group@a@}group@@{group@b@}group@", "group"),
            Err(BibTplError::AmbiguousRegion { count: 2, .. })
        ));
    }

    #[test]
    fn test_split_template() {
        let (outer, subs) =
            split_template("<h1>@{group@<h2>@groupkey@</h2>@{entry@<p>@title@</p>@}entry@@}group@").unwrap();
        assert_eq!(outer, "<h1>@#group@");
        assert_eq!(subs.group.as_deref(), Some("<h2>@groupkey@</h2>@#entry@"));
        assert_eq!(subs.entry.as_deref(), Some("<p>@title@</p>"));
    }

    #[test]
    fn test_split_flat_template() {
        let (outer, subs) = split_template("@?year=2020@MATCH@:@NOMATCH@;@").unwrap();
        assert_eq!(outer, "@?year=2020@MATCH@:@NOMATCH@;@");
        assert_eq!(subs, SubTemplates::default());
    }

    #[test]
    fn test_split_requires_nesting_and_both_regions() {
        assert!(matches!(
            split_template("@{group@x@}group@@{entry@y@}entry@"),
            Err(BibTplError::MisplacedRegion { .. })
        ));
        assert!(matches!(
            split_template("@{group@x@}group@"),
            Err(BibTplError::MissingRegion { ref marker }) if marker == "entry"
        ));
    }
}
