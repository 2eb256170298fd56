//! Author-name parsing and human-readable rendering.
//!
//! Names follow BibTeX conventions. An author field is a list of names joined
//! by a top-level `and`; each name takes one of three shapes:
//!
//! ```text
//! First von Last
//! von Last, First
//! von Last, Jr, First
//! ```
//!
//! Brace groups are protected: `{Barnes and Noble}` is one name and
//! `{de la} Cruz` keeps its particle capitalisation. Braces are dropped from
//! the parsed parts.

use serde::{Deserialize, Serialize};

/// A single parsed author name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first: String,
    pub von: String,
    pub last: String,
    pub jr: String,
}

/// How an author (or author list) is rendered, chosen by the `author:<style>` modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorStyle {
    /// `First von Last, Jr`
    #[default]
    Full,
    /// `F. von Last, Jr`
    Short,
    /// `von Last`
    Last,
    /// `von Last, Jr, First`
    Inverted,
}

impl AuthorStyle {
    /// Resolve a template modifier to a style. Unknown modifiers render in full.
    pub fn from_modifier(modifier: Option<&str>) -> Self {
        match modifier {
            None | Some("") | Some("full") => Self::Full,
            Some("short") | Some("abbrv") => Self::Short,
            Some("last") => Self::Last,
            Some("inverted") => Self::Inverted,
            Some(other) => {
                tracing::warn!("unknown author style '{other}', using full names");
                Self::Full
            }
        }
    }
}

impl Author {
    /// Parse one name in any of the three BibTeX shapes.
    pub fn parse(name: &str) -> Self {
        let parts: Vec<&str> = split_top_level(name, |c| c == ',')
            .into_iter()
            .map(str::trim)
            .collect();

        match parts.as_slice() {
            [] => Self::default(),
            [whole] => {
                let words = split_top_level(whole, char::is_whitespace);
                let n = words.len();
                if n <= 1 {
                    return Self {
                        last: strip_braces(whole),
                        ..Self::default()
                    };
                }
                // von starts at the first lowercase word and ends at the last
                // lowercase word that still leaves a surname behind.
                match words[..n - 1].iter().position(|w| starts_lowercase(w)) {
                    Some(start) => {
                        let end = (start..n - 1)
                            .rev()
                            .find(|&i| starts_lowercase(words[i]))
                            .unwrap_or(start);
                        Self {
                            first: join_words(&words[..start]),
                            von: join_words(&words[start..=end]),
                            last: join_words(&words[end + 1..]),
                            jr: String::new(),
                        }
                    }
                    None => Self {
                        first: join_words(&words[..n - 1]),
                        last: strip_braces(words[n - 1]),
                        ..Self::default()
                    },
                }
            }
            [von_last, rest @ ..] => {
                let (von, last) = split_von_last(von_last);
                let (jr, first) = match rest {
                    [first] => (String::new(), strip_braces(first)),
                    [jr, first, ..] => (strip_braces(jr), strip_braces(first)),
                    [] => (String::new(), String::new()),
                };
                Self { first, von, last, jr }
            }
        }
    }

    /// Render this name in the given style.
    pub fn format(&self, style: AuthorStyle) -> String {
        let surname = join_nonempty(&[&self.von, &self.last], " ");
        let with_jr = |base: String| {
            if self.jr.is_empty() {
                base
            } else {
                format!("{base}, {}", self.jr)
            }
        };

        match style {
            AuthorStyle::Full => with_jr(join_nonempty(&[&self.first, &surname], " ")),
            AuthorStyle::Short => with_jr(join_nonempty(&[&initials(&self.first), &surname], " ")),
            AuthorStyle::Last => surname,
            AuthorStyle::Inverted => join_nonempty(&[&surname, &self.jr, &self.first], ", "),
        }
    }
}

/// Split an author field into individual names on top-level `and`.
pub fn split_authors(field: &str) -> Vec<Author> {
    let mut names = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in split_top_level(field, char::is_whitespace) {
        if word.eq_ignore_ascii_case("and") {
            if !current.is_empty() {
                names.push(Author::parse(&current.join(" ")));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        names.push(Author::parse(&current.join(" ")));
    }

    names
}

/// Render an author list: `A`, `A and B`, `A, B and C`.
pub fn format_authors(authors: &[Author], style: AuthorStyle, and: &str) -> String {
    let names: Vec<String> = authors.iter().map(|a| a.format(style)).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., tail] => format!("{} {and} {tail}", init.join(", ")),
    }
}

/// Split on separator characters that are not enclosed in braces, dropping empty pieces.
fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                if start < i {
                    pieces.push(&s[start..i]);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if start < s.len() {
        pieces.push(&s[start..]);
    }

    pieces.retain(|p| !p.trim().is_empty());
    pieces
}

fn split_von_last(s: &str) -> (String, String) {
    let words = split_top_level(s, char::is_whitespace);
    if words.len() <= 1 {
        return (String::new(), strip_braces(s));
    }
    let von_len = words[..words.len() - 1]
        .iter()
        .take_while(|w| starts_lowercase(w))
        .count();
    (join_words(&words[..von_len]), join_words(&words[von_len..]))
}

fn starts_lowercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_lowercase)
}

fn strip_braces(s: &str) -> String {
    s.chars().filter(|c| *c != '{' && *c != '}').collect::<String>().trim().to_string()
}

fn join_words(words: &[&str]) -> String {
    strip_braces(&words.join(" "))
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

/// `Jean-Paul Marie` -> `J.-P. M.`
fn initials(first: &str) -> String {
    first
        .split_whitespace()
        .map(|word| {
            word.split('-')
                .filter_map(|part| part.chars().next())
                .map(|c| format!("{c}."))
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_last() {
        let a = Author::parse("Herman Melville");
        assert_eq!(a.first, "Herman");
        assert_eq!(a.last, "Melville");
        assert!(a.von.is_empty());
    }

    #[test]
    fn test_parse_with_von() {
        let a = Author::parse("Ludwig van Beethoven");
        assert_eq!(a.first, "Ludwig");
        assert_eq!(a.von, "van");
        assert_eq!(a.last, "Beethoven");
    }

    #[test]
    fn test_parse_comma_forms() {
        let a = Author::parse("Shannon, C. E.");
        assert_eq!(a.last, "Shannon");
        assert_eq!(a.first, "C. E.");

        let b = Author::parse("van der Waals, Jr, Johannes");
        assert_eq!(b.von, "van der");
        assert_eq!(b.last, "Waals");
        assert_eq!(b.jr, "Jr");
        assert_eq!(b.first, "Johannes");
    }

    #[test]
    fn test_parse_braced_corporate_name() {
        let a = Author::parse("{Barnes and Noble}");
        assert_eq!(a.last, "Barnes and Noble");
        assert!(a.first.is_empty());
    }

    #[test]
    fn test_split_authors_respects_braces() {
        let authors = split_authors("Knuth, Donald and {Barnes and Noble} AND Jane Doe");
        assert_eq!(authors.len(), 3);
        assert_eq!(authors[0].last, "Knuth");
        assert_eq!(authors[1].last, "Barnes and Noble");
        assert_eq!(authors[2].last, "Doe");
    }

    #[test]
    fn test_format_styles() {
        let a = Author::parse("Jean-Paul de Sartre");
        assert_eq!(a.format(AuthorStyle::Full), "Jean-Paul de Sartre");
        assert_eq!(a.format(AuthorStyle::Short), "J.-P. de Sartre");
        assert_eq!(a.format(AuthorStyle::Last), "de Sartre");
        assert_eq!(a.format(AuthorStyle::Inverted), "de Sartre, Jean-Paul");
    }

    #[test]
    fn test_format_authors_joining() {
        let authors = split_authors("Ann Ames and Bob Burns and Cy Cole");
        assert_eq!(format_authors(&authors[..1], AuthorStyle::Full, "and"), "Ann Ames");
        assert_eq!(
            format_authors(&authors[..2], AuthorStyle::Last, "und"),
            "Ames und Burns"
        );
        assert_eq!(
            format_authors(&authors, AuthorStyle::Short, "and"),
            "A. Ames, B. Burns and C. Cole"
        );
        assert_eq!(format_authors(&[], AuthorStyle::Full, "and"), "");
    }

    #[test]
    fn test_style_from_modifier() {
        assert_eq!(AuthorStyle::from_modifier(None), AuthorStyle::Full);
        assert_eq!(AuthorStyle::from_modifier(Some("short")), AuthorStyle::Short);
        assert_eq!(AuthorStyle::from_modifier(Some("bogus")), AuthorStyle::Full);
    }
}
