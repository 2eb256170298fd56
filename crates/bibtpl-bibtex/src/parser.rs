//! Cursor-based `.bib` reader.
//!
//! Text outside `@` commands is ignored, as BibTeX does. Within a command the
//! grammar is:
//!
//! ```text
//! command  = '@' ident ( '{' body '}' | '(' body ')' )
//! body     = key ',' field (',' field)* [','] | 'string' field | 'preamble' value
//! field    = ident '=' value
//! value    = piece ('#' piece)*
//! piece    = '{' balanced '}' | '"' balanced '"' | digits | macro
//! ```

use std::collections::HashMap;

use bibtpl_core::entry::Record;
use bibtpl_core::error::{BibTplError, Result};

use crate::macros;

const SPECIAL: &[u8] = b"{}(),=#\"%@";

pub(crate) struct Parser<'s> {
    src: &'s str,
    pos: usize,
    macros: HashMap<String, String>,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            macros: macros::predefined(),
        }
    }

    pub(crate) fn with_macros(mut self, extra: &HashMap<String, String>) -> Self {
        self.macros
            .extend(extra.iter().map(|(k, v)| (k.to_lowercase(), v.clone())));
        self
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        while self.skip_to_command() {
            self.bump();
            self.skip_ws();
            let command = self.ident()?.to_lowercase();
            self.skip_ws();
            let close = self.open_delimiter()?;

            match command.as_str() {
                "comment" => self.skip_balanced(close)?,
                "preamble" => {
                    self.skip_ws();
                    self.value()?;
                    self.skip_ws();
                    self.expect(close)?;
                }
                "string" => {
                    self.skip_ws();
                    let (name, value) = self.field()?;
                    tracing::trace!("@string {name} = {value:?}");
                    self.macros.insert(name, value);
                    self.skip_ws();
                    self.expect(close)?;
                }
                _ => records.push(self.entry(command, close)?),
            }
        }

        Ok(records)
    }

    fn entry(&mut self, entry_type: String, close: u8) -> Result<Record> {
        self.skip_ws();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b',' || b == close || b.is_ascii_whitespace() {
                break;
            }
            self.bump();
        }
        let mut record = Record::new(entry_type, &self.src[start..self.pos]);

        loop {
            self.skip_ws();
            match self.peek() {
                Some(b) if b == close => {
                    self.bump();
                    return Ok(record);
                }
                Some(b',') => {
                    self.bump();
                    self.skip_ws();
                    if self.peek() == Some(close) {
                        continue;
                    }
                    let (name, value) = self.field()?;
                    record.fields.push((name, value));
                }
                Some(other) => {
                    return Err(self.error(format!(
                        "expected ',' or '{}' in entry '{}', found '{}'",
                        close as char, record.cite, other as char
                    )))
                }
                None => return Err(self.error(format!("unterminated entry '{}'", record.cite))),
            }
        }
    }

    fn field(&mut self) -> Result<(String, String)> {
        let name = self.ident()?.to_lowercase();
        self.skip_ws();
        self.expect(b'=')?;
        self.skip_ws();
        let value = self.value()?;
        Ok((name, value))
    }

    fn value(&mut self) -> Result<String> {
        let mut raw = String::new();
        loop {
            raw.push_str(&self.piece()?);
            self.skip_ws();
            if self.peek() != Some(b'#') {
                break;
            }
            self.bump();
            self.skip_ws();
        }
        Ok(normalize(&raw))
    }

    fn piece(&mut self) -> Result<String> {
        match self.peek() {
            Some(b'{') => {
                self.bump();
                self.delimited(b'}')
            }
            Some(b'"') => {
                self.bump();
                self.delimited(b'"')
            }
            Some(b) if b.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
            Some(_) => {
                let name = self.ident()?.to_lowercase();
                Ok(match self.macros.get(&name) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!("undefined macro '{name}' at line {}", self.line());
                        String::new()
                    }
                })
            }
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    /// Content up to the matching `end`, nested braces included.
    fn delimited(&mut self, end: u8) -> Result<String> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => depth += 1,
                b'}' if depth > 0 => depth -= 1,
                b'}' if end == b'"' => return Err(self.error("unbalanced '}' in quoted value")),
                _ if b == end && depth == 0 => {
                    let content = &self.src[start..self.pos];
                    self.bump();
                    return Ok(content.to_string());
                }
                _ => {}
            }
            self.bump();
        }
        Err(self.error_at(start, "unterminated value"))
    }

    fn skip_balanced(&mut self, close: u8) -> Result<()> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            self.bump();
            match b {
                b'{' | b'(' => depth += 1,
                _ if b == close && depth == 0 => return Ok(()),
                b'}' | b')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Err(self.error_at(start, "unterminated comment"))
    }

    fn open_delimiter(&mut self) -> Result<u8> {
        match self.peek() {
            Some(b'{') => {
                self.bump();
                Ok(b'}')
            }
            Some(b'(') => {
                self.bump();
                Ok(b')')
            }
            _ => Err(self.error("expected '{' or '('")),
        }
    }

    fn ident(&mut self) -> Result<&'s str> {
        let src = self.src;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || SPECIAL.contains(&b) {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(&src[start..self.pos])
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.bump();
                Ok(())
            }
            Some(b) => Err(self.error(format!("expected '{}', found '{}'", byte as char, b as char))),
            None => Err(self.error(format!("expected '{}', found end of input", byte as char))),
        }
    }

    /// Advance to the next `@`. Returns `false` at end of input.
    fn skip_to_command(&mut self) -> bool {
        match self.src[self.pos..].find('@') {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Step over one character, keeping `pos` on a char boundary.
    fn bump(&mut self) {
        if let Some(c) = self.src[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn line(&self) -> usize {
        line_of(self.src, self.pos)
    }

    fn error(&self, message: impl Into<String>) -> BibTplError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> BibTplError {
        BibTplError::Parse {
            line: line_of(self.src, pos),
            message: message.into(),
        }
    }
}

fn line_of(src: &str, pos: usize) -> usize {
    src[..pos].matches('\n').count() + 1
}

/// Strip braces and collapse runs of whitespace.
fn normalize(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| word.replace(['{', '}'], ""))
        .collect::<Vec<_>>()
        .join(" ")
}
