//! The literal tuple-list syntax of the credential file and editor buffer.
//!
//! A file holds one list, `[('root', 'Root'), ('admin', 'Admin')]`; the
//! editor holds one tuple per line. Strings take single or double quotes and
//! the escapes `\\ \' \" \n \r \t`. Text is parsed, never evaluated.

use std::iter::Peekable;
use std::str::CharIndices;

use zeroize::Zeroizing;

use super::entry::{CredentialEntry, CredentialList};
use crate::error::ValidationError;

/// Position and expectation of a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub expected: &'static str,
}

struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            len: text.len(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len)
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), SyntaxError> {
        self.skip_ws();
        if self.eat(want) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&mut self, expected: &'static str) -> SyntaxError {
        SyntaxError {
            offset: self.offset(),
            expected,
        }
    }

    fn string(&mut self) -> Result<String, SyntaxError> {
        self.skip_ws();
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("quoted string")),
        };
        self.chars.next();

        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error("closing quote")),
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, '\'')) => out.push('\''),
                    Some((_, '"')) => out.push('"'),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, 't')) => out.push('\t'),
                    _ => return Err(self.error("escape sequence")),
                },
                Some((_, '\n')) => return Err(self.error("closing quote")),
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn tuple(&mut self) -> Result<CredentialEntry, SyntaxError> {
        self.expect('(', "'('")?;
        let secret = Zeroizing::new(self.string()?);
        self.expect(',', "','")?;
        let identity = self.string()?;
        self.skip_ws();
        // optional trailing comma, as in ('a', 'b',)
        self.eat(',');
        self.expect(')', "')'")?;
        Ok(CredentialEntry::new(secret.as_str(), identity))
    }

    fn end(&mut self) -> Result<(), SyntaxError> {
        self.skip_ws();
        if self.peek().is_none() {
            Ok(())
        } else {
            Err(self.error("end of input"))
        }
    }
}

/// Parse a whole list literal, as stored in the decrypted credential file.
pub fn parse_list(text: &str) -> Result<CredentialList, SyntaxError> {
    let mut cursor = Cursor::new(text);
    cursor.expect('[', "'['")?;

    let mut list = CredentialList::default();
    loop {
        cursor.skip_ws();
        if cursor.eat(']') {
            break;
        }
        list.push(cursor.tuple()?);
        cursor.skip_ws();
        if cursor.eat(',') {
            continue;
        }
        cursor.expect(']', "',' or ']'")?;
        break;
    }

    cursor.end()?;
    Ok(list)
}

/// Parse a single `(secret, identity)` tuple literal.
pub fn parse_entry(text: &str) -> Result<CredentialEntry, SyntaxError> {
    let mut cursor = Cursor::new(text);
    let entry = cursor.tuple()?;
    cursor.end()?;
    Ok(entry)
}

/// Parse editor text: one tuple per line, `#` comments and blank lines
/// skipped. The first bad line aborts the whole parse.
pub fn parse_lines(text: &str) -> Result<CredentialList, ValidationError> {
    let mut list = CredentialList::default();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry = parse_entry(trimmed).map_err(|_| ValidationError::MalformedLine {
            line: index + 1,
            text: trimmed.to_string(),
        })?;
        list.push(entry);
    }
    Ok(list)
}

/// Quote a string the way it reads back through `parse_*`.
pub fn quote(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn format_entry(entry: &CredentialEntry) -> String {
    format!("({}, {})", quote(entry.secret()), quote(entry.identity()))
}

/// Serialize a list as the single-line literal stored in the credential file.
pub fn format_list(list: &CredentialList) -> Zeroizing<String> {
    let body: Vec<String> = list.entries().iter().map(format_entry).collect();
    Zeroizing::new(format!("[{}]", body.join(", ")))
}

/// Render a list for the editor, one tuple per line.
pub fn format_lines(list: &CredentialList) -> String {
    let mut out = String::new();
    for entry in list {
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
    out
}
