// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! A byte cursor over one logical line.
//!
//! The term grammar needs lookahead of one token at most, so the cursor
//! offers `peek`/`bump` plus a handful of token readers. Every failure path
//! produces a [`StatementError`] carrying the byte position, which the
//! compiler stitches into the warning record for the line.

use ecow::EcoString;

use crate::error::StatementError;

/// Character class for keywords: function names, relation names, annotation
/// keys.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Character class for bare (unquoted) names: `AKT1`, `p.40*`-free names,
/// `GO:0005622`-style identifiers come quoted or split on the colon.
fn is_bare_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes `c` if it is next; whitespace before it is skipped.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Requires `c` next (after whitespace).
    pub(crate) fn expect(&mut self, c: char) -> Result<(), StatementError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected '{c}'")))
        }
    }

    /// Reads a keyword: one or more word characters.
    pub(crate) fn take_word(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Peeks the keyword that [`Cursor::take_word`] would return.
    pub(crate) fn peek_word(&mut self) -> &'a str {
        let mut probe = self.clone();
        probe.take_word()
    }

    /// Reads a bare name: word characters plus `.` and `-`.
    pub(crate) fn take_bare_name(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(is_bare_name_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Reads everything up to the next whitespace. Used for relation tokens,
    /// which may be symbolic (`->`, `=|`, `:>`).
    pub(crate) fn take_until_ws(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_whitespace()) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Reads a double-quoted string, honoring `\"` and `\\` escapes.
    pub(crate) fn take_quoted(&mut self) -> Result<EcoString, StatementError> {
        self.skip_ws();
        if self.peek() != Some('"') {
            return Err(self.syntax("expected a quoted string"));
        }
        let open = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(StatementError::syntax(open, "unterminated quoted string"));
                }
                Some('"') => return Ok(out.into()),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => {
                        return Err(StatementError::syntax(open, "unterminated quoted string"));
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// Reads a quoted string or a bare name.
    pub(crate) fn take_name(&mut self) -> Result<EcoString, StatementError> {
        self.skip_ws();
        if self.peek() == Some('"') {
            return self.take_quoted();
        }
        let name = self.take_bare_name();
        if name.is_empty() {
            return Err(self.syntax("expected a name"));
        }
        Ok(name.into())
    }

    /// Reads an unsigned integer.
    pub(crate) fn take_integer(&mut self) -> Result<u64, StatementError> {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| StatementError::syntax(start, "expected an integer"))
    }

    /// A syntax error at the current position.
    pub(crate) fn syntax(&self, message: impl Into<EcoString>) -> StatementError {
        StatementError::syntax(self.pos, message)
    }
}
