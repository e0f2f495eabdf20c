// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Logical-line lexing for BEL scripts.
//!
//! BEL is line-oriented, but a logical statement may span several physical
//! lines: a trailing backslash continues onto the next line, and a quoted
//! string may simply run on until its closing quote. This module collapses a
//! stream of physical lines into a stream of `(line number, logical line)`
//! pairs, where the number is the 1-based position of the **first** physical
//! line.
//!
//! The lexer never fails as a whole. The only recoverable problem it can
//! detect — a quote still open at end of input — is reported as a
//! [`Warning`] item and the partial line is discarded.
//!
//! Comment handling:
//!
//! - lines starting with `#` are dropped; `#:` note lines are additionally
//!   logged at info level,
//! - a trailing ` //` comment is stripped from every logical line.

use ecow::EcoString;

use crate::error::{Warning, WarningKind};

/// A logical line paired with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub number: u32,
    /// The assembled, whitespace-trimmed text.
    pub text: EcoString,
}

/// Iterator adapter producing logical lines from physical lines.
///
/// # Example
///
/// ```
/// use belgraph_core::lexer::Lexer;
///
/// let script = "SET DOCUMENT Name = \\\n    \"Example\"\n# comment\np(HGNC:AKT1)\n";
/// let lines: Vec<_> = Lexer::new(script.lines().map(String::from))
///     .filter_map(Result::ok)
///     .collect();
/// assert_eq!(lines[0].text, "SET DOCUMENT Name = \"Example\"");
/// assert_eq!(lines[0].number, 1);
/// assert_eq!(lines[1].text, "p(HGNC:AKT1)");
/// assert_eq!(lines[1].number, 4);
/// ```
#[derive(Debug)]
pub struct Lexer<I> {
    lines: I,
    next_number: u32,
}

/// Logical lines longer than this trigger a log warning; parsing continues.
const LONG_LINE_BYTES: usize = 64 * 1024;

impl<I> Lexer<I>
where
    I: Iterator<Item = String>,
{
    /// Creates a lexer over an iterator of physical lines.
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            next_number: 0,
        }
    }

    /// Pulls the next non-empty, non-comment physical line.
    fn next_clean(&mut self) -> Option<(u32, String)> {
        loop {
            let raw = self.lines.next()?;
            self.next_number += 1;
            let raw = if self.next_number == 1 {
                // Tolerate a UTF-8 byte-order mark on the first line.
                raw.trim_start_matches('\u{feff}')
            } else {
                raw.as_str()
            };
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix('#') {
                if rest.starts_with(':') {
                    tracing::info!(line = self.next_number, note = line, "script note");
                }
                continue;
            }
            return Some((self.next_number, line.to_owned()));
        }
    }
}

fn quote_parity(s: &str) -> bool {
    s.bytes().filter(|&b| b == b'"').count() % 2 == 1
}

fn strip_trailing_comment(line: &mut String) {
    if let Some(idx) = line.rfind(" //") {
        line.truncate(idx);
        line.truncate(line.trim_end().len());
    }
}

impl<I> Iterator for Lexer<I>
where
    I: Iterator<Item = String>,
{
    type Item = Result<LogicalLine, Warning>;

    fn next(&mut self) -> Option<Self::Item> {
        let (number, mut line) = self.next_clean()?;

        if let Some(stripped) = line.strip_suffix('\\') {
            // Backslash continuation; whitespace collapses to one space.
            line = stripped.trim_end().to_owned();
            while let Some((_, next)) = self.next_clean() {
                if let Some(stripped) = next.strip_suffix('\\') {
                    line.push(' ');
                    line.push_str(stripped.trim_end());
                } else {
                    line.push(' ');
                    line.push_str(&next);
                    break;
                }
            }
        } else if quote_parity(&line) {
            // A quote is still open; keep consuming until it closes.
            let mut closed = false;
            while let Some((_, next)) = self.next_clean() {
                line.push(' ');
                line.push_str(&next);
                if !quote_parity(&line) {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Some(Err(Warning::new(
                    number,
                    line,
                    WarningKind::BelSyntax,
                    "unterminated quote at end of input",
                )));
            }
        }

        strip_trailing_comment(&mut line);

        if line.len() > LONG_LINE_BYTES {
            tracing::warn!(line = number, bytes = line.len(), "unusually long logical line");
        }

        Some(Ok(LogicalLine {
            number,
            text: line.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(script: &str) -> Vec<Result<LogicalLine, Warning>> {
        Lexer::new(script.lines().map(String::from)).collect()
    }

    fn lex_ok(script: &str) -> Vec<(u32, String)> {
        lex(script)
            .into_iter()
            .map(|item| item.expect("no lexer warnings expected"))
            .map(|line| (line.number, line.text.to_string()))
            .collect()
    }

    #[test]
    fn strips_blank_and_comment_lines() {
        let lines = lex_ok("\n# header comment\n#: note\n\np(HGNC:AKT1)\n");
        assert_eq!(lines, vec![(5, "p(HGNC:AKT1)".to_owned())]);
    }

    #[test]
    fn backslash_continuation_collapses_whitespace() {
        let lines = lex_ok("SET Evidence = \"abc \\\n    def\"\np(HGNC:A)");
        assert_eq!(
            lines,
            vec![
                (1, "SET Evidence = \"abc def\"".to_owned()),
                (3, "p(HGNC:A)".to_owned()),
            ]
        );
    }

    #[test]
    fn chained_continuations() {
        let lines = lex_ok("a \\\nb \\\nc");
        assert_eq!(lines, vec![(1, "a b c".to_owned())]);
    }

    #[test]
    fn open_quote_spans_lines() {
        let lines = lex_ok("SET Evidence = \"first\nsecond\nthird\"\np(HGNC:A)");
        assert_eq!(
            lines,
            vec![
                (1, "SET Evidence = \"first second third\"".to_owned()),
                (4, "p(HGNC:A)".to_owned()),
            ]
        );
    }

    #[test]
    fn unterminated_quote_becomes_warning() {
        let items = lex("SET Evidence = \"never closed\np(HGNC:A)");
        assert_eq!(items.len(), 1);
        let warning = items[0].as_ref().unwrap_err();
        assert_eq!(warning.kind, WarningKind::BelSyntax);
        assert_eq!(warning.line, 1);
    }

    #[test]
    fn trailing_comment_is_stripped() {
        let lines = lex_ok("p(HGNC:A) -> p(HGNC:B) // because reasons");
        assert_eq!(lines, vec![(1, "p(HGNC:A) -> p(HGNC:B)".to_owned())]);
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        let lines = lex_ok("\u{feff}SET DOCUMENT Name = \"T\"");
        assert_eq!(lines, vec![(1, "SET DOCUMENT Name = \"T\"".to_owned())]);
    }

    #[test]
    fn line_numbers_track_first_physical_line() {
        let lines = lex_ok("# intro\n\nfirst \\\nsecond\nthird");
        assert_eq!(lines, vec![(3, "first second".to_owned()), (5, "third".to_owned())]);
    }
}
