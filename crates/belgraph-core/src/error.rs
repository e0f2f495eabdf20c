// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error and warning types for the BEL compiler.
//!
//! The compiler distinguishes two failure tiers:
//!
//! - **Fatal errors** ([`CompileError`]) abort compilation: missing mandatory
//!   document metadata, malformed or conflicting `DEFINE` directives, and
//!   resource fetch failures. They integrate with [`miette`] for rich
//!   reporting.
//! - **Recoverable findings** ([`Warning`]) are recorded on the graph in
//!   document order and parsing continues with the next logical line. Each
//!   warning carries the line number, the original logical line, a closed
//!   [`WarningKind`], and a human-readable message.
//!
//! Automatic legacy-form upgrades (BEL 1.0 activities, single-letter
//! modification codes, `sub`/`trunc` variants) are not failures; they surface
//! in the same stream at [`Severity::Debug`] and are additionally logged via
//! [`tracing`].

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How severe a recoverable finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The statement was rejected and nothing was committed to the graph.
    Warning,
    /// An automatic normalization note; the statement was still compiled.
    Debug,
}

/// The closed taxonomy of recoverable findings.
///
/// Kind names are stable: they are serialized verbatim into node-link JSON
/// and round-tripped, so renaming a variant is a wire-format break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    // === Syntax ===
    /// General syntax failure in a statement.
    BelSyntax,
    /// `X` used where an amino-acid code is required.
    PlaceholderAminoAcid,
    /// A translocation without `fromLoc`/`toLoc` clauses.
    MalformedTranslocation,
    /// A function applied to an entity it cannot describe (wrong encoding,
    /// or an empty `complex()`).
    InvalidFunctionSemantic,
    /// A nested statement while nesting is disallowed.
    NestedRelation,

    // === Lexical identity ===
    /// A name with no namespace qualifier.
    NakedName,
    /// Reference to a namespace that was never defined.
    UndefinedNamespace,
    /// Reference to an annotation that was never defined.
    UndefinedAnnotation,
    /// A name absent from its enumerated namespace.
    MissingNamespaceName,
    /// A name that does not match its namespace's regular expression.
    MissingNamespaceRegex,
    /// An annotation value that does not match the annotation's regular
    /// expression.
    MissingAnnotationRegex,
    /// An annotation value outside the annotation's enumerated values.
    IllegalAnnotationValue,

    // === Context ===
    /// A qualified statement outside any citation context.
    MissingCitation,
    /// A citation whose `(type, reference)` pair is inconsistent.
    InvalidCitation,
    /// A citation with an unknown type keyword.
    InvalidCitationType,
    /// A PubMed citation whose reference is not numeric.
    InvalidPubMedIdentifier,
    /// A qualified statement with no evidence set.
    MissingEvidence,
    /// `UNSET` of a key that is not currently set.
    MissingAnnotationKey,
    /// A `SET Citation` with fewer than two entries.
    CitationTooShort,
    /// A `SET Citation` with more than six entries.
    CitationTooLong,
    /// A qualified statement missing annotations the compiler was told to
    /// require.
    MissingRequiredAnnotations,

    // === Semantic hygiene ===
    /// A document version that is neither semver nor `YYYYMMDD`.
    VersionFormat,
    /// A resource whose declared keyword differs from the `DEFINE` keyword.
    NamespaceKeywordMismatch,
    /// An unrecognized `SET DOCUMENT` key.
    InvalidMetadata,
    /// A `labeled` statement for a node that already carries a different
    /// label.
    Relabel,

    // === Legacy-form upgrades (debug severity) ===
    /// BEL 1.0 activity function (`kin(...)`, `phos(...)`, ...) upgraded to
    /// `act(..., ma(...))`.
    LegacyActivity,
    /// Single-letter amino-acid code widened to its three-letter form.
    LegacyAminoAcid,
    /// Single-letter BEL 1.0 protein-modification label upgraded.
    LegacyProteinModification,
    /// `sub(...)` in a protein upgraded to an HGVS variant.
    LegacyProteinSubstitution,
    /// `sub(...)` in a gene upgraded to an HGVS variant.
    LegacyGeneSubstitution,
    /// `trunc(...)` upgraded to an HGVS variant.
    LegacyTruncation,
    /// BEL 1.0 fusion form upgraded to the `fus(..)` range form.
    LegacyFusion,
    /// Translocation with bare location arguments upgraded to
    /// `fromLoc`/`toLoc`.
    LegacyTranslocation,
}

impl WarningKind {
    /// The severity this kind reports at.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            WarningKind::LegacyActivity
            | WarningKind::LegacyAminoAcid
            | WarningKind::LegacyProteinModification
            | WarningKind::LegacyProteinSubstitution
            | WarningKind::LegacyGeneSubstitution
            | WarningKind::LegacyTruncation
            | WarningKind::LegacyFusion
            | WarningKind::LegacyTranslocation => Severity::Debug,
            _ => Severity::Warning,
        }
    }
}

/// A recoverable finding, pinned to the logical line that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 1-based number of the first physical line of the logical line.
    pub line: u32,
    /// The logical line as the lexer emitted it.
    pub text: EcoString,
    /// Which finding this is.
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: EcoString,
}

impl Warning {
    /// Creates a warning record.
    #[must_use]
    pub fn new(
        line: u32,
        text: impl Into<EcoString>,
        kind: WarningKind,
        message: impl Into<EcoString>,
    ) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
            message: message.into(),
        }
    }

    /// The severity of this warning, derived from its kind.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// A failure inside a single statement or directive, before it has been tied
/// to a line.
///
/// The compiler stamps the line number and original text on, turning this
/// into a [`Warning`], then moves on to the next logical line. No partial
/// state from the failing statement is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StatementError {
    /// Which finding this is.
    pub kind: WarningKind,
    /// Byte offset within the logical line where the problem was detected.
    pub position: usize,
    /// Human-readable description.
    pub message: EcoString,
}

impl StatementError {
    /// Creates a statement error.
    #[must_use]
    pub fn new(kind: WarningKind, position: usize, message: impl Into<EcoString>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }

    /// Shorthand for a general syntax failure.
    #[must_use]
    pub fn syntax(position: usize, message: impl Into<EcoString>) -> Self {
        Self::new(WarningKind::BelSyntax, position, message)
    }

    /// Converts into a [`Warning`] for the given logical line.
    #[must_use]
    pub fn into_warning(self, line: u32, text: impl Into<EcoString>) -> Warning {
        Warning {
            line,
            text: text.into(),
            kind: self.kind,
            message: self.message,
        }
    }
}

/// A fatal compilation failure.
///
/// Anything here aborts the compilation; per-statement problems never reach
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CompileError {
    /// Mandatory document metadata is absent at the end of the document.
    #[error("missing required document metadata: {key}")]
    #[diagnostic(help("add `SET DOCUMENT {key} = \"...\"` to the document header"))]
    MissingMetadata {
        /// The BEL document key (`Name` or `Version`).
        key: EcoString,
    },

    /// A `DEFINE` directive that could not be parsed.
    #[error("malformed definition on line {line}: {text}")]
    MalformedDefinition {
        /// 1-based line number.
        line: u32,
        /// The offending logical line.
        text: EcoString,
    },

    /// A namespace keyword redefined with a different source.
    #[error("namespace {keyword} redefined on line {line} with a different source")]
    RedefinedNamespace {
        /// 1-based line number.
        line: u32,
        /// The namespace keyword.
        keyword: EcoString,
    },

    /// An annotation keyword redefined with a different source.
    #[error("annotation {keyword} redefined on line {line} with a different source")]
    RedefinedAnnotation {
        /// 1-based line number.
        line: u32,
        /// The annotation keyword.
        keyword: EcoString,
    },

    /// A definition resource could not be resolved.
    #[error("resource unavailable for {keyword} ({url}): {reason}")]
    #[diagnostic(help("the resolver could not produce a validator for this URL"))]
    ResourceUnavailable {
        /// The keyword being defined.
        keyword: EcoString,
        /// The resource URL.
        url: EcoString,
        /// Why resolution failed.
        reason: EcoString,
    },

    /// A `DEFINE ... AS PATTERN` whose regular expression does not compile.
    #[error("invalid pattern for {keyword}: {reason}")]
    InvalidDefinitionPattern {
        /// The keyword being defined.
        keyword: EcoString,
        /// The regex compilation failure.
        reason: EcoString,
    },

    /// The cancellation token was triggered between logical lines.
    #[error("compilation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_kinds_are_debug_severity() {
        assert_eq!(WarningKind::LegacyActivity.severity(), Severity::Debug);
        assert_eq!(WarningKind::LegacyTruncation.severity(), Severity::Debug);
        assert_eq!(WarningKind::MissingCitation.severity(), Severity::Warning);
        assert_eq!(WarningKind::BelSyntax.severity(), Severity::Warning);
    }

    #[test]
    fn statement_error_into_warning_keeps_kind_and_message() {
        let err = StatementError::syntax(7, "unexpected token");
        let warning = err.into_warning(3, "p(HGNC:)");
        assert_eq!(warning.line, 3);
        assert_eq!(warning.kind, WarningKind::BelSyntax);
        assert_eq!(warning.message, "unexpected token");
        assert_eq!(warning.severity(), Severity::Warning);
    }

    #[test]
    fn compile_error_display() {
        let err = CompileError::MissingMetadata { key: "Name".into() };
        assert_eq!(err.to_string(), "missing required document metadata: Name");

        let err = CompileError::ResourceUnavailable {
            keyword: "HGNC".into(),
            url: "https://example.invalid/hgnc.belns".into(),
            reason: "connection refused".into(),
        };
        assert!(err.to_string().contains("HGNC"));
    }

    #[test]
    fn warning_kind_serializes_as_bare_string() {
        let json = serde_json::to_string(&WarningKind::MissingCitation).unwrap();
        assert_eq!(json, "\"MissingCitation\"");
    }
}
