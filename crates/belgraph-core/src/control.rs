// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The metadata & control parser.
//!
//! Handles every directive line: `SET DOCUMENT`, `DEFINE NAMESPACE`,
//! `DEFINE ANNOTATION`, `SET`, and `UNSET`. It owns two pieces of state with
//! the lifetime of one compilation:
//!
//! - [`Definitions`]: the namespace and annotation validators registered by
//!   `DEFINE` directives (resources are resolved lazily, exactly when the
//!   directive is reached);
//! - the **context**: current statement group, citation, evidence, and
//!   annotations, which qualify every statement until changed.
//!
//! `DEFINE` problems are fatal; everything else is a recoverable
//! [`StatementError`] that the compiler converts into a warning. In
//! citation-clearing mode (the default), `SET Citation` also drops the
//! current evidence and all annotations — only the statement group survives.

use ecow::EcoString;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::ast::{Annotations, Citation};
use crate::error::{CompileError, StatementError, Warning, WarningKind};
use crate::graph::BelGraph;
use crate::language::CitationType;
use crate::lexer::LogicalLine;
use crate::parser::Cursor;
use crate::resolver::{NameCheck, Resolver, ResourceSource, Validator};

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?$").expect("static regex"));
static DATE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("static regex"));
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("static regex"));

/// The namespaces and annotations declared so far.
#[derive(Debug, Default)]
pub struct Definitions {
    namespaces: BTreeMap<EcoString, (ResourceSource, Arc<Validator>)>,
    annotations: BTreeMap<EcoString, (ResourceSource, Arc<Validator>)>,
}

impl Definitions {
    /// The validator registered for a namespace keyword.
    #[must_use]
    pub fn namespace_validator(&self, keyword: &str) -> Option<&Validator> {
        self.namespaces.get(keyword).map(|(_, v)| v.as_ref())
    }

    /// The validator registered for an annotation keyword.
    #[must_use]
    pub fn annotation_validator(&self, keyword: &str) -> Option<&Validator> {
        self.annotations.get(keyword).map(|(_, v)| v.as_ref())
    }

    /// Whether any namespaces at all have been declared. With none declared,
    /// identifier validation is off and statements parse unchecked.
    #[must_use]
    pub fn has_namespaces(&self) -> bool {
        !self.namespaces.is_empty()
    }

    /// Whether any annotations at all have been declared. With none
    /// declared, annotation use is unchecked.
    #[must_use]
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }
}

/// Which kind of definition a `DEFINE` directive introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefineKind {
    Namespace,
    Annotation,
}

/// The control parser: directive handling plus the citation/evidence/
/// annotation context.
#[derive(Debug, Default)]
pub struct ControlParser {
    /// Declared namespaces and annotations.
    pub definitions: Definitions,
    citation_clearing: bool,
    statement_group: Option<EcoString>,
    citation: Option<Citation>,
    evidence: Option<EcoString>,
    annotations: Annotations,
}

impl ControlParser {
    /// Creates a control parser.
    #[must_use]
    pub fn new(citation_clearing: bool) -> Self {
        Self {
            citation_clearing,
            ..Self::default()
        }
    }

    /// The current citation.
    #[must_use]
    pub fn citation(&self) -> Option<&Citation> {
        self.citation.as_ref()
    }

    /// The current evidence.
    #[must_use]
    pub fn evidence(&self) -> Option<&EcoString> {
        self.evidence.as_ref()
    }

    /// The current annotation context.
    #[must_use]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The current statement group.
    #[must_use]
    pub fn statement_group(&self) -> Option<&EcoString> {
        self.statement_group.as_ref()
    }

    fn clear_citation(&mut self) {
        self.citation = None;
        if self.citation_clearing {
            self.evidence = None;
            self.annotations.clear();
        }
    }

    // ========================================================================
    // SET DOCUMENT
    // ========================================================================

    /// `SET DOCUMENT <key> = <value>`. Recoverable problems are recorded on
    /// the graph directly: unknown keys warn and are dropped, non-semver
    /// versions warn and are kept.
    pub fn handle_document(&mut self, line: &LogicalLine, graph: &mut BelGraph) {
        if let Err(err) = self.try_handle_document(line, graph) {
            graph.add_warning(err.into_warning(line.number, line.text.clone()));
        }
    }

    fn try_handle_document(
        &mut self,
        line: &LogicalLine,
        graph: &mut BelGraph,
    ) -> Result<(), StatementError> {
        let mut cur = Cursor::new(&line.text);
        cur.take_word(); // SET
        cur.take_word(); // DOCUMENT
        let key_pos = cur.pos();
        let key = cur.take_bare_name().to_owned();
        cur.expect('=')?;
        let value = cur.take_name()?;

        let slot = match key.as_str() {
            "Name" => &mut graph.document.name,
            "Version" => {
                if !SEMVER_RE.is_match(&value) && !DATE_VERSION_RE.is_match(&value) {
                    graph.add_warning(Warning::new(
                        line.number,
                        line.text.clone(),
                        WarningKind::VersionFormat,
                        format!(
                            "version \"{value}\" is neither semantic versioning nor YYYYMMDD"
                        ),
                    ));
                }
                &mut graph.document.version
            }
            "Description" => &mut graph.document.description,
            "Authors" => &mut graph.document.authors,
            "ContactInfo" => &mut graph.document.contact,
            "Licenses" => &mut graph.document.licenses,
            "Copyright" => &mut graph.document.copyright,
            "Disclaimer" => &mut graph.document.disclaimer,
            "Project" => &mut graph.document.project,
            _ => {
                return Err(StatementError::new(
                    WarningKind::InvalidMetadata,
                    key_pos,
                    format!("invalid document metadata key: {key}"),
                ));
            }
        };

        if slot.is_some() {
            tracing::warn!(line = line.number, key = %key, "document metadata already set; keeping first value");
        } else {
            *slot = Some(value);
        }
        Ok(())
    }

    // ========================================================================
    // DEFINE
    // ========================================================================

    /// `DEFINE NAMESPACE|ANNOTATION <keyword> AS URL|PATTERN|LIST ...`.
    ///
    /// # Errors
    ///
    /// All failures here are fatal: malformed directives, redefinition with
    /// a different source, unresolvable resources, and invalid patterns.
    pub fn handle_define(
        &mut self,
        line: &LogicalLine,
        resolver: &mut dyn Resolver,
        graph: &mut BelGraph,
    ) -> Result<(), CompileError> {
        let malformed = || CompileError::MalformedDefinition {
            line: line.number,
            text: line.text.clone(),
        };

        let mut cur = Cursor::new(&line.text);
        cur.take_word(); // DEFINE
        let kind = match cur.take_word() {
            "NAMESPACE" => DefineKind::Namespace,
            "ANNOTATION" => DefineKind::Annotation,
            _ => return Err(malformed()),
        };
        let keyword: EcoString = cur.take_bare_name().into();
        if keyword.is_empty() || cur.take_word() != "AS" {
            return Err(malformed());
        }

        let (source, validator) = match cur.take_word() {
            "URL" => {
                let url = cur.take_quoted().map_err(|_| malformed())?;
                Url::parse(&url).map_err(|_| malformed())?;
                let validator =
                    resolver
                        .resolve(&url)
                        .map_err(|err| CompileError::ResourceUnavailable {
                            keyword: keyword.clone(),
                            url: url.clone(),
                            reason: err.reason,
                        })?;
                if let Some(declared) = validator.declared_keyword()
                    && *declared != keyword
                {
                    graph.add_warning(Warning::new(
                        line.number,
                        line.text.clone(),
                        WarningKind::NamespaceKeywordMismatch,
                        format!("resource declares keyword {declared}, defined as {keyword}"),
                    ));
                }
                (ResourceSource::Url(url), validator)
            }
            "PATTERN" => {
                let pattern = cur.take_quoted().map_err(|_| malformed())?;
                let validator = Validator::pattern(&pattern).map_err(|err| {
                    CompileError::InvalidDefinitionPattern {
                        keyword: keyword.clone(),
                        reason: err.to_string().into(),
                    }
                })?;
                (ResourceSource::Pattern(pattern), Arc::new(validator))
            }
            "LIST" => {
                let values: BTreeSet<EcoString> = parse_brace_list(&mut cur)
                    .map_err(|_| malformed())?
                    .into_iter()
                    .collect();
                let validator = Validator::plain(values.iter().cloned());
                (ResourceSource::List(values), Arc::new(validator))
            }
            _ => return Err(malformed()),
        };

        let table = match kind {
            DefineKind::Namespace => &mut self.definitions.namespaces,
            DefineKind::Annotation => &mut self.definitions.annotations,
        };
        if let Some((existing, _)) = table.get(&keyword) {
            if *existing == source {
                tracing::warn!(line = line.number, keyword = %keyword, "definition repeated with the identical source");
                return Ok(());
            }
            return Err(match kind {
                DefineKind::Namespace => CompileError::RedefinedNamespace {
                    line: line.number,
                    keyword,
                },
                DefineKind::Annotation => CompileError::RedefinedAnnotation {
                    line: line.number,
                    keyword,
                },
            });
        }
        table.insert(keyword.clone(), (source.clone(), validator));
        match kind {
            DefineKind::Namespace => graph.define_namespace(keyword, source),
            DefineKind::Annotation => graph.define_annotation(keyword, source),
        }
        Ok(())
    }

    // ========================================================================
    // SET
    // ========================================================================

    /// A `SET` directive other than `SET DOCUMENT`.
    ///
    /// # Errors
    ///
    /// Recoverable: invalid citations, undefined annotations, illegal
    /// values. The compiler records the error and continues.
    pub fn handle_set(&mut self, line: &LogicalLine) -> Result<(), StatementError> {
        let mut cur = Cursor::new(&line.text);
        cur.take_word(); // SET
        let key_pos = cur.pos();
        let key = cur.take_bare_name().to_owned();
        cur.expect('=')?;

        match key.as_str() {
            "STATEMENT_GROUP" => {
                self.statement_group = Some(cur.take_name()?);
                Ok(())
            }
            "Citation" => self.handle_set_citation(&mut cur, key_pos),
            "Evidence" | "SupportingText" => {
                self.evidence = Some(cur.take_quoted()?);
                Ok(())
            }
            _ => self.handle_set_annotation(&mut cur, &key, key_pos),
        }
    }

    fn handle_set_citation(
        &mut self,
        cur: &mut Cursor<'_>,
        pos: usize,
    ) -> Result<(), StatementError> {
        // Clearing happens before validation; a bad citation leaves no
        // citation in scope.
        self.clear_citation();

        let values = parse_brace_list(cur)?;
        if values.len() < 2 {
            return Err(StatementError::new(
                WarningKind::CitationTooShort,
                pos,
                "citation requires at least a type and a reference",
            ));
        }

        let citation_type = CitationType::from_keyword(&values[0]).ok_or_else(|| {
            StatementError::new(
                WarningKind::InvalidCitationType,
                pos,
                format!("\"{}\" is not a valid citation type", values[0]),
            )
        })?;

        let (name, reference, extras) = if values.len() == 2 {
            (None, values[1].clone(), &values[2..])
        } else {
            (Some(values[1].clone()), values[2].clone(), &values[3..])
        };

        if citation_type == CitationType::PubMed && !is_numeric(&reference) {
            return Err(StatementError::new(
                WarningKind::InvalidPubMedIdentifier,
                pos,
                format!("\"{reference}\" is not a valid PubMed identifier"),
            ));
        }

        let mut citation = Citation::new(citation_type, reference);
        citation.name = name;

        if let Some(date) = extras.first() {
            if !ISO_DATE_RE.is_match(date) {
                tracing::debug!(%date, "invalid citation date; keeping the three-entry form");
                self.citation = Some(citation);
                return Ok(());
            }
            if values.len() > 6 {
                return Err(StatementError::new(
                    WarningKind::CitationTooLong,
                    pos,
                    "citation contains too many entries",
                ));
            }
            citation.date = Some(date.clone());
            citation.authors = extras.get(1).cloned();
            citation.comments = extras.get(2).cloned();
        }

        self.citation = Some(citation);
        Ok(())
    }

    fn handle_set_annotation(
        &mut self,
        cur: &mut Cursor<'_>,
        key: &str,
        key_pos: usize,
    ) -> Result<(), StatementError> {
        if self.citation_clearing && self.citation.is_none() {
            return Err(StatementError::new(
                WarningKind::MissingCitation,
                key_pos,
                format!("cannot set {key} before a citation"),
            ));
        }
        self.check_annotation_defined(key, key_pos)?;

        cur.skip_ws();
        let values: BTreeSet<EcoString> = if cur.peek() == Some('{') {
            parse_brace_list(cur)?.into_iter().collect()
        } else {
            BTreeSet::from([cur.take_name()?])
        };

        for value in &values {
            self.check_annotation_value(key, value, key_pos)?;
        }
        self.annotations.insert(key.into(), values);
        Ok(())
    }

    fn check_annotation_defined(&self, key: &str, pos: usize) -> Result<(), StatementError> {
        if !self.definitions.has_annotations() {
            return Ok(());
        }
        if self.definitions.annotation_validator(key).is_none() {
            return Err(StatementError::new(
                WarningKind::UndefinedAnnotation,
                pos,
                format!("\"{key}\" is not a defined annotation"),
            ));
        }
        Ok(())
    }

    fn check_annotation_value(
        &self,
        key: &str,
        value: &str,
        pos: usize,
    ) -> Result<(), StatementError> {
        let Some(validator) = self.definitions.annotation_validator(key) else {
            return Ok(());
        };
        match validator.check(value, None) {
            NameCheck::Valid => Ok(()),
            NameCheck::PatternMismatch => Err(StatementError::new(
                WarningKind::MissingAnnotationRegex,
                pos,
                format!("\"{value}\" does not match the regex for the {key} annotation"),
            )),
            _ => Err(StatementError::new(
                WarningKind::IllegalAnnotationValue,
                pos,
                format!("\"{value}\" is not defined in the {key} annotation"),
            )),
        }
    }

    // ========================================================================
    // UNSET
    // ========================================================================

    /// An `UNSET` directive.
    ///
    /// # Errors
    ///
    /// Unsetting something that is not set is a recoverable
    /// `MissingAnnotationKey` error.
    pub fn handle_unset(&mut self, line: &LogicalLine) -> Result<(), StatementError> {
        let mut cur = Cursor::new(&line.text);
        cur.take_word(); // UNSET
        cur.skip_ws();

        if cur.peek() == Some('{') {
            let keys = parse_brace_list(&mut cur)?;
            for key in keys {
                self.unset_one(&key, cur.pos())?;
            }
            return Ok(());
        }

        let pos = cur.pos();
        let key = cur.take_bare_name().to_owned();
        if key == "ALL" {
            self.statement_group = None;
            self.citation = None;
            self.evidence = None;
            self.annotations.clear();
            return Ok(());
        }
        self.unset_one(&key, pos)
    }

    fn unset_one(&mut self, key: &str, pos: usize) -> Result<(), StatementError> {
        let missing = |what: &str| {
            StatementError::new(
                WarningKind::MissingAnnotationKey,
                pos,
                format!("\"{what}\" is not set, so it cannot be unset"),
            )
        };
        match key {
            "Citation" => {
                if self.citation.is_none() {
                    return Err(missing(key));
                }
                self.clear_citation();
            }
            "Evidence" | "SupportingText" => {
                if self.evidence.is_none() {
                    return Err(missing(key));
                }
                self.evidence = None;
            }
            "STATEMENT_GROUP" => {
                if self.statement_group.is_none() {
                    return Err(missing(key));
                }
                self.statement_group = None;
            }
            _ => {
                if self.annotations.remove(key).is_none() {
                    return Err(missing(key));
                }
            }
        }
        Ok(())
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses `{ "a", "b", c }`, preserving order (citations are positional).
fn parse_brace_list(cur: &mut Cursor<'_>) -> Result<Vec<EcoString>, StatementError> {
    cur.expect('{')?;
    let mut values = Vec::new();
    loop {
        values.push(cur.take_name()?);
        if !cur.eat(',') {
            break;
        }
    }
    cur.expect('}')?;
    Ok(values)
}
