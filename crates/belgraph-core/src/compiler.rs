// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The streaming BEL compiler.
//!
//! [`compile`] drives the whole pipeline: physical lines go through the
//! [`crate::lexer`], each logical line is dispatched to the
//! [`crate::control`] parser (directives) or the [`crate::parser`]
//! (statements), and committed statements land in a [`BelGraph`].
//!
//! Compilation is a synchronous, single-threaded state machine: one logical
//! line at a time, never the whole document in memory. The only blocking
//! point is resource resolution inside `DEFINE` directives. A
//! [`CancellationToken`] is checked between logical lines.
//!
//! Per-statement failures become warnings on the graph and compilation
//! continues; `DEFINE` failures and missing mandatory metadata abort with a
//! [`CompileError`].
//!
//! # Example
//!
//! ```
//! use belgraph_core::compiler::{CompilerOptions, compile};
//! use belgraph_core::resolver::{MemoryResolver, Validator};
//!
//! let script = r#"
//! SET DOCUMENT Name = "Example"
//! SET DOCUMENT Version = "1.0.0"
//! DEFINE NAMESPACE HGNC AS URL "https://example.org/hgnc.belns"
//! SET Citation = {"PubMed", "Title", "12345"}
//! SET Evidence = "supporting text"
//! p(HGNC:AKT1) -> p(HGNC:EGFR)
//! "#;
//!
//! let mut resolver = MemoryResolver::new()
//!     .with("https://example.org/hgnc.belns", Validator::plain(["AKT1", "EGFR"]));
//! let graph = compile(script.lines().map(String::from), CompilerOptions::default(), &mut resolver)
//!     .unwrap();
//! assert!(graph.warnings().is_empty());
//! ```

use ecow::EcoString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ast::{EdgeData, RelationStatement, Statement};
use crate::control::ControlParser;
use crate::error::{CompileError, StatementError, Warning, WarningKind};
use crate::graph::BelGraph;
use crate::lexer::{Lexer, LogicalLine};
use crate::parser::StatementParser;
use crate::resolver::Resolver;

/// Knobs fixed for the duration of one compilation.
///
/// The non-default settings are concessions for scripts that are wrong or
/// unscientific; enable them knowingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Allow one level of nested statements. Off by default; nested
    /// statements are rejected with a `NestedRelation` warning.
    pub allow_nested: bool,
    /// Accept names without a namespace, filing them under the `dirty`
    /// namespace. Off by default.
    pub allow_naked_names: bool,
    /// `SET Citation` clears evidence and all annotations (the statement
    /// group survives). On by default.
    pub citation_clearing: bool,
    /// Reject `tloc(X)` without `fromLoc`/`toLoc`. On by default.
    pub disallow_unqualified_translocations: bool,
    /// Annotation keywords that must be set for every qualified statement.
    pub required_annotations: Vec<EcoString>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            allow_nested: false,
            allow_naked_names: false,
            citation_clearing: true,
            disallow_unqualified_translocations: true,
            required_annotations: Vec::new(),
        }
    }
}

/// A cooperative cancellation flag, checked between logical lines.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Compiles a BEL script into a graph.
///
/// # Errors
///
/// Fatal problems only — see [`CompileError`]. Everything statement-level is
/// recorded as a warning on the returned graph.
pub fn compile<I, S>(
    lines: I,
    options: CompilerOptions,
    resolver: &mut dyn Resolver,
) -> Result<BelGraph, CompileError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Compiler::new(options, resolver).compile(lines)
}

/// Parses a single statement without graph construction or namespace
/// validation. Naked-name policing still applies per the options.
///
/// # Errors
///
/// The positioned statement error, exactly as compilation would record it.
pub fn parse(statement: &str, options: &CompilerOptions) -> Result<Statement, StatementError> {
    StatementParser::new(statement.trim(), None, options).parse_statement()
}

/// The compiler state machine. Most callers want [`compile`]; construct one
/// directly to attach a [`CancellationToken`].
pub struct Compiler<'r> {
    options: CompilerOptions,
    resolver: &'r mut dyn Resolver,
    control: ControlParser,
    cancellation: Option<CancellationToken>,
}

impl<'r> Compiler<'r> {
    /// Creates a compiler over the given resolver.
    pub fn new(options: CompilerOptions, resolver: &'r mut dyn Resolver) -> Self {
        let control = ControlParser::new(options.citation_clearing);
        Self {
            options,
            resolver,
            control,
            cancellation: None,
        }
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Runs the compilation to completion.
    ///
    /// # Errors
    ///
    /// See [`CompileError`]; additionally checks that the mandatory `Name`
    /// and `Version` document metadata were set by end of input.
    pub fn compile<I, S>(mut self, lines: I) -> Result<BelGraph, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = BelGraph::new();

        for item in Lexer::new(lines.into_iter().map(Into::into)) {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                return Err(CompileError::Cancelled);
            }
            match item {
                Ok(line) => self.process_line(&line, &mut graph)?,
                Err(warning) => graph.add_warning(warning),
            }
        }

        if graph.document.name.is_none() {
            return Err(CompileError::MissingMetadata { key: "Name".into() });
        }
        if graph.document.version.is_none() {
            return Err(CompileError::MissingMetadata {
                key: "Version".into(),
            });
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            warnings = graph.warnings().len(),
            "compilation finished"
        );
        Ok(graph)
    }

    fn process_line(
        &mut self,
        line: &LogicalLine,
        graph: &mut BelGraph,
    ) -> Result<(), CompileError> {
        let text = line.text.as_str();

        if is_directive(text, "SET") {
            if second_word_is(text, "DOCUMENT") {
                self.control.handle_document(line, graph);
            } else if let Err(err) = self.control.handle_set(line) {
                graph.add_warning(err.into_warning(line.number, line.text.clone()));
            }
            return Ok(());
        }
        if is_directive(text, "UNSET") {
            if let Err(err) = self.control.handle_unset(line) {
                graph.add_warning(err.into_warning(line.number, line.text.clone()));
            }
            return Ok(());
        }
        if is_directive(text, "DEFINE") {
            return self.control.handle_define(line, self.resolver, graph);
        }

        self.process_statement(line, graph);
        Ok(())
    }

    fn process_statement(&mut self, line: &LogicalLine, graph: &mut BelGraph) {
        let mut parser =
            StatementParser::new(&line.text, Some(&self.control.definitions), &self.options);
        match parser.parse_statement() {
            Ok(statement) => {
                let notes = std::mem::take(&mut parser.notes);
                for (kind, message) in notes {
                    graph.add_warning(Warning::new(line.number, line.text.clone(), kind, message));
                }
                self.commit_statement(statement, line, graph);
            }
            Err(err) => {
                graph.add_warning(err.into_warning(line.number, line.text.clone()));
            }
        }
    }

    fn commit_statement(&mut self, statement: Statement, line: &LogicalLine, graph: &mut BelGraph) {
        match statement {
            Statement::Term(term) => {
                graph.add_entity(&term.entity);
            }
            Statement::Label { subject, label } => {
                let key = graph.add_entity(&subject.entity);
                if let Err(existing) = graph.set_label(&key, label.clone()) {
                    graph.add_warning(Warning::new(
                        line.number,
                        line.text.clone(),
                        WarningKind::Relabel,
                        format!("tried to relabel from \"{existing}\" to \"{label}\""),
                    ));
                }
            }
            Statement::List {
                subject,
                relation,
                members,
            } => {
                for member in members {
                    graph.add_unqualified_edge(&subject.entity, &member.entity, relation);
                }
            }
            Statement::Relation(relation) => self.commit_relation(relation, line, graph),
            Statement::Nested {
                subject,
                relation,
                inner,
            } => {
                self.commit_relation(
                    RelationStatement {
                        subject,
                        relation,
                        object: inner.subject.clone(),
                    },
                    line,
                    graph,
                );
                self.commit_relation(inner, line, graph);
            }
        }
    }

    fn commit_relation(
        &mut self,
        statement: RelationStatement,
        line: &LogicalLine,
        graph: &mut BelGraph,
    ) {
        if statement.relation.is_unqualified_statement() {
            graph.add_unqualified_edge(
                &statement.subject.entity,
                &statement.object.entity,
                statement.relation,
            );
            return;
        }

        let warn = |graph: &mut BelGraph, kind: WarningKind, message: String| {
            graph.add_warning(Warning::new(line.number, line.text.clone(), kind, message));
        };

        let Some(citation) = self.control.citation().cloned() else {
            warn(
                graph,
                WarningKind::MissingCitation,
                "missing citation; cannot add statement".to_owned(),
            );
            return;
        };
        let Some(evidence) = self.control.evidence().cloned() else {
            warn(
                graph,
                WarningKind::MissingEvidence,
                "missing evidence; cannot add statement".to_owned(),
            );
            return;
        };

        let missing: Vec<&str> = self
            .options
            .required_annotations
            .iter()
            .filter(|key| !self.control.annotations().contains_key(*key))
            .map(EcoString::as_str)
            .collect();
        if !missing.is_empty() {
            warn(
                graph,
                WarningKind::MissingRequiredAnnotations,
                format!("missing annotations: {}", missing.join(", ")),
            );
            return;
        }

        let data = EdgeData {
            relation: statement.relation,
            source_modifier: statement.subject.modifier.clone(),
            target_modifier: statement.object.modifier.clone(),
            citation: Some(citation),
            evidence: Some(evidence),
            annotations: self.control.annotations().clone(),
            line: Some(line.number),
        };

        if let Err(err) = graph.add_qualified_edge(
            &statement.subject.entity,
            &statement.object.entity,
            data.clone(),
        ) {
            warn(graph, err.kind(), err.to_string());
            return;
        }

        // Directionless relations are committed in both orientations; the
        // content hash is shared because two-way edges canonicalize their
        // endpoints as an unordered pair.
        if statement.relation.is_two_way() {
            let mut reverse = data;
            reverse.source_modifier = statement.object.modifier;
            reverse.target_modifier = statement.subject.modifier;
            if let Err(err) = graph.add_qualified_edge(
                &statement.object.entity,
                &statement.subject.entity,
                reverse,
            ) {
                warn(graph, err.kind(), err.to_string());
            }
        }
    }
}

fn is_directive(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn second_word_is(text: &str, word: &str) -> bool {
    text.split_whitespace().nth(1) == Some(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MemoryResolver, Validator};

    const HGNC_URL: &str = "https://example.org/hgnc.belns";

    fn resolver() -> MemoryResolver {
        MemoryResolver::new().with(
            HGNC_URL,
            Validator::plain(["AKT1", "EGFR", "MYC", "FOS", "JUN", "A", "B", "C"]),
        )
    }

    fn header() -> String {
        format!(
            "SET DOCUMENT Name = \"t\"\nSET DOCUMENT Version = \"1.0.0\"\n\
             DEFINE NAMESPACE HGNC AS URL \"{HGNC_URL}\"\n\
             SET Citation = {{\"PubMed\", \"Title\", \"12345\"}}\nSET Evidence = \"ex\"\n"
        )
    }

    fn compile_script(script: &str) -> BelGraph {
        let mut resolver = resolver();
        compile(
            script.lines().map(String::from),
            CompilerOptions::default(),
            &mut resolver,
        )
        .expect("compilation should succeed")
    }

    #[test]
    fn missing_name_is_fatal() {
        let mut resolver = MemoryResolver::new();
        let err = compile(
            ["SET DOCUMENT Version = \"1.0.0\"".to_owned()],
            CompilerOptions::default(),
            &mut resolver,
        )
        .unwrap_err();
        assert_eq!(err, CompileError::MissingMetadata { key: "Name".into() });
    }

    #[test]
    fn unresolvable_namespace_is_fatal() {
        let mut resolver = MemoryResolver::new();
        let err = compile(
            [
                "SET DOCUMENT Name = \"t\"".to_owned(),
                "SET DOCUMENT Version = \"1.0.0\"".to_owned(),
                "DEFINE NAMESPACE HGNC AS URL \"https://example.org/nope.belns\"".to_owned(),
            ],
            CompilerOptions::default(),
            &mut resolver,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::ResourceUnavailable { .. }));
    }

    #[test]
    fn redefinition_with_different_source_is_fatal() {
        let mut resolver = resolver();
        let err = compile(
            [
                "SET DOCUMENT Name = \"t\"".to_owned(),
                "SET DOCUMENT Version = \"1.0.0\"".to_owned(),
                format!("DEFINE NAMESPACE HGNC AS URL \"{HGNC_URL}\""),
                "DEFINE NAMESPACE HGNC AS PATTERN \".*\"".to_owned(),
            ],
            CompilerOptions::default(),
            &mut resolver,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::RedefinedNamespace { .. }));
    }

    #[test]
    fn statement_failures_are_recoverable() {
        let script = header() + "p(HGNC:NOT_A_GENE) -> p(HGNC:EGFR)\np(HGNC:AKT1) -> p(HGNC:EGFR)\n";
        let graph = compile_script(&script);
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::MissingNamespaceName);
        // The second statement still landed.
        assert!(graph.edges().any(|e| e.data.relation == crate::language::Relation::Increases));
    }

    #[test]
    fn cancellation_stops_compilation() {
        let token = CancellationToken::new();
        token.cancel();
        let mut resolver = resolver();
        let err = Compiler::new(CompilerOptions::default(), &mut resolver)
            .with_cancellation(token)
            .compile(["SET DOCUMENT Name = \"t\"".to_owned()])
            .unwrap_err();
        assert_eq!(err, CompileError::Cancelled);
    }

    #[test]
    fn required_annotations_are_enforced() {
        let script = header() + "p(HGNC:AKT1) -> p(HGNC:EGFR)\n";
        let mut resolver = resolver();
        let options = CompilerOptions {
            required_annotations: vec!["Species".into()],
            ..CompilerOptions::default()
        };
        let graph = compile(script.lines().map(String::from), options, &mut resolver).unwrap();
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(
            graph.warnings()[0].kind,
            WarningKind::MissingRequiredAnnotations
        );
    }

    #[test]
    fn labeled_statements_attach_labels() {
        let script = header()
            + "p(HGNC:AKT1) labeled \"AKT1 kinase\"\np(HGNC:AKT1) labeled \"something else\"\n";
        let graph = compile_script(&script);
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::Relabel);
    }

    #[test]
    fn parse_entry_point_needs_no_graph() {
        let statement = parse(
            "p(HGNC:AKT1) -> p(HGNC:EGFR)",
            &CompilerOptions::default(),
        )
        .unwrap();
        assert!(matches!(statement, Statement::Relation(_)));
    }
}
