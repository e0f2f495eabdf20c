// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser for BEL statements.
//!
//! A statement is one logical line that is not a `SET`/`UNSET`/`DEFINE`
//! directive: either a lone term, a `subject relation object` triple, a
//! nested statement (one level, off by default), a `hasMembers`/
//! `hasComponents` list distribution, or a `labeled` attachment.
//!
//! # Design
//!
//! - **Lookahead of one token.** The grammar is unambiguous given the next
//!   keyword; no backtracking is needed beyond [`Cursor::peek_word`].
//! - **Failures are values.** Every error is a positioned
//!   [`StatementError`]; the compiler records it as a warning and resumes
//!   with the next logical line. Nothing is committed for a failing
//!   statement.
//! - **Legacy forms are upgraded in place.** BEL 1.0 spellings parse into
//!   their BEL 2.0 equivalents; each upgrade is recorded as a note and
//!   surfaced as a debug-severity warning.
//!
//! Identifier validation runs against the [`Definitions`] collected by the
//! control parser; with no definitions available (the standalone
//! [`crate::compiler::parse`] entry point), validation is skipped but naked
//! names are still policed.

mod cursor;
mod terms;
mod variants;

use ecow::EcoString;

use crate::ast::{Concept, ParsedTerm, RelationStatement, Statement};
use crate::compiler::CompilerOptions;
use crate::control::Definitions;
use crate::error::{StatementError, WarningKind};
use crate::language::{DIRTY_NAMESPACE, Function, Relation};
use crate::resolver::NameCheck;
pub(crate) use cursor::Cursor;

/// Parser for one BEL statement line.
pub(crate) struct StatementParser<'a> {
    pub(crate) cur: Cursor<'a>,
    definitions: Option<&'a Definitions>,
    options: &'a CompilerOptions,
    /// Legacy-upgrade notes accumulated while parsing; surfaced as
    /// debug-severity warnings by the compiler.
    pub(crate) notes: Vec<(WarningKind, EcoString)>,
}

impl<'a> StatementParser<'a> {
    pub(crate) fn new(
        line: &'a str,
        definitions: Option<&'a Definitions>,
        options: &'a CompilerOptions,
    ) -> Self {
        Self {
            cur: Cursor::new(line),
            definitions,
            options,
            notes: Vec::new(),
        }
    }

    pub(crate) fn note(&mut self, kind: WarningKind, message: impl Into<EcoString>) {
        let message = message.into();
        tracing::debug!(kind = ?kind, %message, "legacy form upgraded");
        self.notes.push((kind, message));
    }

    /// Parses the whole line as a statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, StatementError> {
        let subject = self.parse_outer_term()?;
        self.cur.skip_ws();
        if self.cur.at_end() {
            return Ok(Statement::Term(subject));
        }

        let relation_pos = self.cur.pos();
        let token = self.cur.take_until_ws();
        match token {
            "labeled" => {
                let label = self.cur.take_quoted()?;
                self.expect_line_end()?;
                return Ok(Statement::Label { subject, label });
            }
            "hasMembers" => return self.parse_list_statement(subject, Relation::HasMember),
            "hasComponents" => return self.parse_list_statement(subject, Relation::HasComponent),
            _ => {}
        }

        let relation = Relation::from_keyword(token).ok_or_else(|| {
            StatementError::syntax(relation_pos, format!("unknown relation '{token}'"))
        })?;

        self.cur.skip_ws();
        if self.cur.peek() == Some('(') {
            return self.parse_nested(subject, relation);
        }

        let object = self.parse_outer_term()?;
        self.expect_line_end()?;
        let statement = RelationStatement {
            subject,
            relation,
            object,
        };
        self.check_relation_operands(&statement, relation_pos)?;
        Ok(Statement::Relation(statement))
    }

    /// `subject hasMembers|hasComponents list(term, ...)`.
    fn parse_list_statement(
        &mut self,
        subject: ParsedTerm,
        relation: Relation,
    ) -> Result<Statement, StatementError> {
        let pos = self.cur.pos();
        let word = self.cur.take_word();
        if word != "list" {
            return Err(StatementError::syntax(pos, "expected list(...)"));
        }
        self.cur.expect('(')?;
        let mut members = Vec::new();
        loop {
            let (entity, location) = self.parse_entity_term()?;
            members.push(ParsedTerm {
                entity,
                modifier: location.map(crate::ast::ParticipantModifier::at_location),
            });
            if !self.cur.eat(',') {
                break;
            }
        }
        self.cur.expect(')')?;
        self.expect_line_end()?;
        Ok(Statement::List {
            subject,
            relation,
            members,
        })
    }

    /// `subject relation (inner_subject inner_relation inner_object)`.
    fn parse_nested(
        &mut self,
        subject: ParsedTerm,
        relation: Relation,
    ) -> Result<Statement, StatementError> {
        if !self.options.allow_nested {
            return Err(StatementError::new(
                WarningKind::NestedRelation,
                self.cur.pos(),
                "nested statements are not enabled; split this statement",
            ));
        }
        self.cur.expect('(')?;
        let inner_subject = self.parse_outer_term()?;
        let inner_pos = self.cur.pos();
        let token = self.cur.take_until_ws();
        let inner_relation = Relation::from_keyword(token).ok_or_else(|| {
            StatementError::syntax(inner_pos, format!("unknown relation '{token}'"))
        })?;
        let inner_object = self.parse_outer_term()?;
        self.cur.expect(')')?;
        self.expect_line_end()?;
        Ok(Statement::Nested {
            subject,
            relation,
            inner: RelationStatement {
                subject: inner_subject,
                relation: inner_relation,
                object: inner_object,
            },
        })
    }

    /// Relation-specific operand checks.
    fn check_relation_operands(
        &self,
        statement: &RelationStatement,
        relation_pos: usize,
    ) -> Result<(), StatementError> {
        let subject_function = statement.subject.entity.function();
        let object_function = statement.object.entity.function();
        let fail = |message: String| Err(StatementError::syntax(relation_pos, message));

        match statement.relation {
            Relation::TranscribedTo => {
                if subject_function != Function::Gene || object_function != Function::Rna {
                    return fail("transcribedTo connects a g() to an r()".to_owned());
                }
            }
            Relation::TranslatedTo => {
                if subject_function != Function::Rna || object_function != Function::Protein {
                    return fail("translatedTo connects an r() to a p()".to_owned());
                }
            }
            Relation::HasComponent => {
                if !matches!(subject_function, Function::Complex | Function::Composite) {
                    return fail("hasComponent requires a complex() or composite() subject".into());
                }
            }
            Relation::HasReactant | Relation::HasProduct => {
                if subject_function != Function::Reaction {
                    return fail(format!(
                        "{} requires a rxn() subject",
                        statement.relation.as_str()
                    ));
                }
            }
            _ => {}
        }

        if statement.relation.is_unqualified_statement()
            && (statement.subject.modifier.is_some() || statement.object.modifier.is_some())
        {
            return fail(format!(
                "modifiers are not allowed on {} statements",
                statement.relation.as_str()
            ));
        }

        Ok(())
    }

    fn expect_line_end(&mut self) -> Result<(), StatementError> {
        self.cur.skip_ws();
        if self.cur.at_end() {
            Ok(())
        } else {
            Err(self.cur.syntax("unexpected trailing input"))
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// Parses `namespace:name`, `namespace:"name"`, or a naked name, and
    /// validates it.
    ///
    /// `function` is the context checked against namespace encodings; pass
    /// `None` where no function semantics apply (locations, activity names,
    /// fusion partners).
    pub(crate) fn parse_identifier(
        &mut self,
        function: Option<Function>,
    ) -> Result<Concept, StatementError> {
        self.cur.skip_ws();
        let start = self.cur.pos();

        if self.cur.peek() == Some('"') {
            let name = self.cur.take_quoted()?;
            return self.naked_concept(name, start);
        }

        let word = self.cur.take_bare_name();
        if word.is_empty() {
            return Err(self.cur.syntax("expected an identifier"));
        }

        if self.cur.eat(':') {
            let name = self.cur.take_name()?;
            self.validate_concept(word, &name, function, start)?;
            return Ok(Concept::new(word, name));
        }

        self.naked_concept(word.into(), start)
    }

    fn naked_concept(
        &mut self,
        name: EcoString,
        position: usize,
    ) -> Result<Concept, StatementError> {
        if self.options.allow_naked_names {
            tracing::debug!(%name, "naked name accepted in lenient mode");
            return Ok(Concept::new(DIRTY_NAMESPACE, name));
        }
        Err(StatementError::new(
            WarningKind::NakedName,
            position,
            format!("\"{name}\" should be qualified with a valid namespace"),
        ))
    }

    fn validate_concept(
        &self,
        namespace: &str,
        name: &str,
        function: Option<Function>,
        position: usize,
    ) -> Result<(), StatementError> {
        let Some(definitions) = self.definitions else {
            return Ok(());
        };
        // With no namespaces declared at all, identifier validation is off.
        if !definitions.has_namespaces() {
            return Ok(());
        }
        let Some(validator) = definitions.namespace_validator(namespace) else {
            return Err(StatementError::new(
                WarningKind::UndefinedNamespace,
                position,
                format!("\"{namespace}\" is not a defined namespace"),
            ));
        };
        match validator.check(name, function) {
            NameCheck::Valid => Ok(()),
            NameCheck::MissingName => Err(StatementError::new(
                WarningKind::MissingNamespaceName,
                position,
                format!("\"{name}\" is not in the {namespace} namespace"),
            )),
            NameCheck::PatternMismatch => Err(StatementError::new(
                WarningKind::MissingNamespaceRegex,
                position,
                format!("\"{name}\" does not match the regex for the {namespace} namespace"),
            )),
            NameCheck::InvalidFunction(allowed) => {
                let allowed: Vec<&str> = allowed.iter().map(|f| f.short()).collect();
                Err(StatementError::new(
                    WarningKind::InvalidFunctionSemantic,
                    position,
                    format!(
                        "{} {namespace}:{name} should be encoded as one of: {}",
                        function.map_or("?", Function::short),
                        allowed.join(", ")
                    ),
                ))
            }
        }
    }
}
