// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Term parsing: everything that can appear as the subject or object of a
//! statement.
//!
//! An *outer* term may be wrapped in an edge-side modifier (`act`, `tloc`,
//! `sec`, `surf`, `deg`, or a BEL 1.0 activity function); the wrapped entity
//! is the actual edge endpoint and the modifier annotates it. An *entity*
//! term is the bare thing: a simple abundance, a central-dogma entity with
//! variants, a fusion, a complex/composite, or a reaction.

use ecow::EcoString;

use crate::ast::{Concept, Entity, Modifier, ParsedTerm, ParticipantModifier, Variant};
use crate::error::{StatementError, WarningKind};
use crate::language::{
    Function, activity_from_keyword, cell_surface, extracellular_space, intracellular,
};

use super::StatementParser;

fn concept_from_triple((namespace, identifier, name): (EcoString, EcoString, EcoString)) -> Concept {
    Concept {
        namespace,
        identifier: Some(identifier),
        name: Some(name),
    }
}

impl StatementParser<'_> {
    /// True when the cursor sits on `keyword(`, for any of the keywords.
    fn looking_at_call(&mut self, keywords: &[&str]) -> bool {
        let mut probe = self.cur.clone();
        let word = probe.take_word();
        keywords.contains(&word) && {
            probe.skip_ws();
            probe.peek() == Some('(')
        }
    }

    // ========================================================================
    // Outer terms (modifier-aware)
    // ========================================================================

    /// Parses a term along with any edge-side modifier wrapping it.
    pub(crate) fn parse_outer_term(&mut self) -> Result<ParsedTerm, StatementError> {
        let word = self.cur.peek_word();
        match word {
            "act" | "activity" => self.parse_activity(),
            "tloc" | "translocation" => self.parse_translocation(),
            "sec" | "cellSecretion" => self.parse_shorthand_translocation(extracellular_space()),
            "surf" | "cellSurfaceExpression" => self.parse_shorthand_translocation(cell_surface()),
            "deg" | "degradation" => self.parse_degradation(),
            _ => {
                if Function::from_keyword(word).is_some() {
                    let (entity, location) = self.parse_entity_term()?;
                    return Ok(ParsedTerm {
                        entity,
                        modifier: location.map(ParticipantModifier::at_location),
                    });
                }
                if word != "ma"
                    && word != "molecularActivity"
                    && activity_from_keyword(word).is_some()
                {
                    return self.parse_legacy_activity();
                }
                Err(self.cur.syntax(format!("unknown function '{word}'")))
            }
        }
    }

    /// `act(X)` or `act(X, ma(...))`.
    fn parse_activity(&mut self) -> Result<ParsedTerm, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let (entity, location) = self.parse_entity_term()?;
        let mut effect = None;
        if self.cur.eat(',') {
            let pos = self.cur.pos();
            let word = self.cur.take_word();
            if word != "ma" && word != "molecularActivity" {
                return Err(StatementError::syntax(pos, "expected ma(...)"));
            }
            self.cur.expect('(')?;
            effect = Some(self.parse_molecular_activity()?);
            self.cur.expect(')')?;
        }
        self.cur.expect(')')?;
        Ok(ParsedTerm {
            entity,
            modifier: Some(ParticipantModifier {
                modifier: Some(Modifier::Activity { effect }),
                location,
            }),
        })
    }

    /// The argument of `ma(...)`: a default-vocabulary label or a
    /// namespaced concept.
    fn parse_molecular_activity(&mut self) -> Result<Concept, StatementError> {
        self.cur.skip_ws();
        if self.cur.peek() == Some('"') {
            return self.parse_identifier(None);
        }
        let mut probe = self.cur.clone();
        probe.take_bare_name();
        if probe.peek() == Some(':') {
            return self.parse_identifier(None);
        }

        let pos = self.cur.pos();
        let word = self.cur.take_bare_name();
        match activity_from_keyword(word) {
            Some(label) => Ok(Concept::default_vocabulary(label)),
            None => Err(StatementError::syntax(
                pos,
                format!("unknown molecular activity '{word}'"),
            )),
        }
    }

    /// BEL 1.0 `kin(p(X))` and friends; upgraded to `act(X, ma(label))`.
    fn parse_legacy_activity(&mut self) -> Result<ParsedTerm, StatementError> {
        let pos = self.cur.pos();
        let word = self.cur.take_word();
        let Some(label) = activity_from_keyword(word) else {
            return Err(StatementError::syntax(pos, format!("unknown function '{word}'")));
        };
        self.note(
            WarningKind::LegacyActivity,
            format!("{word}(...) upgraded to act(..., ma({label}))"),
        );
        self.cur.expect('(')?;
        let (entity, location) = self.parse_entity_term()?;
        self.cur.expect(')')?;
        Ok(ParsedTerm {
            entity,
            modifier: Some(ParticipantModifier {
                modifier: Some(Modifier::Activity {
                    effect: Some(Concept::default_vocabulary(label)),
                }),
                location,
            }),
        })
    }

    /// `tloc(X, fromLoc(...), toLoc(...))`, its legacy bare-identifier form,
    /// or the unqualified `tloc(X)`.
    fn parse_translocation(&mut self) -> Result<ParsedTerm, StatementError> {
        let start = self.cur.pos();
        self.cur.take_word();
        self.cur.expect('(')?;
        let (entity, location) = self.parse_entity_term()?;

        let modifier = if self.cur.eat(',') {
            let (from_loc, to_loc) = if self.looking_at_call(&["fromLoc"]) {
                self.cur.take_word();
                self.cur.expect('(')?;
                let from_loc = self.parse_identifier(None)?;
                self.cur.expect(')')?;
                self.cur.expect(',')?;
                let pos = self.cur.pos();
                if self.cur.take_word() != "toLoc" {
                    return Err(StatementError::syntax(pos, "expected toLoc(...)"));
                }
                self.cur.expect('(')?;
                let to_loc = self.parse_identifier(None)?;
                self.cur.expect(')')?;
                (from_loc, to_loc)
            } else {
                let from_loc = self.parse_identifier(None)?;
                self.cur.expect(',')?;
                let to_loc = self.parse_identifier(None)?;
                self.note(
                    WarningKind::LegacyTranslocation,
                    "translocation without fromLoc/toLoc wrappers",
                );
                (from_loc, to_loc)
            };
            Modifier::Translocation {
                from_loc: Some(from_loc),
                to_loc: Some(to_loc),
            }
        } else {
            if self.options.disallow_unqualified_translocations {
                return Err(StatementError::new(
                    WarningKind::MalformedTranslocation,
                    start,
                    "unqualified translocation",
                ));
            }
            Modifier::Translocation {
                from_loc: None,
                to_loc: None,
            }
        };

        self.cur.expect(')')?;
        Ok(ParsedTerm {
            entity,
            modifier: Some(ParticipantModifier {
                modifier: Some(modifier),
                location,
            }),
        })
    }

    /// `sec(X)` / `surf(X)`: translocation from the intracellular region to
    /// a fixed destination.
    fn parse_shorthand_translocation(
        &mut self,
        to: (EcoString, EcoString, EcoString),
    ) -> Result<ParsedTerm, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let (entity, location) = self.parse_entity_term()?;
        self.cur.expect(')')?;
        Ok(ParsedTerm {
            entity,
            modifier: Some(ParticipantModifier {
                modifier: Some(Modifier::Translocation {
                    from_loc: Some(concept_from_triple(intracellular())),
                    to_loc: Some(concept_from_triple(to)),
                }),
                location,
            }),
        })
    }

    /// `deg(X)`.
    fn parse_degradation(&mut self) -> Result<ParsedTerm, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let (entity, location) = self.parse_entity_term()?;
        self.cur.expect(')')?;
        Ok(ParsedTerm {
            entity,
            modifier: Some(ParticipantModifier {
                modifier: Some(Modifier::Degradation),
                location,
            }),
        })
    }

    // ========================================================================
    // Entity terms
    // ========================================================================

    /// Parses a bare entity term, returning the entity and its trailing
    /// `loc(...)`, if any.
    pub(crate) fn parse_entity_term(
        &mut self,
    ) -> Result<(Entity, Option<Concept>), StatementError> {
        let pos = self.cur.pos();
        let word = self.cur.take_word();
        let Some(function) = Function::from_keyword(word) else {
            return Err(StatementError::syntax(pos, format!("unknown function '{word}'")));
        };
        match function {
            Function::Reaction => Ok((self.parse_reaction()?, None)),
            Function::Complex => self.parse_complex(),
            Function::Composite => self.parse_composite(),
            _ => self.parse_simple(function),
        }
    }

    /// A member of a complex, composite, reactant list, or product list.
    fn parse_member(&mut self) -> Result<Entity, StatementError> {
        let pos = self.cur.pos();
        let (entity, _location) = self.parse_entity_term()?;
        if matches!(entity.function(), Function::Reaction | Function::Composite) {
            return Err(StatementError::syntax(
                pos,
                format!("{}() cannot be a member", entity.function().short()),
            ));
        }
        Ok(entity)
    }

    fn parse_member_list(&mut self) -> Result<Vec<Entity>, StatementError> {
        let mut members = vec![self.parse_member()?];
        while self.cur.eat(',') {
            members.push(self.parse_member()?);
        }
        Ok(members)
    }

    /// `rxn(reactants(...), products(...))`.
    fn parse_reaction(&mut self) -> Result<Entity, StatementError> {
        self.cur.expect('(')?;
        let pos = self.cur.pos();
        if self.cur.take_word() != "reactants" {
            return Err(StatementError::syntax(pos, "expected reactants(...)"));
        }
        self.cur.expect('(')?;
        let reactants = self.parse_member_list()?;
        self.cur.expect(')')?;
        self.cur.expect(',')?;
        let pos = self.cur.pos();
        if self.cur.take_word() != "products" {
            return Err(StatementError::syntax(pos, "expected products(...)"));
        }
        self.cur.expect('(')?;
        let products = self.parse_member_list()?;
        self.cur.expect(')')?;
        self.cur.expect(')')?;
        Ok(Entity::reaction(reactants, products))
    }

    /// `complex(ns:name)`, `complex(member, ...)`, or a named complex with
    /// members.
    fn parse_complex(&mut self) -> Result<(Entity, Option<Concept>), StatementError> {
        self.cur.expect('(')?;
        self.cur.skip_ws();
        let body_pos = self.cur.pos();

        if self.cur.peek() == Some(')') {
            return Err(StatementError::new(
                WarningKind::InvalidFunctionSemantic,
                body_pos,
                "complex() requires a name or members",
            ));
        }

        let mut concept = None;
        let mut members = Vec::new();
        let mut location = None;

        if self.looking_at_term() {
            members.push(self.parse_member()?);
        } else {
            concept = Some(self.parse_identifier(Some(Function::Complex))?);
        }

        while self.cur.eat(',') {
            if self.looking_at_call(&["loc"]) {
                location = Some(self.parse_location()?);
                break;
            }
            members.push(self.parse_member()?);
        }
        self.cur.expect(')')?;

        let entity = match (concept, members.is_empty()) {
            (Some(concept), true) => Entity::Abundance {
                function: Function::Complex,
                concept,
            },
            (Some(concept), false) => Entity::named_complex(concept, members),
            (None, _) => Entity::complex(members),
        };
        Ok((entity, location))
    }

    /// `composite(member, ...)`.
    fn parse_composite(&mut self) -> Result<(Entity, Option<Concept>), StatementError> {
        self.cur.expect('(')?;
        let mut members = vec![self.parse_member()?];
        let mut location = None;
        while self.cur.eat(',') {
            if self.looking_at_call(&["loc"]) {
                location = Some(self.parse_location()?);
                break;
            }
            members.push(self.parse_member()?);
        }
        self.cur.expect(')')?;
        Ok((Entity::composite(members), location))
    }

    /// A simple or central-dogma term: identifier, then optional fusion /
    /// variants / location.
    fn parse_simple(
        &mut self,
        function: Function,
    ) -> Result<(Entity, Option<Concept>), StatementError> {
        self.cur.expect('(')?;

        if function.fusion_reference().is_some() && self.looking_at_call(&["fus", "fusion"]) {
            let entity = self.parse_fusion(function)?;
            let location = if self.cur.eat(',') {
                if !self.looking_at_call(&["loc"]) {
                    return Err(self.cur.syntax("expected loc(...)"));
                }
                Some(self.parse_location()?)
            } else {
                None
            };
            self.cur.expect(')')?;
            return Ok((entity, location));
        }

        let concept = self.parse_identifier(Some(function))?;
        let mut fusion = None;
        let mut variants: Vec<Variant> = Vec::new();
        let mut location = None;

        while self.cur.eat(',') {
            if self.looking_at_call(&["loc"]) {
                if !Self::location_allowed(function) {
                    return Err(self
                        .cur
                        .syntax(format!("loc() is not allowed in {}()", function.short())));
                }
                location = Some(self.parse_location()?);
                break;
            }
            if fusion.is_some() {
                return Err(self.cur.syntax("only loc() may follow a fusion"));
            }
            if self.looking_at_call(&["fus", "fusion"]) {
                if variants.is_empty() && function.fusion_reference().is_some() {
                    fusion = Some(self.parse_legacy_fusion(function, concept.clone())?);
                    continue;
                }
                return Err(self.cur.syntax("unexpected fus(...)"));
            }
            if !function.is_central_dogma() {
                return Err(self
                    .cur
                    .syntax(format!("variants are not allowed in {}()", function.short())));
            }
            variants.push(self.parse_variant(function)?);
        }
        self.cur.expect(')')?;

        let entity = match fusion {
            Some(fusion) => fusion,
            None if variants.is_empty() => Entity::simple(function, concept),
            None => Entity::central_dogma(function, concept, variants),
        };
        Ok((entity, location))
    }

    const fn location_allowed(function: Function) -> bool {
        !matches!(function, Function::BiologicalProcess | Function::Pathology)
    }

    /// True when the cursor sits on a term (`function(`), as opposed to an
    /// identifier.
    fn looking_at_term(&mut self) -> bool {
        let mut probe = self.cur.clone();
        let word = probe.take_word();
        Function::from_keyword(word).is_some() && {
            probe.skip_ws();
            probe.peek() == Some('(')
        }
    }

    /// `loc(ns:name)`; the keyword has not been consumed yet.
    pub(crate) fn parse_location(&mut self) -> Result<Concept, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let concept = self.parse_identifier(None)?;
        self.cur.expect(')')?;
        Ok(concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerOptions;

    fn lenient() -> CompilerOptions {
        CompilerOptions {
            allow_naked_names: true,
            ..CompilerOptions::default()
        }
    }

    fn parse_term(line: &str) -> ParsedTerm {
        let options = lenient();
        let mut parser = StatementParser::new(line, None, &options);
        let term = parser.parse_outer_term().expect("term should parse");
        parser.cur.skip_ws();
        assert!(parser.cur.at_end(), "trailing input after term");
        term
    }

    fn parse_err(line: &str) -> StatementError {
        let options = lenient();
        let mut parser = StatementParser::new(line, None, &options);
        match parser.parse_statement() {
            Err(err) => err,
            Ok(statement) => panic!("expected failure, parsed {statement:?}"),
        }
    }

    #[test]
    fn quoted_names() {
        let term = parse_term("a(CHEBI:\"nitric oxide\")");
        assert_eq!(term.entity.to_bel(), "a(CHEBI:\"nitric oxide\")");
    }

    #[test]
    fn long_function_names() {
        let term = parse_term("proteinAbundance(HGNC:AKT1)");
        assert_eq!(term.entity.to_bel(), "p(HGNC:AKT1)");
    }

    #[test]
    fn complex_with_members() {
        let term = parse_term("complex(p(HGNC:FOS), p(HGNC:JUN))");
        assert_eq!(term.entity.to_bel(), "complex(p(HGNC:FOS), p(HGNC:JUN))");
    }

    #[test]
    fn named_complex() {
        let term = parse_term("complex(SCOMP:\"AP-1 Complex\")");
        assert_eq!(term.entity.function(), Function::Complex);
        assert!(term.entity.concept().is_some());
    }

    #[test]
    fn empty_complex_is_semantic_error() {
        let err = parse_err("complex()");
        assert_eq!(err.kind, WarningKind::InvalidFunctionSemantic);
    }

    #[test]
    fn reaction_round_trip() {
        let term = parse_term("rxn(reactants(a(CHEBI:superoxide)), products(a(CHEBI:\"hydrogen peroxide\"), a(CHEBI:oxygen)))");
        assert_eq!(
            term.entity.to_bel(),
            "rxn(reactants(a(CHEBI:superoxide)), products(a(CHEBI:\"hydrogen peroxide\"), a(CHEBI:oxygen)))"
        );
    }

    #[test]
    fn activity_with_default_label() {
        let term = parse_term("act(p(HGNC:AKT1), ma(kin))");
        let modifier = term.modifier.unwrap();
        let Some(Modifier::Activity { effect: Some(effect) }) = modifier.modifier else {
            panic!("expected an activity with an effect");
        };
        assert_eq!(effect.namespace, "bel");
        assert_eq!(effect.label(), "kin");
    }

    #[test]
    fn legacy_activity_upgrades() {
        let options = lenient();
        let mut parser = StatementParser::new("kin(p(HGNC:AKT1))", None, &options);
        let term = parser.parse_outer_term().unwrap();
        let Some(Modifier::Activity { effect: Some(effect) }) =
            term.modifier.unwrap().modifier
        else {
            panic!("expected an activity");
        };
        assert_eq!(effect.label(), "kin");
        assert!(parser
            .notes
            .iter()
            .any(|(kind, _)| *kind == WarningKind::LegacyActivity));
    }

    #[test]
    fn translocation_with_locations() {
        let term = parse_term("tloc(p(HGNC:EGFR), fromLoc(GO:\"cell surface\"), toLoc(GO:endosome))");
        let Some(Modifier::Translocation { from_loc, to_loc }) = term.modifier.unwrap().modifier
        else {
            panic!("expected a translocation");
        };
        assert_eq!(from_loc.unwrap().label(), "cell surface");
        assert_eq!(to_loc.unwrap().label(), "endosome");
    }

    #[test]
    fn legacy_translocation_upgrades() {
        let options = lenient();
        let mut parser = StatementParser::new(
            "tloc(p(HGNC:EGFR), GO:\"cell surface\", GO:endosome)",
            None,
            &options,
        );
        let term = parser.parse_outer_term().unwrap();
        assert!(matches!(
            term.modifier.unwrap().modifier,
            Some(Modifier::Translocation { .. })
        ));
        assert!(parser
            .notes
            .iter()
            .any(|(kind, _)| *kind == WarningKind::LegacyTranslocation));
    }

    #[test]
    fn unqualified_translocation_is_rejected_by_default() {
        let err = parse_err("tloc(p(HGNC:EGFR)) -> bp(GO:x)");
        assert_eq!(err.kind, WarningKind::MalformedTranslocation);
    }

    #[test]
    fn secretion_fixes_locations() {
        let term = parse_term("sec(p(HGNC:IL6))");
        let Some(Modifier::Translocation { from_loc, to_loc }) = term.modifier.unwrap().modifier
        else {
            panic!("expected a translocation");
        };
        assert_eq!(from_loc.unwrap().identifier.as_deref(), Some("GO:0005622"));
        assert_eq!(to_loc.unwrap().label(), "extracellular space");
    }

    #[test]
    fn surface_expression_fixes_locations() {
        let term = parse_term("surf(p(HGNC:EGFR))");
        let Some(Modifier::Translocation { to_loc, .. }) = term.modifier.unwrap().modifier else {
            panic!("expected a translocation");
        };
        assert_eq!(to_loc.unwrap().label(), "cell surface");
    }

    #[test]
    fn degradation() {
        let term = parse_term("deg(r(HGNC:MYC))");
        assert!(matches!(
            term.modifier.unwrap().modifier,
            Some(Modifier::Degradation)
        ));
        assert_eq!(term.entity.to_bel(), "r(HGNC:MYC)");
    }

    #[test]
    fn location_attaches_to_participant_not_entity() {
        let term = parse_term("p(HGNC:EGFR, loc(GO:endosome))");
        assert_eq!(term.entity.to_bel(), "p(HGNC:EGFR)");
        assert_eq!(term.modifier.unwrap().location.unwrap().label(), "endosome");
    }

    #[test]
    fn location_is_rejected_in_processes() {
        let err = parse_err("bp(GO:apoptosis, loc(GO:cytoplasm))");
        assert_eq!(err.kind, WarningKind::BelSyntax);
    }

    #[test]
    fn variants_are_rejected_outside_central_dogma() {
        let err = parse_err("a(CHEBI:water, pmod(Ph))");
        assert_eq!(err.kind, WarningKind::BelSyntax);
    }
}
