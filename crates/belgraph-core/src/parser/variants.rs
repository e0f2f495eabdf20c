// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Variant and fusion parsing.
//!
//! Variants appear inside central-dogma terms after the identifier:
//! `pmod(...)`, `gmod(...)`, `var(...)`, `frag(...)`, plus the BEL 1.0
//! `sub(...)` and `trunc(...)` forms, which are upgraded to HGVS strings on
//! the way in. Which kinds are legal depends on the enclosing function —
//! `pmod` only in proteins, `gmod` only in genes, RNA takes `var` only.
//!
//! Fusions come in the BEL 2.0 form `fus(A, "r.1_79", B, "r.312_5034")` and
//! the BEL 1.0 form `p(A, fus(B, 1875, 2626))`, which is upgraded with
//! half-open ranges on each side of the breakpoint.

use ecow::EcoString;

use crate::ast::{Concept, Entity, FragmentRange, FusionCoord, FusionRange, Variant};
use crate::error::{StatementError, WarningKind};
use crate::language::{
    Function, amino_acid_from_single, amino_acid_from_triple, gmod_from_keyword, is_dna_nucleotide,
    pmod_from_keyword, pmod_from_legacy,
};

use super::StatementParser;

impl StatementParser<'_> {
    /// Parses one variant inside a term of the given function. The keyword
    /// has not been consumed yet.
    pub(crate) fn parse_variant(&mut self, function: Function) -> Result<Variant, StatementError> {
        let pos = self.cur.pos();
        let word = self.cur.peek_word();
        let allowed = match word {
            "pmod" | "proteinModification" => function == Function::Protein,
            "gmod" | "geneModification" => function == Function::Gene,
            "frag" | "fragment" => function == Function::Protein,
            "sub" | "substitution" => {
                matches!(function, Function::Protein | Function::Gene)
            }
            "trunc" | "truncation" => function == Function::Protein,
            "var" | "variant" => true,
            _ => {
                return Err(StatementError::syntax(
                    pos,
                    format!("unknown variant '{word}'"),
                ));
            }
        };
        if !allowed {
            return Err(StatementError::syntax(
                pos,
                format!("{word}() is not valid in {}()", function.short()),
            ));
        }

        match word {
            "pmod" | "proteinModification" => self.parse_pmod(),
            "gmod" | "geneModification" => self.parse_gmod(),
            "frag" | "fragment" => self.parse_fragment(),
            "sub" | "substitution" if function == Function::Protein => {
                self.parse_protein_substitution()
            }
            "sub" | "substitution" => self.parse_gene_substitution(),
            "trunc" | "truncation" => self.parse_truncation(),
            _ => self.parse_hgvs(),
        }
    }

    /// `var("HGVS_string")`.
    fn parse_hgvs(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let variant = self.cur.take_name()?;
        self.cur.expect(')')?;
        Ok(Variant::Hgvs { variant })
    }

    /// `pmod(Ph)`, `pmod(Ph, Ser, 473)`, `pmod(GO:"...", Thr, 308)`.
    fn parse_pmod(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let concept = self.parse_modification_concept(|word| {
            if let Some(canonical) = pmod_from_keyword(word) {
                return Some((canonical, false));
            }
            pmod_from_legacy(word).map(|canonical| (canonical, true))
        })?;

        let mut code = None;
        let mut position = None;
        if self.cur.eat(',') {
            code = Some(self.parse_amino_acid()?.into());
            if self.cur.eat(',') {
                position = Some(self.cur.take_integer()?);
            }
        }
        self.cur.expect(')')?;
        Ok(Variant::ProteinModification {
            concept,
            code,
            position,
        })
    }

    /// `gmod(Me)` or `gmod(GO:"DNA methylation")`.
    fn parse_gmod(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let concept =
            self.parse_modification_concept(|word| gmod_from_keyword(word).map(|c| (c, false)))?;
        self.cur.expect(')')?;
        Ok(Variant::GeneModification { concept })
    }

    /// A modification name: a default-vocabulary keyword (possibly legacy)
    /// or a namespaced concept.
    fn parse_modification_concept(
        &mut self,
        lookup: impl Fn(&str) -> Option<(&'static str, bool)>,
    ) -> Result<Concept, StatementError> {
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
        match lookup(word) {
            Some((canonical, legacy)) => {
                if legacy {
                    self.note(
                        WarningKind::LegacyProteinModification,
                        format!("single-letter modification '{word}' upgraded to {canonical}"),
                    );
                }
                Ok(Concept::default_vocabulary(canonical))
            }
            None => Err(StatementError::syntax(
                pos,
                format!("unknown modification '{word}'"),
            )),
        }
    }

    /// A three-letter amino-acid code, or a legacy single-letter code.
    fn parse_amino_acid(&mut self) -> Result<&'static str, StatementError> {
        self.cur.skip_ws();
        let pos = self.cur.pos();
        let word = self.cur.take_bare_name();
        if word == "X" {
            return Err(StatementError::new(
                WarningKind::PlaceholderAminoAcid,
                pos,
                "placeholder amino acid found: X",
            ));
        }
        if let Some(code) = amino_acid_from_triple(word) {
            return Ok(code);
        }
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(code) = amino_acid_from_single(c)
        {
            self.note(
                WarningKind::LegacyAminoAcid,
                format!("single-letter amino acid '{c}' widened to {code}"),
            );
            return Ok(code);
        }
        Err(StatementError::syntax(
            pos,
            format!("'{word}' is not an amino-acid code"),
        ))
    }

    /// `frag("5_20")`, `frag("?")`, `frag("672_713", "APP-CTF")`. The range
    /// may also appear unquoted.
    fn parse_fragment(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        self.cur.skip_ws();
        let pos = self.cur.pos();
        let text = if self.cur.peek() == Some('"') {
            self.cur.take_quoted()?
        } else {
            let mut raw = String::new();
            while let Some(c) = self.cur.peek() {
                if c.is_ascii_digit() || matches!(c, '?' | '*' | '_') {
                    raw.push(c);
                    self.cur.bump();
                } else {
                    break;
                }
            }
            raw.into()
        };
        let range = Self::parse_fragment_range(&text, pos)?;

        let description = if self.cur.eat(',') {
            Some(self.cur.take_name()?)
        } else {
            None
        };
        self.cur.expect(')')?;
        Ok(Variant::Fragment { range, description })
    }

    fn parse_fragment_range(text: &str, pos: usize) -> Result<FragmentRange, StatementError> {
        if text == "?" {
            return Ok(FragmentRange::Missing);
        }
        let invalid =
            || StatementError::syntax(pos, format!("'{text}' is not a valid fragment range"));
        let (start, stop) = text.split_once('_').ok_or_else(invalid)?;
        let start_ok = start == "?" || start.bytes().all(|b| b.is_ascii_digit()) && !start.is_empty();
        let stop_ok = stop == "?"
            || stop == "*"
            || stop.bytes().all(|b| b.is_ascii_digit()) && !stop.is_empty();
        if !start_ok || !stop_ok {
            return Err(invalid());
        }
        Ok(FragmentRange::Known {
            start: start.into(),
            stop: stop.into(),
        })
    }

    /// BEL 1.0 `sub(Ala, 127, Tyr)` in a protein → `var("p.Ala127Tyr")`.
    fn parse_protein_substitution(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let reference = self.parse_amino_acid()?;
        self.cur.expect(',')?;
        let position = self.cur.take_integer()?;
        self.cur.expect(',')?;
        let variant = self.parse_amino_acid()?;
        self.cur.expect(')')?;
        let upgraded = format!("p.{reference}{position}{variant}");
        self.note(
            WarningKind::LegacyProteinSubstitution,
            format!("sub() in p() upgraded to {upgraded}"),
        );
        Ok(Variant::hgvs(upgraded))
    }

    /// BEL 1.0 `sub(G, 275, T)` in a gene → `var("c.275G>T")`.
    fn parse_gene_substitution(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let reference = self.parse_nucleotide()?;
        self.cur.expect(',')?;
        let position = self.cur.take_integer()?;
        self.cur.expect(',')?;
        let variant = self.parse_nucleotide()?;
        self.cur.expect(')')?;
        let upgraded = format!("c.{position}{reference}>{variant}");
        self.note(
            WarningKind::LegacyGeneSubstitution,
            format!("sub() in g() upgraded to {upgraded}"),
        );
        Ok(Variant::hgvs(upgraded))
    }

    fn parse_nucleotide(&mut self) -> Result<char, StatementError> {
        self.cur.skip_ws();
        let pos = self.cur.pos();
        let word = self.cur.take_bare_name();
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if is_dna_nucleotide(c) => Ok(c),
            _ => Err(StatementError::syntax(
                pos,
                format!("'{word}' is not a nucleotide"),
            )),
        }
    }

    /// BEL 1.0 `trunc(40)` → `var("p.40*")`.
    ///
    /// TODO: proper HGVS needs the reference amino acid at the position;
    /// recover it from a sequence database once grounding is wired up.
    fn parse_truncation(&mut self) -> Result<Variant, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let position = self.cur.take_integer()?;
        self.cur.expect(')')?;
        let upgraded = format!("p.{position}*");
        self.note(
            WarningKind::LegacyTruncation,
            format!("trunc() upgraded to {upgraded}"),
        );
        Ok(Variant::hgvs(upgraded))
    }

    // ========================================================================
    // Fusions
    // ========================================================================

    /// BEL 2.0 `fus(HGNC:TMPRSS2, "r.1_79", HGNC:ERG, "r.312_5034")`.
    pub(crate) fn parse_fusion(&mut self, function: Function) -> Result<Entity, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let partner_5p = self.parse_identifier(None)?;
        self.cur.expect(',')?;
        let range_5p = self.parse_fusion_range()?;
        self.cur.expect(',')?;
        let partner_3p = self.parse_identifier(None)?;
        self.cur.expect(',')?;
        let range_3p = self.parse_fusion_range()?;
        self.cur.expect(')')?;
        Ok(Entity::Fusion {
            function,
            partner_5p,
            range_5p,
            partner_3p,
            range_3p,
        })
    }

    /// BEL 1.0 `p(HGNC:BCR, fus(HGNC:JAK2, 1875, 2626))`: the enclosing
    /// term's identifier is the 5′ partner and the breakpoint coordinates
    /// become half-open ranges.
    pub(crate) fn parse_legacy_fusion(
        &mut self,
        function: Function,
        partner_5p: Concept,
    ) -> Result<Entity, StatementError> {
        self.cur.take_word();
        self.cur.expect('(')?;
        let partner_3p = self.parse_identifier(None)?;
        let reference: EcoString = function
            .fusion_reference()
            .unwrap_or_default()
            .into();

        let (range_5p, range_3p) = if self.cur.eat(',') {
            let stop_5p = self.parse_fusion_coord()?;
            self.cur.expect(',')?;
            let start_3p = self.parse_fusion_coord()?;
            (
                FusionRange::Enumerated {
                    reference: reference.clone(),
                    start: FusionCoord::Unknown,
                    stop: stop_5p,
                },
                FusionRange::Enumerated {
                    reference,
                    start: start_3p,
                    stop: FusionCoord::Unknown,
                },
            )
        } else {
            (FusionRange::Missing, FusionRange::Missing)
        };
        self.cur.expect(')')?;
        self.note(
            WarningKind::LegacyFusion,
            "BEL 1.0 fusion upgraded to the ranged fus() form",
        );
        Ok(Entity::Fusion {
            function,
            partner_5p,
            range_5p,
            partner_3p,
            range_3p,
        })
    }

    fn parse_fusion_coord(&mut self) -> Result<FusionCoord, StatementError> {
        self.cur.skip_ws();
        if self.cur.peek() == Some('?') {
            self.cur.bump();
            return Ok(FusionCoord::Unknown);
        }
        Ok(FusionCoord::Position(self.cur.take_integer()?))
    }

    /// A quoted `"r.1_79"` or `"?"` range (bare `?` is tolerated).
    fn parse_fusion_range(&mut self) -> Result<FusionRange, StatementError> {
        self.cur.skip_ws();
        let pos = self.cur.pos();
        if self.cur.peek() == Some('?') {
            self.cur.bump();
            return Ok(FusionRange::Missing);
        }
        let text = self.cur.take_quoted()?;
        Self::parse_fusion_range_text(&text, pos)
    }

    fn parse_fusion_range_text(text: &str, pos: usize) -> Result<FusionRange, StatementError> {
        if text == "?" {
            return Ok(FusionRange::Missing);
        }
        let invalid =
            || StatementError::syntax(pos, format!("'{text}' is not a valid fusion range"));
        let (reference, coords) = text.split_once('.').ok_or_else(invalid)?;
        if !matches!(reference, "c" | "r" | "p") {
            return Err(invalid());
        }
        let (start, stop) = coords.split_once('_').ok_or_else(invalid)?;
        let parse_coord = |coord: &str| -> Result<FusionCoord, StatementError> {
            if coord == "?" {
                Ok(FusionCoord::Unknown)
            } else {
                coord
                    .parse()
                    .map(FusionCoord::Position)
                    .map_err(|_| invalid())
            }
        };
        Ok(FusionRange::Enumerated {
            reference: reference.into(),
            start: parse_coord(start)?,
            stop: parse_coord(stop)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerOptions;
    use crate::parser::StatementParser;

    fn lenient() -> CompilerOptions {
        CompilerOptions {
            allow_naked_names: true,
            ..CompilerOptions::default()
        }
    }

    fn parse_entity(line: &str) -> (Entity, Vec<WarningKind>) {
        let options = lenient();
        let mut parser = StatementParser::new(line, None, &options);
        let (entity, _) = parser.parse_entity_term().expect("term should parse");
        let kinds = parser.notes.iter().map(|(kind, _)| *kind).collect();
        (entity, kinds)
    }

    fn parse_entity_err(line: &str) -> StatementError {
        let options = lenient();
        let mut parser = StatementParser::new(line, None, &options);
        parser.parse_entity_term().expect_err("term should fail")
    }

    #[test]
    fn pmod_with_code_and_position() {
        let (entity, notes) = parse_entity("p(HGNC:AKT1, pmod(Ph, Ser, 473))");
        assert_eq!(entity.to_bel(), "p(HGNC:AKT1, pmod(Ph, Ser, 473))");
        assert!(notes.is_empty());
    }

    #[test]
    fn pmod_long_synonym_normalizes() {
        let (entity, _) = parse_entity("p(HGNC:AKT1, pmod(phosphorylation, Thr, 308))");
        assert_eq!(entity.to_bel(), "p(HGNC:AKT1, pmod(Ph, Thr, 308))");
    }

    #[test]
    fn pmod_legacy_label_and_amino_acid() {
        let (entity, notes) = parse_entity("p(HGNC:AKT1, pmod(P, S, 473))");
        assert_eq!(entity.to_bel(), "p(HGNC:AKT1, pmod(Ph, Ser, 473))");
        assert!(notes.contains(&WarningKind::LegacyProteinModification));
        assert!(notes.contains(&WarningKind::LegacyAminoAcid));
    }

    #[test]
    fn pmod_namespaced() {
        let (entity, _) = parse_entity("p(HGNC:MAPK1, pmod(GO:\"protein phosphorylation\", Thr, 202))");
        assert_eq!(
            entity.to_bel(),
            "p(HGNC:MAPK1, pmod(GO:\"protein phosphorylation\", Thr, 202))"
        );
    }

    #[test]
    fn placeholder_amino_acid_is_rejected() {
        let err = parse_entity_err("p(HGNC:AKT1, pmod(Ph, X, 40))");
        assert_eq!(err.kind, WarningKind::PlaceholderAminoAcid);
    }

    #[test]
    fn multiple_variants_sort_canonically() {
        let (entity, _) = parse_entity("p(HGNC:MAPK1, pmod(Ph, Tyr, 204), pmod(Ph, Thr, 202))");
        assert_eq!(
            entity.to_bel(),
            "p(HGNC:MAPK1, pmod(Ph, Thr, 202), pmod(Ph, Tyr, 204))"
        );
    }

    #[test]
    fn gmod_in_gene_only() {
        let (entity, _) = parse_entity("g(HGNC:AKT1, gmod(M))");
        assert_eq!(entity.to_bel(), "g(HGNC:AKT1, gmod(Me))");
        let err = parse_entity_err("p(HGNC:AKT1, gmod(Me))");
        assert_eq!(err.kind, WarningKind::BelSyntax);
    }

    #[test]
    fn hgvs_variant() {
        let (entity, _) = parse_entity("p(HGNC:AKT1, var(\"p.Ala127Tyr\"))");
        assert_eq!(entity.to_bel(), "p(HGNC:AKT1, var(\"p.Ala127Tyr\"))");
    }

    #[test]
    fn fragment_forms() {
        let (entity, _) = parse_entity("p(HGNC:APP, frag(\"672_713\"))");
        assert_eq!(entity.to_bel(), "p(HGNC:APP, frag(\"672_713\"))");
        let (entity, _) = parse_entity("p(HGNC:APP, frag(\"?\", \"55kD\"))");
        assert_eq!(entity.to_bel(), "p(HGNC:APP, frag(\"?\", \"55kD\"))");
        let (entity, _) = parse_entity("p(HGNC:APP, frag(672_713))");
        assert_eq!(entity.to_bel(), "p(HGNC:APP, frag(\"672_713\"))");
        let (entity, _) = parse_entity("p(HGNC:YFG, frag(\"1_?\"))");
        assert_eq!(entity.to_bel(), "p(HGNC:YFG, frag(\"1_?\"))");
    }

    #[test]
    fn bad_fragment_range() {
        let err = parse_entity_err("p(HGNC:APP, frag(\"abc\"))");
        assert_eq!(err.kind, WarningKind::BelSyntax);
    }

    #[test]
    fn protein_substitution_upgrades() {
        let (entity, notes) = parse_entity("p(HGNC:PIK3CA, sub(Glu, 545, Lys))");
        assert_eq!(entity.to_bel(), "p(HGNC:PIK3CA, var(\"p.Glu545Lys\"))");
        assert!(notes.contains(&WarningKind::LegacyProteinSubstitution));
    }

    #[test]
    fn gene_substitution_upgrades() {
        let (entity, notes) = parse_entity("g(HGNC:APP, sub(G, 275341, C))");
        assert_eq!(entity.to_bel(), "g(HGNC:APP, var(\"c.275341G>C\"))");
        assert!(notes.contains(&WarningKind::LegacyGeneSubstitution));
    }

    #[test]
    fn truncation_upgrades() {
        let (entity, notes) = parse_entity("p(HGNC:AKT1, trunc(40))");
        assert_eq!(entity.to_bel(), "p(HGNC:AKT1, var(\"p.40*\"))");
        assert!(notes.contains(&WarningKind::LegacyTruncation));
    }

    #[test]
    fn modern_fusion() {
        let (entity, notes) =
            parse_entity("r(fus(HGNC:TMPRSS2, \"r.1_79\", HGNC:ERG, \"r.312_5034\"))");
        assert_eq!(
            entity.to_bel(),
            "r(fus(HGNC:TMPRSS2, \"r.1_79\", HGNC:ERG, \"r.312_5034\"))"
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn fusion_with_missing_ranges() {
        let (entity, _) = parse_entity("p(fus(HGNC:BCR, \"?\", HGNC:JAK2, \"?\"))");
        assert_eq!(entity.to_bel(), "p(fus(HGNC:BCR, \"?\", HGNC:JAK2, \"?\"))");
    }

    #[test]
    fn legacy_fusion_with_breakpoints() {
        let (entity, notes) = parse_entity("p(HGNC:BCR, fus(HGNC:JAK2, 1875, 2626))");
        assert_eq!(
            entity.to_bel(),
            "p(fus(HGNC:BCR, \"p.?_1875\", HGNC:JAK2, \"p.2626_?\"))"
        );
        assert!(notes.contains(&WarningKind::LegacyFusion));
    }

    #[test]
    fn legacy_fusion_without_breakpoints() {
        let (entity, _) = parse_entity("g(HGNC:BCR, fus(HGNC:JAK2))");
        assert_eq!(entity.to_bel(), "g(fus(HGNC:BCR, \"?\", HGNC:JAK2, \"?\"))");
    }

    #[test]
    fn fusion_range_with_unknown_coordinate() {
        let (entity, _) = parse_entity("g(fus(HGNC:BCR, \"c.?_1875\", HGNC:JAK2, \"c.2626_?\"))");
        assert_eq!(
            entity.to_bel(),
            "g(fus(HGNC:BCR, \"c.?_1875\", HGNC:JAK2, \"c.2626_?\"))"
        );
    }

    #[test]
    fn bad_fusion_reference_code() {
        let err = parse_entity_err("g(fus(HGNC:BCR, \"x.1_2\", HGNC:JAK2, \"?\"))");
        assert_eq!(err.kind, WarningKind::BelSyntax);
    }
}
