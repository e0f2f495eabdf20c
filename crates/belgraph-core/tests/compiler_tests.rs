// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end compiler tests: whole scripts in, graphs out.

use belgraph_core::prelude::*;
use belgraph_core::resolver::parse_resource;

const HGNC_URL: &str = "https://example.org/hgnc.belns";
const CELL_LINE_URL: &str = "https://example.org/cell-line.belanno";

const HGNC_BELNS: &str = "\
[Namespace]
Keyword=HGNC

[Values]
AKT1|GRP
EGFR|GRP
MYC|GRP
FOS|GRP
JUN|GRP
APP|GRP
IL6|GRP
MIR21|GRM
";

const CELL_LINE_BELANNO: &str = "\
[AnnotationDefinition]
Keyword=CellLine

[Values]
HeLa cell|description
1321N1 cell|description
";

fn resolver() -> MemoryResolver {
    MemoryResolver::new()
        .with(HGNC_URL, parse_resource(HGNC_BELNS))
        .with(CELL_LINE_URL, parse_resource(CELL_LINE_BELANNO))
}

fn compile_lines(lines: &[&str]) -> BelGraph {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    let mut resolver = resolver();
    compile(
        lines.iter().map(|s| (*s).to_owned()),
        CompilerOptions::default(),
        &mut resolver,
    )
    .expect("compilation should succeed")
}

fn header() -> Vec<&'static str> {
    vec![
        "SET DOCUMENT Name = \"T1\"",
        "SET DOCUMENT Version = \"1.0.0\"",
        "DEFINE NAMESPACE HGNC AS URL \"https://example.org/hgnc.belns\"",
        "DEFINE ANNOTATION CellLine AS URL \"https://example.org/cell-line.belanno\"",
        "SET Citation = {\"PubMed\", \"Title\", \"12345\"}",
        "SET Evidence = \"ex\"",
    ]
}

fn protein(name: &str) -> Entity {
    Entity::protein(Concept::new("HGNC", name))
}

// ============================================================================
// S1 — minimal qualified edge
// ============================================================================

#[test]
fn minimal_qualified_edge() {
    let mut lines = vec![
        "SET DOCUMENT Name = \"T1\"",
        "SET DOCUMENT Version = \"1.0.0\"",
        "DEFINE NAMESPACE HGNC AS URL \"https://example.org/hgnc.belns\"",
        "SET Citation = {\"PubMed\", \"Title\", \"12345\"}",
        "SET Evidence = \"ex\"",
    ];
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    // Two proteins plus the inferred RNA and gene for each.
    assert_eq!(graph.node_count(), 6);

    let qualified: Vec<_> = graph
        .edges()
        .filter(|edge| edge.data.relation == Relation::Increases)
        .collect();
    assert_eq!(qualified.len(), 1);
    let edge = &qualified[0];
    let citation = edge.data.citation.as_ref().unwrap();
    assert_eq!(citation.namespace, "pubmed");
    assert_eq!(citation.identifier, "12345");
    assert_eq!(edge.data.evidence.as_deref(), Some("ex"));
    assert_eq!(edge.data.line, Some(6));

    assert_eq!(
        graph
            .edges()
            .filter(|e| e.data.relation == Relation::TranslatedTo)
            .count(),
        2
    );
    assert_eq!(
        graph
            .edges()
            .filter(|e| e.data.relation == Relation::TranscribedTo)
            .count(),
        2
    );
}

// ============================================================================
// S2 — missing citation is recoverable
// ============================================================================

#[test]
fn missing_citation_is_recoverable() {
    let graph = compile_lines(&[
        "SET DOCUMENT Name = \"T\"",
        "SET DOCUMENT Version = \"1.0.0\"",
        "p(HGNC:AKT1) -- p(HGNC:EGFR)",
    ]);

    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::Association)
            .count(),
        0
    );
    assert_eq!(graph.warnings().len(), 1);
    let warning = &graph.warnings()[0];
    assert_eq!(warning.kind, WarningKind::MissingCitation);
    assert_eq!(warning.line, 3);
}

// ============================================================================
// S3 — variant inference and hashing stability
// ============================================================================

#[test]
fn variant_inference_and_reparse_stability() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1, pmod(Ph, Ser, 9))");
    let graph = compile_lines(&lines);

    let variant_key = graph
        .nodes()
        .find(|(_, entity)| !entity.variants().is_empty())
        .map(|(key, _)| key.clone())
        .expect("variant node should exist");
    let variant = graph.entity(&variant_key).unwrap();
    assert!(variant.to_bel().contains("pmod(Ph, Ser, 9)"));

    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::HasVariant)
            .count(),
        1
    );

    // Re-parsing the canonical form produces the same hash.
    let reparsed = parse(&variant.to_bel(), &CompilerOptions::default()).unwrap();
    let Statement::Term(term) = reparsed else {
        panic!("expected a term statement");
    };
    assert_eq!(hash_entity(&term.entity), variant_key);
}

// ============================================================================
// S4 — complex member order invariance
// ============================================================================

#[test]
fn complex_member_order_is_irrelevant() {
    let a = parse("complex(p(HGNC:FOS), p(HGNC:JUN))", &CompilerOptions::default()).unwrap();
    let b = parse("complex(p(HGNC:JUN), p(HGNC:FOS))", &CompilerOptions::default()).unwrap();
    let (Statement::Term(a), Statement::Term(b)) = (a, b) else {
        panic!("expected term statements");
    };
    assert_eq!(hash_entity(&a.entity), hash_entity(&b.entity));
}

// ============================================================================
// S5 — correlation symmetry
// ============================================================================

#[test]
fn positive_correlation_is_emitted_both_ways() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1) positiveCorrelation p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    let correlations: Vec<_> = graph
        .edges()
        .filter(|edge| edge.data.relation == Relation::PositiveCorrelation)
        .collect();
    assert_eq!(correlations.len(), 2);
    assert_eq!(correlations[0].key, correlations[1].key);
    assert_eq!(correlations[0].source, correlations[1].target);
    assert_eq!(correlations[0].target, correlations[1].source);
}

// ============================================================================
// S6 — nested statement rejected by default
// ============================================================================

#[test]
fn nested_statement_rejected_by_default() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1) -> (p(HGNC:EGFR) -> p(HGNC:MYC))");
    let graph = compile_lines(&lines);

    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::Increases)
            .count(),
        0
    );
    let nested: Vec<_> = graph
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::NestedRelation)
        .collect();
    assert_eq!(nested.len(), 1);
}

#[test]
fn nested_statement_compiles_when_enabled() {
    let mut resolver = resolver();
    let mut lines = header();
    lines.push("p(HGNC:AKT1) -> (p(HGNC:EGFR) -> p(HGNC:MYC))");
    let options = CompilerOptions {
        allow_nested: true,
        ..CompilerOptions::default()
    };
    let graph = compile(lines.iter().map(|s| (*s).to_owned()), options, &mut resolver).unwrap();
    // Outer subject → inner subject, and the inner statement itself.
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::Increases)
            .count(),
        2
    );
}

// ============================================================================
// Warnings
// ============================================================================

#[test]
fn warning_lines_are_monotonically_non_decreasing() {
    let mut lines = header();
    lines.push("p(HGNC:NOPE1) -> p(HGNC:EGFR)");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    lines.push("p(HGNC:NOPE2) -> p(HGNC:EGFR)");
    lines.push("frobnicate");
    let graph = compile_lines(&lines);

    let line_numbers: Vec<u32> = graph.warnings().iter().map(|w| w.line).collect();
    assert_eq!(line_numbers.len(), 3);
    assert!(line_numbers.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn legacy_forms_surface_as_debug_severity() {
    let mut lines = header();
    lines.push("kin(p(HGNC:AKT1)) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    let legacy: Vec<_> = graph
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::LegacyActivity)
        .collect();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].severity(), Severity::Debug);
    // The statement itself still compiled.
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::Increases)
            .count(),
        1
    );
}

#[test]
fn encoding_violations_are_semantic_warnings() {
    let mut lines = header();
    // AKT1 is encoded GRP: gene, RNA, protein — not a biological process.
    lines.push("bp(HGNC:AKT1)");
    let graph = compile_lines(&lines);
    assert_eq!(graph.warnings().len(), 1);
    assert_eq!(graph.warnings()[0].kind, WarningKind::InvalidFunctionSemantic);
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn mirna_encoding_is_accepted() {
    let mut lines = header();
    lines.push("m(HGNC:MIR21)");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    // miRNA infers its gene only.
    assert_eq!(graph.node_count(), 2);
}

// ============================================================================
// Annotations and context
// ============================================================================

#[test]
fn annotations_attach_as_sets() {
    let mut lines = header();
    lines.push("SET CellLine = {\"HeLa cell\", \"1321N1 cell\"}");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    let values = edge.data.annotations.get("CellLine").unwrap();
    assert_eq!(values.len(), 2);
    assert!(values.contains("HeLa cell"));
}

#[test]
fn illegal_annotation_value_is_rejected() {
    let mut lines = header();
    lines.push("SET CellLine = \"NIH-3T3 cell\"");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    assert_eq!(graph.warnings().len(), 1);
    assert_eq!(graph.warnings()[0].kind, WarningKind::IllegalAnnotationValue);
    // The annotation never entered the context; the edge has none.
    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    assert!(edge.data.annotations.is_empty());
}

#[test]
fn undefined_annotation_is_rejected() {
    let mut lines = header();
    lines.push("SET Species = \"9606\"");
    let graph = compile_lines(&lines);
    assert_eq!(graph.warnings().len(), 1);
    assert_eq!(graph.warnings()[0].kind, WarningKind::UndefinedAnnotation);
}

#[test]
fn citation_clearing_resets_annotations_but_not_statement_group() {
    let mut lines = header();
    lines.push("SET STATEMENT_GROUP = \"group one\"");
    lines.push("SET CellLine = \"HeLa cell\"");
    lines.push("SET Citation = {\"PubMed\", \"Other\", \"67890\"}");
    lines.push("SET Evidence = \"fresh\"");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);

    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    assert!(edge.data.annotations.is_empty());
    assert_eq!(
        edge.data.citation.as_ref().unwrap().identifier,
        "67890"
    );
}

#[test]
fn unset_removes_annotations_from_subsequent_edges() {
    let mut lines = header();
    lines.push("SET CellLine = \"HeLa cell\"");
    lines.push("UNSET CellLine");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty());
    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    assert!(edge.data.annotations.is_empty());
}

// ============================================================================
// Structural statements
// ============================================================================

#[test]
fn has_members_distributes_unqualified_edges() {
    let graph = compile_lines(&[
        "SET DOCUMENT Name = \"T\"",
        "SET DOCUMENT Version = \"1.0.0\"",
        "DEFINE NAMESPACE HGNC AS URL \"https://example.org/hgnc.belns\"",
        // No citation required for structural statements.
        "p(HGNC:AKT1) hasMembers list(p(HGNC:FOS), p(HGNC:JUN))",
    ]);
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::HasMember)
            .count(),
        2
    );
}

#[test]
fn reaction_statement_infers_sides() {
    let mut lines = header();
    lines.push("rxn(reactants(p(HGNC:FOS)), products(p(HGNC:JUN)))");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty());
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::HasReactant)
            .count(),
        1
    );
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::HasProduct)
            .count(),
        1
    );
}

#[test]
fn complex_statement_infers_components() {
    let mut lines = header();
    lines.push("complex(p(HGNC:FOS), p(HGNC:JUN)) -> p(HGNC:MYC)");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty());
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::HasComponent)
            .count(),
        2
    );
}

// ============================================================================
// Modifiers
// ============================================================================

#[test]
fn modifiers_ride_on_the_edge() {
    let mut lines = header();
    lines.push("act(p(HGNC:AKT1), ma(kin)) -> deg(p(HGNC:MYC))");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());

    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    assert!(matches!(
        edge.data.source_modifier.as_ref().unwrap().modifier,
        Some(Modifier::Activity { .. })
    ));
    assert!(matches!(
        edge.data.target_modifier.as_ref().unwrap().modifier,
        Some(Modifier::Degradation)
    ));
    // Endpoints are the bare entities.
    assert_eq!(graph.entity(edge.source).unwrap().to_bel(), "p(HGNC:AKT1)");
    assert_eq!(graph.entity(edge.target).unwrap().to_bel(), "p(HGNC:MYC)");
}

#[test]
fn secretion_statement_compiles_to_translocation() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1) -> sec(p(HGNC:IL6))");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty());
    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    let Some(Modifier::Translocation { from_loc, to_loc }) = &edge
        .data
        .target_modifier
        .as_ref()
        .unwrap()
        .modifier
    else {
        panic!("expected a translocation modifier");
    };
    assert_eq!(from_loc.as_ref().unwrap().label(), "intracellular");
    assert_eq!(to_loc.as_ref().unwrap().label(), "extracellular space");
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn node_link_round_trip_preserves_everything() {
    let mut lines = header();
    lines.push("SET CellLine = \"HeLa cell\"");
    lines.push("p(HGNC:AKT1, pmod(Ph, Ser, 473)) -> p(HGNC:EGFR)");
    lines.push("complex(p(HGNC:FOS), p(HGNC:JUN)) neg bp(GO:apoptosis)");
    lines.push("p(HGNC:NOPE) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);
    // Warnings (undefined GO namespace, unknown NOPE name) are preserved
    // through the round trip.
    assert!(!graph.warnings().is_empty());

    let json = to_nodelink_string(&graph).unwrap();
    let restored = from_nodelink_str(&json).unwrap();
    assert_eq!(graph, restored);

    // And the round trip is a fixed point.
    let json_again = to_nodelink_string(&restored).unwrap();
    assert_eq!(json, json_again);
}

// ============================================================================
// Lexing inside full compilations
// ============================================================================

#[test]
fn multiline_evidence_is_assembled() {
    let mut lines = header();
    lines.push("SET Evidence = \"first half \\");
    lines.push("second half\"");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);
    assert!(graph.warnings().is_empty());
    let edge = graph
        .edges()
        .find(|edge| edge.data.relation == Relation::Increases)
        .unwrap();
    assert_eq!(edge.data.evidence.as_deref(), Some("first half second half"));
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let graph = compile_lines(&[
        "# A BEL document",
        "",
        "SET DOCUMENT Name = \"T\"",
        "#: note to self",
        "SET DOCUMENT Version = \"1.0.0\"",
        "DEFINE NAMESPACE HGNC AS URL \"https://example.org/hgnc.belns\"",
        "p(HGNC:AKT1) // trailing comment",
    ]);
    assert!(graph.warnings().is_empty(), "{:?}", graph.warnings());
    assert_eq!(graph.node_count(), 3);
}

// ============================================================================
// Graph-level invariants reachable end to end
// ============================================================================

#[test]
fn duplicate_statements_are_idempotent() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);
    // Line numbers differ but are excluded from the hash, so the second
    // statement lands on the same edge.
    assert_eq!(
        graph
            .edges()
            .filter(|edge| edge.data.relation == Relation::Increases)
            .count(),
        1
    );
}

#[test]
fn protein_chain_appears_for_every_protein() {
    let mut lines = header();
    lines.push("p(HGNC:AKT1) -> p(HGNC:EGFR)");
    let graph = compile_lines(&lines);
    for name in ["AKT1", "EGFR"] {
        let protein_key = hash_entity(&protein(name));
        let rna_key = hash_entity(&Entity::rna(Concept::new("HGNC", name)));
        let gene_key = hash_entity(&Entity::gene(Concept::new("HGNC", name)));
        assert!(graph.edges().any(|e| {
            e.data.relation == Relation::TranslatedTo
                && *e.source == rna_key
                && *e.target == protein_key
        }));
        assert!(graph.edges().any(|e| {
            e.data.relation == Relation::TranscribedTo
                && *e.source == gene_key
                && *e.target == rna_key
        }));
    }
}
