// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The BEL knowledge graph.
//!
//! [`BelGraph`] is a directed multigraph over typed entities. Storage is an
//! arena (petgraph's adjacency graph) plus content-hash indexes: nodes are
//! keyed by the SHA-512 of their canonical form, edges by the SHA-512 of
//! their data within a `(source, target)` slot. Inserting the same node or
//! edge twice is a no-op, which is what makes compilation idempotent and
//! cycles harmless.
//!
//! # Structural inference
//!
//! Inserting an entity pulls in its structural neighborhood:
//!
//! - a variant-bearing entity gets a `hasVariant` edge from its parent,
//! - a variant-free protein gets `r(X) translatedTo p(X)`, and a variant-free
//!   RNA/miRNA gets `g(X) transcribedTo r(X)` (so proteins reify the whole
//!   central dogma chain),
//! - complexes and composites get `hasComponent` edges to their members,
//! - reactions get `hasReactant`/`hasProduct` edges.
//!
//! These inferences are deterministic and hash-driven: replaying them can
//! never duplicate an edge.

use ecow::EcoString;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::ast::{Citation, EdgeData, Entity};
use crate::canonical::{EdgeKey, NodeKey, hash_edge, hash_entity};
use crate::error::{Warning, WarningKind};
use crate::language::Relation;
use crate::resolver::ResourceSource;

/// Document metadata from the `SET DOCUMENT` section. The `(name, version)`
/// pair is the graph's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// `SET DOCUMENT Name = ...` (mandatory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<EcoString>,
    /// `SET DOCUMENT Version = ...` (mandatory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<EcoString>,
    /// `SET DOCUMENT Description = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<EcoString>,
    /// `SET DOCUMENT Authors = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<EcoString>,
    /// `SET DOCUMENT ContactInfo = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<EcoString>,
    /// `SET DOCUMENT Licenses = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenses: Option<EcoString>,
    /// `SET DOCUMENT Copyright = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<EcoString>,
    /// `SET DOCUMENT Disclaimer = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<EcoString>,
    /// `SET DOCUMENT Project = ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<EcoString>,
}

/// Why a qualified edge was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualifiedEdgeError {
    /// No citation on the edge data.
    #[error("missing citation")]
    MissingCitation,
    /// No evidence on the edge data.
    #[error("missing evidence")]
    MissingEvidence,
    /// The citation's `(namespace, identifier)` pair is inconsistent.
    #[error("invalid citation: {reason}")]
    InvalidCitation {
        /// What is wrong with the pair.
        reason: EcoString,
    },
}

impl QualifiedEdgeError {
    /// The warning kind this rejection reports as.
    #[must_use]
    pub const fn kind(&self) -> WarningKind {
        match self {
            QualifiedEdgeError::MissingCitation => WarningKind::MissingCitation,
            QualifiedEdgeError::MissingEvidence => WarningKind::MissingEvidence,
            QualifiedEdgeError::InvalidCitation { .. } => WarningKind::InvalidCitation,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    entity: Entity,
    label: Option<EcoString>,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    data: EdgeData,
}

/// One edge as yielded by [`BelGraph::edges`].
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    /// Source node hash.
    pub source: &'a NodeKey,
    /// Target node hash.
    pub target: &'a NodeKey,
    /// Content hash of the edge data.
    pub key: &'a EdgeKey,
    /// The edge's data dictionary.
    pub data: &'a EdgeData,
}

/// A labeled directed multigraph of BEL entities and qualified relations.
#[derive(Debug, Default, Clone)]
pub struct BelGraph {
    graph: DiGraph<NodeEntry, EdgeEntry>,
    node_index: BTreeMap<NodeKey, NodeIndex>,
    edge_index: BTreeMap<(NodeKey, NodeKey, EdgeKey), petgraph::graph::EdgeIndex>,
    /// Document metadata.
    pub document: Document,
    namespaces: BTreeMap<EcoString, ResourceSource>,
    annotations: BTreeMap<EcoString, ResourceSource>,
    warnings: Vec<Warning>,
}

impl BelGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Inserts an entity (idempotently) and returns its hash. Structural
    /// neighbors — variant parents, central-dogma precursors, members,
    /// reactants, products — are inserted and linked as well.
    pub fn add_entity(&mut self, entity: &Entity) -> NodeKey {
        let key = hash_entity(entity);
        if self.node_index.contains_key(&key) {
            return key;
        }
        let index = self.graph.add_node(NodeEntry {
            entity: entity.clone(),
            label: None,
        });
        self.node_index.insert(key.clone(), index);
        self.infer_structure(entity, &key);
        key
    }

    fn infer_structure(&mut self, entity: &Entity, key: &NodeKey) {
        if let Some(parent) = entity.parent() {
            let parent_key = self.add_entity(&parent);
            self.insert_edge(
                parent_key,
                key.clone(),
                EdgeData::unqualified(Relation::HasVariant),
            );
            return;
        }

        if let Some(rna) = entity.rna_counterpart() {
            let rna_key = self.add_entity(&rna);
            self.insert_edge(
                rna_key,
                key.clone(),
                EdgeData::unqualified(Relation::TranslatedTo),
            );
        }
        if let Some(gene) = entity.gene_counterpart() {
            let gene_key = self.add_entity(&gene);
            self.insert_edge(
                gene_key,
                key.clone(),
                EdgeData::unqualified(Relation::TranscribedTo),
            );
        }

        match entity {
            Entity::Complex { members, .. } | Entity::Composite { members } => {
                for member in members {
                    let member_key = self.add_entity(member);
                    self.insert_edge(
                        key.clone(),
                        member_key,
                        EdgeData::unqualified(Relation::HasComponent),
                    );
                }
            }
            Entity::Reaction {
                reactants,
                products,
                ..
            } => {
                for (side, relation) in [
                    (reactants, Relation::HasReactant),
                    (products, Relation::HasProduct),
                ] {
                    for member in side {
                        let member_key = self.add_entity(member);
                        self.insert_edge(
                            key.clone(),
                            member_key,
                            EdgeData::unqualified(relation),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    /// The entity stored under a hash.
    #[must_use]
    pub fn entity(&self, key: &NodeKey) -> Option<&Entity> {
        self.node_index
            .get(key)
            .map(|index| &self.graph[*index].entity)
    }

    /// The display label attached to a node, if any.
    #[must_use]
    pub fn label(&self, key: &NodeKey) -> Option<&EcoString> {
        self.node_index
            .get(key)
            .and_then(|index| self.graph[*index].label.as_ref())
    }

    /// Attaches a display label. Relabeling with a different value fails
    /// with the existing label; the first label wins.
    ///
    /// # Errors
    ///
    /// The current label, when it differs from `label`.
    pub fn set_label(&mut self, key: &NodeKey, label: EcoString) -> Result<(), EcoString> {
        let Some(index) = self.node_index.get(key) else {
            return Ok(());
        };
        let entry = &mut self.graph[*index];
        match &entry.label {
            Some(existing) if *existing != label => Err(existing.clone()),
            _ => {
                entry.label = Some(label);
                Ok(())
            }
        }
    }

    /// Iterates nodes in hash order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &Entity)> {
        self.node_index
            .iter()
            .map(|(key, index)| (key, &self.graph[*index].entity))
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    fn insert_edge(&mut self, source: NodeKey, target: NodeKey, data: EdgeData) -> EdgeKey {
        let key = hash_edge(&source, &target, &data);
        let identity = (source, target, key.clone());
        if self.edge_index.contains_key(&identity) {
            return key;
        }
        let source_index = self.node_index[&identity.0];
        let target_index = self.node_index[&identity.1];
        let edge_index = self.graph.add_edge(source_index, target_index, EdgeEntry { data });
        self.edge_index.insert(identity, edge_index);
        key
    }

    /// Adds an inferred or structural edge carrying no provenance.
    /// Idempotent by `(source, target, relation)`.
    pub fn add_unqualified_edge(
        &mut self,
        source: &Entity,
        target: &Entity,
        relation: Relation,
    ) -> EdgeKey {
        let source_key = self.add_entity(source);
        let target_key = self.add_entity(target);
        self.insert_edge(source_key, target_key, EdgeData::unqualified(relation))
    }

    /// Adds both directions of a symmetric unqualified relation.
    fn add_two_way_unqualified_edge(
        &mut self,
        source: &Entity,
        target: &Entity,
        relation: Relation,
    ) {
        self.add_unqualified_edge(source, target, relation);
        self.add_unqualified_edge(target, source, relation);
    }

    /// Adds `u equivalentTo v` in both directions.
    pub fn add_equivalence(&mut self, u: &Entity, v: &Entity) {
        self.add_two_way_unqualified_edge(u, v, Relation::EquivalentTo);
    }

    /// Adds `u orthologous v` in both directions.
    pub fn add_orthology(&mut self, u: &Entity, v: &Entity) {
        self.add_two_way_unqualified_edge(u, v, Relation::Orthologous);
    }

    /// Adds a qualified edge, validating its provenance.
    ///
    /// # Errors
    ///
    /// [`QualifiedEdgeError`] when citation or evidence is missing or the
    /// citation pair is inconsistent. Nothing is inserted on failure.
    pub fn add_qualified_edge(
        &mut self,
        source: &Entity,
        target: &Entity,
        data: EdgeData,
    ) -> Result<EdgeKey, QualifiedEdgeError> {
        Self::check_citation(data.citation.as_ref())?;
        if !data
            .evidence
            .as_ref()
            .is_some_and(|evidence| !evidence.is_empty())
        {
            return Err(QualifiedEdgeError::MissingEvidence);
        }
        let source_key = self.add_entity(source);
        let target_key = self.add_entity(target);
        Ok(self.insert_edge(source_key, target_key, data))
    }

    fn check_citation(citation: Option<&Citation>) -> Result<(), QualifiedEdgeError> {
        let citation = citation.ok_or(QualifiedEdgeError::MissingCitation)?;
        if citation.namespace.is_empty() || citation.identifier.is_empty() {
            return Err(QualifiedEdgeError::InvalidCitation {
                reason: "citation requires both a database and an identifier".into(),
            });
        }
        if citation.namespace == "pubmed"
            && !citation.identifier.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(QualifiedEdgeError::InvalidCitation {
                reason: format!("\"{}\" is not a valid PubMed identifier", citation.identifier)
                    .into(),
            });
        }
        Ok(())
    }

    /// Whether the exact edge `(source, target, key)` exists.
    #[must_use]
    pub fn has_edge(&self, source: &NodeKey, target: &NodeKey, key: &EdgeKey) -> bool {
        self.edge_index
            .contains_key(&(source.clone(), target.clone(), key.clone()))
    }

    /// Iterates edges in `(source, target, key)` order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.edge_index
            .iter()
            .map(|((source, target, key), index)| EdgeView {
                source,
                target,
                key,
                data: &self.graph[*index].data,
            })
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // ========================================================================
    // Definitions, warnings, metadata
    // ========================================================================

    /// Records a namespace definition.
    pub fn define_namespace(&mut self, keyword: EcoString, source: ResourceSource) {
        self.namespaces.insert(keyword, source);
    }

    /// Records an annotation definition.
    pub fn define_annotation(&mut self, keyword: EcoString, source: ResourceSource) {
        self.annotations.insert(keyword, source);
    }

    /// The declared namespaces.
    #[must_use]
    pub fn namespaces(&self) -> &BTreeMap<EcoString, ResourceSource> {
        &self.namespaces
    }

    /// The declared annotations.
    #[must_use]
    pub fn annotations(&self) -> &BTreeMap<EcoString, ResourceSource> {
        &self.annotations
    }

    /// Appends a warning. Warnings stay in insertion (document) order.
    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// The ordered warning log.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    // ========================================================================
    // Raw insertion (deserialization)
    // ========================================================================

    /// Inserts a node without structural inference. Used when replaying a
    /// serialized graph, whose inferred edges are already explicit.
    pub(crate) fn insert_node_raw(
        &mut self,
        entity: Entity,
        label: Option<EcoString>,
    ) -> NodeKey {
        let key = hash_entity(&entity);
        if let Some(index) = self.node_index.get(&key) {
            if label.is_some() {
                self.graph[*index].label = label;
            }
            return key;
        }
        let index = self.graph.add_node(NodeEntry { entity, label });
        self.node_index.insert(key.clone(), index);
        key
    }

    /// Inserts an edge between already-present nodes without validation.
    /// Returns `None` when either endpoint is unknown.
    pub(crate) fn insert_edge_raw(
        &mut self,
        source: &NodeKey,
        target: &NodeKey,
        data: EdgeData,
    ) -> Option<EdgeKey> {
        if !self.node_index.contains_key(source) || !self.node_index.contains_key(target) {
            return None;
        }
        Some(self.insert_edge(source.clone(), target.clone(), data))
    }

    /// Replaces the warning log wholesale (deserialization only).
    pub(crate) fn set_warnings(&mut self, warnings: Vec<Warning>) {
        self.warnings = warnings;
    }

    fn edge_data(&self, source: &NodeKey, target: &NodeKey, key: &EdgeKey) -> Option<&EdgeData> {
        self.edge_index
            .get(&(source.clone(), target.clone(), key.clone()))
            .map(|index| &self.graph[*index].data)
    }
}

impl PartialEq for BelGraph {
    /// Hash-equivalence: same document, definitions, warnings, node set
    /// (with labels), and edge set (with data).
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
            && self.namespaces == other.namespaces
            && self.annotations == other.annotations
            && self.warnings == other.warnings
            && self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && self.node_index.keys().all(|key| {
                other.node_index.contains_key(key) && self.label(key) == other.label(key)
            })
            && self.edges().all(|edge| {
                other.edge_data(edge.source, edge.target, edge.key) == Some(edge.data)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Concept;
    use crate::language::Function;

    fn protein(name: &str) -> Entity {
        Entity::protein(Concept::new("HGNC", name))
    }

    fn qualified(relation: Relation) -> EdgeData {
        let mut data = EdgeData::unqualified(relation);
        data.citation = Some(Citation::pubmed("12345"));
        data.evidence = Some("ex".into());
        data
    }

    fn count_relation(graph: &BelGraph, relation: Relation) -> usize {
        graph
            .edges()
            .filter(|edge| edge.data.relation == relation)
            .count()
    }

    #[test]
    fn protein_insertion_reifies_central_dogma() {
        let mut graph = BelGraph::new();
        graph.add_entity(&protein("AKT1"));
        // p, r, g
        assert_eq!(graph.node_count(), 3);
        assert_eq!(count_relation(&graph, Relation::TranslatedTo), 1);
        assert_eq!(count_relation(&graph, Relation::TranscribedTo), 1);
    }

    #[test]
    fn rna_insertion_infers_gene_only() {
        let mut graph = BelGraph::new();
        graph.add_entity(&Entity::rna(Concept::new("HGNC", "MYC")));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(count_relation(&graph, Relation::TranscribedTo), 1);
        assert_eq!(count_relation(&graph, Relation::TranslatedTo), 0);
    }

    #[test]
    fn variant_insertion_links_parent() {
        let mut graph = BelGraph::new();
        let variant = protein("AKT1").with_variants([crate::ast::Variant::hgvs("p.Ala127Tyr")]);
        graph.add_entity(&variant);
        // variant, parent, rna, gene
        assert_eq!(graph.node_count(), 4);
        assert_eq!(count_relation(&graph, Relation::HasVariant), 1);
        // The chain hangs off the parent, not the variant node.
        assert_eq!(count_relation(&graph, Relation::TranslatedTo), 1);
    }

    #[test]
    fn complex_members_get_component_edges() {
        let mut graph = BelGraph::new();
        graph.add_entity(&Entity::complex([protein("FOS"), protein("JUN")]));
        assert_eq!(count_relation(&graph, Relation::HasComponent), 2);
    }

    #[test]
    fn reaction_sides_get_edges() {
        let mut graph = BelGraph::new();
        let reaction = Entity::reaction(
            [Entity::simple(Function::Abundance, Concept::new("CHEBI", "superoxide"))],
            [
                Entity::simple(Function::Abundance, Concept::new("CHEBI", "oxygen")),
                Entity::simple(Function::Abundance, Concept::new("CHEBI", "hydrogen peroxide")),
            ],
        );
        graph.add_entity(&reaction);
        assert_eq!(count_relation(&graph, Relation::HasReactant), 1);
        assert_eq!(count_relation(&graph, Relation::HasProduct), 2);
    }

    #[test]
    fn node_insertion_is_idempotent() {
        let mut graph = BelGraph::new();
        let first = graph.add_entity(&protein("AKT1"));
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let second = graph.add_entity(&protein("AKT1"));
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), nodes);
        assert_eq!(graph.edge_count(), edges);
    }

    #[test]
    fn qualified_edge_requires_citation_and_evidence() {
        let mut graph = BelGraph::new();
        let mut data = EdgeData::unqualified(Relation::Increases);
        assert_eq!(
            graph.add_qualified_edge(&protein("A"), &protein("B"), data.clone()),
            Err(QualifiedEdgeError::MissingCitation)
        );
        data.citation = Some(Citation::pubmed("12345"));
        assert_eq!(
            graph.add_qualified_edge(&protein("A"), &protein("B"), data.clone()),
            Err(QualifiedEdgeError::MissingEvidence)
        );
        data.evidence = Some("ex".into());
        assert!(graph.add_qualified_edge(&protein("A"), &protein("B"), data).is_ok());
    }

    #[test]
    fn pubmed_citation_must_be_numeric() {
        let mut graph = BelGraph::new();
        let mut data = qualified(Relation::Increases);
        data.citation = Some(Citation::pubmed("PMC999"));
        let err = graph
            .add_qualified_edge(&protein("A"), &protein("B"), data)
            .unwrap_err();
        assert_eq!(err.kind(), WarningKind::InvalidCitation);
    }

    #[test]
    fn qualified_edge_insertion_is_idempotent() {
        let mut graph = BelGraph::new();
        let first = graph
            .add_qualified_edge(&protein("A"), &protein("B"), qualified(Relation::Increases))
            .unwrap();
        let edges = graph.edge_count();
        let second = graph
            .add_qualified_edge(&protein("A"), &protein("B"), qualified(Relation::Increases))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), edges);
    }

    #[test]
    fn distinct_evidence_makes_parallel_edges() {
        let mut graph = BelGraph::new();
        let mut second = qualified(Relation::Increases);
        second.evidence = Some("different".into());
        graph
            .add_qualified_edge(&protein("A"), &protein("B"), qualified(Relation::Increases))
            .unwrap();
        let before = graph.edge_count();
        graph
            .add_qualified_edge(&protein("A"), &protein("B"), second)
            .unwrap();
        assert_eq!(graph.edge_count(), before + 1);
    }

    #[test]
    fn relabeling_fails_with_existing_label() {
        let mut graph = BelGraph::new();
        let key = graph.add_entity(&protein("AKT1"));
        graph.set_label(&key, "kinase".into()).unwrap();
        graph.set_label(&key, "kinase".into()).unwrap();
        let existing = graph.set_label(&key, "other".into()).unwrap_err();
        assert_eq!(existing, "kinase");
    }

    #[test]
    fn equivalence_is_two_way() {
        let mut graph = BelGraph::new();
        graph.add_equivalence(&protein("A"), &protein("B"));
        assert_eq!(count_relation(&graph, Relation::EquivalentTo), 2);
    }
}
