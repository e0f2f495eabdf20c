// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Node-link JSON interchange.
//!
//! The flat wire form of a [`BelGraph`]: nodes with their content hash as
//! `id`, links referencing endpoint hashes plus their own content hash as
//! `key`, and the graph-level metadata (document, definitions, warnings).
//! Round-tripping preserves hashes: node and edge keys are recomputed from
//! the canonical forms on read and verified against the serialized ones, so
//! a corrupted or hand-edited document fails loudly instead of silently
//! forking identities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ecow::EcoString;
use thiserror::Error;

use crate::ast::{EdgeData, Entity};
use crate::canonical::{EdgeKey, NodeKey, hash_edge, hash_entity};
use crate::error::Warning;
use crate::graph::{BelGraph, Document};
use crate::resolver::ResourceSource;

/// The serialized form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The node's content hash.
    pub id: NodeKey,
    /// The entity itself.
    pub entity: Entity,
    /// Display label, if one was attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<EcoString>,
}

/// The serialized form of one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Source node hash.
    pub source: NodeKey,
    /// Target node hash.
    pub target: NodeKey,
    /// The edge's content hash.
    pub key: EdgeKey,
    /// The edge data dictionary.
    #[serde(flatten)]
    pub data: EdgeData,
}

/// Graph-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Document metadata.
    pub document: Document,
    /// Declared namespaces.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<EcoString, ResourceSource>,
    /// Declared annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<EcoString, ResourceSource>,
    /// The ordered warning log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// A complete node-link document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    /// Always `true`.
    pub directed: bool,
    /// Always `true`.
    pub multigraph: bool,
    /// Graph-level metadata.
    pub graph: GraphRecord,
    /// Nodes in hash order.
    pub nodes: Vec<NodeRecord>,
    /// Edges in `(source, target, key)` order.
    pub links: Vec<LinkRecord>,
}

/// Why a node-link document could not be loaded.
#[derive(Debug, Error)]
pub enum NodeLinkError {
    /// The document is not valid JSON for this schema.
    #[error("invalid node-link JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A link references a node id that is not in the node list.
    #[error("link references unknown node {id}")]
    UnknownNode {
        /// The dangling hash.
        id: NodeKey,
    },
    /// A serialized hash does not match the recomputed one.
    #[error("serialized hash {serialized} does not match recomputed {computed}")]
    HashMismatch {
        /// The hash in the document.
        serialized: EcoString,
        /// The hash recomputed from canonical form.
        computed: EcoString,
    },
}

/// Serializes a graph to the node-link structure.
#[must_use]
pub fn to_nodelink(graph: &BelGraph) -> NodeLink {
    NodeLink {
        directed: true,
        multigraph: true,
        graph: GraphRecord {
            document: graph.document.clone(),
            namespaces: graph.namespaces().clone(),
            annotations: graph.annotations().clone(),
            warnings: graph.warnings().to_vec(),
        },
        nodes: graph
            .nodes()
            .map(|(key, entity)| NodeRecord {
                id: key.clone(),
                entity: entity.clone(),
                label: graph.label(key).cloned(),
            })
            .collect(),
        links: graph
            .edges()
            .map(|edge| LinkRecord {
                source: edge.source.clone(),
                target: edge.target.clone(),
                key: edge.key.clone(),
                data: edge.data.clone(),
            })
            .collect(),
    }
}

/// Serializes a graph to a node-link JSON string.
///
/// # Errors
///
/// Serialization failures from `serde_json` (not expected for well-formed
/// graphs).
pub fn to_nodelink_string(graph: &BelGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_nodelink(graph))
}

/// Rebuilds a graph from the node-link structure, verifying hashes.
///
/// Inferred edges are part of the document, so nodes are inserted without
/// re-running structural inference.
///
/// # Errors
///
/// [`NodeLinkError`] on dangling links or hash mismatches.
pub fn from_nodelink(document: &NodeLink) -> Result<BelGraph, NodeLinkError> {
    let mut graph = BelGraph::new();
    graph.document = document.graph.document.clone();
    for (keyword, source) in &document.graph.namespaces {
        graph.define_namespace(keyword.clone(), source.clone());
    }
    for (keyword, source) in &document.graph.annotations {
        graph.define_annotation(keyword.clone(), source.clone());
    }
    graph.set_warnings(document.graph.warnings.clone());

    for node in &document.nodes {
        let computed = hash_entity(&node.entity);
        if computed != node.id {
            return Err(NodeLinkError::HashMismatch {
                serialized: node.id.as_str().into(),
                computed: computed.as_str().into(),
            });
        }
        graph.insert_node_raw(node.entity.clone(), node.label.clone());
    }

    for link in &document.links {
        let computed = hash_edge(&link.source, &link.target, &link.data);
        if computed != link.key {
            return Err(NodeLinkError::HashMismatch {
                serialized: link.key.as_str().into(),
                computed: computed.as_str().into(),
            });
        }
        if graph
            .insert_edge_raw(&link.source, &link.target, link.data.clone())
            .is_none()
        {
            return Err(NodeLinkError::UnknownNode {
                id: link.source.clone(),
            });
        }
    }

    Ok(graph)
}

/// Parses and rebuilds a graph from a node-link JSON string.
///
/// # Errors
///
/// [`NodeLinkError`] on malformed JSON, dangling links, or hash mismatches.
pub fn from_nodelink_str(json: &str) -> Result<BelGraph, NodeLinkError> {
    let document: NodeLink = serde_json::from_str(json)?;
    from_nodelink(&document)
}
