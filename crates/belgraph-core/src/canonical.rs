// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Canonicalization and content hashing.
//!
//! Every entity has exactly one canonical BEL string, and the node's identity
//! is the SHA-512 of that string's UTF-8 bytes. Edge identity is the SHA-512
//! of a canonical JSON document over the edge's data plus its endpoint
//! hashes. Hashes depend on nothing but the value itself — no graph state,
//! no insertion order, no line numbers — so they are stable across machines
//! and process runs.
//!
//! # Canonical form rules
//!
//! - Variants and list members are rendered in sorted order regardless of how
//!   the value was built.
//! - Reactions sort within reactants and within products, never across.
//! - Fusions preserve 5′/3′ orientation.
//! - Two-way relations hash their endpoints as an order-free participant
//!   pair so both emitted directions share one content hash.

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha512};
use std::fmt;

use crate::ast::{
    Concept, EdgeData, Entity, FragmentRange, FusionCoord, FusionRange, ParticipantModifier,
    Variant,
};
use crate::language::DEFAULT_NAMESPACE;

/// The content hash identifying a node: SHA-512 of the canonical BEL string,
/// hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(EcoString);

impl NodeKey {
    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The content hash identifying an edge within its `(source, target)` slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKey(EcoString);

impl EdgeKey {
    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
}

fn sha512_hex(data: &str) -> EcoString {
    let mut hasher = Sha512::new();
    hasher.update(data.as_bytes());
    hex_encode(&hasher.finalize()).into()
}

/// Quotes a string unless it is purely alphanumeric.
#[must_use]
pub fn ensure_quotes(s: &str) -> String {
    if !s.is_empty() && s.chars().all(char::is_alphanumeric) {
        s.to_owned()
    } else {
        format!("\"{s}\"")
    }
}

impl Concept {
    /// The canonical `namespace:name` rendering.
    #[must_use]
    pub fn to_bel(&self) -> String {
        format!("{}:{}", self.namespace, ensure_quotes(self.label()))
    }

    /// Rendering inside `pmod(...)`/`gmod(...)`: default-vocabulary names
    /// stay bare.
    fn to_bel_modification(&self) -> String {
        if self.namespace == DEFAULT_NAMESPACE {
            self.label().to_owned()
        } else {
            self.to_bel()
        }
    }
}

impl FusionCoord {
    fn render(self) -> String {
        match self {
            FusionCoord::Position(p) => p.to_string(),
            FusionCoord::Unknown => "?".to_owned(),
        }
    }
}

impl FusionRange {
    /// The canonical range string, without surrounding quotes.
    #[must_use]
    pub fn to_bel(&self) -> String {
        match self {
            FusionRange::Missing => "?".to_owned(),
            FusionRange::Enumerated {
                reference,
                start,
                stop,
            } => format!("{reference}.{}_{}", start.render(), stop.render()),
        }
    }
}

impl Variant {
    /// The canonical rendering of this variant.
    #[must_use]
    pub fn to_bel(&self) -> String {
        match self {
            Variant::ProteinModification {
                concept,
                code,
                position,
            } => {
                let mut out = format!("pmod({}", concept.to_bel_modification());
                if let Some(code) = code {
                    out.push_str(", ");
                    out.push_str(code);
                }
                if let Some(position) = position {
                    out.push_str(&format!(", {position}"));
                }
                out.push(')');
                out
            }
            Variant::GeneModification { concept } => {
                format!("gmod({})", concept.to_bel_modification())
            }
            Variant::Hgvs { variant } => format!("var(\"{variant}\")"),
            Variant::Fragment { range, description } => {
                let range = match range {
                    FragmentRange::Missing => "?".to_owned(),
                    FragmentRange::Known { start, stop } => format!("{start}_{stop}"),
                };
                match description {
                    Some(description) => format!("frag(\"{range}\", \"{description}\")"),
                    None => format!("frag(\"{range}\")"),
                }
            }
        }
    }
}

fn render_members(members: &[Entity]) -> String {
    let mut rendered: Vec<String> = members.iter().map(Entity::to_bel).collect();
    rendered.sort();
    rendered.join(", ")
}

impl Entity {
    /// The canonical BEL string of this entity.
    #[must_use]
    pub fn to_bel(&self) -> String {
        match self {
            Entity::Abundance { function, concept } => {
                format!("{}({})", function.short(), concept.to_bel())
            }
            Entity::CentralDogma {
                function,
                concept,
                variants,
            } => {
                if variants.is_empty() {
                    return format!("{}({})", function.short(), concept.to_bel());
                }
                let mut rendered: Vec<String> = variants.iter().map(Variant::to_bel).collect();
                rendered.sort();
                format!(
                    "{}({}, {})",
                    function.short(),
                    concept.to_bel(),
                    rendered.join(", ")
                )
            }
            Entity::Fusion {
                function,
                partner_5p,
                range_5p,
                partner_3p,
                range_3p,
            } => format!(
                "{}(fus({}, \"{}\", {}, \"{}\"))",
                function.short(),
                partner_5p.to_bel(),
                range_5p.to_bel(),
                partner_3p.to_bel(),
                range_3p.to_bel(),
            ),
            Entity::Complex { concept, members } => match concept {
                Some(concept) if members.is_empty() => {
                    format!("complex({})", concept.to_bel())
                }
                Some(concept) => {
                    format!("complex({}, {})", concept.to_bel(), render_members(members))
                }
                None => format!("complex({})", render_members(members)),
            },
            Entity::Composite { members } => format!("composite({})", render_members(members)),
            Entity::Reaction {
                concept,
                reactants,
                products,
            } => {
                let body = format!(
                    "reactants({}), products({})",
                    render_members(reactants),
                    render_members(products)
                );
                match concept {
                    Some(concept) => format!("rxn({}, {})", concept.to_bel(), body),
                    None => format!("rxn({body})"),
                }
            }
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bel())
    }
}

/// Hashes an entity's canonical form into its node key.
#[must_use]
pub fn hash_entity(entity: &Entity) -> NodeKey {
    NodeKey(sha512_hex(&entity.to_bel()))
}

fn modifier_value(modifier: Option<&ParticipantModifier>) -> Value {
    match modifier {
        // Serialized through serde; serde_json's map is BTree-backed, so key
        // order is already canonical.
        Some(m) if !m.is_empty() => serde_json::to_value(m).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Hashes an edge's data dictionary plus its endpoint hashes into its edge
/// key.
///
/// The line number is excluded; the citation participates only through its
/// `namespace:identifier` pair. For two-way relations, the endpoints are
/// hashed as an order-free pair so that the reversed emission of the same
/// statement produces the same key.
#[must_use]
pub fn hash_edge(source: &NodeKey, target: &NodeKey, data: &EdgeData) -> EdgeKey {
    let mut map = Map::new();
    map.insert("relation".into(), json!(data.relation.as_str()));
    map.insert(
        "citation".into(),
        match &data.citation {
            Some(citation) => json!(citation.identity()),
            None => Value::Null,
        },
    );
    map.insert(
        "evidence".into(),
        match &data.evidence {
            Some(evidence) => json!(evidence),
            None => Value::Null,
        },
    );
    map.insert(
        "annotations".into(),
        serde_json::to_value(&data.annotations).unwrap_or(Value::Null),
    );

    if data.relation.is_two_way() {
        let mut participants = [
            json!({
                "node": source.as_str(),
                "modifier": modifier_value(data.source_modifier.as_ref()),
            }),
            json!({
                "node": target.as_str(),
                "modifier": modifier_value(data.target_modifier.as_ref()),
            }),
        ];
        participants.sort_by_cached_key(Value::to_string);
        map.insert("participants".into(), Value::Array(participants.to_vec()));
    } else {
        map.insert("source".into(), json!(source.as_str()));
        map.insert("target".into(), json!(target.as_str()));
        map.insert(
            "source_modifier".into(),
            modifier_value(data.source_modifier.as_ref()),
        );
        map.insert(
            "target_modifier".into(),
            modifier_value(data.target_modifier.as_ref()),
        );
    }

    EdgeKey(sha512_hex(&Value::Object(map).to_string()))
}
