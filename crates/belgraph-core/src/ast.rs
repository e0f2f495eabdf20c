// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The typed BEL domain model.
//!
//! Entities, variants, fusions, and edge-side modifiers form closed sum
//! types; there is no open extension point. Every entity is a value object:
//! built once, immutable afterwards, compared and hashed through its
//! canonical BEL string (see the [`crate::canonical`] module).
//!
//! # Ordering invariants
//!
//! Constructors normalize member order so that equality is structural:
//!
//! - variants of a central-dogma entity are sorted by canonical form,
//! - members of `complex(...)`/`composite(...)` are sorted and de-duplicated,
//! - reactants and products of `rxn(...)` are each sorted and de-duplicated
//!   (but never exchanged — reaction direction is meaningful),
//! - fusion partners keep their 5′/3′ orientation.
//!
//! # Example
//!
//! ```
//! use belgraph_core::ast::{Concept, Entity, Variant};
//!
//! let akt1 = Entity::protein(Concept::new("HGNC", "AKT1"))
//!     .with_variants([Variant::protein_modification("Ph", Some("Ser"), Some(473))]);
//! assert_eq!(akt1.to_bel(), r#"p(HGNC:AKT1, pmod(Ph, Ser, 473))"#);
//! assert_eq!(akt1.parent().unwrap().to_bel(), "p(HGNC:AKT1)");
//! ```

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::language::{CitationType, DEFAULT_NAMESPACE, Function, Relation};

/// Annotations attached to a qualified edge: keyword → set of values.
///
/// Values are always sets, even when a single value was asserted.
pub type Annotations = BTreeMap<EcoString, BTreeSet<EcoString>>;

// ============================================================================
// Concepts
// ============================================================================

/// The minimal identity of a biological entity: a namespace prefix plus an
/// identifier and/or a name. At least one of identifier/name is present and
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Concept {
    /// The namespace prefix, e.g. `HGNC`.
    pub namespace: EcoString,
    /// The database identifier within the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<EcoString>,
    /// The human-readable name within the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<EcoString>,
}

impl Concept {
    /// Creates a named concept.
    #[must_use]
    pub fn new(namespace: impl Into<EcoString>, name: impl Into<EcoString>) -> Self {
        Self {
            namespace: namespace.into(),
            identifier: None,
            name: Some(name.into()),
        }
    }

    /// Creates a concept known only by its database identifier.
    #[must_use]
    pub fn identified(namespace: impl Into<EcoString>, identifier: impl Into<EcoString>) -> Self {
        Self {
            namespace: namespace.into(),
            identifier: Some(identifier.into()),
            name: None,
        }
    }

    /// Adds a database identifier to a named concept.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<EcoString>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Creates a concept in the BEL default vocabulary.
    #[must_use]
    pub fn default_vocabulary(name: impl Into<EcoString>) -> Self {
        Self::new(DEFAULT_NAMESPACE, name)
    }

    /// The priority label: the name when present, the identifier otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        match (&self.name, &self.identifier) {
            (Some(name), _) => name.as_str(),
            (None, Some(identifier)) => identifier.as_str(),
            (None, None) => "",
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

/// One coordinate of an enumerated fusion range: a position or `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FusionCoord {
    /// A sequence position.
    Position(u64),
    /// `?` — unknown.
    Unknown,
}

/// A fusion breakpoint range for one partner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FusionRange {
    /// `"?"` — no range information.
    Missing,
    /// `"<reference>.<start>_<stop>"`, e.g. `r.1_79`.
    Enumerated {
        /// Reference sequence code: `c`, `r`, or `p`.
        reference: EcoString,
        /// Left coordinate.
        start: FusionCoord,
        /// Right coordinate.
        stop: FusionCoord,
    },
}

/// A proteolytic fragment range.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FragmentRange {
    /// `"?"` — neither start nor stop known.
    Missing,
    /// `"<start>_<stop>"` where each side is a position, `?`, or (for the
    /// stop) `*`.
    Known {
        /// Start coordinate as written.
        start: EcoString,
        /// Stop coordinate as written.
        stop: EcoString,
    },
}

/// A modification attached to a central-dogma entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// `pmod(...)`: a post-translational modification.
    ProteinModification {
        /// The modification concept; default-vocabulary names use the `bel`
        /// namespace.
        concept: Concept,
        /// Three-letter amino-acid code of the affected residue.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<EcoString>,
        /// Position of the affected residue.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u64>,
    },
    /// `gmod(...)`: a gene modification.
    GeneModification {
        /// The modification concept.
        concept: Concept,
    },
    /// `var("...")`: a free-form HGVS variant string.
    Hgvs {
        /// The HGVS string, e.g. `p.Ala127Tyr`.
        variant: EcoString,
    },
    /// `frag(...)`: a proteolytic fragment.
    Fragment {
        /// The fragment range.
        range: FragmentRange,
        /// Optional free-form descriptor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<EcoString>,
    },
}

impl Variant {
    /// Creates a protein modification from the default vocabulary.
    #[must_use]
    pub fn protein_modification(
        name: impl Into<EcoString>,
        code: Option<&str>,
        position: Option<u64>,
    ) -> Self {
        Variant::ProteinModification {
            concept: Concept::default_vocabulary(name),
            code: code.map(EcoString::from),
            position,
        }
    }

    /// Creates a gene modification from the default vocabulary.
    #[must_use]
    pub fn gene_modification(name: impl Into<EcoString>) -> Self {
        Variant::GeneModification {
            concept: Concept::default_vocabulary(name),
        }
    }

    /// Creates an HGVS variant.
    #[must_use]
    pub fn hgvs(variant: impl Into<EcoString>) -> Self {
        Variant::Hgvs {
            variant: variant.into(),
        }
    }

    /// Creates a fragment with known coordinates.
    #[must_use]
    pub fn fragment(start: impl Into<EcoString>, stop: impl Into<EcoString>) -> Self {
        Variant::Fragment {
            range: FragmentRange::Known {
                start: start.into(),
                stop: stop.into(),
            },
            description: None,
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A BEL entity — a graph vertex.
///
/// The set of functions is closed; see [`Function`]. `Abundance` covers every
/// simple (variant-free, member-free) function including named complexes
/// written as `complex(ns:name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entity {
    /// A simple abundance or process: `a()`, `bp()`, `path()`, `pop()`, or a
    /// named `complex(ns:name)`.
    Abundance {
        /// Which function the entity appears under.
        function: Function,
        /// The entity's concept.
        concept: Concept,
    },
    /// A gene, RNA, miRNA, or protein, optionally carrying variants.
    CentralDogma {
        /// `Gene`, `Rna`, `MicroRna`, or `Protein`.
        function: Function,
        /// The entity's concept.
        concept: Concept,
        /// Variants, sorted by canonical form. Empty for reference entities.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    /// A gene, RNA, or protein fusion. Orientation is meaningful and never
    /// normalized away.
    Fusion {
        /// `Gene`, `Rna`, or `Protein`.
        function: Function,
        /// The 5′ partner.
        partner_5p: Concept,
        /// The 5′ partner's breakpoint range.
        range_5p: FusionRange,
        /// The 3′ partner.
        partner_3p: Concept,
        /// The 3′ partner's breakpoint range.
        range_3p: FusionRange,
    },
    /// `complex(...)` with members, optionally named.
    Complex {
        /// The named-complex concept, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        concept: Option<Concept>,
        /// Members, sorted and de-duplicated.
        members: Vec<Entity>,
    },
    /// `composite(...)`.
    Composite {
        /// Members, sorted and de-duplicated.
        members: Vec<Entity>,
    },
    /// `rxn(reactants(...), products(...))`.
    Reaction {
        /// An optional named concept for the reaction.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        concept: Option<Concept>,
        /// Reactants, sorted and de-duplicated.
        reactants: Vec<Entity>,
        /// Products, sorted and de-duplicated.
        products: Vec<Entity>,
    },
}

fn sort_and_dedup(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by_cached_key(Entity::to_bel);
    entities.dedup_by(|a, b| a == b);
    entities
}

impl Entity {
    /// Creates a simple abundance under the given function.
    #[must_use]
    pub fn simple(function: Function, concept: Concept) -> Self {
        if function.is_central_dogma() {
            return Entity::CentralDogma {
                function,
                concept,
                variants: Vec::new(),
            };
        }
        Entity::Abundance { function, concept }
    }

    /// Creates a protein reference entity.
    #[must_use]
    pub fn protein(concept: Concept) -> Self {
        Entity::simple(Function::Protein, concept)
    }

    /// Creates a gene reference entity.
    #[must_use]
    pub fn gene(concept: Concept) -> Self {
        Entity::simple(Function::Gene, concept)
    }

    /// Creates an RNA reference entity.
    #[must_use]
    pub fn rna(concept: Concept) -> Self {
        Entity::simple(Function::Rna, concept)
    }

    /// Creates a micro-RNA reference entity.
    #[must_use]
    pub fn micro_rna(concept: Concept) -> Self {
        Entity::simple(Function::MicroRna, concept)
    }

    /// Creates a central-dogma entity with variants; the variants are sorted
    /// by canonical form.
    #[must_use]
    pub fn central_dogma(
        function: Function,
        concept: Concept,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Self {
        let mut variants: Vec<Variant> = variants.into_iter().collect();
        variants.sort_by_cached_key(Variant::to_bel);
        Entity::CentralDogma {
            function,
            concept,
            variants,
        }
    }

    /// Attaches variants to a central-dogma entity. Has no effect on other
    /// entity kinds.
    #[must_use]
    pub fn with_variants(self, variants: impl IntoIterator<Item = Variant>) -> Self {
        match self {
            Entity::CentralDogma {
                function, concept, ..
            } => Entity::central_dogma(function, concept, variants),
            other => other,
        }
    }

    /// Creates a member complex; members are sorted and de-duplicated.
    #[must_use]
    pub fn complex(members: impl IntoIterator<Item = Entity>) -> Self {
        Entity::Complex {
            concept: None,
            members: sort_and_dedup(members.into_iter().collect()),
        }
    }

    /// Creates a named complex with members.
    #[must_use]
    pub fn named_complex(concept: Concept, members: impl IntoIterator<Item = Entity>) -> Self {
        Entity::Complex {
            concept: Some(concept),
            members: sort_and_dedup(members.into_iter().collect()),
        }
    }

    /// Creates a composite abundance; members are sorted and de-duplicated.
    #[must_use]
    pub fn composite(members: impl IntoIterator<Item = Entity>) -> Self {
        Entity::Composite {
            members: sort_and_dedup(members.into_iter().collect()),
        }
    }

    /// Creates a reaction. Reactants and products are each sorted and
    /// de-duplicated; swapping the two sides produces a different entity.
    #[must_use]
    pub fn reaction(
        reactants: impl IntoIterator<Item = Entity>,
        products: impl IntoIterator<Item = Entity>,
    ) -> Self {
        Entity::Reaction {
            concept: None,
            reactants: sort_and_dedup(reactants.into_iter().collect()),
            products: sort_and_dedup(products.into_iter().collect()),
        }
    }

    /// The function tag of this entity.
    #[must_use]
    pub fn function(&self) -> Function {
        match self {
            Entity::Abundance { function, .. }
            | Entity::CentralDogma { function, .. }
            | Entity::Fusion { function, .. } => *function,
            Entity::Complex { .. } => Function::Complex,
            Entity::Composite { .. } => Function::Composite,
            Entity::Reaction { .. } => Function::Reaction,
        }
    }

    /// The entity's own concept, when it has one.
    #[must_use]
    pub fn concept(&self) -> Option<&Concept> {
        match self {
            Entity::Abundance { concept, .. } | Entity::CentralDogma { concept, .. } => {
                Some(concept)
            }
            Entity::Complex { concept, .. } | Entity::Reaction { concept, .. } => concept.as_ref(),
            Entity::Fusion { .. } | Entity::Composite { .. } => None,
        }
    }

    /// The variants carried by this entity.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        match self {
            Entity::CentralDogma { variants, .. } => variants,
            _ => &[],
        }
    }

    /// The reference entity a variant-bearing entity modifies: the same
    /// entity with its variants removed. `None` when there is nothing to
    /// strip.
    #[must_use]
    pub fn parent(&self) -> Option<Entity> {
        match self {
            Entity::CentralDogma {
                function,
                concept,
                variants,
            } if !variants.is_empty() => Some(Entity::CentralDogma {
                function: *function,
                concept: concept.clone(),
                variants: Vec::new(),
            }),
            _ => None,
        }
    }

    /// The RNA a variant-free protein is translated from.
    #[must_use]
    pub fn rna_counterpart(&self) -> Option<Entity> {
        match self {
            Entity::CentralDogma {
                function: Function::Protein,
                concept,
                variants,
            } if variants.is_empty() => Some(Entity::rna(concept.clone())),
            _ => None,
        }
    }

    /// The gene a variant-free RNA or micro-RNA is transcribed from.
    #[must_use]
    pub fn gene_counterpart(&self) -> Option<Entity> {
        match self {
            Entity::CentralDogma {
                function: Function::Rna | Function::MicroRna,
                concept,
                variants,
            } if variants.is_empty() => Some(Entity::gene(concept.clone())),
            _ => None,
        }
    }
}

// ============================================================================
// Edge-side modifiers
// ============================================================================

/// A modifier applied to one endpoint of an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// `act(X)` or `act(X, ma(...))`.
    Activity {
        /// The molecular activity, when specified.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        effect: Option<Concept>,
    },
    /// `deg(X)`.
    Degradation,
    /// `tloc(X, fromLoc(...), toLoc(...))` — also the normal form of
    /// `sec(X)` and `surf(X)`. Both locations are absent only for the
    /// lenient unqualified form `tloc(X)`.
    Translocation {
        /// Where the abundance starts.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_loc: Option<Concept>,
        /// Where the abundance ends up.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_loc: Option<Concept>,
    },
}

/// Everything attached to one participant of an edge: an optional
/// [`Modifier`] plus an optional `loc(...)` location.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantModifier {
    /// The modifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    /// The cellular location, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Concept>,
}

impl ParticipantModifier {
    /// Wraps a bare modifier.
    #[must_use]
    pub fn new(modifier: Modifier) -> Self {
        Self {
            modifier: Some(modifier),
            location: None,
        }
    }

    /// Wraps a bare location.
    #[must_use]
    pub fn at_location(location: Concept) -> Self {
        Self {
            modifier: None,
            location: Some(location),
        }
    }

    /// True when neither a modifier nor a location is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifier.is_none() && self.location.is_none()
    }
}

// ============================================================================
// Citations and edge data
// ============================================================================

/// Provenance for a qualified edge: a `(namespace, identifier)` pair plus
/// optional parsed metadata. Only the pair participates in edge identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// The citation database, lower-case: `pubmed`, `doi`, `url`, ...
    pub namespace: EcoString,
    /// The identifier within the database.
    pub identifier: EcoString,
    /// The citation's display name (e.g. an article title).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<EcoString>,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<EcoString>,
    /// Authors string as written in the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<EcoString>,
    /// Free-form comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<EcoString>,
}

impl Citation {
    /// Creates a citation from a known type and reference.
    #[must_use]
    pub fn new(citation_type: CitationType, identifier: impl Into<EcoString>) -> Self {
        Self {
            namespace: citation_type.namespace().into(),
            identifier: identifier.into(),
            name: None,
            date: None,
            authors: None,
            comments: None,
        }
    }

    /// Creates a PubMed citation.
    #[must_use]
    pub fn pubmed(identifier: impl Into<EcoString>) -> Self {
        Self::new(CitationType::PubMed, identifier)
    }

    /// The `namespace:identifier` pair used for edge identity.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}:{}", self.namespace, self.identifier)
    }
}

/// The data dictionary carried by one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    /// The relation.
    pub relation: Relation,
    /// Modifier on the source participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_modifier: Option<ParticipantModifier>,
    /// Modifier on the target participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_modifier: Option<ParticipantModifier>,
    /// Citation; present on every qualified edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    /// Supporting text; present on every qualified edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EcoString>,
    /// Annotations, keyword → set of values. Older serializations carry a
    /// single string or a value→flag map instead of a set; both are coerced
    /// to the set form on the way in.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_annotations"
    )]
    pub annotations: Annotations,
    /// 1-based line the statement originated from. Excluded from the edge
    /// hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One annotation entry as it may appear on the wire: the canonical set
/// form, a bare string, or the value→flag map used by older tooling.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationValues {
    Many(BTreeSet<EcoString>),
    One(EcoString),
    Flags(BTreeMap<EcoString, bool>),
}

fn deserialize_annotations<'de, D>(deserializer: D) -> Result<Annotations, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<EcoString, AnnotationValues> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, values)| {
            let values = match values {
                AnnotationValues::Many(values) => values,
                AnnotationValues::One(value) => BTreeSet::from([value]),
                AnnotationValues::Flags(flags) => flags
                    .into_iter()
                    .filter_map(|(value, keep)| keep.then_some(value))
                    .collect(),
            };
            (key, values)
        })
        .collect())
}

impl EdgeData {
    /// Creates the data dictionary of an inferred, unqualified edge.
    #[must_use]
    pub fn unqualified(relation: Relation) -> Self {
        Self {
            relation,
            source_modifier: None,
            target_modifier: None,
            citation: None,
            evidence: None,
            annotations: Annotations::new(),
            line: None,
        }
    }

    /// True when the edge carries both citation and evidence.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.citation.is_some() && self.evidence.is_some()
    }
}

// ============================================================================
// Parsed statements
// ============================================================================

/// One endpoint of a parsed statement: the entity plus whatever edge-side
/// modifier wrapped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerm {
    /// The entity at this endpoint.
    pub entity: Entity,
    /// The modifier that wrapped the entity, if any.
    pub modifier: Option<ParticipantModifier>,
}

impl ParsedTerm {
    /// A bare term with no modifier.
    #[must_use]
    pub fn bare(entity: Entity) -> Self {
        Self {
            entity,
            modifier: None,
        }
    }
}

/// A subject–relation–object triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationStatement {
    /// The subject term.
    pub subject: ParsedTerm,
    /// The relation.
    pub relation: Relation,
    /// The object term.
    pub object: ParsedTerm,
}

/// A fully parsed BEL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A lone term: inserts its nodes, no edge.
    Term(ParsedTerm),
    /// `subject relation object`.
    Relation(RelationStatement),
    /// `subject relation (inner_subject inner_relation inner_object)`.
    Nested {
        /// The outer subject.
        subject: ParsedTerm,
        /// The outer relation.
        relation: Relation,
        /// The parenthesized inner statement.
        inner: RelationStatement,
    },
    /// `subject hasMembers|hasComponents list(...)`; distributes into one
    /// unqualified edge per member.
    List {
        /// The collection entity.
        subject: ParsedTerm,
        /// `HasMember` or `HasComponent`.
        relation: Relation,
        /// The listed members.
        members: Vec<ParsedTerm>,
    },
    /// `subject labeled "text"`.
    Label {
        /// The labeled term.
        subject: ParsedTerm,
        /// The display label.
        label: EcoString,
    },
}
