// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The closed BEL vocabularies.
//!
//! Everything the grammar can name lives here: entity functions, relations
//! and their aliases, citation types, amino acids, the default protein- and
//! gene-modification vocabularies, BEL 1.0 activity labels, and the
//! namespace-encoding table that maps resource encoding characters to the
//! functions a name may legally appear under.
//!
//! The tables are the BEL 1.0/2.0 language definition; lookups are plain
//! `match`es so the compiler carries no runtime table state.

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The namespace implied when a default-vocabulary name is used without
/// qualification, e.g. `pmod(Ph)` or `ma(kin)`.
pub const DEFAULT_NAMESPACE: &str = "bel";

/// The namespace assigned to naked names when lenient parsing is enabled.
pub const DIRTY_NAMESPACE: &str = "dirty";

// ============================================================================
// Functions
// ============================================================================

/// The closed set of BEL entity functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Function {
    /// `a()` / `abundance()` — a chemical or other general abundance.
    Abundance,
    /// `g()` / `geneAbundance()`.
    Gene,
    /// `r()` / `rnaAbundance()`.
    Rna,
    /// `m()` / `microRNAAbundance()`.
    MicroRna,
    /// `p()` / `proteinAbundance()`.
    Protein,
    /// `bp()` / `biologicalProcess()`.
    BiologicalProcess,
    /// `path()` / `pathology()`.
    Pathology,
    /// `pop()` / `populationAbundance()`.
    Population,
    /// `complex()` / `complexAbundance()`.
    Complex,
    /// `composite()` / `compositeAbundance()`.
    Composite,
    /// `rxn()` / `reaction()`.
    Reaction,
}

impl Function {
    /// Resolves a surface keyword (abbreviation or long form) to a function.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "a" | "abundance" => Function::Abundance,
            "g" | "geneAbundance" => Function::Gene,
            "r" | "rnaAbundance" => Function::Rna,
            "m" | "microRNAAbundance" => Function::MicroRna,
            "p" | "proteinAbundance" => Function::Protein,
            "bp" | "biologicalProcess" => Function::BiologicalProcess,
            "o" | "path" | "pathology" => Function::Pathology,
            "pop" | "populationAbundance" => Function::Population,
            "complex" | "complexAbundance" => Function::Complex,
            "composite" | "compositeAbundance" => Function::Composite,
            "rxn" | "reaction" => Function::Reaction,
            _ => return None,
        })
    }

    /// The canonical abbreviation used in serialized BEL.
    #[must_use]
    pub const fn short(self) -> &'static str {
        match self {
            Function::Abundance => "a",
            Function::Gene => "g",
            Function::Rna => "r",
            Function::MicroRna => "m",
            Function::Protein => "p",
            Function::BiologicalProcess => "bp",
            Function::Pathology => "path",
            Function::Population => "pop",
            Function::Complex => "complex",
            Function::Composite => "composite",
            Function::Reaction => "rxn",
        }
    }

    /// The long-form keyword.
    #[must_use]
    pub const fn long(self) -> &'static str {
        match self {
            Function::Abundance => "abundance",
            Function::Gene => "geneAbundance",
            Function::Rna => "rnaAbundance",
            Function::MicroRna => "microRNAAbundance",
            Function::Protein => "proteinAbundance",
            Function::BiologicalProcess => "biologicalProcess",
            Function::Pathology => "pathology",
            Function::Population => "populationAbundance",
            Function::Complex => "complexAbundance",
            Function::Composite => "compositeAbundance",
            Function::Reaction => "reaction",
        }
    }

    /// Whether this function names a central-dogma entity that may carry
    /// variants.
    #[must_use]
    pub const fn is_central_dogma(self) -> bool {
        matches!(
            self,
            Function::Gene | Function::Rna | Function::MicroRna | Function::Protein
        )
    }

    /// The reference-sequence code used when upgrading legacy fusions for
    /// this function.
    #[must_use]
    pub(crate) const fn fusion_reference(self) -> Option<&'static str> {
        match self {
            Function::Gene => Some("c"),
            Function::Rna | Function::MicroRna => Some("r"),
            Function::Protein => Some("p"),
            _ => None,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// Expands a namespace-resource encoding character into the functions a name
/// carrying it may appear under.
///
/// Encoding characters come from `.belns` resources; an unknown character
/// permits nothing.
#[must_use]
pub fn encoding_functions(encoding: char) -> &'static [Function] {
    match encoding {
        'G' => &[Function::Gene],
        'R' => &[Function::Rna, Function::MicroRna],
        'P' => &[Function::Protein],
        'M' => &[Function::MicroRna],
        'A' => &[
            Function::Abundance,
            Function::Rna,
            Function::MicroRna,
            Function::Protein,
            Function::Gene,
            Function::Complex,
        ],
        'B' => &[Function::Pathology, Function::BiologicalProcess],
        'O' => &[Function::Pathology],
        'C' => &[Function::Complex],
        _ => &[],
    }
}

// ============================================================================
// Relations
// ============================================================================

/// The closed set of BEL relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// `A -> B`: A increases B.
    Increases,
    /// `A => B`: A directly increases B.
    DirectlyIncreases,
    /// `A -| B`: A decreases B.
    Decreases,
    /// `A =| B`: A directly decreases B.
    DirectlyDecreases,
    /// A is reported not to change B.
    CausesNoChange,
    /// A regulates B with unknown direction.
    Regulates,
    /// A directly regulates B.
    DirectlyRegulates,
    /// A and B physically bind.
    Binds,
    /// A and B are positively correlated.
    PositiveCorrelation,
    /// A and B are negatively correlated.
    NegativeCorrelation,
    /// A and B are correlated with unknown sign.
    Correlation,
    /// A and B are reported not to correlate.
    NoCorrelation,
    /// `A -- B`: A is associated with B.
    Association,
    /// A is a subclass/instance of B.
    IsA,
    /// A is a subprocess of B.
    SubProcessOf,
    /// A is the rate-limiting step of B.
    RateLimitingStepOf,
    /// A is a biomarker for process B.
    BiomarkerFor,
    /// A is a prognostic biomarker for process B.
    PrognosticBiomarkerFor,
    /// A is analogous to B.
    Analogous,
    /// A is orthologous to B.
    Orthologous,
    /// `g(X) :> r(X)`.
    TranscribedTo,
    /// `r(X) >> p(X)`.
    TranslatedTo,
    /// A and B denote the same entity.
    EquivalentTo,
    /// A is part of B.
    PartOf,
    /// Structural: parent hasVariant variant.
    HasVariant,
    /// Structural: complex/composite hasComponent member.
    HasComponent,
    /// Structural: A hasMember B.
    HasMember,
    /// Structural: reaction hasReactant R.
    HasReactant,
    /// Structural: reaction hasProduct P.
    HasProduct,
}

impl Relation {
    /// Resolves a relation keyword or symbolic alias.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "->" | "→" | "increases" => Relation::Increases,
            "=>" | "⇒" | "directlyIncreases" => Relation::DirectlyIncreases,
            "-|" | "decreases" => Relation::Decreases,
            "=|" | "directlyDecreases" => Relation::DirectlyDecreases,
            "cnc" | "causesNoChange" => Relation::CausesNoChange,
            "reg" | "regulates" => Relation::Regulates,
            "directlyRegulates" => Relation::DirectlyRegulates,
            "binds" => Relation::Binds,
            "pos" | "positiveCorrelation" => Relation::PositiveCorrelation,
            "neg" | "negativeCorrelation" => Relation::NegativeCorrelation,
            "cor" | "correlation" => Relation::Correlation,
            "noCorrelation" => Relation::NoCorrelation,
            "--" | "association" => Relation::Association,
            "isA" => Relation::IsA,
            "subProcessOf" => Relation::SubProcessOf,
            "rateLimitingStepOf" => Relation::RateLimitingStepOf,
            "biomarkerFor" => Relation::BiomarkerFor,
            "prognosticBiomarkerFor" => Relation::PrognosticBiomarkerFor,
            "analogousTo" | "analogous" => Relation::Analogous,
            "orthologous" => Relation::Orthologous,
            ":>" | "transcribedTo" => Relation::TranscribedTo,
            ">>" | "translatedTo" => Relation::TranslatedTo,
            "eq" | "equivalentTo" => Relation::EquivalentTo,
            "partOf" => Relation::PartOf,
            "hasVariant" => Relation::HasVariant,
            "hasComponent" => Relation::HasComponent,
            "hasMember" => Relation::HasMember,
            "hasReactant" => Relation::HasReactant,
            "hasProduct" => Relation::HasProduct,
            _ => return None,
        })
    }

    /// The canonical keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Relation::Increases => "increases",
            Relation::DirectlyIncreases => "directlyIncreases",
            Relation::Decreases => "decreases",
            Relation::DirectlyDecreases => "directlyDecreases",
            Relation::CausesNoChange => "causesNoChange",
            Relation::Regulates => "regulates",
            Relation::DirectlyRegulates => "directlyRegulates",
            Relation::Binds => "binds",
            Relation::PositiveCorrelation => "positiveCorrelation",
            Relation::NegativeCorrelation => "negativeCorrelation",
            Relation::Correlation => "correlation",
            Relation::NoCorrelation => "noCorrelation",
            Relation::Association => "association",
            Relation::IsA => "isA",
            Relation::SubProcessOf => "subProcessOf",
            Relation::RateLimitingStepOf => "rateLimitingStepOf",
            Relation::BiomarkerFor => "biomarkerFor",
            Relation::PrognosticBiomarkerFor => "prognosticBiomarkerFor",
            Relation::Analogous => "analogous",
            Relation::Orthologous => "orthologous",
            Relation::TranscribedTo => "transcribedTo",
            Relation::TranslatedTo => "translatedTo",
            Relation::EquivalentTo => "equivalentTo",
            Relation::PartOf => "partOf",
            Relation::HasVariant => "hasVariant",
            Relation::HasComponent => "hasComponent",
            Relation::HasMember => "hasMember",
            Relation::HasReactant => "hasReactant",
            Relation::HasProduct => "hasProduct",
        }
    }

    /// Whether this relation is inherently directionless. Two-way relations
    /// are committed to the graph in both directions with a shared content
    /// hash.
    #[must_use]
    pub const fn is_two_way(self) -> bool {
        matches!(
            self,
            Relation::PositiveCorrelation
                | Relation::NegativeCorrelation
                | Relation::Correlation
                | Relation::NoCorrelation
                | Relation::Association
                | Relation::Orthologous
                | Relation::Analogous
                | Relation::EquivalentTo
        )
    }

    /// Whether an edge of this relation may exist without citation and
    /// evidence.
    #[must_use]
    pub const fn can_be_unqualified(self) -> bool {
        matches!(
            self,
            Relation::HasVariant
                | Relation::HasComponent
                | Relation::HasMember
                | Relation::HasReactant
                | Relation::HasProduct
                | Relation::TranscribedTo
                | Relation::TranslatedTo
                | Relation::EquivalentTo
                | Relation::PartOf
        )
    }

    /// Whether a *statement* using this relation is committed without
    /// provenance. Structural relations written out explicitly
    /// (`complex(...) hasComponent p(...)`) never require a citation.
    #[must_use]
    pub(crate) const fn is_unqualified_statement(self) -> bool {
        matches!(
            self,
            Relation::HasVariant
                | Relation::HasComponent
                | Relation::HasMember
                | Relation::HasReactant
                | Relation::HasProduct
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Citations
// ============================================================================

/// A known citation type keyword from `SET Citation = {"<type>", ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CitationType {
    /// `PubMed` — reference must be a numeric identifier.
    PubMed,
    /// `Book`.
    Book,
    /// `Journal`.
    Journal,
    /// `Journal Article`.
    JournalArticle,
    /// `Online Resource`.
    OnlineResource,
    /// `URL`.
    Url,
    /// `DOI`.
    Doi,
    /// `PMC`.
    Pmc,
    /// `Other`.
    Other,
}

impl CitationType {
    /// Resolves the citation type keyword used in BEL scripts.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "PubMed" => CitationType::PubMed,
            "Book" => CitationType::Book,
            "Journal" => CitationType::Journal,
            "Journal Article" => CitationType::JournalArticle,
            "Online Resource" => CitationType::OnlineResource,
            "URL" => CitationType::Url,
            "DOI" => CitationType::Doi,
            "PMC" => CitationType::Pmc,
            "Other" => CitationType::Other,
            _ => return None,
        })
    }

    /// The citation database prefix stored on edges, e.g. `pubmed`.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            CitationType::PubMed => "pubmed",
            CitationType::Book => "book",
            CitationType::Journal => "journal",
            CitationType::JournalArticle => "journal article",
            CitationType::OnlineResource => "online resource",
            CitationType::Url => "url",
            CitationType::Doi => "doi",
            CitationType::Pmc => "pmc",
            CitationType::Other => "other",
        }
    }
}

// ============================================================================
// Amino acids and nucleotides
// ============================================================================

/// Widens a single-letter amino-acid code to its three-letter form.
#[must_use]
pub fn amino_acid_from_single(code: char) -> Option<&'static str> {
    Some(match code {
        'A' => "Ala",
        'R' => "Arg",
        'N' => "Asn",
        'D' => "Asp",
        'C' => "Cys",
        'E' => "Glu",
        'Q' => "Gln",
        'G' => "Gly",
        'H' => "His",
        'I' => "Ile",
        'L' => "Leu",
        'K' => "Lys",
        'M' => "Met",
        'F' => "Phe",
        'P' => "Pro",
        'S' => "Ser",
        'T' => "Thr",
        'W' => "Trp",
        'Y' => "Tyr",
        'V' => "Val",
        _ => return None,
    })
}

/// Checks a three-letter amino-acid code, returning its canonical spelling.
#[must_use]
pub fn amino_acid_from_triple(code: &str) -> Option<&'static str> {
    const TRIPLES: &[&str] = &[
        "Ala", "Arg", "Asn", "Asp", "Cys", "Glu", "Gln", "Gly", "His", "Ile", "Leu", "Lys", "Met",
        "Phe", "Pro", "Ser", "Thr", "Trp", "Tyr", "Val",
    ];
    TRIPLES.iter().find(|&&t| t == code).copied()
}

/// Whether the character is a DNA nucleotide code.
#[must_use]
pub fn is_dna_nucleotide(code: char) -> bool {
    matches!(code, 'A' | 'T' | 'C' | 'G')
}

// ============================================================================
// Modification vocabularies
// ============================================================================

/// Resolves a protein-modification name from the default vocabulary to its
/// preferred label, accepting both preferred labels and long synonyms.
#[must_use]
pub fn pmod_from_keyword(word: &str) -> Option<&'static str> {
    Some(match word {
        "Ac" | "acetylation" => "Ac",
        "ADPRib" | "ADP-ribosylation" | "adenosine diphosphoribosyl" => "ADPRib",
        "Farn" | "farnesylation" => "Farn",
        "Gerger" | "geranylgeranylation" => "Gerger",
        "Glyco" | "glycosylation" => "Glyco",
        "Hy" | "hydroxylation" => "Hy",
        "ISG" | "ISGylation" | "ISG15-protein conjugation" => "ISG",
        "Me" | "methylation" => "Me",
        "Me1" | "monomethylation" | "mono-methylation" => "Me1",
        "Me2" | "dimethylation" | "di-methylation" => "Me2",
        "Me3" | "trimethylation" | "tri-methylation" => "Me3",
        "Myr" | "myristoylation" => "Myr",
        "Nedd" | "neddylation" => "Nedd",
        "NGlyco" | "N-linked glycosylation" => "NGlyco",
        "NO" | "Nitrosylation" => "NO",
        "OGlyco" | "O-linked glycosylation" => "OGlyco",
        "Palm" | "palmitoylation" => "Palm",
        "Ph" | "phosphorylation" => "Ph",
        "Sulf" | "sulfation" | "sulphation" | "sulfur addition" | "sulphur addition" => "Sulf",
        "sulfonation" | "sulphonation" => "sulfonation",
        "Sumo" | "SUMOylation" => "Sumo",
        "Ub" | "ubiquitination" | "ubiquitinylation" | "ubiquitylation" => "Ub",
        "UbK48" | "Lysine 48-linked polyubiquitination" => "UbK48",
        "UbK63" | "Lysine 63-linked polyubiquitination" => "UbK63",
        "UbMono" | "monoubiquitination" => "UbMono",
        "UbPoly" | "polyubiquitination" => "UbPoly",
        "Ox" | "oxidation" => "Ox",
        _ => return None,
    })
}

/// Resolves a BEL 1.0 single-letter protein-modification label to its
/// preferred BEL 2.0 label.
#[must_use]
pub fn pmod_from_legacy(word: &str) -> Option<&'static str> {
    Some(match word {
        "P" => "Ph",
        "A" => "Ac",
        "F" => "Farn",
        "G" => "Glyco",
        "H" => "Hy",
        "M" => "Me",
        "R" => "ADPRib",
        "S" => "Sumo",
        "U" => "Ub",
        "O" => "Ox",
        _ => return None,
    })
}

/// Resolves a gene-modification name to its preferred label.
#[must_use]
pub fn gmod_from_keyword(word: &str) -> Option<&'static str> {
    match word {
        "Me" | "M" | "methylation" => Some("Me"),
        _ => None,
    }
}

// ============================================================================
// Activities
// ============================================================================

/// Resolves a molecular-activity name — either a BEL 1.0 activity function
/// keyword or a `ma(...)` default-vocabulary name — to its preferred label.
#[must_use]
pub fn activity_from_keyword(word: &str) -> Option<&'static str> {
    Some(match word {
        "cat" | "catalyticActivity" => "cat",
        "chap" | "chaperoneActivity" => "chap",
        "gtp" | "gtpBoundActivity" => "gtp",
        "kin" | "kinaseActivity" => "kin",
        "pep" | "peptidaseActivity" => "pep",
        "phos" | "phosphataseActivity" => "phos",
        "ribo" | "ribosylationActivity" => "ribo",
        "tscript" | "transcriptionalActivity" => "tscript",
        "tport" | "transportActivity" => "tport",
        "gef" | "guanineNucleotideExchangeFactorActivity" => "gef",
        "gap" | "gtpaseActivatingProteinActivity" => "gap",
        "molecularActivity" => "molecularActivity",
        _ => return None,
    })
}

// ============================================================================
// Fixed locations for shorthand translocations
// ============================================================================

/// The GO cellular component a secreted or surface-expressed abundance
/// starts from.
#[must_use]
pub fn intracellular() -> (EcoString, EcoString, EcoString) {
    ("GO".into(), "GO:0005622".into(), "intracellular".into())
}

/// The GO cellular component `sec(...)` translocates to.
#[must_use]
pub fn extracellular_space() -> (EcoString, EcoString, EcoString) {
    ("GO".into(), "GO:0005615".into(), "extracellular space".into())
}

/// The GO cellular component `surf(...)` translocates to.
#[must_use]
pub fn cell_surface() -> (EcoString, EcoString, EcoString) {
    ("GO".into(), "GO:0009986".into(), "cell surface".into())
}
