// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Compiler core for the Biological Expression Language (BEL).
//!
//! BEL encodes causal and correlative molecular-biology statements —
//! `p(HGNC:AKT1) -> p(HGNC:EGFR)` — in a line-oriented script format. This
//! crate compiles such scripts into an in-memory labeled multigraph whose
//! vertices are typed biological entities and whose edges are qualified
//! relations carrying citation, evidence, and annotations.
//!
//! The pipeline:
//!
//! 1. [`lexer`] — collapses physical lines into logical lines (backslash
//!    continuations, multi-line quotes, comments).
//! 2. [`control`] — `SET DOCUMENT` / `DEFINE` / `SET` / `UNSET` directives;
//!    maintains the citation/evidence/annotation context and loads
//!    namespace resources through a [`resolver::Resolver`].
//! 3. [`parser`] — recursive-descent parsing and semantic validation of BEL
//!    terms and relations into the typed [`ast`] model.
//! 4. [`graph`] — the multigraph, structural inference, and the warning log.
//! 5. [`canonical`] — deterministic canonical forms and SHA-512 content
//!    hashes giving every node and edge a stable identity.
//! 6. [`nodelink`] — hash-preserving node-link JSON interchange.
//!
//! Compilation is streaming and single-threaded; per-statement problems are
//! recorded as warnings and compilation continues, while broken definitions
//! and missing mandatory metadata abort.
//!
//! # Quick start
//!
//! ```
//! use belgraph_core::prelude::*;
//!
//! let script = r#"
//! SET DOCUMENT Name = "example"
//! SET DOCUMENT Version = "1.0.0"
//! DEFINE NAMESPACE HGNC AS PATTERN "[A-Z0-9-]+"
//! SET Citation = {"PubMed", "Some title", "12345"}
//! SET Evidence = "observed in vitro"
//! p(HGNC:AKT1) -> p(HGNC:EGFR)
//! "#;
//!
//! let mut resolver = MemoryResolver::new();
//! let graph = compile(script.lines().map(String::from), CompilerOptions::default(), &mut resolver)
//!     .unwrap();
//!
//! assert!(graph.warnings().is_empty());
//! // The two proteins plus their inferred RNAs and genes.
//! assert_eq!(graph.node_count(), 6);
//! ```

pub mod ast;
pub mod canonical;
pub mod compiler;
pub mod control;
pub mod error;
pub mod graph;
pub mod language;
pub mod lexer;
pub mod nodelink;
mod parser;
pub mod resolver;

/// Re-export of the types most callers need.
pub mod prelude {
    pub use crate::ast::{
        Citation, Concept, EdgeData, Entity, Modifier, ParsedTerm, ParticipantModifier, Statement,
        Variant,
    };
    pub use crate::canonical::{EdgeKey, NodeKey, hash_edge, hash_entity};
    pub use crate::compiler::{CancellationToken, Compiler, CompilerOptions, compile, parse};
    pub use crate::error::{CompileError, Severity, Warning, WarningKind};
    pub use crate::graph::{BelGraph, Document};
    pub use crate::language::{Function, Relation};
    pub use crate::nodelink::{from_nodelink, from_nodelink_str, to_nodelink, to_nodelink_string};
    pub use crate::resolver::{
        CachedResolver, MemoryResolver, Resolver, ResourceSource, Validator,
    };
}
