// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Namespace and annotation resource resolution.
//!
//! A `DEFINE NAMESPACE ... AS URL` directive needs a set of valid names (and
//! their allowed functions) before any statement can be validated against it.
//! Fetching is not this crate's business — transport lives with the caller —
//! so the seam is the [`Resolver`] trait: given a URL, produce a
//! [`Validator`]. The compiler blocks on `resolve` during `DEFINE` processing
//! and treats failure as fatal.
//!
//! Two implementations ship here: [`MemoryResolver`], a plain URL→validator
//! map for tests and embedders that prefetch, and [`CachedResolver`], which
//! memoizes an inner resolver so identical URLs yield identical validators.
//!
//! [`parse_resource`] understands the classic `.belns`/`.belanno` INI
//! dialect, so a caller that fetched a resource body can turn it into a
//! validator in one call.

use ecow::EcoString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::language::{Function, encoding_functions};

/// How a namespace or annotation keyword was defined, as recorded in graph
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceSource {
    /// `DEFINE ... AS URL "..."`.
    Url(EcoString),
    /// `DEFINE ... AS PATTERN "..."`.
    Pattern(EcoString),
    /// `DEFINE ... AS LIST {...}`.
    List(BTreeSet<EcoString>),
}

/// The outcome of checking one name against a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCheck {
    /// The name is valid in this context.
    Valid,
    /// The name is not in the enumerated set.
    MissingName,
    /// The name does not match the pattern.
    PatternMismatch,
    /// The name exists but is not allowed under the requested function.
    InvalidFunction(BTreeSet<Function>),
}

/// A compiled membership test for one namespace or annotation.
#[derive(Debug, Clone)]
pub enum Validator {
    /// An explicit name set. Each name may carry the set of functions it is
    /// legal under; an empty set means unrestricted.
    Enumerated {
        /// The keyword declared inside the resource itself, when known.
        keyword: Option<EcoString>,
        /// name → allowed functions.
        names: BTreeMap<EcoString, BTreeSet<Function>>,
    },
    /// A regular-expression test.
    Regex(Regex),
    /// An enumerated set with parent links, e.g. a tissue hierarchy.
    Hierarchical {
        /// The member names.
        names: BTreeSet<EcoString>,
        /// child → parent.
        parents: BTreeMap<EcoString, EcoString>,
    },
}

impl Validator {
    /// Builds an enumerated validator with no function restrictions.
    #[must_use]
    pub fn plain(names: impl IntoIterator<Item = impl Into<EcoString>>) -> Self {
        Validator::Enumerated {
            keyword: None,
            names: names
                .into_iter()
                .map(|name| (name.into(), BTreeSet::new()))
                .collect(),
        }
    }

    /// Builds an enumerated validator with per-name function restrictions.
    #[must_use]
    pub fn enumerated(
        names: impl IntoIterator<Item = (EcoString, BTreeSet<Function>)>,
    ) -> Self {
        Validator::Enumerated {
            keyword: None,
            names: names.into_iter().collect(),
        }
    }

    /// Compiles a regex validator. The pattern is anchored at the start, as
    /// namespace patterns conventionally are.
    ///
    /// # Errors
    ///
    /// Returns the underlying regex compilation error.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Validator::Regex(Regex::new(&format!("^(?:{pattern})"))?))
    }

    /// The keyword declared inside the backing resource, if any.
    #[must_use]
    pub fn declared_keyword(&self) -> Option<&EcoString> {
        match self {
            Validator::Enumerated { keyword, .. } => keyword.as_ref(),
            _ => None,
        }
    }

    /// Whether the name passes this validator, ignoring functions.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Validator::Enumerated { names, .. } => names.contains_key(name),
            Validator::Regex(regex) => regex.is_match(name),
            Validator::Hierarchical { names, .. } => names.contains(name),
        }
    }

    /// Checks a name, optionally under a function context.
    #[must_use]
    pub fn check(&self, name: &str, function: Option<Function>) -> NameCheck {
        match self {
            Validator::Enumerated { names, .. } => match names.get(name) {
                None => NameCheck::MissingName,
                Some(allowed) => match function {
                    Some(function) if !allowed.is_empty() && !allowed.contains(&function) => {
                        NameCheck::InvalidFunction(allowed.clone())
                    }
                    _ => NameCheck::Valid,
                },
            },
            Validator::Regex(regex) => {
                if regex.is_match(name) {
                    NameCheck::Valid
                } else {
                    NameCheck::PatternMismatch
                }
            }
            Validator::Hierarchical { names, .. } => {
                if names.contains(name) {
                    NameCheck::Valid
                } else {
                    NameCheck::MissingName
                }
            }
        }
    }
}

/// Why a resource could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ResolverError {
    /// Human-readable failure description.
    pub reason: EcoString,
}

impl ResolverError {
    /// Creates a resolver error.
    #[must_use]
    pub fn new(reason: impl Into<EcoString>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turns a resource URL into a validator.
///
/// Implementations may block; the compiler only calls this while processing a
/// `DEFINE` directive, and compilation order is preserved around the call.
/// Implementations are responsible for their own timeouts — an expired fetch
/// is just a [`ResolverError`].
pub trait Resolver {
    /// Resolves a URL to a validator.
    ///
    /// # Errors
    ///
    /// Any failure to produce a validator; the compiler surfaces it as a
    /// fatal `ResourceUnavailable` error for the offending `DEFINE`.
    fn resolve(&mut self, url: &str) -> Result<Arc<Validator>, ResolverError>;
}

/// A resolver backed by a fixed URL→validator map.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    resources: HashMap<String, Arc<Validator>>,
}

impl MemoryResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator for a URL.
    pub fn insert(&mut self, url: impl Into<String>, validator: Validator) {
        self.resources.insert(url.into(), Arc::new(validator));
    }

    /// Builder-style [`MemoryResolver::insert`].
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, validator: Validator) -> Self {
        self.insert(url, validator);
        self
    }
}

impl Resolver for MemoryResolver {
    fn resolve(&mut self, url: &str) -> Result<Arc<Validator>, ResolverError> {
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| ResolverError::new(format!("no resource registered for {url}")))
    }
}

/// Memoizes an inner resolver by URL, so identical URLs yield the identical
/// validator without repeating the fetch.
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    cache: HashMap<String, Arc<Validator>>,
}

impl<R> CachedResolver<R> {
    /// Wraps a resolver with a fresh cache.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }
}

impl<R: Resolver> Resolver for CachedResolver<R> {
    fn resolve(&mut self, url: &str) -> Result<Arc<Validator>, ResolverError> {
        if let Some(validator) = self.cache.get(url) {
            return Ok(Arc::clone(validator));
        }
        let validator = self.inner.resolve(url)?;
        self.cache.insert(url.to_owned(), Arc::clone(&validator));
        Ok(validator)
    }
}

/// Parses a `.belns`/`.belanno` resource body into a validator.
///
/// The dialect is INI-style: a `[Namespace]` or `[AnnotationDefinition]`
/// section declaring `Keyword=...`, then a `[Values]` section of
/// `name|payload` lines. In a namespace, the payload is the encoding string
/// (`GRP`, `A`, ...); in an annotation it is a description and carries no
/// function information.
#[must_use]
pub fn parse_resource(text: &str) -> Validator {
    let mut keyword: Option<EcoString> = None;
    let mut names: BTreeMap<EcoString, BTreeSet<Function>> = BTreeMap::new();
    let mut section = "";
    let mut is_namespace = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            section = rest.strip_suffix(']').unwrap_or(rest);
            if section == "Namespace" {
                is_namespace = true;
            }
            continue;
        }
        match section {
            "Namespace" | "AnnotationDefinition" => {
                if let Some(value) = line.strip_prefix("Keyword=") {
                    keyword = Some(value.trim().into());
                }
            }
            "Values" => {
                let (name, payload) = match line.split_once('|') {
                    Some((name, payload)) => (name, payload),
                    None => (line, ""),
                };
                let functions = if is_namespace {
                    payload
                        .chars()
                        .flat_map(|c| encoding_functions(c).iter().copied())
                        .collect()
                } else {
                    BTreeSet::new()
                };
                names.insert(name.into(), functions);
            }
            _ => {}
        }
    }

    Validator::Enumerated { keyword, names }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_validator_checks_membership() {
        let validator = Validator::plain(["AKT1", "EGFR"]);
        assert!(validator.contains("AKT1"));
        assert!(!validator.contains("TP53"));
        assert_eq!(validator.check("AKT1", Some(Function::Protein)), NameCheck::Valid);
        assert_eq!(validator.check("TP53", None), NameCheck::MissingName);
    }

    #[test]
    fn enumerated_validator_enforces_functions() {
        let validator = Validator::enumerated([(
            "MIR21".into(),
            BTreeSet::from([Function::MicroRna, Function::Gene]),
        )]);
        assert_eq!(validator.check("MIR21", Some(Function::MicroRna)), NameCheck::Valid);
        assert!(matches!(
            validator.check("MIR21", Some(Function::Protein)),
            NameCheck::InvalidFunction(_)
        ));
        // No function context: membership only.
        assert_eq!(validator.check("MIR21", None), NameCheck::Valid);
    }

    #[test]
    fn pattern_validator_is_anchored() {
        let validator = Validator::pattern(r"\d+").unwrap();
        assert_eq!(validator.check("12345", None), NameCheck::Valid);
        assert_eq!(validator.check("x12345", None), NameCheck::PatternMismatch);
    }

    #[test]
    fn memory_resolver_round_trip() {
        let mut resolver = MemoryResolver::new().with("u", Validator::plain(["A"]));
        assert!(resolver.resolve("u").is_ok());
        assert!(resolver.resolve("missing").is_err());
    }

    #[test]
    fn cached_resolver_returns_identical_validators() {
        struct Counting(usize);
        impl Resolver for Counting {
            fn resolve(&mut self, _url: &str) -> Result<Arc<Validator>, ResolverError> {
                self.0 += 1;
                Ok(Arc::new(Validator::plain(["A"])))
            }
        }
        let mut resolver = CachedResolver::new(Counting(0));
        let first = resolver.resolve("u").unwrap();
        let second = resolver.resolve("u").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.inner.0, 1);
    }

    #[test]
    fn parses_belns_with_encodings() {
        let body = "\
[Namespace]
Keyword=HGNC
CreatedDateTime=2015-06-11T19:51:19

[Values]
AKT1|GRP
MIR21|GRM
";
        let validator = parse_resource(body);
        assert_eq!(validator.declared_keyword().map(EcoString::as_str), Some("HGNC"));
        assert_eq!(validator.check("AKT1", Some(Function::Protein)), NameCheck::Valid);
        assert!(matches!(
            validator.check("AKT1", Some(Function::Complex)),
            NameCheck::InvalidFunction(_)
        ));
    }

    #[test]
    fn parses_belanno_without_encodings() {
        let body = "\
[AnnotationDefinition]
Keyword=CellLine

[Values]
1321N1 cell|CLO_0001072
";
        let validator = parse_resource(body);
        assert_eq!(validator.check("1321N1 cell", None), NameCheck::Valid);
        assert_eq!(validator.check("1321N1 cell", Some(Function::Protein)), NameCheck::Valid);
    }
}
