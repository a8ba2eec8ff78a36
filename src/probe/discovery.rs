//! Capability discovery: pick the operation on a surface whose name satisfies
//! every predicate of a query.
//!
//! Candidates are the callable members of the surface (own plus one inherited
//! level, minus [`EXCLUDED_NAMES`]), sorted ascending, so the answer does not
//! depend on enumeration order. Discovery never fails; a member whose access
//! fails is just not a candidate.

use super::surface::{Member, Operation, Surface, EXCLUDED_NAMES};
use crate::error::ProbeError;

use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::sync::Arc;

// ─── Predicates ──────────────────────────────────────────────────────────────

/// A boolean test over a candidate name.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Case-insensitive substring.
    Contains(String),
    /// Case-insensitive substring that must be absent.
    Excludes(String),
    /// Arbitrary regular expression.
    Matches(Regex),
}

impl Predicate {
    pub fn test(&self, name: &str) -> bool {
        match self {
            Predicate::Contains(s) => name.to_lowercase().contains(&s.to_lowercase()),
            Predicate::Excludes(s) => !name.to_lowercase().contains(&s.to_lowercase()),
            Predicate::Matches(re) => re.is_match(name),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Contains(s) => write!(f, "{}", s),
            Predicate::Excludes(s) => write!(f, "!{}", s),
            Predicate::Matches(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// An ordered conjunction of predicates.
#[derive(Debug, Clone, Default)]
pub struct CapabilityQuery {
    predicates: Vec<Predicate>,
}

impl CapabilityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(mut self, s: &str) -> Self {
        self.predicates.push(Predicate::Contains(s.to_string()));
        self
    }

    pub fn excludes(mut self, s: &str) -> Self {
        self.predicates.push(Predicate::Excludes(s.to_string()));
        self
    }

    /// Add a case-insensitive regex predicate.
    pub fn matches(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.predicates.push(Predicate::Matches(re));
        Ok(self)
    }

    pub fn predicate(mut self, p: Predicate) -> Self {
        self.predicates.push(p);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when every predicate holds. An empty query accepts everything.
    pub fn is_satisfied_by(&self, name: &str) -> bool {
        self.predicates.iter().all(|p| p.test(name))
    }
}

impl std::fmt::Display for CapabilityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.predicates.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

// ─── Discovery ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Found { name: String, candidates: Vec<String> },
    NotFound { candidates: Vec<String> },
}

impl Discovery {
    pub fn name(&self) -> Option<&str> {
        match self {
            Discovery::Found { name, .. } => Some(name),
            Discovery::NotFound { .. } => None,
        }
    }

    pub fn candidates(&self) -> &[String] {
        match self {
            Discovery::Found { candidates, .. } | Discovery::NotFound { candidates } => candidates,
        }
    }
}

/// Sorted names of every callable member of `target`.
pub fn callable_members(target: &dyn Surface) -> Vec<String> {
    let names: BTreeSet<String> = target
        .own_member_names()
        .into_iter()
        .chain(target.inherited_member_names())
        .filter(|n| !EXCLUDED_NAMES.contains(&n.as_str()))
        .collect();

    names
        .into_iter()
        .filter(|n| matches!(target.member(n), Ok(Some(m)) if m.is_callable()))
        .collect()
}

/// Find the first callable member (in ascending name order) satisfying `query`.
pub fn discover(target: Option<&dyn Surface>, query: &CapabilityQuery) -> Discovery {
    let Some(target) = target else {
        return Discovery::NotFound { candidates: vec![] };
    };

    let candidates = callable_members(target);
    match candidates.iter().find(|n| query.is_satisfied_by(n)) {
        Some(name) => Discovery::Found {
            name: name.clone(),
            candidates,
        },
        None => Discovery::NotFound { candidates },
    }
}

/// [`discover`] and fetch the operation, or fail with the candidate list.
pub fn resolve(
    target: &dyn Surface,
    query: &CapabilityQuery,
) -> Result<(String, Arc<dyn Operation>), ProbeError> {
    match discover(Some(target), query) {
        Discovery::Found { name, .. } => match target.member(&name) {
            Ok(Some(Member::Operation(op))) => {
                tracing::debug!(surface = target.name(), method = %name, "Resolved capability");
                Ok((name, op))
            }
            // The member changed between enumeration and access.
            _ => Err(ProbeError::NotCallable { name }),
        },
        Discovery::NotFound { candidates } => Err(ProbeError::CapabilityNotFound {
            capability: format!("{} on {}", query, target.name()),
            candidates,
        }),
    }
}
