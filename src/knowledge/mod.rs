// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Background knowledge over variable names.
//!
//! Knowledge is consulted, never mutated, by the search. It constrains which
//! orders are acceptable: `required(a, b)` means `a` must precede `b`, and
//! `forbidden(a, b)` means `a` must not precede `b`. An edge forbidden in both
//! directions imposes no order, only that neither variable may be a parent of
//! the other. The search never queries a [`Knowledge`] directly; it compiles
//! it once into a [`Precedence`] matrix.

pub mod precedence;

pub use precedence::Precedence;

use crate::error::{Result, SearchError};
use std::collections::{HashMap, HashSet};

/// Read-only knowledge capability.
pub trait Knowledge {
    /// True if the edge `a --> b` is forbidden.
    fn is_forbidden(&self, a: &str, b: &str) -> bool;

    /// True if the edge `a --> b` is required.
    fn is_required(&self, a: &str, b: &str) -> bool;

    /// True if no constraint of any kind is present.
    fn is_empty(&self) -> bool;

    /// Every variable name the knowledge refers to, when known.
    fn mentioned_variables(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Explicit required/forbidden edges plus temporal tiers.
///
/// Variables in a later tier may not cause variables in an earlier tier.
/// A tier may additionally forbid every edge within it.
#[derive(Debug, Clone, Default)]
pub struct TieredKnowledge {
    forbidden: HashSet<(String, String)>,
    required: HashSet<(String, String)>,
    tier_of: HashMap<String, usize>,
    forbidden_within: HashSet<usize>,
}

impl TieredKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid `a --> b`.
    pub fn set_forbidden(&mut self, a: &str, b: &str) -> Result<()> {
        if self.is_required(a, b) {
            return Err(conflict(a, b, "cannot forbid a required edge"));
        }
        self.forbidden.insert((a.to_string(), b.to_string()));
        Ok(())
    }

    /// Require `a --> b`.
    pub fn set_required(&mut self, a: &str, b: &str) -> Result<()> {
        if self.is_forbidden(a, b) {
            return Err(conflict(a, b, "cannot require a forbidden edge"));
        }
        self.required.insert((a.to_string(), b.to_string()));
        Ok(())
    }

    pub fn remove_forbidden(&mut self, a: &str, b: &str) {
        self.forbidden.remove(&(a.to_string(), b.to_string()));
    }

    pub fn remove_required(&mut self, a: &str, b: &str) {
        self.required.remove(&(a.to_string(), b.to_string()));
    }

    /// Place `var` in `tier`, replacing any earlier placement.
    pub fn add_to_tier(&mut self, tier: usize, var: &str) {
        self.tier_of.insert(var.to_string(), tier);
    }

    /// Forbid (or allow) every edge between two members of `tier`.
    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) {
        if forbidden {
            self.forbidden_within.insert(tier);
        } else {
            self.forbidden_within.remove(&tier);
        }
    }

    pub fn tier(&self, var: &str) -> Option<usize> {
        self.tier_of.get(var).copied()
    }

    /// One more than the highest tier in use.
    pub fn num_tiers(&self) -> usize {
        self.tier_of.values().max().map_or(0, |t| t + 1)
    }

    fn forbidden_by_tiers(&self, a: &str, b: &str) -> bool {
        match (self.tier(a), self.tier(b)) {
            (Some(ta), Some(tb)) => ta > tb || (ta == tb && self.forbidden_within.contains(&ta)),
            _ => false,
        }
    }
}

impl Knowledge for TieredKnowledge {
    fn is_forbidden(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        self.forbidden.contains(&(a.to_string(), b.to_string())) || self.forbidden_by_tiers(a, b)
    }

    fn is_required(&self, a: &str, b: &str) -> bool {
        a != b && self.required.contains(&(a.to_string(), b.to_string()))
    }

    fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tier_of.is_empty()
    }

    fn mentioned_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .forbidden
            .iter()
            .chain(self.required.iter())
            .flat_map(|(a, b)| [a.clone(), b.clone()])
            .chain(self.tier_of.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

fn conflict(a: &str, b: &str, reason: &str) -> SearchError {
    SearchError::KnowledgeConflict {
        first: a.to_string(),
        second: b.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_edges() {
        let mut knowledge = TieredKnowledge::new();
        assert!(knowledge.is_empty());

        knowledge.set_required("A", "B").unwrap();
        knowledge.set_forbidden("C", "D").unwrap();
        assert!(knowledge.is_required("A", "B"));
        assert!(!knowledge.is_required("B", "A"));
        assert!(knowledge.is_forbidden("C", "D"));
        assert!(!knowledge.is_forbidden("D", "C"));
        assert!(!knowledge.is_empty());

        assert_eq!(knowledge.mentioned_variables(), vec!["A", "B", "C", "D"]);

        knowledge.remove_required("A", "B");
        knowledge.remove_forbidden("C", "D");
        assert!(knowledge.is_empty());
    }

    #[test]
    fn test_conflicts_are_reported() {
        let mut knowledge = TieredKnowledge::new();
        knowledge.set_required("A", "B").unwrap();
        assert!(matches!(
            knowledge.set_forbidden("A", "B"),
            Err(SearchError::KnowledgeConflict { .. })
        ));

        knowledge.add_to_tier(0, "X");
        knowledge.add_to_tier(1, "Y");
        // Y is in a later tier, so Y --> X is forbidden.
        let err = knowledge.set_required("Y", "X").unwrap_err();
        assert_eq!(
            err,
            SearchError::KnowledgeConflict {
                first: "Y".into(),
                second: "X".into(),
                reason: "cannot require a forbidden edge".into(),
            }
        );
    }

    #[test]
    fn test_tiers() {
        let mut knowledge = TieredKnowledge::new();
        knowledge.add_to_tier(0, "A");
        knowledge.add_to_tier(0, "B");
        knowledge.add_to_tier(2, "C");
        assert_eq!(knowledge.num_tiers(), 3);

        assert!(knowledge.is_forbidden("C", "A"));
        assert!(!knowledge.is_forbidden("A", "C"));
        assert!(!knowledge.is_forbidden("A", "B"));
        assert!(!knowledge.is_forbidden("A", "Z"));

        knowledge.set_tier_forbidden_within(0, true);
        assert!(knowledge.is_forbidden("A", "B"));
        assert!(knowledge.is_forbidden("B", "A"));
        assert!(!knowledge.is_forbidden("A", "A"));
    }
}
