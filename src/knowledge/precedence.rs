// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Knowledge compiled to index form.
//!
//! Built once per search from a [`Knowledge`] and the score's variables, so the
//! hot loops only touch bitsets. Construction is where conflicts are found:
//! an edge both required and forbidden, or precedence constraints that form a
//! cycle, are reported as [`SearchError::KnowledgeConflict`].

use super::Knowledge;
use crate::error::{Result, SearchError};
use crate::model::{VarId, VarSet, Variable};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Precedence {
    /// `before[b]` holds every variable that must precede `b`.
    before: Vec<VarSet>,
    /// `forbidden_parents[b]` holds every `a` with `a --> b` forbidden.
    forbidden_parents: Vec<VarSet>,
    /// `required_parents[b]` holds every `a` with `a --> b` required.
    required_parents: Vec<VarSet>,
    empty: bool,
}

impl Precedence {
    /// A precedence with no constraints over `n` variables.
    pub fn unconstrained(n: usize) -> Self {
        Self {
            before: vec![VarSet::new(); n],
            forbidden_parents: vec![VarSet::new(); n],
            required_parents: vec![VarSet::new(); n],
            empty: true,
        }
    }

    pub fn build<K: Knowledge + ?Sized>(knowledge: &K, variables: &[Variable]) -> Result<Self> {
        let n = variables.len();
        if knowledge.is_empty() {
            return Ok(Self::unconstrained(n));
        }

        let known: HashSet<&str> = variables.iter().map(Variable::name).collect();
        if let Some(unknown) = knowledge
            .mentioned_variables()
            .into_iter()
            .find(|name| !known.contains(name.as_str()))
        {
            return Err(SearchError::UnknownVariable(unknown));
        }

        let mut before = vec![VarSet::new(); n];
        let mut forbidden_parents = vec![VarSet::new(); n];
        let mut required_parents = vec![VarSet::new(); n];
        for a in variables {
            for b in variables {
                if a.id() == b.id() {
                    continue;
                }
                let forbidden = knowledge.is_forbidden(a.name(), b.name());
                let required = knowledge.is_required(a.name(), b.name());
                if forbidden && required {
                    return Err(conflict(a, b, "edge is both required and forbidden"));
                }
                if forbidden {
                    forbidden_parents[b.id()].insert(a.id());
                }
                if required {
                    required_parents[b.id()].insert(a.id());
                    before[b.id()].insert(a.id());
                } else if forbidden && !knowledge.is_forbidden(b.name(), a.name()) {
                    before[a.id()].insert(b.id());
                }
            }
        }

        let precedence = Self {
            before,
            forbidden_parents,
            required_parents,
            empty: false,
        };
        precedence.check_acyclic(variables)?;
        Ok(precedence)
    }

    fn check_acyclic(&self, variables: &[Variable]) -> Result<()> {
        let identity: Vec<VarId> = (0..self.before.len()).collect();
        let sorted = self.make_valid_order(&identity);
        if sorted.len() == identity.len() {
            return Ok(());
        }
        // Anything left unplaced sits on or behind a cycle.
        let placed: VarSet = sorted.iter().copied().collect();
        let stuck = identity
            .iter()
            .copied()
            .find(|v| !placed.contains(*v))
            .unwrap_or_default();
        let blocker = self.before[stuck]
            .iter()
            .find(|u| !placed.contains(*u))
            .unwrap_or(stuck);
        Err(conflict(
            &variables[blocker],
            &variables[stuck],
            "ordering constraints form a cycle",
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// True if `a` must come before `b`.
    pub fn must_precede(&self, a: VarId, b: VarId) -> bool {
        self.before[b].contains(a)
    }

    /// Variables that may never be parents of `v`.
    pub fn forbidden_parents(&self, v: VarId) -> &VarSet {
        &self.forbidden_parents[v]
    }

    /// Variables that must be parents of `v` whenever they precede it.
    pub fn required_parents(&self, v: VarId) -> &VarSet {
        &self.required_parents[v]
    }

    /// Stable topological sort of `order` under the precedence constraints.
    ///
    /// Each step takes the earliest-positioned variable whose required
    /// predecessors are already placed, so an order that already respects
    /// the constraints is returned unchanged. If the constraints are cyclic
    /// the result is shorter than `order`; [`Precedence::build`] rules that out.
    pub fn make_valid_order(&self, order: &[VarId]) -> Vec<VarId> {
        if self.empty {
            return order.to_vec();
        }
        let mut remaining: Vec<VarId> = order.to_vec();
        let mut placed = VarSet::with_capacity(order.len());
        let mut result = Vec::with_capacity(order.len());
        while !remaining.is_empty() {
            let Some(pos) = remaining
                .iter()
                .position(|&v| self.before[v].is_subset(&placed))
            else {
                break;
            };
            let v = remaining.remove(pos);
            placed.insert(v);
            result.push(v);
        }
        result
    }

    /// True if some pair in `order` breaks a precedence constraint.
    pub fn violates(&self, order: &[VarId]) -> bool {
        !order.is_empty() && self.violates_window(order, 0, order.len() - 1)
    }

    /// Like [`Precedence::violates`], restricted to pairs inside `order[lo..=hi]`.
    ///
    /// Rearranging a window cannot change the relative order of a pair with
    /// one member outside it, so checking the window is enough after a tuck.
    pub fn violates_window(&self, order: &[VarId], lo: usize, hi: usize) -> bool {
        if self.empty {
            return false;
        }
        let window = &order[lo..=hi];
        window.iter().enumerate().any(|(i, &later)| {
            window[..i]
                .iter()
                .any(|&earlier| self.must_precede(later, earlier))
        })
    }

    /// True if the variable at `order[i]` sits on the wrong side of another.
    ///
    /// When the rest of `order` is valid, moving one variable can only break
    /// pairs that involve it, so this is enough to check a single move.
    pub fn violates_at(&self, order: &[VarId], i: usize) -> bool {
        if self.empty {
            return false;
        }
        let v = order[i];
        order[..i].iter().any(|&u| self.must_precede(v, u))
            || order[i + 1..].iter().any(|&u| self.must_precede(u, v))
    }
}

fn conflict(a: &Variable, b: &Variable, reason: &str) -> SearchError {
    SearchError::KnowledgeConflict {
        first: a.name().to_string(),
        second: b.name().to_string(),
        reason: reason.to_string(),
    }
}
