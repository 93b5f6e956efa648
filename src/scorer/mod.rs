// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The ordered scorer: a permutation of the variables together with the DAG
//! it induces.
//!
//! Every variable's parent set is the grow-shrink choice among the variables
//! that precede it, and the total score is the sum of the local scores. The
//! scorer keeps these consistent under moves: rearranging positions `lo..=hi`
//! only recomputes the variables in that window, since nothing else had its
//! set of predecessors changed.
//!
//! # Memory Model
//!
//! - MEMO: the score, the variables, the forbidden and required parent masks
//! - DYNAMIC: order, positions, parent sets, local scores, the trail
//! - CACHES: local scores and grow-shrink results, pure functions of their keys
//!
//! Bookmarks are backed by a [`Trail`]: each rearrangement made while a
//! bookmark is active records the window it overwrote, and rewinding writes
//! those windows back. Restoring is exact, including the floating-point
//! value of the total score.

pub mod graph;

pub use graph::Dag;

use crate::error::{Result, SearchError};
use crate::grow_shrink::{grow_shrink_from, GrowShrinkMemo, ParentChoice};
use crate::knowledge::Precedence;
use crate::model::{inverse, is_permutation, VarId, VarSet, Variable};
use crate::score::{LocalScoreCache, Score};
use crate::statistics::{Counters, Statistics};
use crate::trail::{Bookmark, Trail};
use crate::tuck;

/// Undo record: the window `order[lo..]` as it was, with its parent sets.
#[derive(Debug)]
struct WindowChange {
    lo: usize,
    order: Vec<VarId>,
    parents: Vec<(VarSet, f64)>,
}

pub struct OrderedScorer<'s, S: Score + ?Sized> {
    score: &'s S,
    variables: Vec<Variable>,
    forbidden_parents: Vec<VarSet>,
    required_parents: Vec<VarSet>,

    order: Vec<VarId>,
    /// Inverse of `order`.
    positions: Vec<usize>,
    parents: Vec<VarSet>,
    local_scores: Vec<f64>,

    trail: Trail<WindowChange>,
    local_cache: LocalScoreCache,
    memo: GrowShrinkMemo,
    stats: Statistics,
}

impl<'s, S: Score + ?Sized> OrderedScorer<'s, S> {
    /// Create a scorer over the variables of `score`, starting from the
    /// identity order.
    pub fn new(score: &'s S) -> Self {
        let variables = score.variables();
        let n = variables.len();
        let mut scorer = Self {
            score,
            variables,
            forbidden_parents: vec![VarSet::new(); n],
            required_parents: vec![VarSet::new(); n],
            order: (0..n).collect(),
            positions: (0..n).collect(),
            parents: vec![VarSet::new(); n],
            local_scores: vec![0.0; n],
            trail: Trail::new(),
            local_cache: LocalScoreCache::new(n),
            memo: GrowShrinkMemo::new(n),
            stats: Statistics::new(),
        };
        if n > 0 {
            scorer.recompute(0, n - 1);
        }
        scorer
    }

    /// Exclude forbidden parents and force required ones, as compiled in
    /// `precedence`. A required parent is only forced once it precedes its
    /// child.
    ///
    /// The current order is rescored under the new masks.
    pub fn with_precedence(mut self, precedence: &Precedence) -> Self {
        let n = self.variables.len();
        self.forbidden_parents = (0..n)
            .map(|v| precedence.forbidden_parents(v).clone())
            .collect();
        self.required_parents = (0..n)
            .map(|v| precedence.required_parents(v).clone())
            .collect();
        self.memo.clear();
        self.trail.clear();
        if n > 0 {
            self.recompute(0, n - 1);
        }
        self
    }

    /// Replace the order wholesale and return the new total score.
    ///
    /// Outstanding bookmarks stay valid: the replacement is recorded like
    /// any other move.
    ///
    /// # Panics
    ///
    /// Panics if `order` is not a permutation of the variables.
    pub fn score(&mut self, order: &[VarId]) -> f64 {
        assert!(
            is_permutation(order, self.variables.len()),
            "Cannot score {:?}: not a permutation of {} variables",
            order,
            self.variables.len()
        );
        if !order.is_empty() {
            self.replace_window(0, order);
        }
        self.total_score()
    }

    /// Sum of the local scores, added in variable index order.
    pub fn total_score(&self) -> f64 {
        self.local_scores.iter().sum()
    }

    /// Move `x` to the earlier position `j`, shifting the block in between
    /// one step right. Returns true iff the total score strictly increased.
    ///
    /// # Panics
    ///
    /// Panics unless `j < index(x)`.
    pub fn tuck(&mut self, x: VarId, j: usize) -> bool {
        let i = self.index(x);
        assert!(
            j < i,
            "Cannot tuck {} to position {}: it is at position {}",
            self.name(x),
            j,
            i
        );
        let before = self.total_score();
        self.move_to(x, j);
        self.total_score() > before
    }

    /// Move `v` to position `to`, in either direction.
    pub fn move_to(&mut self, v: VarId, to: usize) {
        let from = self.index(v);
        if from == to {
            return;
        }
        let (lo, hi) = (from.min(to), from.max(to));
        let mut window = self.order[lo..=hi].to_vec();
        tuck::shift(&mut window, from - lo, to - lo);
        self.rearrange_window(lo, &window);
    }

    /// Overwrite `order[lo..lo + window.len()]` with a rearrangement of the
    /// same variables, recomputing only that window.
    pub fn rearrange_window(&mut self, lo: usize, window: &[VarId]) {
        debug_assert!({
            let mut current = self.order[lo..lo + window.len()].to_vec();
            let mut proposed = window.to_vec();
            current.sort_unstable();
            proposed.sort_unstable();
            current == proposed
        });
        if window.is_empty() {
            return;
        }
        self.stats.increment(Counters::Tucks);
        self.replace_window(lo, window);
    }

    fn replace_window(&mut self, lo: usize, window: &[VarId]) {
        let hi = lo + window.len() - 1;
        if self.trail.is_recording() {
            let saved = self.order[lo..=hi].to_vec();
            let parents = saved
                .iter()
                .map(|&v| (self.parents[v].clone(), self.local_scores[v]))
                .collect();
            self.trail.record(WindowChange {
                lo,
                order: saved,
                parents,
            });
        }
        for (k, &v) in window.iter().enumerate() {
            self.order[lo + k] = v;
            self.positions[v] = lo + k;
        }
        self.recompute(lo, hi);
    }

    /// Recompute parent sets for positions `lo..=hi`.
    fn recompute(&mut self, lo: usize, hi: usize) {
        let mut prefix: VarSet = self.order[..lo].iter().copied().collect();
        for i in lo..=hi {
            let v = self.order[i];
            let allowed = prefix.difference(&self.forbidden_parents[v]);
            let choice = self.best_parents(v, allowed);
            self.parents[v] = choice.parents;
            self.local_scores[v] = choice.score;
            prefix.insert(v);
        }
        debug_assert!(self.check_consistency().is_ok());
    }

    fn best_parents(&mut self, v: VarId, allowed: VarSet) -> ParentChoice {
        self.stats.increment(Counters::GrowShrinkCalls);
        if let Some(choice) = self.memo.get(v, &allowed) {
            self.stats.increment(Counters::GrowShrinkMemoHits);
            return choice.clone();
        }
        let score = self.score;
        let cache = &mut self.local_cache;
        let stats = &mut self.stats;
        // The required set is fixed per node, so `(v, allowed)` stays a full key.
        let choice = grow_shrink_from(&allowed, &self.required_parents[v], |parents| {
            cache.local_score(score, v, parents, stats)
        });
        self.memo.insert(v, allowed, choice.clone());
        choice
    }

    /// Take a bookmark of the current state.
    pub fn bookmark(&mut self) -> Bookmark {
        self.trail.checkpoint()
    }

    /// Restore the state `bookmark` was taken in, releasing it and every
    /// later bookmark.
    pub fn go_to_bookmark(&mut self, bookmark: Bookmark) {
        self.stats.increment(Counters::Rollbacks);
        for change in self.trail.rewind_to(bookmark) {
            for (k, (&v, (parents, local))) in
                change.order.iter().zip(change.parents).enumerate()
            {
                self.order[change.lo + k] = v;
                self.positions[v] = change.lo + k;
                self.parents[v] = parents;
                self.local_scores[v] = local;
            }
        }
    }

    /// Keep the current state and release `bookmark`.
    pub fn commit(&mut self, bookmark: Bookmark) {
        self.trail.commit(bookmark);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn name(&self, v: VarId) -> &str {
        self.variables[v].name()
    }

    /// Look up a variable by name.
    pub fn var_id(&self, name: &str) -> Result<VarId> {
        self.variables
            .iter()
            .position(|var| var.name() == name)
            .ok_or_else(|| SearchError::UnknownVariable(name.to_string()))
    }

    pub fn order(&self) -> &[VarId] {
        &self.order
    }

    /// Variable at position `i`.
    pub fn get(&self, i: usize) -> VarId {
        self.order[i]
    }

    /// Position of `v` in the order.
    pub fn index(&self, v: VarId) -> usize {
        self.positions[v]
    }

    pub fn parents(&self, v: VarId) -> &VarSet {
        &self.parents[v]
    }

    pub fn local_score(&self, v: VarId) -> f64 {
        self.local_scores[v]
    }

    pub fn adjacent(&self, a: VarId, b: VarId) -> bool {
        self.parents[a].contains(b) || self.parents[b].contains(a)
    }

    /// True if `x --> y` is an edge and `parents(x) == parents(y) \ {x}`.
    ///
    /// Reversing a covered edge leaves the Markov equivalence class unchanged.
    pub fn covered_edge(&self, x: VarId, y: VarId) -> bool {
        if !self.parents[y].contains(x) {
            return false;
        }
        let mut others = self.parents[y].clone();
        others.remove(x);
        others == self.parents[x]
    }

    /// `v` together with every variable that has a directed path to `v`.
    pub fn ancestors(&self, v: VarId) -> VarSet {
        let mut ancestors = VarSet::with_capacity(self.num_variables());
        let mut stack = vec![v];
        while let Some(u) = stack.pop() {
            if ancestors.insert(u) {
                stack.extend(self.parents[u].iter());
            }
        }
        ancestors
    }

    pub fn num_edges(&self) -> usize {
        self.parents.iter().map(VarSet::len).sum()
    }

    /// Every edge `(parent, child)`, grouped by child in order position.
    pub fn edges(&self) -> Vec<(VarId, VarId)> {
        self.order
            .iter()
            .flat_map(|&child| self.parents[child].iter().map(move |p| (p, child)))
            .collect()
    }

    /// The DAG induced by the current order.
    pub fn graph(&self) -> Dag {
        Dag::new(self.variables.clone(), self.parents.clone())
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Count an event observed by a search driving this scorer.
    pub fn count(&mut self, counter: Counters) {
        self.stats.increment(counter);
    }

    /// Drop memoized local scores and grow-shrink results.
    pub fn clear_caches(&mut self) {
        self.local_cache.clear();
        self.memo.clear();
    }

    /// Drop the caches if they hold more than `max_entries` local scores.
    /// Returns true if they were dropped.
    pub fn reset_caches_if_larger_than(&mut self, max_entries: usize) -> bool {
        let reset = self.local_cache.reset_if_larger_than(max_entries);
        if reset {
            self.memo.clear();
            self.stats.increment(Counters::CacheResets);
        }
        reset
    }

    /// Check that the derived state agrees with the order.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let n = self.variables.len();
        if !is_permutation(&self.order, n) {
            return Err(format!("order {:?} is not a permutation", self.order));
        }
        if inverse(&self.order) != self.positions {
            return Err("positions are not the inverse of the order".into());
        }
        let mut prefix = VarSet::with_capacity(n);
        for &v in &self.order {
            if !self.parents[v].is_subset(&prefix) {
                return Err(format!(
                    "parents {} of {} do not all precede it",
                    self.parents[v],
                    self.name(v)
                ));
            }
            if !self.parents[v]
                .intersection(&self.forbidden_parents[v])
                .is_empty()
            {
                return Err(format!("{} has a forbidden parent", self.name(v)));
            }
            if !self.required_parents[v]
                .intersection(&prefix)
                .is_subset(&self.parents[v])
            {
                return Err(format!("{} is missing a required parent", self.name(v)));
            }
            let expected = self
                .score
                .local_score(v, &self.parents[v].to_vec());
            let expected = if expected.is_nan() {
                f64::NEG_INFINITY
            } else {
                expected
            };
            if expected != self.local_scores[v] {
                return Err(format!(
                    "local score of {} is {} but its parents score {}",
                    self.name(v),
                    self.local_scores[v],
                    expected
                ));
            }
            prefix.insert(v);
        }
        Ok(())
    }
}
