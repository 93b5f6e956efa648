// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Local search over orders.
//!
//! This module implements GRaSP: a depth-bounded DFS over tucks that escapes
//! local optima greedy tucking cannot. [`boss`] holds the greedy variant.
//!
//! # Architecture
//!
//! The DFS keeps an explicit stack instead of recursing. Each stack entry
//! tracks:
//! - Its depth (1 for the root)
//! - The candidate tucks computed when the entry was pushed
//! - The next candidate to try
//! - The tuck being explored below it, with the bookmark taken before it
//!
//! One step pops the next candidate of the top entry and applies it as an
//! ancestor tuck:
//! 1. Strict improvement over the score the DFS began with: commit every
//!    open bookmark and report success (first improvement, not best)
//! 2. Equal score and depth left: push a child entry from the new state
//! 3. Otherwise: rewind to the bookmark and try the next candidate
//!
//! An exhausted entry is popped; its parent rewinds the tuck that led to it.
//! The outer loop reruns the DFS from the improved order until a DFS fails,
//! so at return no tuck sequence within the limits improves the score.
//!
//! A search may be given a schedule of limits instead of one; each stage
//! runs to convergence before the next, looser one starts.

pub mod boss;

pub use boss::{BossMove, BossSearch};

use crate::cancel::CancellationToken;
use crate::config::DepthLimits;
use crate::knowledge::Precedence;
use crate::model::VarId;
use crate::score::Score;
use crate::scorer::OrderedScorer;
use crate::statistics::Counters;
use crate::trail::Bookmark;
use crate::tuck::{self, TuckMove, TuckOutcome};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// How a local search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No further improvement within the search's limits.
    Converged,
    /// The cancellation token fired. The scorer holds a consistent order no
    /// worse than the one the search started from.
    Cancelled,
}

/// A search that improves the scorer's order in place.
pub trait LocalSearch {
    fn improve<S: Score + ?Sized>(&mut self, scorer: &mut OrderedScorer<'_, S>) -> Outcome;
}

/// Result of one DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Improved,
    Exhausted,
    Cancelled,
}

/// Stack entry tracking one level of the DFS.
#[derive(Debug)]
struct StackEntry {
    depth: usize,
    candidates: Vec<TuckMove>,
    next: usize,
    /// Tuck applied below this entry, undone when control returns here.
    active: Option<(TuckMove, Bookmark)>,
}

/// Bounded-depth DFS over tucks.
pub struct GraspSearch<'k> {
    schedule: Vec<DepthLimits>,
    precedence: Option<&'k Precedence>,
    cancel: CancellationToken,
    /// Shuffles candidates when set.
    rng: Option<StdRng>,
    max_cache_entries: Option<usize>,
}

impl<'k> GraspSearch<'k> {
    pub fn new(limits: DepthLimits) -> Self {
        Self::staged(vec![limits])
    }

    /// Run each set of limits to convergence in turn.
    pub fn staged(schedule: Vec<DepthLimits>) -> Self {
        Self {
            schedule,
            precedence: None,
            cancel: CancellationToken::new(),
            rng: None,
            max_cache_entries: None,
        }
    }

    /// Roll back tucks that break the precedence constraints.
    pub fn with_precedence(mut self, precedence: &'k Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Try candidates in a random order drawn from `seed`.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Flush the scorer's caches after any DFS round that leaves them
    /// larger than `max_entries`.
    pub fn with_cache_limit(mut self, max_entries: Option<usize>) -> Self {
        self.max_cache_entries = max_entries;
        self
    }

    /// Improve the order until no tuck sequence within the limits helps.
    pub fn run<S: Score + ?Sized>(&mut self, scorer: &mut OrderedScorer<'_, S>) -> Outcome {
        for stage in 0..self.schedule.len() {
            let limits = self.schedule[stage];
            loop {
                let before = scorer.total_score();
                let step = self.dfs(scorer, before, &limits);
                if let Some(max) = self.max_cache_entries {
                    scorer.reset_caches_if_larger_than(max);
                }
                match step {
                    Step::Improved => {
                        scorer.count(Counters::Improvements);
                        tracing::trace!(
                            from = before,
                            to = scorer.total_score(),
                            edges = scorer.num_edges(),
                            "grasp improved"
                        );
                    }
                    Step::Exhausted => {
                        tracing::debug!(stage, score = before, "grasp converged");
                        break;
                    }
                    Step::Cancelled => return Outcome::Cancelled,
                }
            }
        }
        Outcome::Converged
    }

    fn entry<S: Score + ?Sized>(
        &mut self,
        scorer: &OrderedScorer<'_, S>,
        depth: usize,
    ) -> StackEntry {
        let mut candidates = tuck::candidates(scorer);
        if let Some(rng) = self.rng.as_mut() {
            candidates.shuffle(rng);
        }
        StackEntry {
            depth,
            candidates,
            next: 0,
            active: None,
        }
    }

    fn violates<S: Score + ?Sized>(
        &self,
        scorer: &OrderedScorer<'_, S>,
        outcome: &TuckOutcome,
    ) -> bool {
        self.precedence
            .is_some_and(|p| p.violates_window(scorer.order(), outcome.lo, outcome.hi))
    }

    fn dfs<S: Score + ?Sized>(
        &mut self,
        scorer: &mut OrderedScorer<'_, S>,
        s_old: f64,
        limits: &DepthLimits,
    ) -> Step {
        let mut stack = vec![self.entry(scorer, 1)];
        let mut path: Vec<TuckMove> = Vec::new();
        let mut history: HashSet<Vec<(VarId, VarId)>> = HashSet::new();

        while let Some(entry) = stack.last_mut() {
            if let Some((_, bookmark)) = entry.active.take() {
                path.pop();
                scorer.go_to_bookmark(bookmark);
            }

            if self.cancel.is_cancelled() {
                if let Some(bookmark) = outermost_bookmark(&stack) {
                    scorer.go_to_bookmark(bookmark);
                }
                return Step::Cancelled;
            }

            let entry = match stack.last_mut() {
                Some(entry) => entry,
                None => break,
            };
            let Some(&candidate) = entry.candidates.get(entry.next) else {
                stack.pop();
                continue;
            };
            entry.next += 1;
            let depth = entry.depth;

            let covered = scorer.covered_edge(candidate.x, candidate.y);
            if covered && path.iter().any(|t| t.key() == candidate.key()) {
                continue;
            }
            if !covered && depth > limits.uncovered {
                continue;
            }

            let bookmark = scorer.bookmark();
            let j = scorer.index(candidate.x);
            let outcome = tuck::ancestor_tuck(scorer, candidate.y, j);
            if (depth > limits.non_singular && !outcome.singular)
                || self.violates(scorer, &outcome)
            {
                scorer.go_to_bookmark(bookmark);
                continue;
            }

            let s_new = scorer.total_score();
            if s_new > s_old {
                let outermost = outermost_bookmark(&stack).unwrap_or(bookmark);
                scorer.commit(outermost);
                return Step::Improved;
            }

            if s_new == s_old && depth < limits.max_depth {
                path.push(candidate);
                let explore = depth <= limits.uncovered || {
                    let mut tucks: Vec<(VarId, VarId)> = path.iter().map(TuckMove::key).collect();
                    tucks.sort_unstable();
                    tucks.dedup();
                    history.insert(tucks)
                };
                if explore {
                    if let Some(entry) = stack.last_mut() {
                        entry.active = Some((candidate, bookmark));
                    }
                    let child = self.entry(scorer, depth + 1);
                    stack.push(child);
                    continue;
                }
                path.pop();
            }
            scorer.go_to_bookmark(bookmark);
        }
        Step::Exhausted
    }
}

fn outermost_bookmark(stack: &[StackEntry]) -> Option<Bookmark> {
    stack
        .iter()
        .find_map(|entry| entry.active.map(|(_, bookmark)| bookmark))
}

impl LocalSearch for GraspSearch<'_> {
    fn improve<S: Score + ?Sized>(&mut self, scorer: &mut OrderedScorer<'_, S>) -> Outcome {
        self.run(scorer)
    }
}
