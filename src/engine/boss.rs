// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! BOSS: greedy best-order search.
//!
//! Two kinds of pass are available, chosen by [`BossMove`]:
//!
//! - Mutation: every variable in turn is tried at every position of the
//!   order, and left at the best-scoring position that respects precedence.
//!   Ties go to the later position.
//! - Ancestor tuck: the variable at position `i` is tried in front of every
//!   earlier position `j`, nearest first, whenever the variable there is
//!   adjacent to it by an uncovered edge. A tuck is kept only if it strictly
//!   improves the score (and respects precedence); otherwise it is rolled back.
//!
//! Passes repeat until one makes no improvement, so the score never drops.

use super::{LocalSearch, Outcome};
use crate::cancel::CancellationToken;
use crate::knowledge::Precedence;
use crate::model::VarId;
use crate::score::Score;
use crate::scorer::OrderedScorer;
use crate::statistics::Counters;
use crate::tuck;

/// The move a BOSS pass is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BossMove {
    /// Move each variable to its best position anywhere in the order.
    #[default]
    Mutation,
    /// Ancestor-tuck each variable in front of uncovered neighbors.
    AncestorTuck,
}

#[derive(Debug, Clone, Default)]
pub struct BossSearch<'k> {
    moves: BossMove,
    precedence: Option<&'k Precedence>,
    cancel: CancellationToken,
    max_cache_entries: Option<usize>,
}

impl<'k> BossSearch<'k> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_moves(mut self, moves: BossMove) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_precedence(mut self, precedence: &'k Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flush the scorer's caches after any pass that leaves them larger
    /// than `max_entries`.
    pub fn with_cache_limit(mut self, max_entries: Option<usize>) -> Self {
        self.max_cache_entries = max_entries;
        self
    }

    pub fn run<S: Score + ?Sized>(&self, scorer: &mut OrderedScorer<'_, S>) -> Outcome {
        loop {
            let start = scorer.total_score();
            let pass = match self.moves {
                BossMove::Mutation => self.mutation_pass(scorer),
                BossMove::AncestorTuck => self.tuck_pass(scorer, start),
            };
            if pass == Outcome::Cancelled {
                return Outcome::Cancelled;
            }
            if let Some(max) = self.max_cache_entries {
                scorer.reset_caches_if_larger_than(max);
            }

            let score = scorer.total_score();
            tracing::trace!(score, edges = scorer.num_edges(), "boss pass");
            if score <= start {
                tracing::debug!(score, "boss converged");
                return Outcome::Converged;
            }
            if self.moves == BossMove::Mutation {
                scorer.count(Counters::Improvements);
            }
        }
    }

    fn mutation_pass<S: Score + ?Sized>(&self, scorer: &mut OrderedScorer<'_, S>) -> Outcome {
        let n = scorer.num_variables();
        let pass: Vec<VarId> = scorer.order().to_vec();
        for k in pass {
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            let mut best_position = scorer.index(k);
            let mut best = f64::NEG_INFINITY;
            for j in 0..n {
                scorer.move_to(k, j);
                let score = scorer.total_score();
                let misplaced = self
                    .precedence
                    .is_some_and(|p| p.violates_at(scorer.order(), j));
                if score >= best && !misplaced {
                    best = score;
                    best_position = j;
                }
            }
            scorer.move_to(k, best_position);
        }
        Outcome::Converged
    }

    fn tuck_pass<S: Score + ?Sized>(
        &self,
        scorer: &mut OrderedScorer<'_, S>,
        start: f64,
    ) -> Outcome {
        let mut best = start;
        for i in 1..scorer.num_variables() {
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            let x = scorer.get(i);
            for j in (0..i).rev() {
                if j >= scorer.index(x) {
                    continue;
                }
                let z = scorer.get(j);
                if !scorer.adjacent(x, z) || scorer.covered_edge(z, x) {
                    continue;
                }

                let bookmark = scorer.bookmark();
                let outcome = tuck::ancestor_tuck(scorer, x, j);
                let score = scorer.total_score();
                let violates = self
                    .precedence
                    .is_some_and(|p| p.violates_window(scorer.order(), outcome.lo, outcome.hi));
                if score > best && !violates {
                    scorer.commit(bookmark);
                    scorer.count(Counters::Improvements);
                    best = score;
                } else {
                    scorer.go_to_bookmark(bookmark);
                }
            }
        }
        Outcome::Converged
    }
}

impl LocalSearch for BossSearch<'_> {
    fn improve<S: Score + ?Sized>(&mut self, scorer: &mut OrderedScorer<'_, S>) -> Outcome {
        self.run(scorer)
    }
}
