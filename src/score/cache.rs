// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memoized local scores.

use super::Score;
use crate::model::{VarId, VarSet};
use crate::statistics::{Counters, Statistics};
use std::collections::HashMap;

/// Cache of `local_score(node, parents)` keyed by node and parent set.
///
/// Grow-shrink evaluates many overlapping parent sets, and tucks revisit the
/// same prefixes again and again, so most requests are answered here. NaN
/// scores are stored as negative infinity so a broken score can never be
/// chosen as an improvement.
#[derive(Debug, Default)]
pub struct LocalScoreCache {
    by_node: Vec<HashMap<VarSet, f64>>,
    scratch: Vec<VarId>,
}

impl LocalScoreCache {
    pub fn new(num_variables: usize) -> Self {
        Self {
            by_node: vec![HashMap::new(); num_variables],
            scratch: Vec::with_capacity(num_variables),
        }
    }

    /// Local score of `node` given `parents`, computed at most once.
    pub fn local_score<S: Score + ?Sized>(
        &mut self,
        score: &S,
        node: VarId,
        parents: &VarSet,
        stats: &mut Statistics,
    ) -> f64 {
        stats.increment(Counters::LocalScoreCalls);
        if let Some(&cached) = self.by_node[node].get(parents) {
            stats.increment(Counters::LocalScoreCacheHits);
            return cached;
        }

        self.scratch.clear();
        self.scratch.extend(parents.iter());
        let value = score.local_score(node, &self.scratch);
        let value = if value.is_nan() {
            f64::NEG_INFINITY
        } else {
            value
        };

        self.by_node[node].insert(parents.clone(), value);
        value
    }

    /// Total number of cached entries.
    pub fn len(&self) -> usize {
        self.by_node.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.by_node.iter_mut().for_each(HashMap::clear);
    }

    /// Drop every entry if the cache holds more than `max_entries`.
    ///
    /// Returns true if the cache was cleared.
    pub fn reset_if_larger_than(&mut self, max_entries: usize) -> bool {
        if self.len() > max_entries {
            tracing::debug!(entries = self.len(), "clearing local score cache");
            self.clear();
            true
        } else {
            false
        }
    }
}
