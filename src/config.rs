// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search configuration.
//!
//! The recognized options mirror the tunable parameters of the GRaSP and BOSS
//! drivers. Depth limits use `-1` for "unlimited"; the DFS depth is still
//! capped at [`MAX_DEPTH`] so the explicit search stack stays bounded.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// Hard cap on the DFS depth when `depth` is unlimited.
pub const MAX_DEPTH: usize = 1000;

/// Which local search improves each start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Bounded-depth DFS over tucks (escapes some local optima).
    #[default]
    Grasp,
    /// Greedy mutation: move each variable to its best position.
    Boss,
    /// Greedy tucking: accept single ancestor tucks that immediately improve.
    BossTuck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of starts; start 0 may use the data order, the rest are random.
    pub num_starts: u32,
    /// Maximum DFS depth for GRaSP; values below 1 mean unlimited.
    pub depth: i32,
    /// Deepest level at which uncovered tucks are tried; -1 means unlimited.
    pub uncovered_depth: i32,
    /// Deepest level at which non-singular tucks are kept; -1 means unlimited.
    pub non_singular_depth: i32,
    /// Run GRaSP in stages of growing freedom: covered tucks only, then
    /// uncovered ones, then non-singular ones.
    pub ordered: bool,
    /// Use the given order as-is for the first start.
    pub use_data_order: bool,
    pub algorithm: Algorithm,
    /// Seed for start shuffles; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Run starts on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// Shuffle DFS candidates. Results then depend on the seed.
    pub allow_internal_randomness: bool,
    /// Flush a start's caches between search rounds once they hold more
    /// local scores than this. `None` never flushes.
    pub max_cache_entries: Option<usize>,
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_starts: 1,
            depth: 1,
            uncovered_depth: 1,
            non_singular_depth: 1,
            ordered: false,
            use_data_order: true,
            algorithm: Algorithm::Grasp,
            seed: None,
            parallel: false,
            allow_internal_randomness: false,
            max_cache_entries: None,
            verbose: false,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_starts(mut self, num_starts: u32) -> Self {
        self.num_starts = num_starts;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_uncovered_depth(mut self, uncovered_depth: i32) -> Self {
        self.uncovered_depth = uncovered_depth;
        self
    }

    pub fn with_non_singular_depth(mut self, non_singular_depth: i32) -> Self {
        self.non_singular_depth = non_singular_depth;
        self
    }

    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn with_use_data_order(mut self, use_data_order: bool) -> Self {
        self.use_data_order = use_data_order;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_internal_randomness(mut self, allow: bool) -> Self {
        self.allow_internal_randomness = allow;
        self
    }

    pub fn with_max_cache_entries(mut self, max_entries: usize) -> Self {
        self.max_cache_entries = Some(max_entries);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check that every option is in range.
    pub fn validate(&self) -> Result<()> {
        if self.num_starts == 0 {
            return Err(SearchError::InvalidConfig(
                "num_starts must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("depth", self.depth),
            ("uncovered_depth", self.uncovered_depth),
            ("non_singular_depth", self.non_singular_depth),
        ] {
            if value < -1 {
                return Err(SearchError::InvalidConfig(format!(
                    "{} must be >= -1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Resolved depth limits used by the DFS.
    pub fn depth_limits(&self) -> DepthLimits {
        DepthLimits {
            max_depth: if self.depth < 1 {
                MAX_DEPTH
            } else {
                (self.depth as usize).min(MAX_DEPTH)
            },
            uncovered: resolve_limit(self.uncovered_depth),
            non_singular: resolve_limit(self.non_singular_depth),
        }
    }

    /// The depth limits GRaSP runs through, in order.
    ///
    /// Unordered runs use [`SearchConfig::depth_limits`] alone. Ordered runs
    /// first allow covered singular tucks only, then uncovered ones, skipping
    /// a stage that would repeat a later one.
    pub fn depth_schedule(&self) -> Vec<DepthLimits> {
        let full = self.depth_limits();
        let mut schedule = Vec::with_capacity(3);
        if self.ordered && self.uncovered_depth != 0 && self.non_singular_depth != 0 {
            schedule.push(DepthLimits {
                uncovered: 0,
                non_singular: 0,
                ..full
            });
        }
        if self.ordered && self.non_singular_depth != 0 {
            schedule.push(DepthLimits {
                non_singular: 0,
                ..full
            });
        }
        schedule.push(full);
        schedule
    }
}

fn resolve_limit(value: i32) -> usize {
    if value < 0 {
        usize::MAX
    } else {
        value as usize
    }
}

/// Depth limits after resolving the `-1` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimits {
    /// Deepest DFS level.
    pub max_depth: usize,
    /// Uncovered tucks are only tried at levels `<= uncovered`.
    pub uncovered: usize,
    /// Non-singular tucks are only kept at levels `<= non_singular`.
    pub non_singular: usize,
}

impl Default for DepthLimits {
    fn default() -> Self {
        SearchConfig::default().depth_limits()
    }
}
