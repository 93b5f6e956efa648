// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters are owned by each scorer, so independent starts never share
//! them. The driver merges the counters of all completed starts.

use std::fmt;
use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(Debug, EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// Primitive moves applied to the order.
    Tucks,
    /// Bookmarks restored.
    Rollbacks,
    /// Speculative sequences that strictly improved the score.
    Improvements,
    /// Grow-shrink runs requested by the scorer.
    GrowShrinkCalls,
    /// Grow-shrink requests answered from the memo.
    GrowShrinkMemoHits,
    /// Local score requests.
    LocalScoreCalls,
    /// Local score requests answered from the cache.
    LocalScoreCacheHits,
    /// Cache flushes forced by the entry limit.
    CacheResets,
    /// Starts completed by the driver.
    Starts,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            *mine += theirs;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use strum::IntoEnumIterator;
        let mut first = true;
        for counter in Counters::iter() {
            if !first {
                write!(f, " ")?;
            }
            let name: &'static str = counter.into();
            write!(f, "{}={}", name, self.get(counter))?;
            first = false;
        }
        Ok(())
    }
}
