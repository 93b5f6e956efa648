// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! VarSet type for representing sets of variables as bitsets.
//!
//! A VarSet is a compact representation of a set of variable indices using a
//! bitset, where bit i represents the presence of variable i. Because the
//! number of variables is only known at run time, the set is backed by a
//! growable vector of u64 words.
//!
//! # Examples
//!
//! ```
//! use causal_perm_search::model::VarSet;
//!
//! let mut set = VarSet::new();
//! set.insert(0);
//! set.insert(70);
//!
//! assert_eq!(set.len(), 2);
//! assert!(set.contains(70));
//! assert!(!set.contains(3));
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 70]);
//! ```

use super::VarId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A set of variables represented as a bitset.
///
/// Equality and hashing ignore trailing zero words, so two sets holding the
/// same members compare equal regardless of how they were built. This makes
/// VarSet usable as a memo key for parent sets and prefixes.
#[derive(Debug, Clone, Default)]
pub struct VarSet {
    words: Vec<u64>,
}

impl VarSet {
    /// Create an empty variable set.
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create an empty set with room for variables `0..n` without reallocation.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            words: Vec::with_capacity(n.div_ceil(64)),
        }
    }

    /// Create a set containing all variables `0..n`.
    pub fn full(n: usize) -> Self {
        let mut words = vec![u64::MAX; n / 64];
        let remaining_bits = n % 64;
        if remaining_bits > 0 {
            words.push((1u64 << remaining_bits) - 1);
        }
        Self { words }
    }

    /// Check if the set contains a variable.
    pub fn contains(&self, v: VarId) -> bool {
        self.words
            .get(v / 64)
            .is_some_and(|w| (w >> (v % 64)) & 1 != 0)
    }

    /// Insert a variable. Returns true if it was not already present.
    pub fn insert(&mut self, v: VarId) -> bool {
        let word_idx = v / 64;
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        let mask = 1u64 << (v % 64);
        let fresh = self.words[word_idx] & mask == 0;
        self.words[word_idx] |= mask;
        fresh
    }

    /// Remove a variable. Returns true if it was present.
    pub fn remove(&mut self, v: VarId) -> bool {
        match self.words.get_mut(v / 64) {
            Some(word) => {
                let mask = 1u64 << (v % 64);
                let present = *word & mask != 0;
                *word &= !mask;
                present
            }
            None => false,
        }
    }

    /// Get the number of variables in the set (population count).
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Remove all members, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Iterate over all variables in the set, in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = VarId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            BitIter { bits: word }.map(move |bit| word_idx * 64 + bit)
        })
    }

    /// Collect the members into a sorted vector.
    pub fn to_vec(&self) -> Vec<VarId> {
        self.iter().collect()
    }

    /// True if every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Compute the union of two sets.
    pub fn union(&self, other: &Self) -> Self {
        let len = self.words.len().max(other.words.len());
        let words = (0..len)
            .map(|i| self.word(i) | other.word(i))
            .collect();
        Self { words }
    }

    /// Compute the intersection of two sets.
    pub fn intersection(&self, other: &Self) -> Self {
        let len = self.words.len().min(other.words.len());
        let words = (0..len)
            .map(|i| self.word(i) & other.word(i))
            .collect();
        Self { words }
    }

    /// Compute the difference of two sets (self - other).
    pub fn difference(&self, other: &Self) -> Self {
        let words = (0..self.words.len())
            .map(|i| self.word(i) & !other.word(i))
            .collect();
        Self { words }
    }

    fn word(&self, i: usize) -> u64 {
        self.words.get(i).copied().unwrap_or(0)
    }

    /// Number of words after dropping trailing zero words.
    fn significant_len(&self) -> usize {
        self.words
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |i| i + 1)
    }
}

/// Iterator over set bits of a single word, lowest first.
struct BitIter {
    bits: u64,
}

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let bit = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(bit)
    }
}

impl PartialEq for VarSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.significant_len();
        len == other.significant_len() && self.words[..len] == other.words[..len]
    }
}

impl Eq for VarSet {}

impl Hash for VarSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.words[..self.significant_len()].hash(state);
    }
}

impl fmt::Display for VarSet {
    /// Format a variable set as "{0, 5, 12}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for v in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl From<&[VarId]> for VarSet {
    fn from(ids: &[VarId]) -> Self {
        ids.iter().copied().collect()
    }
}

impl FromIterator<VarId> for VarSet {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl Extend<VarId> for VarSet {
    fn extend<I: IntoIterator<Item = VarId>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}
