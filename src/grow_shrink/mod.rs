// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Greedy parent selection.
//!
//! Given a node and the set of variables allowed to be its parents (its
//! predecessors in the current order), grow-shrink picks a locally optimal
//! parent set:
//!
//! 1. Grow: starting from the empty set, repeatedly add the single allowed
//!    candidate that most increases the local score, while some addition
//!    strictly improves it.
//! 2. Shrink: repeatedly remove the single member whose removal most
//!    increases the local score, while some removal strictly improves it.
//!
//! Ties are broken by the first candidate found in ascending index order, so
//! results are deterministic.
//!
//! [`grow_shrink_from`] seeds the grow phase with required parents, which the
//! shrink phase never removes.

pub mod memo;

pub use memo::GrowShrinkMemo;

use crate::model::VarSet;

/// A parent set and its local score.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentChoice {
    pub parents: VarSet,
    pub score: f64,
}

/// Run grow-shrink over `allowed`, scoring candidate sets with `local_score`.
///
/// The result is a subset of `allowed`. With `allowed` empty the result is
/// the empty set scored once.
pub fn grow_shrink<F>(allowed: &VarSet, local_score: F) -> ParentChoice
where
    F: FnMut(&VarSet) -> f64,
{
    grow_shrink_from(allowed, &VarSet::new(), local_score)
}

/// Grow-shrink starting from the members of `required` inside `allowed`.
///
/// Those members stay in the result regardless of score.
pub fn grow_shrink_from<F>(
    allowed: &VarSet,
    required: &VarSet,
    mut local_score: F,
) -> ParentChoice
where
    F: FnMut(&VarSet) -> f64,
{
    let mut parents = allowed.intersection(required);
    let mut score = local_score(&parents);

    // Grow
    loop {
        let mut best: Option<(usize, f64)> = None;
        for candidate in allowed.iter().filter(|c| !parents.contains(*c)) {
            let mut trial = parents.clone();
            trial.insert(candidate);
            let trial_score = local_score(&trial);
            if best.map_or(true, |(_, s)| trial_score > s) {
                best = Some((candidate, trial_score));
            }
        }
        match best {
            Some((candidate, s)) if s > score => {
                parents.insert(candidate);
                score = s;
            }
            _ => break,
        }
    }

    // Shrink
    loop {
        let mut best: Option<(usize, f64)> = None;
        for member in parents.iter().filter(|m| !required.contains(*m)) {
            let mut trial = parents.clone();
            trial.remove(member);
            let trial_score = local_score(&trial);
            if best.map_or(true, |(_, s)| trial_score > s) {
                best = Some((member, trial_score));
            }
        }
        match best {
            Some((member, s)) if s > score => {
                parents.remove(member);
                score = s;
            }
            _ => break,
        }
    }

    ParentChoice { parents, score }
}
