// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Tucks: the moves of permutation search.
//!
//! The primitive tuck moves the variable at position `i` to an earlier
//! position `j`, shifting `order[j..i]` one step right. Everything else here
//! is built from it:
//!
//! - [`ancestor_tuck`] moves a variable in front of position `j` together
//!   with those of its ancestors that sat in between, so no ancestor ends up
//!   after it. This is the move GRaSP and BOSS apply through the scorer.
//! - [`candidates`] lists every edge `x --> y` of the current DAG; tucking
//!   `y` in front of `x` reverses it.
//! - [`covered_edges`] keeps the candidates whose edge is covered.

use crate::model::VarId;
use crate::score::Score;
use crate::scorer::OrderedScorer;

/// Move `order[from]` to position `to`, shifting the elements in between by
/// one. Works in either direction.
pub fn shift(order: &mut [VarId], from: usize, to: usize) {
    if from > to {
        order[to..=from].rotate_right(1);
    } else if from < to {
        order[from..=to].rotate_left(1);
    }
}

/// Move the variable at position `i` to the earlier position `j`.
///
/// # Panics
///
/// Panics unless `j < i`.
pub fn tuck(order: &mut [VarId], i: usize, j: usize) {
    assert!(j < i, "Cannot tuck position {} to {}: not earlier", i, j);
    shift(order, i, j);
}

/// An edge `x --> y` that could be reversed by tucking `y` before `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TuckMove {
    pub x: VarId,
    pub y: VarId,
}

impl TuckMove {
    /// The unordered pair, for remembering which edges a DFS path touched.
    pub fn key(&self) -> (VarId, VarId) {
        (self.x.min(self.y), self.x.max(self.y))
    }
}

/// What an ancestor tuck did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuckOutcome {
    /// First position rewritten.
    pub lo: usize,
    /// Last position rewritten.
    pub hi: usize,
    /// False if a moved ancestor had the displaced variable as a parent.
    pub singular: bool,
}

/// Tuck `y` in front of the variable at position `j`, carrying along the
/// ancestors of `y` found between them, in their current relative order.
///
/// With `x = order[j]`, the window `order[j..=index(y)]` becomes: the moved
/// ancestors, then `y`, then `x` and the remaining variables.
///
/// # Panics
///
/// Panics unless `j < index(y)`.
pub fn ancestor_tuck<S: Score + ?Sized>(
    scorer: &mut OrderedScorer<'_, S>,
    y: VarId,
    j: usize,
) -> TuckOutcome {
    let i = scorer.index(y);
    assert!(
        j < i,
        "Cannot tuck {} to position {}: it is at position {}",
        scorer.name(y),
        j,
        i
    );
    let x = scorer.get(j);
    let ancestors = scorer.ancestors(y);
    let mut window = scorer.order()[j..=i].to_vec();
    let mut next = 0;
    let mut singular = true;
    for k in 1..window.len() {
        let v = window[k];
        if ancestors.contains(v) {
            if v != y && scorer.parents(v).contains(x) {
                singular = false;
            }
            tuck(&mut window, k, next);
            next += 1;
        }
    }
    scorer.rearrange_window(j, &window);
    TuckOutcome {
        lo: j,
        hi: i,
        singular,
    }
}

/// Every edge `x --> y`, with `y` in order position and `x` ascending.
pub fn candidates<S: Score + ?Sized>(scorer: &OrderedScorer<'_, S>) -> Vec<TuckMove> {
    scorer
        .order()
        .iter()
        .flat_map(|&y| scorer.parents(y).iter().map(move |x| TuckMove { x, y }))
        .collect()
}

/// The candidates whose edge is covered.
pub fn covered_edges<S: Score + ?Sized>(scorer: &OrderedScorer<'_, S>) -> Vec<TuckMove> {
    candidates(scorer)
        .into_iter()
        .filter(|m| scorer.covered_edge(m.x, m.y))
        .collect()
}
