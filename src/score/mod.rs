// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Score capability consumed by the search.
//!
//! A score assigns a local value to a node given a candidate parent set; the
//! total score of a DAG is the sum of its local scores. Implementations (BIC,
//! BDeu, conditional-Gaussian likelihood, ...) live outside this crate. The
//! search assumes local scores are pure functions of their arguments, which
//! is what makes [`LocalScoreCache`] valid.

pub mod cache;

pub use cache::LocalScoreCache;

use crate::model::{VarId, Variable};

/// A decomposable score over a fixed set of variables.
///
/// Parent slices are always passed in ascending index order and never
/// contain `node` itself.
pub trait Score {
    /// The variables this score is defined over, indexed `0..n`.
    fn variables(&self) -> Vec<Variable>;

    /// Score of `node` given exactly `parents`. Higher is better.
    fn local_score(&self, node: VarId, parents: &[VarId]) -> f64;

    /// Change in the local score of `y` when `x` is added to parents `z`.
    fn local_score_diff(&self, x: VarId, y: VarId, z: &[VarId]) -> f64 {
        let mut with_x = z.to_vec();
        if let Err(pos) = with_x.binary_search(&x) {
            with_x.insert(pos, x);
        }
        self.local_score(y, &with_x) - self.local_score(y, z)
    }

    /// Number of variables.
    fn num_variables(&self) -> usize {
        self.variables().len()
    }
}

impl<S: Score + ?Sized> Score for &S {
    fn variables(&self) -> Vec<Variable> {
        (**self).variables()
    }

    fn local_score(&self, node: VarId, parents: &[VarId]) -> f64 {
        (**self).local_score(node, parents)
    }

    fn local_score_diff(&self, x: VarId, y: VarId, z: &[VarId]) -> f64 {
        (**self).local_score_diff(x, y, z)
    }

    fn num_variables(&self) -> usize {
        (**self).num_variables()
    }
}
