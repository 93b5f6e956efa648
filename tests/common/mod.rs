// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use causal_perm_search::model::{variables_from_names, VarId, Variable};
use causal_perm_search::{OrderedScorer, Precedence, Score};

/// Population BIC for a linear-Gaussian model.
///
/// The covariance is the one implied by a weighted DAG with unit noise, so
/// conditional independences are exact. A small bonus for each true parent
/// breaks the ties within a Markov equivalence class, making the generating
/// DAG the unique optimum.
#[derive(Debug, Clone)]
pub struct GaussianDagScore {
    names: Vec<String>,
    covariance: Vec<Vec<f64>>,
    true_parents: Vec<Vec<VarId>>,
    sample_size: f64,
    penalty: f64,
    bonus: f64,
}

impl GaussianDagScore {
    /// Build from `(from, to, weight)` edges. Every edge must point from a
    /// lower index to a higher one.
    pub fn new(names: &[&str], edges: &[(VarId, VarId, f64)]) -> Self {
        let n = names.len();
        let mut weighted: Vec<Vec<(VarId, f64)>> = vec![Vec::new(); n];
        for &(from, to, weight) in edges {
            assert!(from < to, "edges must follow index order");
            weighted[to].push((from, weight));
        }

        let mut covariance = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..i {
                let c: f64 = weighted[i].iter().map(|&(p, w)| w * covariance[p][j]).sum();
                covariance[i][j] = c;
                covariance[j][i] = c;
            }
            let mut variance = 1.0;
            for &(p, wp) in &weighted[i] {
                for &(q, wq) in &weighted[i] {
                    variance += wp * wq * covariance[p][q];
                }
            }
            covariance[i][i] = variance;
        }

        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            covariance,
            true_parents: weighted
                .iter()
                .map(|ps| ps.iter().map(|&(p, _)| p).collect())
                .collect(),
            sample_size: 1000.0,
            penalty: 1.0,
            bonus: 0.01,
        }
    }

    pub fn true_parents(&self, v: VarId) -> Vec<VarId> {
        let mut parents = self.true_parents[v].clone();
        parents.sort_unstable();
        parents
    }

    /// Variance of `v` left after regressing on `parents`.
    fn residual_variance(&self, v: VarId, parents: &[VarId]) -> f64 {
        let k = parents.len();
        // Augmented system [cov(P, P) | cov(P, v)].
        let mut a: Vec<Vec<f64>> = parents
            .iter()
            .map(|&r| {
                let mut row: Vec<f64> = parents.iter().map(|&c| self.covariance[r][c]).collect();
                row.push(self.covariance[r][v]);
                row
            })
            .collect();
        for col in 0..k {
            let pivot = (col..k)
                .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
                .unwrap();
            a.swap(col, pivot);
            for r in col + 1..k {
                let f = a[r][col] / a[col][col];
                for c in col..=k {
                    a[r][c] -= f * a[col][c];
                }
            }
        }
        let mut beta = vec![0.0; k];
        for r in (0..k).rev() {
            let mut s = a[r][k];
            for c in r + 1..k {
                s -= a[r][c] * beta[c];
            }
            beta[r] = s / a[r][r];
        }
        let mut variance = self.covariance[v][v];
        for r in 0..k {
            variance -= beta[r] * self.covariance[parents[r]][v];
        }
        variance
    }
}

impl Score for GaussianDagScore {
    fn variables(&self) -> Vec<Variable> {
        variables_from_names(&self.names)
    }

    fn local_score(&self, node: VarId, parents: &[VarId]) -> f64 {
        let n = self.sample_size;
        let k = parents.len() as f64;
        let hits = parents
            .iter()
            .filter(|p| self.true_parents[node].contains(p))
            .count() as f64;
        -n / 2.0 * self.residual_variance(node, parents).ln() - self.penalty * k * n.ln() / 2.0
            + self.bonus * hits
    }
}

/// A --> B --> C and A --> D.
pub fn four_variable_model() -> GaussianDagScore {
    GaussianDagScore::new(
        &["A", "B", "C", "D"],
        &[(0, 1, 0.8), (1, 2, 0.7), (0, 3, 0.6)],
    )
}

/// Six variables with a collider at D.
pub fn six_variable_model() -> GaussianDagScore {
    GaussianDagScore::new(
        &["A", "B", "C", "D", "E", "F"],
        &[
            (0, 1, 0.8),
            (0, 2, 0.6),
            (1, 3, 0.7),
            (2, 3, 0.5),
            (3, 4, 0.9),
            (1, 5, 0.6),
        ],
    )
}

/// Every permutation of `0..n`, in lexicographic order.
pub fn permutations(n: usize) -> Vec<Vec<VarId>> {
    fn extend(prefix: &mut Vec<VarId>, used: &mut Vec<bool>, out: &mut Vec<Vec<VarId>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for v in 0..used.len() {
            if !used[v] {
                used[v] = true;
                prefix.push(v);
                extend(prefix, used, out);
                prefix.pop();
                used[v] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}

/// Best total score over every order that respects `precedence`.
pub fn brute_force_best<S: Score>(score: &S, precedence: &Precedence) -> (f64, Vec<VarId>) {
    let mut scorer = OrderedScorer::new(score).with_precedence(precedence);
    let mut best: Option<(f64, Vec<VarId>)> = None;
    for order in permutations(score.num_variables()) {
        if precedence.violates(&order) {
            continue;
        }
        let total = scorer.score(&order);
        if best.as_ref().map_or(true, |(b, _)| total > *b) {
            best = Some((total, order));
        }
    }
    best.unwrap()
}

/// Parent sets of every variable as sorted vectors.
pub fn parent_lists<S: Score + ?Sized>(scorer: &OrderedScorer<'_, S>) -> Vec<Vec<VarId>> {
    (0..scorer.num_variables())
        .map(|v| scorer.parents(v).to_vec())
        .collect()
}

/// Install a test-friendly tracing subscriber once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
