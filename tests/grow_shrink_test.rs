// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Grow-shrink returns parent sets no single addition or removal improves.

mod common;

use causal_perm_search::grow_shrink::grow_shrink;
use causal_perm_search::{Score, VarSet};
use common::six_variable_model;

/// Every subset of `others`, by bitmask.
fn subsets(others: &[usize]) -> impl Iterator<Item = VarSet> + '_ {
    (0u32..1 << others.len()).map(move |mask| {
        others
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &v)| v)
            .collect()
    })
}

#[test]
fn test_result_is_one_swap_optimal() {
    let score = six_variable_model();
    for v in 0..6 {
        let others: Vec<usize> = (0..6).filter(|&u| u != v).collect();
        for allowed in subsets(&others) {
            let local = |parents: &VarSet| score.local_score(v, &parents.to_vec());
            let choice = grow_shrink(&allowed, local);
            assert!(choice.parents.is_subset(&allowed));
            assert_eq!(choice.score, local(&choice.parents));

            for member in choice.parents.iter() {
                let mut fewer = choice.parents.clone();
                fewer.remove(member);
                assert!(
                    local(&fewer) <= choice.score,
                    "removing {} from {} improves node {}",
                    member,
                    choice.parents,
                    v
                );
            }
            for candidate in allowed.difference(&choice.parents).iter() {
                let mut more = choice.parents.clone();
                more.insert(candidate);
                assert!(
                    local(&more) <= choice.score,
                    "adding {} to {} improves node {}",
                    candidate,
                    choice.parents,
                    v
                );
            }
        }
    }
}

#[test]
fn test_finds_true_parents_when_all_allowed() {
    let score = six_variable_model();
    // D has parents B and C; everything but its descendant E is allowed.
    let allowed: VarSet = [0, 1, 2, 5].as_slice().into();
    let choice = grow_shrink(&allowed, |p| score.local_score(3, &p.to_vec()));
    assert_eq!(choice.parents.to_vec(), score.true_parents(3));
}

#[test]
fn test_empty_allowed_scores_empty_set() {
    let score = six_variable_model();
    let mut calls = 0;
    let choice = grow_shrink(&VarSet::new(), |p| {
        calls += 1;
        score.local_score(4, &p.to_vec())
    });
    assert!(choice.parents.is_empty());
    assert_eq!(choice.score, score.local_score(4, &[]));
    assert_eq!(calls, 1);
}
