// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Local searches on linear-Gaussian models with known optima.

mod common;

use causal_perm_search::config::SearchConfig;
use causal_perm_search::{
    BossMove, BossSearch, Counters, GraspSearch, OrderedScorer, Outcome, Precedence, Score,
};
use common::{
    brute_force_best, four_variable_model, parent_lists, permutations, six_variable_model,
    GaussianDagScore,
};

fn grasp(depth: i32) -> GraspSearch<'static> {
    GraspSearch::new(SearchConfig::new().with_depth(depth).depth_limits())
}

fn boss_tucks() -> BossSearch<'static> {
    BossSearch::new().with_moves(BossMove::AncestorTuck)
}

fn true_dag(score: &GaussianDagScore) -> Vec<Vec<usize>> {
    (0..score.num_variables()).map(|v| score.true_parents(v)).collect()
}

#[test]
fn test_grasp_from_data_order() {
    let score = four_variable_model();
    let mut scorer = OrderedScorer::new(&score);
    scorer.score(&[0, 1, 2, 3]);
    assert_eq!(grasp(2).run(&mut scorer), Outcome::Converged);
    assert_eq!(parent_lists(&scorer), vec![vec![], vec![0], vec![1], vec![0]]);
}

#[test]
fn test_grasp_from_reversed_order() {
    let score = four_variable_model();
    let mut scorer = OrderedScorer::new(&score);
    let start = scorer.score(&[3, 2, 1, 0]);
    assert_eq!(grasp(2).run(&mut scorer), Outcome::Converged);
    assert_eq!(parent_lists(&scorer), true_dag(&score));
    assert!(scorer.total_score() > start);
    assert!(scorer.statistics().get(Counters::Improvements) > 0);
    assert_eq!(scorer.check_consistency(), Ok(()));
}

#[test]
fn test_grasp_reaches_optimum_from_every_start() {
    let score = four_variable_model();
    let (best, _) = brute_force_best(&score, &Precedence::unconstrained(4));
    for depth in 1..=3 {
        for start in permutations(4) {
            let mut scorer = OrderedScorer::new(&score);
            scorer.score(&start);
            grasp(depth).run(&mut scorer);
            assert_eq!(
                parent_lists(&scorer),
                true_dag(&score),
                "depth {} from {:?}",
                depth,
                start
            );
            assert!((scorer.total_score() - best).abs() < 1e-9);
        }
    }
}

#[test]
fn test_grasp_never_worsens_score() {
    let score = six_variable_model();
    for start in permutations(6).into_iter().step_by(11) {
        let mut scorer = OrderedScorer::new(&score);
        let initial = scorer.score(&start);
        grasp(2).run(&mut scorer);
        assert!(scorer.total_score() >= initial);
    }
}

#[test]
fn test_grasp_six_variables() {
    let score = six_variable_model();
    let (best, best_order) = brute_force_best(&score, &Precedence::unconstrained(6));
    assert_eq!(best_order, vec![0, 1, 2, 3, 4, 5]);

    for start in permutations(6).into_iter().step_by(7) {
        let mut scorer = OrderedScorer::new(&score);
        scorer.score(&start);
        grasp(2).run(&mut scorer);
        assert!(
            (scorer.total_score() - best).abs() < 1e-9,
            "from {:?} reached {} not {}",
            start,
            scorer.total_score(),
            best
        );
        assert_eq!(parent_lists(&scorer), true_dag(&score));
    }
}

#[test]
fn test_ordered_stages_reach_optimum() {
    let score = four_variable_model();
    let (best, _) = brute_force_best(&score, &Precedence::unconstrained(4));
    let schedule = SearchConfig::new()
        .with_depth(2)
        .with_ordered(true)
        .depth_schedule();
    for start in permutations(4) {
        let mut scorer = OrderedScorer::new(&score);
        scorer.score(&start);
        let outcome = GraspSearch::staged(schedule.clone()).run(&mut scorer);
        assert_eq!(outcome, Outcome::Converged);
        assert!((scorer.total_score() - best).abs() < 1e-9, "from {:?}", start);
        assert_eq!(parent_lists(&scorer), true_dag(&score));
    }
}

#[test]
fn test_rerun_is_idempotent() {
    let score = six_variable_model();
    let mut scorer = OrderedScorer::new(&score);
    scorer.score(&[5, 4, 3, 2, 1, 0]);
    grasp(3).run(&mut scorer);
    let order = scorer.order().to_vec();
    let total = scorer.total_score();
    let improvements = scorer.statistics().get(Counters::Improvements);

    assert_eq!(grasp(3).run(&mut scorer), Outcome::Converged);
    assert_eq!(scorer.order(), order.as_slice());
    assert_eq!(scorer.total_score().to_bits(), total.to_bits());
    assert_eq!(scorer.statistics().get(Counters::Improvements), improvements);
}

#[test]
fn test_single_variable() {
    let score = GaussianDagScore::new(&["X"], &[]);
    let mut scorer = OrderedScorer::new(&score);
    let total = scorer.score(&[0]);
    assert_eq!(grasp(3).run(&mut scorer), Outcome::Converged);
    assert_eq!(BossSearch::new().run(&mut scorer), Outcome::Converged);
    assert_eq!(boss_tucks().run(&mut scorer), Outcome::Converged);
    assert_eq!(scorer.order(), &[0]);
    assert_eq!(scorer.total_score(), total);
    assert_eq!(scorer.num_edges(), 0);
}

#[test]
fn test_boss_mutation_reaches_optimum() {
    let score = six_variable_model();
    let (best, _) = brute_force_best(&score, &Precedence::unconstrained(6));
    for start in permutations(6).into_iter().step_by(5) {
        let mut scorer = OrderedScorer::new(&score);
        let initial = scorer.score(&start);
        assert_eq!(BossSearch::new().run(&mut scorer), Outcome::Converged);
        assert!(scorer.total_score() >= initial);
        assert!(
            (scorer.total_score() - best).abs() < 1e-9,
            "from {:?} reached {} not {}",
            start,
            scorer.total_score(),
            best
        );
        assert_eq!(parent_lists(&scorer), true_dag(&score));
        assert_eq!(scorer.check_consistency(), Ok(()));
    }
}

#[test]
fn test_boss_tucks_reach_equivalence_class_skeleton() {
    let score = four_variable_model();
    let mut scorer = OrderedScorer::new(&score);
    let start = scorer.score(&[1, 3, 2, 0]);
    assert_eq!(boss_tucks().run(&mut scorer), Outcome::Converged);
    assert!(scorer.total_score() >= start);
    assert_eq!(scorer.num_edges(), 3);
    for (a, b) in [(0, 1), (1, 2), (0, 3)] {
        assert!(scorer.adjacent(a, b));
    }
    assert_eq!(scorer.check_consistency(), Ok(()));
}

#[test]
fn test_boss_tucks_never_worsen_score() {
    let score = four_variable_model();
    for start in permutations(4) {
        let mut scorer = OrderedScorer::new(&score);
        let initial = scorer.score(&start);
        boss_tucks().run(&mut scorer);
        assert!(scorer.total_score() >= initial);
        assert_eq!(scorer.check_consistency(), Ok(()));
    }
}
