// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Multi-start orchestration.
//!
//! The driver turns a score, an initial order and optional knowledge into
//! the best order found over `num_starts` independent starts:
//!
//! 1. Validate the configuration, the initial order and the knowledge
//! 2. Draw every start order up front from one seeded generator: start 0 is
//!    the data order (if `use_data_order`), later starts are shuffles; each is
//!    then sorted to respect the knowledge
//! 3. Run each start with its own scorer (sequentially, or on the rayon pool)
//! 4. Keep the highest score, ties going to the lowest start index
//!
//! Because start orders are fixed before any start runs, sequential and
//! parallel runs with the same seed return the same result.

use crate::cancel::CancellationToken;
use crate::config::{Algorithm, DepthLimits, SearchConfig};
use crate::engine::{BossMove, BossSearch, GraspSearch, Outcome};
use crate::error::{Result, SearchError};
use crate::knowledge::{Knowledge, Precedence};
use crate::model::{is_permutation, Order, VarId, VarSet};
use crate::score::Score;
use crate::scorer::{Dag, OrderedScorer};
use crate::statistics::{Counters, Statistics};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Log at `info` when verbose, `debug` otherwise. The level of a tracing
/// event is fixed at its call site, so the choice is made here.
macro_rules! progress {
    ($verbose:expr, $($event:tt)+) => {
        if $verbose {
            tracing::info!($($event)+)
        } else {
            tracing::debug!($($event)+)
        }
    };
}

/// A refinement applied after each local optimum, such as backward
/// elimination of edges. Returning a different order makes the driver search
/// again from it; the refinement is kept only if that search ends with a
/// strictly better score.
pub trait PostPass: Send + Sync {
    fn refine(&self, order: &[VarId], graph: &Dag) -> Option<Order>;
}

/// The best order found and the DAG it induces.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub order: Order,
    /// Parent set of each variable, by variable index.
    pub parents: Vec<VarSet>,
    pub score: f64,
    pub graph: Dag,
    /// Counters summed over every completed start.
    pub statistics: Statistics,
    pub starts_completed: usize,
    /// True if the search was cut short by its cancellation token.
    pub cancelled: bool,
}

impl SearchResult {
    /// Names of the variables in result order.
    pub fn order_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&v| self.graph.variables()[v].name())
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Start {
    index: usize,
    order: Order,
    shuffle_seed: u64,
}

#[derive(Debug)]
struct StartResult {
    index: usize,
    order: Order,
    parents: Vec<VarSet>,
    score: f64,
    graph: Dag,
    statistics: Statistics,
}

/// Everything one start needs, shareable across threads.
struct StartRunner<'a, S: Score + Sync + ?Sized> {
    score: &'a S,
    precedence: &'a Precedence,
    post_pass: Option<&'a dyn PostPass>,
    cancel: &'a CancellationToken,
    algorithm: Algorithm,
    schedule: Vec<DepthLimits>,
    shuffle: bool,
    max_cache_entries: Option<usize>,
    verbose: bool,
}

impl<S: Score + Sync + ?Sized> StartRunner<'_, S> {
    fn local_search(&self, scorer: &mut OrderedScorer<'_, S>, shuffle_seed: u64) -> Outcome {
        match self.algorithm {
            Algorithm::Grasp => {
                let mut search = GraspSearch::staged(self.schedule.clone())
                    .with_precedence(self.precedence)
                    .with_cancellation(self.cancel.clone())
                    .with_cache_limit(self.max_cache_entries);
                if self.shuffle {
                    search = search.with_shuffle(shuffle_seed);
                }
                search.run(scorer)
            }
            Algorithm::Boss => self.boss(BossMove::Mutation).run(scorer),
            Algorithm::BossTuck => self.boss(BossMove::AncestorTuck).run(scorer),
        }
    }

    fn boss(&self, moves: BossMove) -> BossSearch<'_> {
        BossSearch::new()
            .with_moves(moves)
            .with_precedence(self.precedence)
            .with_cancellation(self.cancel.clone())
            .with_cache_limit(self.max_cache_entries)
    }

    /// Run one start. Returns `None` if it was cancelled before finishing.
    fn run(&self, start: &Start) -> Option<StartResult> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let began = Instant::now();
        let mut scorer = OrderedScorer::new(self.score).with_precedence(self.precedence);
        scorer.score(&start.order);

        let mut outcome = self.local_search(&mut scorer, start.shuffle_seed);
        while outcome == Outcome::Converged {
            let Some(post_pass) = self.post_pass else {
                break;
            };
            let order = scorer.order().to_vec();
            let Some(next) = post_pass.refine(&order, &scorer.graph()).filter(|next| {
                next != &order
                    && is_permutation(next, order.len())
                    && !self.precedence.violates(next)
            }) else {
                break;
            };
            let before = scorer.total_score();
            let bookmark = scorer.bookmark();
            scorer.score(&next);
            outcome = self.local_search(&mut scorer, start.shuffle_seed);
            if scorer.total_score() > before {
                scorer.commit(bookmark);
            } else {
                scorer.go_to_bookmark(bookmark);
                break;
            }
        }
        if outcome == Outcome::Cancelled {
            tracing::debug!(start = start.index, "start cancelled");
            return None;
        }

        let score = scorer.total_score();
        progress!(
            self.verbose,
            start = start.index,
            score,
            edges = scorer.num_edges(),
            elapsed_ms = began.elapsed().as_millis() as u64,
            "start finished"
        );
        scorer.count(Counters::Starts);
        Some(StartResult {
            index: start.index,
            order: scorer.order().to_vec(),
            parents: (0..scorer.num_variables())
                .map(|v| scorer.parents(v).clone())
                .collect(),
            score,
            graph: scorer.graph(),
            statistics: scorer.statistics().clone(),
        })
    }
}

/// Multi-start best-order search.
pub struct BestOrderDriver<'a, S: Score + Sync + ?Sized> {
    score: &'a S,
    config: SearchConfig,
    knowledge: Option<&'a dyn Knowledge>,
    post_pass: Option<&'a dyn PostPass>,
    cancel: CancellationToken,
}

impl<'a, S: Score + Sync + ?Sized> BestOrderDriver<'a, S> {
    pub fn new(score: &'a S, config: SearchConfig) -> Self {
        Self {
            score,
            config,
            knowledge: None,
            post_pass: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: &'a dyn Knowledge) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn with_post_pass(mut self, post_pass: &'a dyn PostPass) -> Self {
        self.post_pass = Some(post_pass);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this driver's searches.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search starting from the score's own variable order.
    pub fn best_order_default(&self) -> Result<SearchResult> {
        let identity: Order = (0..self.score.num_variables()).collect();
        self.best_order(&identity)
    }

    /// Search starting from an order given by variable names.
    pub fn best_order_by_name<N: AsRef<str>>(&self, names: &[N]) -> Result<SearchResult> {
        let variables = self.score.variables();
        let order = names
            .iter()
            .map(|name| {
                variables
                    .iter()
                    .position(|v| v.name() == name.as_ref())
                    .ok_or_else(|| SearchError::UnknownVariable(name.as_ref().to_string()))
            })
            .collect::<Result<Order>>()?;
        self.best_order(&order)
    }

    /// Search for the best order, using `initial_order` as the data order.
    pub fn best_order(&self, initial_order: &[VarId]) -> Result<SearchResult> {
        self.config.validate()?;
        let variables = self.score.variables();
        let n = variables.len();
        if !is_permutation(initial_order, n) {
            return Err(SearchError::InvalidOrder(format!(
                "{:?} is not a permutation of {} variables",
                initial_order, n
            )));
        }
        let precedence = match self.knowledge {
            Some(knowledge) => Precedence::build(knowledge, &variables)?,
            None => Precedence::unconstrained(n),
        };

        let starts = self.start_orders(initial_order, &precedence);
        let runner = StartRunner {
            score: self.score,
            precedence: &precedence,
            post_pass: self.post_pass,
            cancel: &self.cancel,
            algorithm: self.config.algorithm,
            schedule: self.config.depth_schedule(),
            shuffle: self.config.allow_internal_randomness,
            max_cache_entries: self.config.max_cache_entries,
            verbose: self.config.verbose,
        };
        let began = Instant::now();
        let completed = self.run_starts(&runner, &starts);
        let cancelled = self.cancel.is_cancelled();

        let mut statistics = Statistics::new();
        for result in &completed {
            statistics.merge(&result.statistics);
        }
        let starts_completed = completed.len();
        let best = completed
            .into_iter()
            .reduce(|best, next| {
                if next.score > best.score {
                    next
                } else {
                    best
                }
            });
        let best_start = best.as_ref().map(|b| b.index);

        let result = match best {
            Some(best) => SearchResult {
                order: best.order,
                parents: best.parents,
                score: best.score,
                graph: best.graph,
                statistics,
                starts_completed,
                cancelled,
            },
            None => {
                // Cancelled before any start finished: report the first start
                // as scored, without search.
                let mut scorer = OrderedScorer::new(self.score).with_precedence(&precedence);
                let first = starts.first().map_or_else(Vec::new, |s| s.order.clone());
                let score = scorer.score(&first);
                SearchResult {
                    order: first,
                    parents: (0..n).map(|v| scorer.parents(v).clone()).collect(),
                    score,
                    graph: scorer.graph(),
                    statistics: scorer.statistics().clone(),
                    starts_completed: 0,
                    cancelled,
                }
            }
        };

        progress!(
            self.config.verbose,
            score = result.score,
            edges = result.graph.num_edges(),
            starts = result.starts_completed,
            best_start = ?best_start,
            elapsed_ms = began.elapsed().as_millis() as u64,
            "best order found"
        );
        Ok(result)
    }

    fn start_orders(&self, initial_order: &[VarId], precedence: &Precedence) -> Vec<Start> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        (0..self.config.num_starts as usize)
            .map(|index| {
                let mut order = initial_order.to_vec();
                if index > 0 || !self.config.use_data_order {
                    order.shuffle(&mut rng);
                }
                Start {
                    index,
                    order: precedence.make_valid_order(&order),
                    shuffle_seed: rng.gen(),
                }
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_starts(&self, runner: &StartRunner<'_, S>, starts: &[Start]) -> Vec<StartResult> {
        if self.config.parallel {
            use rayon::prelude::*;
            return starts
                .par_iter()
                .filter_map(|start| runner.run(start))
                .collect();
        }
        run_sequential(runner, starts)
    }

    #[cfg(not(feature = "parallel"))]
    fn run_starts(&self, runner: &StartRunner<'_, S>, starts: &[Start]) -> Vec<StartResult> {
        if self.config.parallel {
            tracing::warn!("parallel starts requested without the parallel feature");
        }
        run_sequential(runner, starts)
    }
}

fn run_sequential<S: Score + Sync + ?Sized>(
    runner: &StartRunner<'_, S>,
    starts: &[Start],
) -> Vec<StartResult> {
    let mut completed = Vec::with_capacity(starts.len());
    for start in starts {
        if runner.cancel.is_cancelled() {
            break;
        }
        if let Some(result) = runner.run(start) {
            completed.push(result);
        }
    }
    completed
}
