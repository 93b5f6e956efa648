// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Permutation-based causal order search.
//!
//! Given a decomposable score over a set of variables, find a total order of
//! the variables whose induced DAG scores best. Each order determines a DAG:
//! every variable takes as parents the grow-shrink choice among the variables
//! before it. Search moves between orders by *tucks*, and two local searches
//! are provided: GRaSP (bounded-depth DFS over tucks) and BOSS (greedy
//! tucking). A multi-start driver runs either from several starting orders
//! and keeps the best.
//!
//! # Architecture
//!
//! The implementation uses a two-tier memory model:
//!
//! ## Tier 1: MEMO Data (Immutable)
//!
//! Fixed for a whole search and shared by all starts:
//! - The score and its variables
//! - The [`Precedence`] matrix compiled from background knowledge
//! - The search configuration
//!
//! ## Tier 2: DYNAMIC Data (Mutable)
//!
//! Owned by one [`OrderedScorer`] per start, never shared:
//! - The order and its inverse
//! - Parent sets and local scores
//! - Trail - records overwritten windows for exact bookmark rollback
//! - Local score and grow-shrink caches
//!
//! # Search Algorithm
//!
//! 1. **BestOrderDriver**: draw start orders, sorted to respect knowledge
//! 2. **OrderedScorer::score**: compute parent sets for a start order
//! 3. **GraspSearch** or **BossSearch**: tuck or move variables until no
//!    improvement is found
//! 4. **BestOrderDriver**: keep the best start
//!
//! # Parallelization
//!
//! Starts are independent. With the `parallel` feature and
//! `SearchConfig::parallel`, they run on the rayon pool; the result is the
//! same as a sequential run with the same seed.
//!
//! # References
//!
//! - Lam, W.-Y., Andrews, B., Ramsey, J. (2022). "Greedy Relaxations of the
//!   Sparsest Permutation Algorithm." UAI 2022.
//! - Andrews, B., Ramsey, J., Sanchez-Romero, R., Camchong, J., Kummerfeld, E.
//!   (2023). "Fast Scalable and Accurate Discovery of DAGs Using the Best
//!   Order Score Search and Grow-Shrink Trees." NeurIPS 2023.

pub mod cancel;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grow_shrink;
pub mod knowledge;
pub mod model;
pub mod score;
pub mod scorer;
pub mod statistics;
pub mod trail;
pub mod tuck;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::{Algorithm, SearchConfig};
pub use driver::{BestOrderDriver, PostPass, SearchResult};
pub use engine::{BossMove, BossSearch, GraspSearch, LocalSearch, Outcome};
pub use error::{Result, SearchError};
pub use knowledge::{Knowledge, Precedence, TieredKnowledge};
pub use model::{Order, VarId, VarSet, Variable};
pub use score::Score;
pub use scorer::{Dag, OrderedScorer};
pub use statistics::{Counters, Statistics};
pub use trail::{Bookmark, Trail};
