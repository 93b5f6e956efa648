// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for order search.
//!
//! Only configuration problems are reported as errors. Contract violations
//! inside the scorer (tucking to a later position, an out-of-range variable)
//! panic, and cancellation is reported through the search result.

use thiserror::Error;

/// Result of search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors surfaced once, at search start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Two knowledge statements cannot both hold.
    #[error("Knowledge conflict between {first} and {second}: {reason}")]
    KnowledgeConflict {
        first: String,
        second: String,
        reason: String,
    },

    /// The initial order is not a permutation of the score's variables.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// A name was used that the score does not define.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
