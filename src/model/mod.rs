// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Core data model for order search.
//!
//! This module contains the small value types the search manipulates:
//! - VarId: stable integer index of a variable
//! - Variable: index plus display name
//! - VarSet: bitset of variable indices (parent sets, prefixes, ancestors)
//! - Order helpers: permutation checks and inverse-permutation construction

pub mod var_set;

pub use var_set::VarSet;

use std::fmt;

/// Stable index of a variable, `0..n`.
pub type VarId = usize;

/// A total order over all variables. Position `i` holds the variable whose
/// legal parents are exactly `order[0..i]`.
pub type Order = Vec<VarId>;

/// A search variable: an immutable index and a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    id: VarId,
    name: String,
}

impl Variable {
    pub fn new(id: VarId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Build variables named by `names`, indexed in the given order.
pub fn variables_from_names<S: AsRef<str>>(names: &[S]) -> Vec<Variable> {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| Variable::new(id, name.as_ref()))
        .collect()
}

/// True if `order` contains each of `0..n` exactly once.
pub fn is_permutation(order: &[VarId], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in order {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Inverse of a permutation: `positions[order[i]] == i`.
pub fn inverse(order: &[VarId]) -> Vec<usize> {
    let mut positions = vec![0; order.len()];
    for (i, &v) in order.iter().enumerate() {
        positions[v] = i;
    }
    positions
}
