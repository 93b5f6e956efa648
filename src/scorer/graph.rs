// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! DAG output of a search.

use crate::model::{VarId, VarSet, Variable};
use std::fmt;

/// A directed acyclic graph given by each node's parent set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    variables: Vec<Variable>,
    parents: Vec<VarSet>,
}

impl Dag {
    pub fn new(variables: Vec<Variable>, parents: Vec<VarSet>) -> Self {
        debug_assert_eq!(variables.len(), parents.len());
        Self { variables, parents }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_nodes(&self) -> usize {
        self.variables.len()
    }

    pub fn parents(&self, v: VarId) -> &VarSet {
        &self.parents[v]
    }

    pub fn children(&self, v: VarId) -> VarSet {
        (0..self.parents.len())
            .filter(|&c| self.parents[c].contains(v))
            .collect()
    }

    pub fn has_edge(&self, from: VarId, to: VarId) -> bool {
        self.parents[to].contains(from)
    }

    pub fn num_edges(&self) -> usize {
        self.parents.iter().map(VarSet::len).sum()
    }

    /// Every edge `(from, to)`, sorted by `to` then `from`.
    pub fn edges(&self) -> Vec<(VarId, VarId)> {
        self.parents
            .iter()
            .enumerate()
            .flat_map(|(to, ps)| ps.iter().map(move |from| (from, to)))
            .collect()
    }

    /// Edges as `(from, to)` name pairs, sorted by `to` then `from`.
    pub fn named_edges(&self) -> Vec<(&str, &str)> {
        self.edges()
            .into_iter()
            .map(|(from, to)| (self.variables[from].name(), self.variables[to].name()))
            .collect()
    }
}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (from, to)) in self.named_edges().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} --> {}", from, to)?;
        }
        Ok(())
    }
}
