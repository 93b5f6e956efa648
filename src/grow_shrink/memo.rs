// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-node memo of grow-shrink results.
//!
//! Grow-shrink is a pure function of `(node, allowed)`, and tucking revisits
//! the same prefixes often, so each scorer keeps one memo. Memos are never
//! shared between starts.

use super::ParentChoice;
use crate::model::{VarId, VarSet};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct GrowShrinkMemo {
    by_node: Vec<HashMap<VarSet, ParentChoice>>,
}

impl GrowShrinkMemo {
    pub fn new(num_variables: usize) -> Self {
        Self {
            by_node: vec![HashMap::new(); num_variables],
        }
    }

    pub fn get(&self, node: VarId, allowed: &VarSet) -> Option<&ParentChoice> {
        self.by_node[node].get(allowed)
    }

    pub fn insert(&mut self, node: VarId, allowed: VarSet, choice: ParentChoice) {
        self.by_node[node].insert(allowed, choice);
    }

    pub fn len(&self) -> usize {
        self.by_node.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.by_node.iter_mut().for_each(HashMap::clear);
    }
}
