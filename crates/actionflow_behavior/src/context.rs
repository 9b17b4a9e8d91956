// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution context shared by one tick's call chain.
//!
//! The context records which nodes are mid-execution. It is the only state
//! that survives from one tick to the next: nodes update it from their tick
//! and completion handlers, and the scheduler reads it before the next tick
//! to decide which subtrees to resume.

use crate::node::NodeId;
use indexmap::IndexSet;

/// Activation ledger for one behavior-tree run
#[derive(Debug, Default)]
pub struct ExecutionContext {
    active: IndexSet<NodeId>,
    tick: u64,
}

impl ExecutionContext {
    /// Create a new context with no active nodes
    pub fn new() -> Self {
        Self {
            active: IndexSet::new(),
            tick: 0,
        }
    }

    /// Mark a node as mid-execution
    pub fn active(&mut self, node: NodeId) {
        if self.active.insert(node) {
            tracing::trace!("Node {:?} active", node);
        }
    }

    /// Clear a node's mid-execution mark
    pub fn inactive(&mut self, node: NodeId) {
        if self.active.shift_remove(&node) {
            tracing::trace!("Node {:?} inactive", node);
        }
    }

    /// Check if a node is marked mid-execution
    pub fn is_active(&self, node: NodeId) -> bool {
        self.active.contains(&node)
    }

    /// Get all active nodes, in activation order
    pub fn active_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.active.iter().copied()
    }

    /// Number of active nodes
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Start a new tick
    pub fn begin_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Number of ticks started so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Forget every active node
    pub fn clear(&mut self) {
        self.active.clear();
    }
}
