// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behavior-tree evaluation status.

use serde::{Deserialize, Serialize};

/// Result of evaluating a behavior-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorStatus {
    /// No result
    #[default]
    None,
    /// Still executing; resume on the next tick
    Running,
    /// Finished successfully
    Success,
    /// Finished unsuccessfully
    Failure,
}

impl BehaviorStatus {
    /// Whether the node is still executing
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// Whether the node reached a terminal result
    pub fn is_settled(self) -> bool {
        !self.is_running()
    }
}
