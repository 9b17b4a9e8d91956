// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence and selector composites.
//!
//! Both delegate child evaluation to the scheduler and decide, in
//! [`BehaviorComposite::completed`], whether the next sibling runs. A child
//! reporting [`BehaviorStatus::Running`] stops the pass and marks the
//! composite active so the scheduler resumes it from that child next tick.

use crate::context::ExecutionContext;
use crate::node::{
    BehaviorChild, BehaviorComposite, BehaviorError, BehaviorNode, Capabilities, Capability,
    ChildEvaluator, NodeId,
};
use crate::status::BehaviorStatus;
use actionflow_graph::{MethodDecl, NodeDefinition, NodeShape, UNLIMITED_LINKS};
use serde::{Deserialize, Serialize};

/// Progress shared by both composites
#[derive(Debug, Clone, Default)]
struct Progress {
    running_child: Option<usize>,
}

impl Progress {
    fn completed(
        &mut self,
        id: NodeId,
        ctx: &mut ExecutionContext,
        child_index: usize,
        result: BehaviorStatus,
        continue_on: BehaviorStatus,
    ) -> (bool, BehaviorStatus) {
        if result.is_running() {
            self.running_child = Some(child_index);
            ctx.active(id);
            return (false, result);
        }
        self.running_child = None;
        ctx.inactive(id);
        (result == continue_on, result)
    }
}

/// Runs children in order until one fails
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence {
    /// Instance ID
    pub id: NodeId,
    #[serde(skip)]
    progress: Progress,
}

impl Sequence {
    /// Create a new sequence
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            progress: Progress::default(),
        }
    }

    /// Child to resume from on the next tick
    pub fn resume_from(&self) -> usize {
        self.progress.running_child.unwrap_or(0)
    }
}

/// Runs children in order until one succeeds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selector {
    /// Instance ID
    pub id: NodeId,
    #[serde(skip)]
    progress: Progress,
}

impl Selector {
    /// Create a new selector
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            progress: Progress::default(),
        }
    }

    /// Child to resume from on the next tick
    pub fn resume_from(&self) -> usize {
        self.progress.running_child.unwrap_or(0)
    }
}

macro_rules! impl_composite {
    ($ty:ty, $name:literal, $continue_on:expr) => {
        impl NodeDefinition for $ty {
            fn shape() -> NodeShape {
                NodeShape::serializable::<Self>()
                    .named($name)
                    .method(MethodDecl::behavior_input())
                    .method(MethodDecl::new("completed").behavior_output(1, UNLIMITED_LINKS))
            }
        }

        impl BehaviorChild for $ty {
            fn behavior_input(
                &mut self,
                ctx: &mut ExecutionContext,
                children: &mut dyn ChildEvaluator,
            ) -> Result<BehaviorStatus, BehaviorError> {
                Ok(children.evaluate(ctx))
            }
        }

        impl BehaviorComposite for $ty {
            fn completed(
                &mut self,
                ctx: &mut ExecutionContext,
                child_index: usize,
                result: BehaviorStatus,
            ) -> (bool, BehaviorStatus) {
                self.progress
                    .completed(self.id, ctx, child_index, result, $continue_on)
            }
        }

        impl BehaviorNode for $ty {
            fn id(&self) -> NodeId {
                self.id
            }

            fn capabilities(&self) -> Capabilities {
                Capabilities::of(&[Capability::BehaviorChild, Capability::Composite])
            }

            fn as_behavior_child(&mut self) -> Option<&mut dyn BehaviorChild> {
                Some(self)
            }

            fn as_composite(&mut self) -> Option<&mut dyn BehaviorComposite> {
                Some(self)
            }
        }
    };
}

impl_composite!(Sequence, "BT/Sequence", BehaviorStatus::Success);
impl_composite!(Selector, "BT/Selector", BehaviorStatus::Failure);
