// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node-side behavior-tree protocol.
//!
//! A node offers up to four capabilities:
//! - [`InputHandler`]: receives a value over a structural link
//! - [`Tick`]: evaluates itself
//! - [`BehaviorChild`]: is evaluated as a behavior-tree child
//! - [`BehaviorComposite`]: is notified when one of its children completes
//!
//! Schedulers dispatch on [`BehaviorNode::capabilities`] and the matching
//! `as_*` accessor, never on the concrete node type.

use crate::context::ExecutionContext;
use crate::status::BehaviorStatus;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use uuid::Uuid;

/// Unique identifier for a node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// One capability a node may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`InputHandler`]
    Input,
    /// [`Tick`]
    Tick,
    /// [`BehaviorChild`]
    BehaviorChild,
    /// [`BehaviorComposite`]
    Composite,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::Input => 1,
            Self::Tick => 1 << 1,
            Self::BehaviorChild => 1 << 2,
            Self::Composite => 1 << 3,
        }
    }
}

/// Set of capabilities declared by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities
    pub const NONE: Self = Self(0);

    /// Build a set from a list of capabilities
    pub const fn of(list: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < list.len() {
            bits |= list[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Check if the set contains `capability`
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

impl BitOr<Capability> for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Capability) -> Self {
        Self(self.0 | rhs.bit())
    }
}

/// Scheduler handle for evaluating a node's behavior-tree children.
///
/// Nodes call this from their tick to obtain the combined status of the
/// subtree linked to their behavior-tree output.
pub trait ChildEvaluator {
    /// Evaluate the children and return their combined status
    fn evaluate(&mut self, ctx: &mut ExecutionContext) -> BehaviorStatus;
}

impl<F> ChildEvaluator for F
where
    F: FnMut(&mut ExecutionContext) -> BehaviorStatus,
{
    fn evaluate(&mut self, ctx: &mut ExecutionContext) -> BehaviorStatus {
        self(ctx)
    }
}

/// Evaluator for nodes with no behavior-tree children
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChildren;

impl ChildEvaluator for NoChildren {
    fn evaluate(&mut self, _ctx: &mut ExecutionContext) -> BehaviorStatus {
        BehaviorStatus::None
    }
}

/// Receives input over a structural link
pub trait InputHandler {
    /// Handle the input; may forward into the node's own tick
    fn on_input(&mut self, ctx: &mut ExecutionContext, children: &mut dyn ChildEvaluator);
}

/// Self-evaluation
pub trait Tick {
    /// Evaluate the node once
    fn on_tick(&mut self, ctx: &mut ExecutionContext, children: &mut dyn ChildEvaluator);
}

/// Evaluation as a behavior-tree child
pub trait BehaviorChild {
    /// Evaluate the node on behalf of its parent
    fn behavior_input(
        &mut self,
        ctx: &mut ExecutionContext,
        children: &mut dyn ChildEvaluator,
    ) -> Result<BehaviorStatus, BehaviorError>;
}

/// A behavior-tree node that sequences its children
pub trait BehaviorComposite {
    /// Called after child `child_index` settled or reported running.
    ///
    /// Returns whether the scheduler should go on to the next sibling, and the
    /// status to report in place of `result`.
    fn completed(
        &mut self,
        ctx: &mut ExecutionContext,
        child_index: usize,
        result: BehaviorStatus,
    ) -> (bool, BehaviorStatus);
}

/// A node instance driven by a scheduler
pub trait BehaviorNode {
    /// Instance ID
    fn id(&self) -> NodeId;

    /// Declared capabilities
    fn capabilities(&self) -> Capabilities;

    /// Input capability
    fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        None
    }

    /// Tick capability
    fn as_tick(&mut self) -> Option<&mut dyn Tick> {
        None
    }

    /// Behavior-tree child capability
    fn as_behavior_child(&mut self) -> Option<&mut dyn BehaviorChild> {
        None
    }

    /// Composite capability
    fn as_composite(&mut self) -> Option<&mut dyn BehaviorComposite> {
        None
    }
}

/// Deliver structural input to a node.
///
/// Nodes without an input handler but with a tick are ticked directly.
pub fn deliver_input(
    node: &mut dyn BehaviorNode,
    ctx: &mut ExecutionContext,
    children: &mut dyn ChildEvaluator,
) -> Result<(), BehaviorError> {
    let id = node.id();
    let capabilities = node.capabilities();
    if capabilities.contains(Capability::Input) {
        if let Some(handler) = node.as_input_handler() {
            handler.on_input(ctx, children);
            return Ok(());
        }
    }
    if capabilities.contains(Capability::Tick) {
        if let Some(tick) = node.as_tick() {
            tick.on_tick(ctx, children);
            return Ok(());
        }
    }
    Err(BehaviorError::Unsupported {
        node: id,
        capability: Capability::Input,
    })
}

/// Evaluate a node as a behavior-tree child
pub fn evaluate_child(
    node: &mut dyn BehaviorNode,
    ctx: &mut ExecutionContext,
    children: &mut dyn ChildEvaluator,
) -> Result<BehaviorStatus, BehaviorError> {
    let id = node.id();
    if !node.capabilities().contains(Capability::BehaviorChild) {
        return Err(BehaviorError::Unsupported {
            node: id,
            capability: Capability::BehaviorChild,
        });
    }
    match node.as_behavior_child() {
        Some(child) => child.behavior_input(ctx, children),
        None => Err(BehaviorError::Unsupported {
            node: id,
            capability: Capability::BehaviorChild,
        }),
    }
}

/// Notify a composite that one of its children completed
pub fn notify_completed(
    node: &mut dyn BehaviorNode,
    ctx: &mut ExecutionContext,
    child_index: usize,
    result: BehaviorStatus,
) -> Result<(bool, BehaviorStatus), BehaviorError> {
    let id = node.id();
    match node.as_composite() {
        Some(composite) => Ok(composite.completed(ctx, child_index, result)),
        None => Err(BehaviorError::Unsupported {
            node: id,
            capability: Capability::Composite,
        }),
    }
}

/// Error raised by the behavior-tree protocol
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorError {
    /// A root node was evaluated as another node's child.
    ///
    /// This is a tree-construction defect; retrying cannot succeed.
    #[error("Root node {node:?} cannot be evaluated as a behavior-tree child")]
    RootAsChild {
        /// The misused root
        node: NodeId,
    },

    /// The node does not declare the capability the scheduler needs
    #[error("Node {node:?} does not support {capability:?}")]
    Unsupported {
        /// Offending node
        node: NodeId,
        /// Missing capability
        capability: Capability,
    },
}
