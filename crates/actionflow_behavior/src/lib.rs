// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behavior-tree execution protocol for `ActionFlow` nodes.
//!
//! A node can be reached in two ways:
//! - over a structural link, through its input handler
//! - as a behavior-tree child, through its child entry point
//!
//! ## Architecture
//!
//! One tick is one synchronous call chain. The [`ExecutionContext`] is passed
//! by mutable reference through the whole chain and records which nodes are
//! still running, so the scheduler knows what to resume on the next tick.
//! Composites stop their siblings by returning `false` from
//! [`BehaviorComposite::completed`]; nothing is aborted mid-evaluation.

pub mod status;
pub mod context;
pub mod node;
pub mod nodes;

pub use context::ExecutionContext;
pub use node::{
    deliver_input, evaluate_child, notify_completed, BehaviorChild, BehaviorComposite,
    BehaviorError, BehaviorNode, Capabilities, Capability, ChildEvaluator, InputHandler,
    NoChildren, NodeId, Tick,
};
pub use nodes::{Root, Selector, Sequence};
pub use status::BehaviorStatus;
