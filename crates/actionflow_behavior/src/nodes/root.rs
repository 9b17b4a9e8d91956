// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behavior-tree root.
//!
//! The root is entered over a structural link and ticks its single subtree.
//! It can never be another node's child.

use crate::context::ExecutionContext;
use crate::node::{
    BehaviorChild, BehaviorComposite, BehaviorError, BehaviorNode, Capabilities, Capability,
    ChildEvaluator, InputHandler, NodeId, Tick,
};
use crate::status::BehaviorStatus;
use actionflow_graph::{MethodDecl, NodeDefinition, NodeShape};
use serde::{Deserialize, Serialize};

/// Root of a behavior tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Root {
    /// Instance ID
    pub id: NodeId,
}

impl Root {
    /// Create a new root
    pub fn new() -> Self {
        Self { id: NodeId::new() }
    }

    // Running clears the mark; any settled result sets it.
    fn record(&self, ctx: &mut ExecutionContext, status: BehaviorStatus) {
        if status.is_running() {
            ctx.inactive(self.id);
        } else {
            ctx.active(self.id);
        }
    }
}

impl NodeDefinition for Root {
    fn shape() -> NodeShape {
        NodeShape::serializable::<Self>()
            .named("BT/Root")
            .method(MethodDecl::input_handler())
            .method(MethodDecl::behavior_input())
            .method(MethodDecl::new("on_tick").behavior_output(0, 1))
    }
}

impl InputHandler for Root {
    fn on_input(&mut self, ctx: &mut ExecutionContext, children: &mut dyn ChildEvaluator) {
        self.on_tick(ctx, children);
    }
}

impl Tick for Root {
    fn on_tick(&mut self, ctx: &mut ExecutionContext, children: &mut dyn ChildEvaluator) {
        let status = children.evaluate(ctx);
        tracing::trace!("Root {:?} subtree returned {:?}", self.id, status);
        self.record(ctx, status);
    }
}

impl BehaviorChild for Root {
    fn behavior_input(
        &mut self,
        _ctx: &mut ExecutionContext,
        _children: &mut dyn ChildEvaluator,
    ) -> Result<BehaviorStatus, BehaviorError> {
        tracing::error!("Root {:?} evaluated as a behavior-tree child", self.id);
        Err(BehaviorError::RootAsChild { node: self.id })
    }
}

impl BehaviorComposite for Root {
    fn completed(
        &mut self,
        ctx: &mut ExecutionContext,
        _child_index: usize,
        result: BehaviorStatus,
    ) -> (bool, BehaviorStatus) {
        self.record(ctx, result);
        (false, BehaviorStatus::None)
    }
}

impl BehaviorNode for Root {
    fn id(&self) -> NodeId {
        self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::of(&[
            Capability::Input,
            Capability::Tick,
            Capability::BehaviorChild,
            Capability::Composite,
        ])
    }

    fn as_input_handler(&mut self) -> Option<&mut dyn InputHandler> {
        Some(self)
    }

    fn as_tick(&mut self) -> Option<&mut dyn Tick> {
        Some(self)
    }

    fn as_behavior_child(&mut self) -> Option<&mut dyn BehaviorChild> {
        Some(self)
    }

    fn as_composite(&mut self) -> Option<&mut dyn BehaviorComposite> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_running_marks_inactive() {
        let mut root = Root::new();
        let mut ctx = ExecutionContext::new();
        ctx.active(root.id);

        let (next, result) = root.completed(&mut ctx, 0, BehaviorStatus::Running);
        assert!(!next);
        assert_eq!(result, BehaviorStatus::None);
        assert!(!ctx.is_active(root.id));
    }

    #[test]
    fn test_completed_settled_marks_active() {
        for status in [
            BehaviorStatus::Success,
            BehaviorStatus::Failure,
            BehaviorStatus::None,
        ] {
            let mut root = Root::new();
            let mut ctx = ExecutionContext::new();
            let (next, _) = root.completed(&mut ctx, 0, status);
            assert!(!next);
            assert!(ctx.is_active(root.id), "{status:?}");
        }
    }

    #[test]
    fn test_root_as_child_always_fails() {
        let mut root = Root::new();
        let mut ctx = ExecutionContext::new();
        for _ in 0..2 {
            let err = root.behavior_input(&mut ctx, &mut crate::node::NoChildren);
            assert_eq!(err, Err(BehaviorError::RootAsChild { node: root.id }));
        }
        ctx.active(root.id);
        let err = root.behavior_input(&mut ctx, &mut crate::node::NoChildren);
        assert_eq!(err, Err(BehaviorError::RootAsChild { node: root.id }));
    }

    #[test]
    fn test_input_ticks_subtree() {
        let mut root = Root::new();
        let mut ctx = ExecutionContext::new();
        let mut calls = 0;
        let mut subtree = |_: &mut ExecutionContext| {
            calls += 1;
            BehaviorStatus::Success
        };
        root.on_input(&mut ctx, &mut subtree);
        assert_eq!(calls, 1);
        assert!(ctx.is_active(root.id));

        root.on_tick(&mut ctx, &mut |_: &mut ExecutionContext| BehaviorStatus::Running);
        assert!(!ctx.is_active(root.id));
    }
    #[test]
    fn test_shape_lists_every_entry_point() {
        let shape = Root::shape();
        let names: Vec<&str> = shape.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["on_input", "behavior_input", "on_tick"]);

        let descriptor = actionflow_graph::NodeTypeDescriptor::build(&shape).unwrap();
        assert_eq!(descriptor.inputs.len(), 1);
        assert!(descriptor.is_behavior_child());
        assert!(Root::new()
            .capabilities()
            .contains(crate::node::Capability::BehaviorChild));
        assert_eq!(descriptor.behavior_output.unwrap().max_link, 1);
    }
}
