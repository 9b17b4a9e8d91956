// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port metadata for `ActionFlow` nodes.
//!
//! This crate derives the ports a node type exposes in the graph editor:
//! - Structural value inputs and outputs
//! - Input/output parameters bound to fields or methods
//! - Behavior-tree parent and child links
//!
//! ## Architecture
//!
//! - [`shape`]: node types describe their members declaratively
//! - [`descriptor`]: builds a [`NodeTypeDescriptor`] from a shape
//! - [`registry`]: caches one descriptor per node type
//! - [`port`]: port roles and link compatibility

pub mod port;
pub mod shape;
pub mod descriptor;
pub mod registry;

pub use descriptor::{
    BehaviorTreeOutputDescriptor, BuildError, FieldDescriptor, NodeTypeDescriptor,
    UNLIMITED_LINKS,
};
pub use port::{
    PortDescriptor, Role, ValueType, BEHAVIOR_TREE_ID_PREFIX, BEHAVIOR_TREE_ID_STRIDE,
    PARAMETER_ID_PREFIX,
};
pub use registry::{SharedTypeRegistry, TypeMetadataRegistry};
pub use shape::{
    FieldDecl, FieldMarker, MethodDecl, MethodMarker, NodeDefinition, NodeShape,
    BEHAVIOR_INPUT_HANDLER, INPUT_HANDLER,
};
