// SPDX-License-Identifier: MIT OR Apache-2.0
//! Descriptor dump of the built-in node types.

use crate::settings::{OutputFormat, SettingsError};
use actionflow_behavior::{Root, Selector, Sequence};
use actionflow_graph::{
    FieldDescriptor, NodeDefinition, NodeShape, NodeTypeDescriptor, PortDescriptor,
    TypeMetadataRegistry,
};
use serde::Serialize;
use std::any::TypeId;

/// A node type the inspector knows about
pub struct BuiltinNode {
    /// Type identity used as the registry key
    pub type_id: TypeId,
    /// Shape function
    pub shape: fn() -> NodeShape,
}

impl BuiltinNode {
    fn of<T: NodeDefinition>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            shape: T::shape,
        }
    }

    /// Node type name
    pub fn name(&self) -> String {
        (self.shape)().type_name
    }
}

/// Get every built-in node type
pub fn builtin_nodes() -> Vec<BuiltinNode> {
    vec![
        BuiltinNode::of::<Root>(),
        BuiltinNode::of::<Sequence>(),
        BuiltinNode::of::<Selector>(),
    ]
}

/// Printable view of a port
#[derive(Debug, Serialize)]
pub struct PortReport {
    /// Display name
    pub name: String,
    /// Role tag
    pub role: String,
    /// Port ID
    pub id: i32,
    /// Value type name
    pub value_type: Option<String>,
}

impl From<&PortDescriptor> for PortReport {
    fn from(port: &PortDescriptor) -> Self {
        Self {
            name: port.display_name(),
            role: port.role.to_string(),
            id: port.id,
            value_type: port.value_type.map(|ty| ty.display_name().to_string()),
        }
    }
}

/// Printable view of a field
#[derive(Debug, Serialize)]
pub struct FieldReport {
    /// Member path
    pub path: String,
    /// Display name
    pub name: String,
    /// Field type name
    pub field_type: String,
    /// Maximum behavior-tree links
    pub max_link: i32,
    /// Bound parameter port
    pub parameter: Option<PortReport>,
}

impl From<&FieldDescriptor> for FieldReport {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            path: field.path.clone(),
            name: field.name.clone(),
            field_type: field.field_type.display_name().to_string(),
            max_link: field.max_link,
            parameter: field.parameter.as_ref().map(PortReport::from),
        }
    }
}

/// Printable view of a node type descriptor
#[derive(Debug, Serialize)]
pub struct NodeReport {
    /// Node type name
    pub type_name: String,
    /// Structural inputs
    pub inputs: Vec<PortReport>,
    /// Structural outputs
    pub outputs: Vec<PortReport>,
    /// Fields
    pub fields: Vec<FieldReport>,
    /// Method output parameters
    pub output_parameters: Vec<PortReport>,
    /// Behavior-tree inputs
    pub behavior_inputs: Vec<PortReport>,
    /// Behavior-tree output and its link limit
    pub behavior_output: Option<(PortReport, i32)>,
}

impl From<&NodeTypeDescriptor> for NodeReport {
    fn from(descriptor: &NodeTypeDescriptor) -> Self {
        let ports = |list: &[PortDescriptor]| -> Vec<PortReport> {
            list.iter().map(PortReport::from).collect()
        };
        Self {
            type_name: descriptor.type_name.clone(),
            inputs: ports(&descriptor.inputs),
            outputs: ports(&descriptor.outputs),
            fields: descriptor.fields.iter().map(FieldReport::from).collect(),
            output_parameters: ports(&descriptor.output_parameters),
            behavior_inputs: ports(&descriptor.behavior_inputs),
            behavior_output: descriptor
                .behavior_output
                .as_ref()
                .map(|bt| (PortReport::from(&bt.port), bt.max_link)),
        }
    }
}

/// Build the reports for the requested node names (all when empty)
pub fn collect(
    registry: &mut TypeMetadataRegistry,
    names: &[String],
) -> Result<Vec<NodeReport>, SettingsError> {
    let nodes = builtin_nodes();

    if let Some(unknown) = names
        .iter()
        .find(|name| !nodes.iter().any(|node| node.name() == **name))
    {
        return Err(SettingsError::UnknownNode(unknown.clone()));
    }

    let mut reports = Vec::new();
    for node in &nodes {
        if !names.is_empty() && !names.contains(&node.name()) {
            continue;
        }
        match registry.get_or_build_shape(node.type_id, node.shape) {
            Ok(descriptor) => reports.push(NodeReport::from(descriptor.as_ref())),
            Err(e) => tracing::warn!("Skipping {}: {}", node.name(), e),
        }
    }
    Ok(reports)
}

/// Encode reports in the requested format
pub fn render(reports: &[NodeReport], format: OutputFormat) -> Result<String, SettingsError> {
    match format {
        OutputFormat::Ron => Ok(ron::ser::to_string_pretty(
            reports,
            ron::ser::PrettyConfig::default(),
        )?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
    }
}
