// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type descriptors built from node shapes.

use crate::port::{
    PortDescriptor, Role, ValueType, BEHAVIOR_TREE_ID_PREFIX, BEHAVIOR_TREE_ID_STRIDE,
    PARAMETER_ID_PREFIX,
};
use crate::shape::{
    FieldMarker, MethodMarker, NodeShape, BEHAVIOR_INPUT_HANDLER, INPUT_HANDLER,
};

/// Link count meaning "unlimited / not applicable"
pub const UNLIMITED_LINKS: i32 = -1;

/// A field exposed in the graph view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Member path
    pub path: String,
    /// Declared field type
    pub field_type: ValueType,
    /// Display name; empty when the label is hidden
    pub name: String,
    /// Maximum outgoing behavior-tree links, or [`UNLIMITED_LINKS`]
    pub max_link: i32,
    /// Bound parameter port
    pub parameter: Option<PortDescriptor>,
    /// Bound behavior-tree output port
    pub behavior_output: Option<PortDescriptor>,
}

/// The node's single behavior-tree output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorTreeOutputDescriptor {
    /// Maximum outgoing links
    pub max_link: i32,
    /// Output port
    pub port: PortDescriptor,
}

impl Default for BehaviorTreeOutputDescriptor {
    fn default() -> Self {
        Self {
            max_link: 1,
            port: PortDescriptor::new(Role::BehaviorTreeOutput, BEHAVIOR_TREE_ID_PREFIX),
        }
    }
}

/// Ports and fields of one node type.
///
/// Built once per type by [`NodeTypeDescriptor::build`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTypeDescriptor {
    /// Node type name
    pub type_name: String,
    /// Structural input ports
    pub inputs: Vec<PortDescriptor>,
    /// Structural output ports
    pub outputs: Vec<PortDescriptor>,
    /// Visible fields, in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Output parameters published by methods
    pub output_parameters: Vec<PortDescriptor>,
    /// Behavior-tree input ports
    pub behavior_inputs: Vec<PortDescriptor>,
    /// Behavior-tree output, if declared
    pub behavior_output: Option<BehaviorTreeOutputDescriptor>,
}

/// Error when building a node type descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The node's value representation is not serializable
    #[error("{type_name} is not marked serializable")]
    NotSerializable {
        /// Offending node type
        type_name: String,
    },

    /// A marker ID overflows or leaves its role's namespace.
    ///
    /// Structural IDs stay below [`PARAMETER_ID_PREFIX`], namespaced parameter
    /// IDs below [`BEHAVIOR_TREE_ID_PREFIX`], and behavior-tree IDs at or above
    /// it.
    #[error("{type_name}: {role} ID {id} is out of range")]
    IdOutOfRange {
        /// Offending node type
        type_name: String,
        /// Role the ID was declared for
        role: Role,
        /// Raw marker ID
        id: i32,
    },
}

impl NodeTypeDescriptor {
    /// Build the descriptor for a node shape.
    ///
    /// Fails before any port is derived if the shape is not serializable, and
    /// with [`BuildError::IdOutOfRange`] if a marker ID cannot be namespaced.
    pub fn build(shape: &NodeShape) -> Result<Self, BuildError> {
        if !shape.serializable {
            return Err(BuildError::NotSerializable {
                type_name: shape.type_name.clone(),
            });
        }

        let descriptor = Self {
            type_name: shape.type_name.clone(),
            inputs: build_inputs(shape)?,
            outputs: build_outputs(shape)?,
            fields: build_fields(shape)?,
            output_parameters: build_output_parameters(shape)?,
            behavior_inputs: build_behavior_inputs(shape),
            behavior_output: build_behavior_output(shape)?,
        };

        tracing::debug!(
            "Built descriptor for {}: {} inputs, {} outputs, {} fields",
            descriptor.type_name,
            descriptor.inputs.len(),
            descriptor.outputs.len(),
            descriptor.fields.len()
        );
        Ok(descriptor)
    }

    /// Get all ports, bound field ports included
    pub fn ports(&self) -> impl Iterator<Item = &PortDescriptor> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.fields.iter().filter_map(|f| f.parameter.as_ref()))
            .chain(self.output_parameters.iter())
            .chain(self.behavior_inputs.iter())
            .chain(self.behavior_output.iter().map(|bt| &bt.port))
    }

    /// Find a port by ID and role
    pub fn find_port(&self, id: i32, role: Role) -> Option<&PortDescriptor> {
        self.ports().find(|p| p.id == id && p.role == role)
    }

    /// Get a field by path
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Whether the node can be a behavior-tree child
    pub fn is_behavior_child(&self) -> bool {
        !self.behavior_inputs.is_empty()
    }
}

/// Apply the namespace of `role` to a raw marker ID.
fn namespaced_id(shape: &NodeShape, role: Role, id: i32) -> Result<i32, BuildError> {
    let namespaced = match role {
        Role::Input | Role::Output => (id < PARAMETER_ID_PREFIX).then_some(id),
        Role::InputParameter | Role::OutputParameter => PARAMETER_ID_PREFIX
            .checked_add(id)
            .filter(|n| (PARAMETER_ID_PREFIX..BEHAVIOR_TREE_ID_PREFIX).contains(n)),
        Role::BehaviorTreeInput | Role::BehaviorTreeOutput => id
            .checked_mul(BEHAVIOR_TREE_ID_STRIDE)
            .and_then(|n| BEHAVIOR_TREE_ID_PREFIX.checked_add(n))
            .filter(|n| *n >= BEHAVIOR_TREE_ID_PREFIX),
    };
    namespaced.ok_or_else(|| BuildError::IdOutOfRange {
        type_name: shape.type_name.clone(),
        role,
        id,
    })
}

fn build_inputs(shape: &NodeShape) -> Result<Vec<PortDescriptor>, BuildError> {
    let mut handlers = shape.methods_named(INPUT_HANDLER);
    let Some(handler) = handlers.next() else {
        return Ok(Vec::new());
    };
    if handlers.next().is_some() {
        tracing::warn!(
            "{} declares more than one {INPUT_HANDLER}; using the first",
            shape.type_name
        );
    }

    let mut port = PortDescriptor::new(Role::Input, 0);
    port.value_type = handler.payload;
    let marker = handler.markers.iter().find_map(|m| match m {
        MethodMarker::Input { name, id } => Some((name, *id)),
        _ => None,
    });
    if let Some((name, id)) = marker {
        port = port.with_name(name.as_str());
        port.id = namespaced_id(shape, Role::Input, id)?;
    }
    Ok(vec![port])
}

fn build_outputs(shape: &NodeShape) -> Result<Vec<PortDescriptor>, BuildError> {
    shape
        .methods
        .iter()
        .flat_map(|m| m.markers.iter())
        .filter_map(|marker| match marker {
            MethodMarker::Output {
                name,
                value_type,
                id,
            } => Some(namespaced_id(shape, Role::Output, *id).map(|id| {
                PortDescriptor::new(Role::Output, id)
                    .with_name(name.as_str())
                    .with_value_type(*value_type)
            })),
            _ => None,
        })
        .collect()
}

fn build_fields(shape: &NodeShape) -> Result<Vec<FieldDescriptor>, BuildError> {
    let mut fields = Vec::with_capacity(shape.fields.len());
    for field in &shape.fields {
        if field.has(FieldMarker::HideInGraph) {
            continue;
        }

        let has_input = field
            .markers
            .iter()
            .any(|m| matches!(m, FieldMarker::InputParameter { .. }));
        let has_output = field
            .markers
            .iter()
            .any(|m| matches!(m, FieldMarker::OutputParameter { .. }));
        if has_input && has_output {
            tracing::warn!(
                "{}.{} is marked as both input and output parameter; keeping the input",
                shape.type_name,
                field.name
            );
        }

        let parameter = match field.parameter_marker() {
            Some(FieldMarker::InputParameter { id }) => Some((Role::InputParameter, id)),
            Some(FieldMarker::OutputParameter { id }) => Some((Role::OutputParameter, id)),
            _ => None,
        };
        let parameter = match parameter {
            Some((role, id)) => Some(
                PortDescriptor::new(role, namespaced_id(shape, role, id)?)
                    .with_name(field.name.as_str())
                    .with_value_type(field.field_type),
            ),
            None => None,
        };

        let (max_link, behavior_output) = match field.behavior_output_marker() {
            Some((_, max_link)) => (
                max_link,
                Some(PortDescriptor::new(
                    Role::BehaviorTreeOutput,
                    BEHAVIOR_TREE_ID_PREFIX,
                )),
            ),
            None => (UNLIMITED_LINKS, None),
        };

        let name = if field.has(FieldMarker::HideLabel) {
            String::new()
        } else {
            field.name.clone()
        };

        fields.push(FieldDescriptor {
            path: field.name.clone(),
            field_type: field.field_type,
            name,
            max_link,
            parameter,
            behavior_output,
        });
    }
    Ok(fields)
}

fn build_output_parameters(shape: &NodeShape) -> Result<Vec<PortDescriptor>, BuildError> {
    let mut parameters = Vec::new();
    for method in &shape.methods {
        let marker = method.markers.iter().find_map(|m| match m {
            MethodMarker::OutputParameter { name, id } => Some((name, *id)),
            _ => None,
        });
        let Some((name, id)) = marker else {
            continue;
        };
        let id = namespaced_id(shape, Role::OutputParameter, id)?;
        let mut port = PortDescriptor::new(Role::OutputParameter, id).with_name(name.as_str());
        port.value_type = method.returns;
        if port.value_type.is_none() {
            tracing::warn!(
                "{}.{} publishes an output parameter but returns nothing",
                shape.type_name,
                method.name
            );
        }
        parameters.push(port);
    }
    Ok(parameters)
}

fn build_behavior_inputs(shape: &NodeShape) -> Vec<PortDescriptor> {
    if shape.methods_named(BEHAVIOR_INPUT_HANDLER).next().is_some() {
        vec![PortDescriptor::new(
            Role::BehaviorTreeInput,
            BEHAVIOR_TREE_ID_PREFIX,
        )]
    } else {
        Vec::new()
    }
}

/// Fields are scanned before methods; the last declaration found wins.
fn build_behavior_output(
    shape: &NodeShape,
) -> Result<Option<BehaviorTreeOutputDescriptor>, BuildError> {
    let from_fields = shape
        .fields
        .iter()
        .filter_map(|f| f.behavior_output_marker());
    let from_methods = shape
        .methods
        .iter()
        .flat_map(|m| m.markers.iter())
        .filter_map(|m| match m {
            MethodMarker::BehaviorTreeOutput { id, max_link } => Some((*id, *max_link)),
            _ => None,
        });

    let mut last = None;
    for decl in from_fields.chain(from_methods) {
        if last.is_some() {
            tracing::debug!(
                "{} redeclares its behavior-tree output; later declaration wins",
                shape.type_name
            );
        }
        last = Some(decl);
    }

    let Some((id, max_link)) = last else {
        return Ok(None);
    };
    Ok(Some(BehaviorTreeOutputDescriptor {
        max_link,
        port: PortDescriptor::new(
            Role::BehaviorTreeOutput,
            namespaced_id(shape, Role::BehaviorTreeOutput, id)?,
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldDecl, MethodDecl};

    fn shape() -> NodeShape {
        let mut shape = NodeShape::new("Sample");
        shape.serializable = true;
        shape
    }

    #[test]
    fn test_not_serializable() {
        let shape = NodeShape::new("Loose").method(MethodDecl::input_handler());
        let err = NodeTypeDescriptor::build(&shape).unwrap_err();
        assert_eq!(
            err,
            BuildError::NotSerializable {
                type_name: "Loose".to_string()
            }
        );
    }

    #[test]
    fn test_empty_shape() {
        let descriptor = NodeTypeDescriptor::build(&shape()).unwrap();
        assert!(descriptor.inputs.is_empty());
        assert!(descriptor.outputs.is_empty());
        assert!(descriptor.fields.is_empty());
        assert!(descriptor.output_parameters.is_empty());
        assert!(descriptor.behavior_inputs.is_empty());
        assert!(descriptor.behavior_output.is_none());
        assert_eq!(descriptor.ports().count(), 0);
    }

    #[test]
    fn test_input_payload_and_override() {
        let plain = shape().method(MethodDecl::input_handler().with_payload::<f32>());
        let descriptor = NodeTypeDescriptor::build(&plain).unwrap();
        assert_eq!(descriptor.inputs.len(), 1);
        let input = &descriptor.inputs[0];
        assert_eq!(input.id, 0);
        assert!(input.name.is_none());
        assert!(input.value_type.unwrap().is::<f32>());
        assert_eq!(input.display_name(), "In (float)");

        let named = shape().method(MethodDecl::input_handler().input("Trigger", 4));
        let descriptor = NodeTypeDescriptor::build(&named).unwrap();
        assert_eq!(descriptor.inputs[0].id, 4);
        assert_eq!(descriptor.inputs[0].display_name(), "Trigger");
        assert!(descriptor.inputs[0].value_type.is_none());
    }

    #[test]
    fn test_only_first_input_handler_counts() {
        let twice = shape()
            .method(MethodDecl::input_handler())
            .method(MethodDecl::input_handler().with_payload::<i32>());
        let descriptor = NodeTypeDescriptor::build(&twice).unwrap();
        assert_eq!(descriptor.inputs.len(), 1);
        assert!(descriptor.inputs[0].value_type.is_none());
    }

    #[test]
    fn test_outputs_keep_declaration_order() {
        let s = shape()
            .method(
                MethodDecl::new("on_tick")
                    .output::<f32>("Value", 1)
                    .output::<bool>("Done", 2),
            )
            .method(MethodDecl::new("on_exit").output::<i32>("Count", 3));
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        let ids: Vec<i32> = descriptor.outputs.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(descriptor.outputs.iter().all(|p| p.role == Role::Output));
    }

    #[test]
    fn test_field_ports() {
        let s = shape()
            .field(FieldDecl::new::<f32>("speed").input_parameter(7))
            .field(FieldDecl::new::<i32>("count").output_parameter(2))
            .field(FieldDecl::new::<String>("note").hide_label())
            .field(FieldDecl::new::<bool>("secret").hidden().input_parameter(9));
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();

        let paths: Vec<&str> = descriptor.fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["speed", "count", "note"]);

        let speed = descriptor.field("speed").unwrap();
        let port = speed.parameter.as_ref().unwrap();
        assert_eq!(port.role, Role::InputParameter);
        assert_eq!(port.id, PARAMETER_ID_PREFIX + 7);
        assert_eq!(speed.max_link, UNLIMITED_LINKS);

        let count = descriptor.field("count").unwrap();
        assert_eq!(count.parameter.as_ref().unwrap().role, Role::OutputParameter);

        let note = descriptor.field("note").unwrap();
        assert!(note.name.is_empty());
        assert!(note.parameter.is_none());

        assert!(descriptor.field("secret").is_none());
    }

    #[test]
    fn test_field_behavior_output() {
        let s = shape().field(FieldDecl::new::<Vec<u32>>("children").behavior_output(2, 4));
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        let children = descriptor.field("children").unwrap();
        assert_eq!(children.max_link, 4);
        let port = children.behavior_output.as_ref().unwrap();
        assert_eq!(port.id, BEHAVIOR_TREE_ID_PREFIX);

        let bt = descriptor.behavior_output.as_ref().unwrap();
        assert_eq!(bt.max_link, 4);
        assert_eq!(bt.port.id, BEHAVIOR_TREE_ID_PREFIX + 2 * BEHAVIOR_TREE_ID_STRIDE);
    }

    #[test]
    fn test_method_output_parameter_uses_return_type() {
        let s = shape().method(
            MethodDecl::new("distance")
                .returning::<f32>()
                .output_parameter("Distance", 5),
        );
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        assert_eq!(descriptor.output_parameters.len(), 1);
        let port = &descriptor.output_parameters[0];
        assert_eq!(port.id, PARAMETER_ID_PREFIX + 5);
        assert!(port.value_type.unwrap().is::<f32>());
        assert_eq!(port.display_name(), "Distance");
    }

    #[test]
    fn test_behavior_input() {
        let s = shape()
            .method(MethodDecl::behavior_input())
            .method(MethodDecl::behavior_input());
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        assert_eq!(descriptor.behavior_inputs.len(), 1);
        let port = &descriptor.behavior_inputs[0];
        assert_eq!(port.id, BEHAVIOR_TREE_ID_PREFIX);
        assert!(port.value_type.is_none());
        assert!(descriptor.is_behavior_child());
    }

    #[test]
    fn test_method_behavior_output_overrides_field() {
        let s = shape()
            .field(FieldDecl::new::<Vec<u32>>("children").behavior_output(1, 8))
            .method(MethodDecl::new("on_tick").behavior_output(3, 1));
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        let bt = descriptor.behavior_output.unwrap();
        assert_eq!(bt.max_link, 1);
        assert_eq!(bt.port.id, BEHAVIOR_TREE_ID_PREFIX + 3 * BEHAVIOR_TREE_ID_STRIDE);
        // The field keeps its own bound port
        assert_eq!(descriptor.fields[0].max_link, 8);
    }

    #[test]
    fn test_hidden_field_still_declares_behavior_output() {
        let s = shape().field(
            FieldDecl::new::<Vec<u32>>("children")
                .hidden()
                .behavior_output(1, 2),
        );
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        assert!(descriptor.fields.is_empty());
        assert_eq!(descriptor.behavior_output.unwrap().max_link, 2);
    }

    #[test]
    fn test_find_port() {
        let s = shape()
            .method(MethodDecl::new("on_tick").output::<f32>("Value", 1))
            .field(FieldDecl::new::<f32>("speed").input_parameter(1));
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        assert!(descriptor.find_port(1, Role::Output).is_some());
        assert!(descriptor.find_port(1, Role::InputParameter).is_none());
        assert!(descriptor
            .find_port(PARAMETER_ID_PREFIX + 1, Role::InputParameter)
            .is_some());
    }

    fn out_of_range(role: Role, id: i32) -> BuildError {
        BuildError::IdOutOfRange {
            type_name: "Sample".to_string(),
            role,
            id,
        }
    }

    #[test]
    fn test_parameter_id_overflow_is_rejected() {
        let s = shape().field(FieldDecl::new::<i32>("x").input_parameter(i32::MAX));
        let err = NodeTypeDescriptor::build(&s).unwrap_err();
        assert_eq!(err, out_of_range(Role::InputParameter, i32::MAX));

        let s = shape().method(
            MethodDecl::new("total")
                .returning::<i32>()
                .output_parameter("Total", i32::MAX),
        );
        let err = NodeTypeDescriptor::build(&s).unwrap_err();
        assert_eq!(err, out_of_range(Role::OutputParameter, i32::MAX));
    }

    #[test]
    fn test_behavior_output_id_overflow_is_rejected() {
        let s = shape().method(MethodDecl::new("on_tick").behavior_output(30_000_000, 1));
        let err = NodeTypeDescriptor::build(&s).unwrap_err();
        assert_eq!(err, out_of_range(Role::BehaviorTreeOutput, 30_000_000));

        let s = shape().field(FieldDecl::new::<Vec<u32>>("children").behavior_output(-1, 1));
        let err = NodeTypeDescriptor::build(&s).unwrap_err();
        assert_eq!(err, out_of_range(Role::BehaviorTreeOutput, -1));
    }

    #[test]
    fn test_namespaces_never_collide() {
        let structural = shape()
            .method(MethodDecl::new("on_tick").output::<f32>("Value", PARAMETER_ID_PREFIX + 1))
            .field(FieldDecl::new::<f32>("speed").input_parameter(1));
        let err = NodeTypeDescriptor::build(&structural).unwrap_err();
        assert_eq!(err, out_of_range(Role::Output, PARAMETER_ID_PREFIX + 1));

        let input = shape().method(MethodDecl::input_handler().input("Go", PARAMETER_ID_PREFIX));
        let err = NodeTypeDescriptor::build(&input).unwrap_err();
        assert_eq!(err, out_of_range(Role::Input, PARAMETER_ID_PREFIX));

        let raw = BEHAVIOR_TREE_ID_PREFIX - PARAMETER_ID_PREFIX;
        let parameter = shape()
            .method(MethodDecl::behavior_input())
            .method(
                MethodDecl::new("total")
                    .returning::<i32>()
                    .output_parameter("Total", raw),
            );
        let err = NodeTypeDescriptor::build(&parameter).unwrap_err();
        assert_eq!(err, out_of_range(Role::OutputParameter, raw));

        let negative = shape().field(FieldDecl::new::<f32>("speed").output_parameter(-1));
        let err = NodeTypeDescriptor::build(&negative).unwrap_err();
        assert_eq!(err, out_of_range(Role::OutputParameter, -1));
    }

    #[test]
    fn test_namespace_edges_are_accepted() {
        let s = shape()
            .method(MethodDecl::behavior_input())
            .method(
                MethodDecl::new("on_tick")
                    .output::<f32>("Value", PARAMETER_ID_PREFIX - 1)
                    .behavior_output(0, 1),
            )
            .field(
                FieldDecl::new::<f32>("speed")
                    .input_parameter(BEHAVIOR_TREE_ID_PREFIX - PARAMETER_ID_PREFIX - 1),
            );
        let descriptor = NodeTypeDescriptor::build(&s).unwrap();
        let mut ids: Vec<(Role, i32)> = descriptor.ports().map(|p| (p.role, p.id)).collect();
        ids.sort_by_key(|(_, id)| *id);
        assert_eq!(
            ids,
            vec![
                (Role::Output, PARAMETER_ID_PREFIX - 1),
                (Role::InputParameter, BEHAVIOR_TREE_ID_PREFIX - 1),
                (Role::BehaviorTreeInput, BEHAVIOR_TREE_ID_PREFIX),
                (Role::BehaviorTreeOutput, BEHAVIOR_TREE_ID_PREFIX),
            ]
        );
    }
}
