// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative node shapes.
//!
//! A node type describes its members through a [`NodeShape`]: the methods and
//! fields it declares, in declaration order, each annotated with markers from
//! a closed vocabulary. The metadata builder derives ports from this table.

use crate::port::ValueType;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Method name that marks the value-input handler.
pub const INPUT_HANDLER: &str = "on_input";

/// Method name that marks the behavior-tree child handler.
pub const BEHAVIOR_INPUT_HANDLER: &str = "behavior_input";

/// Marker attached to a method
#[derive(Debug, Clone, PartialEq)]
pub enum MethodMarker {
    /// Emits one structural output port
    Output {
        /// Port name
        name: String,
        /// Value produced on the port
        value_type: ValueType,
        /// Port ID
        id: i32,
    },
    /// Overrides the name and ID of the input port (only on the input handler)
    Input {
        /// Port name; ignored when empty
        name: String,
        /// Port ID
        id: i32,
    },
    /// Publishes the method's return value as an output parameter
    OutputParameter {
        /// Port name
        name: String,
        /// Parameter ID, before namespacing
        id: i32,
    },
    /// Declares the node's behavior-tree output
    BehaviorTreeOutput {
        /// Output ID, before namespacing
        id: i32,
        /// Maximum number of outgoing links
        max_link: i32,
    },
}

/// Marker attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMarker {
    /// Skip the field entirely
    HideInGraph,
    /// Show the field without a label
    HideLabel,
    /// Expose the field as an input parameter
    InputParameter {
        /// Parameter ID, before namespacing
        id: i32,
    },
    /// Expose the field as an output parameter
    OutputParameter {
        /// Parameter ID, before namespacing
        id: i32,
    },
    /// Declares the node's behavior-tree output
    BehaviorTreeOutput {
        /// Output ID, before namespacing
        id: i32,
        /// Maximum number of outgoing links
        max_link: i32,
    },
}

/// A method declared by a node type
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Payload argument type, if the method takes one
    pub payload: Option<ValueType>,
    /// Return type, if any
    pub returns: Option<ValueType>,
    /// Attached markers, in declaration order
    pub markers: Vec<MethodMarker>,
}

impl MethodDecl {
    /// Create a method with no payload, no return value and no markers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
            returns: None,
            markers: Vec::new(),
        }
    }

    /// The value-input handler
    pub fn input_handler() -> Self {
        Self::new(INPUT_HANDLER)
    }

    /// The behavior-tree child handler
    pub fn behavior_input() -> Self {
        Self::new(BEHAVIOR_INPUT_HANDLER)
    }

    /// Set the payload argument type
    pub fn with_payload<T: 'static>(mut self) -> Self {
        self.payload = Some(ValueType::of::<T>());
        self
    }

    /// Set the return type
    pub fn returning<T: 'static>(mut self) -> Self {
        self.returns = Some(ValueType::of::<T>());
        self
    }

    /// Attach an output port marker
    pub fn output<T: 'static>(mut self, name: impl Into<String>, id: i32) -> Self {
        self.markers.push(MethodMarker::Output {
            name: name.into(),
            value_type: ValueType::of::<T>(),
            id,
        });
        self
    }

    /// Attach an input override marker
    pub fn input(mut self, name: impl Into<String>, id: i32) -> Self {
        self.markers.push(MethodMarker::Input {
            name: name.into(),
            id,
        });
        self
    }

    /// Attach an output parameter marker
    pub fn output_parameter(mut self, name: impl Into<String>, id: i32) -> Self {
        self.markers.push(MethodMarker::OutputParameter {
            name: name.into(),
            id,
        });
        self
    }

    /// Attach a behavior-tree output marker
    pub fn behavior_output(mut self, id: i32, max_link: i32) -> Self {
        self.markers
            .push(MethodMarker::BehaviorTreeOutput { id, max_link });
        self
    }
}

/// A field declared by a node type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared field type
    pub field_type: ValueType,
    /// Attached markers, in declaration order
    pub markers: Vec<FieldMarker>,
}

impl FieldDecl {
    /// Create a field of type `T` with no markers
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: ValueType::of::<T>(),
            markers: Vec::new(),
        }
    }

    /// Attach a marker
    pub fn marked(mut self, marker: FieldMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Mark as hidden in the graph view
    pub fn hidden(self) -> Self {
        self.marked(FieldMarker::HideInGraph)
    }

    /// Mark as shown without a label
    pub fn hide_label(self) -> Self {
        self.marked(FieldMarker::HideLabel)
    }

    /// Expose as an input parameter
    pub fn input_parameter(self, id: i32) -> Self {
        self.marked(FieldMarker::InputParameter { id })
    }

    /// Expose as an output parameter
    pub fn output_parameter(self, id: i32) -> Self {
        self.marked(FieldMarker::OutputParameter { id })
    }

    /// Declare a behavior-tree output on this field
    pub fn behavior_output(self, id: i32, max_link: i32) -> Self {
        self.marked(FieldMarker::BehaviorTreeOutput { id, max_link })
    }

    /// Check if the field carries `marker`
    pub fn has(&self, marker: FieldMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// First parameter marker, input taking precedence over output
    pub fn parameter_marker(&self) -> Option<FieldMarker> {
        self.markers
            .iter()
            .find(|m| matches!(m, FieldMarker::InputParameter { .. }))
            .or_else(|| {
                self.markers
                    .iter()
                    .find(|m| matches!(m, FieldMarker::OutputParameter { .. }))
            })
            .copied()
    }

    /// First behavior-tree output marker as `(id, max_link)`
    pub fn behavior_output_marker(&self) -> Option<(i32, i32)> {
        self.markers.iter().find_map(|m| match m {
            FieldMarker::BehaviorTreeOutput { id, max_link } => Some((*id, *max_link)),
            _ => None,
        })
    }
}

/// Declarative description of a node type's members
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    /// Node type name
    pub type_name: String,
    /// Whether the node's value representation is serializable
    pub serializable: bool,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodDecl>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldDecl>,
}

impl NodeShape {
    /// Create a shape for a value representation that is not serializable
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            serializable: false,
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Create a shape for the serializable value representation `T`
    pub fn serializable<T>() -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let mut shape = Self::new(short_type_name(std::any::type_name::<T>()));
        shape.serializable = true;
        shape
    }

    /// Override the type name
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Declare a method
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare a field
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Methods with the given name
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDecl> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

/// A node type that can describe its own shape.
pub trait NodeDefinition: 'static {
    /// Describe the node's members
    fn shape() -> NodeShape;
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Wait;

    #[test]
    fn test_serializable_shape() {
        let shape = NodeShape::serializable::<Wait>();
        assert!(shape.serializable);
        assert_eq!(shape.type_name, "Wait");
        assert!(!NodeShape::new("Raw").serializable);
    }

    #[test]
    fn test_parameter_marker_precedence() {
        let field = FieldDecl::new::<f32>("speed")
            .output_parameter(2)
            .input_parameter(1);
        assert_eq!(
            field.parameter_marker(),
            Some(FieldMarker::InputParameter { id: 1 })
        );
    }

    #[test]
    fn test_methods_named() {
        let shape = NodeShape::new("N")
            .method(MethodDecl::input_handler())
            .method(MethodDecl::new("on_tick"))
            .method(MethodDecl::input_handler().with_payload::<i32>());
        assert_eq!(shape.methods_named(INPUT_HANDLER).count(), 2);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("crate::nodes::Wait"), "Wait");
        assert_eq!(short_type_name("alloc::vec::Vec<i32>"), "Vec");
    }
}
