// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions and link compatibility.
//!
//! Every port carries a [`Role`]. Roles are encoded as a 12-bit pair: the
//! upper six bits are the role's *flag* half, the lower six its *match* half.
//! Two roles may be linked when the other side's match half covers every flag
//! bit this side exposes (see [`Role::matches`]).

use std::any::TypeId;
use std::fmt;

/// Offset applied to every parameter-role port ID.
pub const PARAMETER_ID_PREFIX: i32 = 10_000;

/// Offset applied to every behavior-tree port ID.
pub const BEHAVIOR_TREE_ID_PREFIX: i32 = 1_000_000;

/// Stride between behavior-tree output IDs declared with distinct marker IDs.
pub const BEHAVIOR_TREE_ID_STRIDE: i32 = 100;

/// Role of a port on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Role {
    /// Structural value input
    Input = 0b000001_000010,
    /// Structural value output
    Output = 0b000010_000001,
    /// Parameter read by the node
    InputParameter = 0b000100_001000,
    /// Parameter published by the node
    OutputParameter = 0b001000_000100,
    /// Behavior-tree parent link (the node is a child)
    BehaviorTreeInput = 0b010000_100000,
    /// Behavior-tree child link (the node is a parent)
    BehaviorTreeOutput = 0b100000_010000,
}

impl Role {
    /// Isolates the match half of a role encoding.
    pub const MASK: u16 = 0b000000_111111;

    /// All roles, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Input,
        Role::Output,
        Role::InputParameter,
        Role::OutputParameter,
        Role::BehaviorTreeInput,
        Role::BehaviorTreeOutput,
    ];

    /// Raw 12-bit encoding.
    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Upper six bits, shifted down.
    pub const fn flag_half(self) -> u16 {
        self.bits() >> 6
    }

    /// Lower six bits.
    pub const fn match_half(self) -> u16 {
        self.bits() & Self::MASK
    }

    /// Check if a port with this role may be linked to a port with `other`.
    ///
    /// The encoding is asymmetric (`self` contributes flags, `other`
    /// contributes match bits) yet every canonical pair matches in both
    /// directions. Do not replace this with a role comparison: a future role
    /// may share part of an existing role's flag set.
    pub const fn matches(self, other: Role) -> bool {
        let flags = self.flag_half();
        (flags & other.match_half()) == flags
    }

    /// Short tag used when a port has no explicit name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Input => "In",
            Self::Output => "Out",
            Self::InputParameter => "ParamIn",
            Self::OutputParameter => "ParamOut",
            Self::BehaviorTreeInput => "BTin",
            Self::BehaviorTreeOutput => "BTout",
        }
    }

    /// Get the pin color for this role (for UI)
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::BehaviorTreeInput | Self::BehaviorTreeOutput => [117, 184, 217],
            Self::InputParameter | Self::OutputParameter => [179, 217, 179],
            Self::Input | Self::Output => [255, 255, 255],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Semantic type of the value flowing through a port or stored in a field.
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    /// Capture the value type of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type identity
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full Rust type name
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Human-readable name shown next to a port.
    pub fn display_name(&self) -> &'static str {
        if self.id == TypeId::of::<i32>() {
            "int"
        } else if self.id == TypeId::of::<f32>() {
            "float"
        } else {
            self.name
        }
    }

    /// Check if this value type is `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A port derived from a node type's shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Explicit display name, if any
    pub name: Option<String>,
    /// Value type; `None` for untyped ports such as behavior-tree links
    pub value_type: Option<ValueType>,
    /// Category-namespaced port ID
    pub id: i32,
    /// Port role
    pub role: Role,
}

impl PortDescriptor {
    /// Create an unnamed, untyped port
    pub fn new(role: Role, id: i32) -> Self {
        Self {
            name: None,
            value_type: None,
            id,
            role,
        }
    }

    /// Set the explicit name. Empty names are ignored.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    /// Set the value type
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Name shown in the editor.
    ///
    /// Falls back to the role tag. Structural ports append the value type,
    /// e.g. `In (float)`.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (self.role, self.value_type) {
            (Role::Input | Role::Output, Some(ty)) => format!("{} ({})", self.role.tag(), ty),
            _ => self.role.tag().to_string(),
        }
    }

    /// Check if a link to another port is valid
    pub fn can_connect(&self, other: &PortDescriptor) -> bool {
        self.role.matches(other.role)
    }
}
