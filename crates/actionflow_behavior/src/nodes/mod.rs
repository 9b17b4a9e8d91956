// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in behavior-tree nodes.

pub mod root;
pub mod composite;

pub use composite::{Selector, Sequence};
pub use root::Root;
