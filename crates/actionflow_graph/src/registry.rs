// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cache of node type descriptors.
//!
//! Descriptors are built lazily on first lookup and kept until the registry is
//! cleared. Nothing is evicted automatically; hosts that redefine node types
//! at runtime (hot reload) call [`TypeMetadataRegistry::invalidate`] or
//! [`TypeMetadataRegistry::clear`].
//!
//! Lookups take `&mut self`. The registry does no locking of its own; share it
//! across threads through [`SharedTypeRegistry`].

use crate::descriptor::{BuildError, NodeTypeDescriptor};
use crate::shape::{NodeDefinition, NodeShape};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;

/// Registry shared between threads
pub type SharedTypeRegistry = Arc<RwLock<TypeMetadataRegistry>>;

/// Descriptors keyed by node type identity
#[derive(Debug, Default)]
pub struct TypeMetadataRegistry {
    descriptors: IndexMap<TypeId, Arc<NodeTypeDescriptor>>,
}

impl TypeMetadataRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Create a registry ready to be shared between threads
    pub fn shared() -> SharedTypeRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Get the descriptor for `T`, building it on first use.
    ///
    /// Repeated calls return the same `Arc`.
    pub fn get_or_build<T: NodeDefinition>(
        &mut self,
    ) -> Result<Arc<NodeTypeDescriptor>, BuildError> {
        self.get_or_build_shape(TypeId::of::<T>(), T::shape)
    }

    /// Get the descriptor for `type_id`, building it from `shape` on first use.
    ///
    /// `shape` is only called on a cache miss. Failed builds are not cached.
    pub fn get_or_build_shape(
        &mut self,
        type_id: TypeId,
        shape: impl FnOnce() -> NodeShape,
    ) -> Result<Arc<NodeTypeDescriptor>, BuildError> {
        if let Some(descriptor) = self.descriptors.get(&type_id) {
            return Ok(Arc::clone(descriptor));
        }

        let descriptor = Arc::new(NodeTypeDescriptor::build(&shape())?);
        tracing::debug!("Cached descriptor for {}", descriptor.type_name);
        self.descriptors.insert(type_id, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Get a cached descriptor
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<NodeTypeDescriptor>> {
        self.descriptors.get(&type_id)
    }

    /// Check if a descriptor is cached for `type_id`
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.descriptors.contains_key(&type_id)
    }

    /// Get all cached descriptors, in build order
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<NodeTypeDescriptor>> {
        self.descriptors.values()
    }

    /// Number of cached descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Drop the descriptor for one type so the next lookup rebuilds it
    pub fn invalidate(&mut self, type_id: TypeId) -> Option<Arc<NodeTypeDescriptor>> {
        let removed = self.descriptors.shift_remove(&type_id);
        if let Some(descriptor) = &removed {
            tracing::debug!("Invalidated descriptor for {}", descriptor.type_name);
        }
        removed
    }

    /// Drop every cached descriptor
    pub fn clear(&mut self) {
        tracing::debug!("Clearing {} cached descriptors", self.descriptors.len());
        self.descriptors.clear();
    }
}
