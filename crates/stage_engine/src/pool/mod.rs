//! Instance pooling
//!
//! This module provides the fixed-capacity allocator that supplies and
//! reclaims the instances placed at every grid cell, fence and runway step.
//! Instances are created through a [`PlacementSink`] and addressed by opaque
//! [`InstanceHandle`]s.

pub mod resource_kind;
pub mod sink;
pub mod object_pool;
pub mod shared;

pub use resource_kind::ResourceKind;
pub use sink::{PlacementCommand, PlacementSink, RecordingSink, SceneInstance, SinkId};
pub use object_pool::{InstanceHandle, KindStats, ObjectPool, PoolError, PoolStats};
pub use shared::SharedObjectPool;

use crate::foundation::math::{Quat, Vec3};

/// The pool operations level composition relies on
///
/// Implemented by [`ObjectPool`] for single-owner use and by
/// [`SharedObjectPool`] when releases may come from another thread.
pub trait InstancePool {
    /// Register a pool for `kind`; no-op when it already exists
    fn create_pool(&mut self, kind: ResourceKind, initial_size: usize, max_size: usize);

    /// Hand out an instance of `kind` at the given placement
    fn acquire(&mut self, kind: ResourceKind, position: Vec3, rotation: Quat) -> Result<InstanceHandle, PoolError>;

    /// Return an instance to the idle queue of `kind`
    fn release(&mut self, kind: ResourceKind, handle: InstanceHandle) -> Result<(), PoolError>;

    /// Instances of `kind` currently handed out
    fn active_count(&self, kind: ResourceKind) -> usize;

    /// Pool-wide statistics
    fn pool_stats(&self) -> PoolStats;
}

impl<S: PlacementSink> InstancePool for ObjectPool<S> {
    fn create_pool(&mut self, kind: ResourceKind, initial_size: usize, max_size: usize) {
        Self::create_pool(self, kind, initial_size, max_size);
    }

    fn acquire(&mut self, kind: ResourceKind, position: Vec3, rotation: Quat) -> Result<InstanceHandle, PoolError> {
        Self::acquire(self, kind, position, rotation)
    }

    fn release(&mut self, kind: ResourceKind, handle: InstanceHandle) -> Result<(), PoolError> {
        Self::release(self, kind, handle)
    }

    fn active_count(&self, kind: ResourceKind) -> usize {
        Self::active_count(self, kind)
    }

    fn pool_stats(&self) -> PoolStats {
        self.stats()
    }
}
