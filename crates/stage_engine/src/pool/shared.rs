//! Thread-shared pool handle
//!
//! Wraps an [`ObjectPool`] in a single global lock so that a release issued
//! by a previous generation pass on another thread cannot interleave with an
//! acquire on the same kind. Plain `&mut ObjectPool` is enough when one owner
//! drives both.

use crate::foundation::math::{Quat, Vec3};
use crate::pool::{InstanceHandle, InstancePool, ObjectPool, PlacementSink, PoolError, PoolStats, ResourceKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable, lock-guarded handle to one [`ObjectPool`]
pub struct SharedObjectPool<S: PlacementSink> {
    inner: Arc<Mutex<ObjectPool<S>>>,
}

impl<S: PlacementSink> SharedObjectPool<S> {
    /// Share an existing pool
    pub fn new(pool: ObjectPool<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Lock the pool for a batch of operations
    ///
    /// A poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, ObjectPool<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the pool
    pub fn with<R>(&self, f: impl FnOnce(&mut ObjectPool<S>) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<S: PlacementSink> Clone for SharedObjectPool<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PlacementSink> InstancePool for SharedObjectPool<S> {
    fn create_pool(&mut self, kind: ResourceKind, initial_size: usize, max_size: usize) {
        self.lock().create_pool(kind, initial_size, max_size);
    }

    fn acquire(&mut self, kind: ResourceKind, position: Vec3, rotation: Quat) -> Result<InstanceHandle, PoolError> {
        self.lock().acquire(kind, position, rotation)
    }

    fn release(&mut self, kind: ResourceKind, handle: InstanceHandle) -> Result<(), PoolError> {
        self.lock().release(kind, handle)
    }

    fn active_count(&self, kind: ResourceKind) -> usize {
        self.lock().active_count(kind)
    }

    fn pool_stats(&self) -> PoolStats {
        self.lock().stats()
    }
}
