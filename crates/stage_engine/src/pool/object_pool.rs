//! Fixed-capacity Object Pool
//!
//! Supplies reusable instances per [`ResourceKind`] without unbounded
//! allocation growth, and reclaims them for reuse.
//!
//! # Architecture
//!
//! ```text
//! ObjectPool
//!     ├── instances: SlotMap<InstanceHandle, PooledInstance>   (arena)
//!     ├── pools: HashMap<ResourceKind, PoolEntry>
//!     │          └── capacity / total_allocated / idle queue
//!     └── sink: PlacementSink                                  (host objects)
//! ```
//!
//! Handles are generational arena keys. A released instance keeps its handle
//! and goes back to the idle queue of its kind; an instance that is discarded
//! is removed from the arena, so every handle to it becomes stale.
//!
//! # Usage
//!
//! ```rust
//! use stage_engine::foundation::math::{Quat, Vec3};
//! use stage_engine::pool::{ObjectPool, RecordingSink, ResourceKind};
//!
//! let mut pool = ObjectPool::new(RecordingSink::new());
//! pool.create_pool(ResourceKind::Floor, 4, 16);
//!
//! let handle = pool.acquire(ResourceKind::Floor, Vec3::new(2.0, 0.0, 0.0), Quat::identity()).unwrap();
//! pool.release(ResourceKind::Floor, handle).unwrap();
//! assert_eq!(pool.inactive_count(ResourceKind::Floor), 4);
//! ```

use crate::foundation::math::{Quat, Transform, Vec3};
use crate::pool::sink::{PlacementSink, SinkId};
use crate::pool::ResourceKind;
use slotmap::SlotMap;
use std::collections::{HashMap, VecDeque};

slotmap::new_key_type! {
    /// Opaque handle to a pooled instance
    ///
    /// Returned by [`ObjectPool::acquire`] and required by
    /// [`ObjectPool::release`]. Handles of discarded instances are stale and
    /// rejected.
    pub struct InstanceHandle;
}

/// Errors reported by pool operations
///
/// None of these are fatal for level generation; callers skip the placement
/// (or the release) and carry on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No idle instance and the kind is at its maximum size
    #[error("pool for {kind} is exhausted ({capacity} instances allocated)")]
    CapacityExhausted {
        /// Kind that ran out
        kind: ResourceKind,
        /// Maximum size of that pool
        capacity: usize,
    },

    /// The kind was never registered with `create_pool`
    #[error("no pool registered for {kind}")]
    UnknownResourceKind {
        /// Kind that was requested
        kind: ResourceKind,
    },

    /// The handle does not refer to a live instance
    #[error("handle {handle:?} does not refer to a live instance")]
    InvalidHandle {
        /// Offending handle
        handle: InstanceHandle,
    },

    /// The handle was acquired from a different kind
    #[error("handle {handle:?} belongs to the {actual} pool, not {expected}")]
    KindMismatch {
        /// Offending handle
        handle: InstanceHandle,
        /// Kind given by the caller
        expected: ResourceKind,
        /// Kind the instance was acquired from
        actual: ResourceKind,
    },

    /// The instance is already idle
    #[error("handle {handle:?} was already released")]
    AlreadyReleased {
        /// Offending handle
        handle: InstanceHandle,
    },
}

/// Arena slot for one instance
#[derive(Debug, Clone)]
struct PooledInstance {
    kind: ResourceKind,
    sink_id: SinkId,
    transform: Transform,
    active: bool,
}

/// Bookkeeping for one resource kind
#[derive(Debug)]
struct PoolEntry {
    capacity: usize,
    total_allocated: usize,
    idle: VecDeque<InstanceHandle>,
    stats: KindStats,
}

impl PoolEntry {
    fn active_count(&self) -> usize {
        self.total_allocated - self.idle.len()
    }
}

/// Usage statistics for a single kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Successful acquisitions
    pub acquired: u64,
    /// Successful releases
    pub released: u64,
    /// Acquisitions refused because the pool was full
    pub exhaustions: u64,
    /// Largest number of simultaneously active instances
    pub peak_active: usize,
}

/// Pool-wide statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of registered kinds
    pub registered_kinds: usize,
    /// Instances alive in the arena, active or idle
    pub live_instances: usize,
    /// Acquire/release calls naming an unregistered kind
    pub unknown_kind_requests: u64,
    /// Instances destroyed instead of pooled
    pub discarded: u64,
}

/// Per-kind fixed-capacity allocator backed by a handle arena
pub struct ObjectPool<S: PlacementSink> {
    sink: S,
    instances: SlotMap<InstanceHandle, PooledInstance>,
    pools: HashMap<ResourceKind, PoolEntry>,
    stats: PoolStats,
}

impl<S: PlacementSink> ObjectPool<S> {
    /// Create an empty pool that places instances through `sink`
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            instances: SlotMap::with_key(),
            pools: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Register a pool for `kind`
    ///
    /// A second call for an already registered kind is a no-op. `max_size`
    /// is raised to at least one, and `initial_size` inactive instances
    /// (clamped to `max_size`) are created up front.
    pub fn create_pool(&mut self, kind: ResourceKind, initial_size: usize, max_size: usize) {
        if self.pools.contains_key(&kind) {
            log::trace!("Pool for {} already exists, keeping it", kind);
            return;
        }

        let capacity = max_size.max(1);
        let prewarm = initial_size.min(capacity);
        let mut idle = VecDeque::with_capacity(prewarm);

        for _ in 0..prewarm {
            let sink_id = self.sink.instantiate(kind);
            self.sink.set_active(sink_id, false);
            let handle = self.instances.insert(PooledInstance {
                kind,
                sink_id,
                transform: Transform::identity(),
                active: false,
            });
            idle.push_back(handle);
        }

        self.pools.insert(kind, PoolEntry {
            capacity,
            total_allocated: prewarm,
            idle,
            stats: KindStats::default(),
        });
        self.stats.registered_kinds = self.pools.len();
        self.stats.live_instances = self.instances.len();

        log::info!("Created pool for {}, size {}/{}", kind, prewarm, capacity);
    }

    /// Hand out an instance of `kind` placed at `position` with `rotation`
    ///
    /// Idle instances are always reused before a new one is allocated.
    pub fn acquire(&mut self, kind: ResourceKind, position: Vec3, rotation: Quat) -> Result<InstanceHandle, PoolError> {
        let Some(entry) = self.pools.get_mut(&kind) else {
            self.stats.unknown_kind_requests += 1;
            log::error!("Acquire for {} without a registered pool; call create_pool first", kind);
            return Err(PoolError::UnknownResourceKind { kind });
        };

        let handle = if let Some(handle) = entry.idle.pop_front() {
            handle
        } else if entry.total_allocated < entry.capacity {
            let sink_id = self.sink.instantiate(kind);
            entry.total_allocated += 1;
            self.instances.insert(PooledInstance {
                kind,
                sink_id,
                transform: Transform::identity(),
                active: false,
            })
        } else {
            entry.stats.exhaustions += 1;
            log::warn!("Pool for {} is full ({}/{})", kind, entry.total_allocated, entry.capacity);
            return Err(PoolError::CapacityExhausted { kind, capacity: entry.capacity });
        };

        let transform = Transform::from_position_rotation(position, rotation);
        // Every handle in an idle queue or freshly inserted is live.
        if let Some(instance) = self.instances.get_mut(handle) {
            instance.transform = transform;
            instance.active = true;
            self.sink.set_transform(instance.sink_id, &transform);
            self.sink.set_active(instance.sink_id, true);
        }

        entry.stats.acquired += 1;
        entry.stats.peak_active = entry.stats.peak_active.max(entry.active_count());
        self.stats.live_instances = self.instances.len();

        log::trace!("Acquired {} {:?} at {:?}", kind, handle, position);
        Ok(handle)
    }

    /// Return an instance to the idle queue of `kind`
    ///
    /// Releasing under a kind that was never registered discards the
    /// instance instead of pooling it.
    pub fn release(&mut self, kind: ResourceKind, handle: InstanceHandle) -> Result<(), PoolError> {
        if !self.pools.contains_key(&kind) {
            self.stats.unknown_kind_requests += 1;
            log::error!("Release for {} without a registered pool; discarding {:?}", kind, handle);
            self.discard(handle);
            return Err(PoolError::UnknownResourceKind { kind });
        }

        let Some(instance) = self.instances.get_mut(handle) else {
            return Err(PoolError::InvalidHandle { handle });
        };
        if instance.kind != kind {
            return Err(PoolError::KindMismatch { handle, expected: kind, actual: instance.kind });
        }
        if !instance.active {
            return Err(PoolError::AlreadyReleased { handle });
        }

        instance.active = false;
        self.sink.set_active(instance.sink_id, false);

        if let Some(entry) = self.pools.get_mut(&kind) {
            entry.idle.push_back(handle);
            entry.stats.released += 1;
        }

        log::trace!("Returned {:?} to pool {}", handle, kind);
        Ok(())
    }

    /// Destroy an instance outright and free its slot in the owning pool
    fn discard(&mut self, handle: InstanceHandle) {
        let Some(instance) = self.instances.remove(handle) else {
            return;
        };

        if let Some(owner) = self.pools.get_mut(&instance.kind) {
            owner.total_allocated = owner.total_allocated.saturating_sub(1);
            owner.idle.retain(|idle| *idle != handle);
        }

        self.sink.destroy(instance.sink_id);
        self.stats.discarded += 1;
        self.stats.live_instances = self.instances.len();
        log::warn!("Destroyed {} {:?} (no pool found)", instance.kind, handle);
    }

    /// Check if a pool exists for `kind`
    pub fn has_pool(&self, kind: ResourceKind) -> bool {
        self.pools.contains_key(&kind)
    }

    /// Instances allocated for `kind`, active plus idle
    pub fn total_objects(&self, kind: ResourceKind) -> usize {
        self.pools.get(&kind).map_or(0, |entry| entry.total_allocated)
    }

    /// Idle instances waiting in the queue of `kind`
    pub fn inactive_count(&self, kind: ResourceKind) -> usize {
        self.pools.get(&kind).map_or(0, |entry| entry.idle.len())
    }

    /// Instances of `kind` currently handed out
    pub fn active_count(&self, kind: ResourceKind) -> usize {
        self.pools.get(&kind).map_or(0, PoolEntry::active_count)
    }

    /// Maximum size of the pool for `kind`
    pub fn capacity(&self, kind: ResourceKind) -> Option<usize> {
        self.pools.get(&kind).map(|entry| entry.capacity)
    }

    /// Statistics for one kind
    pub fn kind_stats(&self, kind: ResourceKind) -> Option<KindStats> {
        self.pools.get(&kind).map(|entry| entry.stats)
    }

    /// Pool-wide statistics
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Kind an instance was acquired from
    pub fn kind_of(&self, handle: InstanceHandle) -> Option<ResourceKind> {
        self.instances.get(handle).map(|instance| instance.kind)
    }

    /// Current placement of an instance
    pub fn transform(&self, handle: InstanceHandle) -> Option<Transform> {
        self.instances.get(handle).map(|instance| instance.transform)
    }

    /// Whether an instance is currently handed out
    pub fn is_active(&self, handle: InstanceHandle) -> bool {
        self.instances.get(handle).is_some_and(|instance| instance.active)
    }

    /// Sink-side identifier of an instance
    pub fn sink_id(&self, handle: InstanceHandle) -> Option<SinkId> {
        self.instances.get(handle).map(|instance| instance.sink_id)
    }

    /// Borrow the placement sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the placement sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S: PlacementSink> std::fmt::Debug for ObjectPool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("pools", &self.pools)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
