//! AABB pool: flat 6-float records with bump + LIFO recycling
//!
//! Allocation is a bump counter; released slots go onto a LIFO free-list
//! and are reused most-recent-first before the bump counter moves again.
//! `size` reports the bump count only - the number of distinct slots ever
//! allocated since the last reset - and is unaffected by `release`.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::error::IndexError;
use crate::pool::index::IndexPool;
use crate::pool::store::{FloatStore, SharedRegion};

/// Floats per AABB record: `[min_x, min_y, min_z, max_x, max_y, max_z]`
pub const FLOATS_PER_AABB: usize = 6;

/// Fixed-capacity store of AABB records
#[derive(Debug)]
pub struct AabbPool {
    store: FloatStore,
    free: IndexPool,
    bump: u32,
    capacity: u32,
}

impl AabbPool {
    /// Construct with an owned, zero-filled buffer
    pub fn new(capacity: u32) -> Self {
        Self {
            store: FloatStore::owned(capacity as usize * FLOATS_PER_AABB),
            free: IndexPool::empty(capacity),
            bump: 0,
            capacity,
        }
    }

    /// Construct backed by a fresh shared region
    ///
    /// The region can be cloned out via [`region`](Self::region) and
    /// handed to another thread; a second pool built over the same region
    /// with [`shared_with`](Self::shared_with) sees the same records but
    /// keeps its own bump counter and free-list.
    pub fn create_shared(capacity: u32) -> Self {
        let region = SharedRegion::new(capacity as usize * FLOATS_PER_AABB);
        Self {
            store: FloatStore::shared(region),
            free: IndexPool::empty(capacity),
            bump: 0,
            capacity,
        }
    }

    /// Construct over an existing shared region
    pub fn shared_with(region: SharedRegion, capacity: u32) -> Result<Self, IndexError> {
        let expected = capacity as usize * FLOATS_PER_AABB;
        if region.len() != expected {
            return Err(IndexError::RegionMismatch {
                expected,
                actual: region.len(),
            });
        }
        Ok(Self {
            store: FloatStore::shared(region),
            free: IndexPool::empty(capacity),
            bump: 0,
            capacity,
        })
    }

    /// The shared region backing this pool, if any
    pub fn region(&self) -> Option<SharedRegion> {
        match &self.store {
            FloatStore::Shared(r) => Some(r.clone()),
            FloatStore::Owned(_) => None,
        }
    }

    /// Allocate a slot: most recently released first, else bump
    pub fn allocate(&mut self) -> Result<u32, IndexError> {
        if let Some(index) = self.free.acquire() {
            return Ok(index);
        }
        if self.bump >= self.capacity {
            return Err(IndexError::CapacityExceeded {
                what: "AABB pool",
                capacity: self.capacity,
            });
        }
        let index = self.bump;
        self.bump += 1;
        Ok(index)
    }

    /// Return a slot to the free-list
    pub fn release(&mut self, index: u32) -> Result<(), IndexError> {
        self.free.release(index)
    }

    /// Write a record
    #[inline]
    pub fn set(&mut self, index: u32, min: Vec3, max: Vec3) {
        let off = index as usize * FLOATS_PER_AABB;
        self.store.set(off, min.x);
        self.store.set(off + 1, min.y);
        self.store.set(off + 2, min.z);
        self.store.set(off + 3, max.x);
        self.store.set(off + 4, max.y);
        self.store.set(off + 5, max.z);
    }

    /// Read one component of a record (0..6, min-xyz then max-xyz)
    #[inline]
    pub fn get(&self, index: u32, component: usize) -> f32 {
        self.store.get(index as usize * FLOATS_PER_AABB + component)
    }

    /// Minimum corner of a record
    #[inline]
    pub fn min(&self, index: u32) -> Vec3 {
        let off = index as usize * FLOATS_PER_AABB;
        Vec3::new(
            self.store.get(off),
            self.store.get(off + 1),
            self.store.get(off + 2),
        )
    }

    /// Maximum corner of a record
    #[inline]
    pub fn max(&self, index: u32) -> Vec3 {
        let off = index as usize * FLOATS_PER_AABB;
        Vec3::new(
            self.store.get(off + 3),
            self.store.get(off + 4),
            self.store.get(off + 5),
        )
    }

    /// Number of distinct slots ever bump-allocated since the last reset
    #[inline]
    pub fn size(&self) -> u32 {
        self.bump
    }

    /// The fixed capacity
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Drop every allocation; the next `allocate` returns slot 0
    pub fn reset(&mut self) {
        self.bump = 0;
        self.free.clear();
    }

    /// The whole backing buffer, for the flat traversal kernels
    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        self.store.as_slice()
    }
}
