//! Ray pool: flat 6-float records
//!
//! Rays are written by the producer and only ever read by the traversal
//! kernels, so there is no recycling here - just a fixed grid of records
//! over owned or shared storage.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::error::IndexError;
use crate::pool::store::{FloatStore, SharedRegion};

/// Floats per ray record: `[ox, oy, oz, dx, dy, dz]`
pub const FLOATS_PER_RAY: usize = 6;

/// Fixed-capacity store of ray records
#[derive(Debug)]
pub struct RayPool {
    store: FloatStore,
    capacity: u32,
}

impl RayPool {
    /// Construct with an owned, zero-filled buffer
    pub fn new(capacity: u32) -> Self {
        Self {
            store: FloatStore::owned(capacity as usize * FLOATS_PER_RAY),
            capacity,
        }
    }

    /// Construct over an existing shared region
    pub fn shared_with(region: SharedRegion, capacity: u32) -> Result<Self, IndexError> {
        let expected = capacity as usize * FLOATS_PER_RAY;
        if region.len() != expected {
            return Err(IndexError::RegionMismatch {
                expected,
                actual: region.len(),
            });
        }
        Ok(Self {
            store: FloatStore::shared(region),
            capacity,
        })
    }

    /// Write a ray record
    #[inline]
    pub fn set(&mut self, index: u32, origin: Vec3, direction: Vec3) {
        let off = index as usize * FLOATS_PER_RAY;
        self.store.set(off, origin.x);
        self.store.set(off + 1, origin.y);
        self.store.set(off + 2, origin.z);
        self.store.set(off + 3, direction.x);
        self.store.set(off + 4, direction.y);
        self.store.set(off + 5, direction.z);
    }

    /// Origin of a ray record
    #[inline]
    pub fn origin(&self, index: u32) -> Vec3 {
        let off = index as usize * FLOATS_PER_RAY;
        Vec3::new(
            self.store.get(off),
            self.store.get(off + 1),
            self.store.get(off + 2),
        )
    }

    /// Direction of a ray record
    #[inline]
    pub fn direction(&self, index: u32) -> Vec3 {
        let off = index as usize * FLOATS_PER_RAY;
        Vec3::new(
            self.store.get(off + 3),
            self.store.get(off + 4),
            self.store.get(off + 5),
        )
    }

    /// The fixed capacity
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The whole backing buffer, for the flat traversal kernels
    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        self.store.as_slice()
    }
}
