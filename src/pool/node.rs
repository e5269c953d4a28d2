//! Octree node pool: fixed-stride records, bump allocation only
//!
//! Node record layout, in floats:
//!
//! ```text
//! [min_x, min_y, min_z, max_x, max_y, max_z,   node AABB
//!  first_child, parent, object_count,          links (-1 sentinels)
//!  obj_0 .. obj_{K-1}]                         inline object indices
//! ```
//!
//! Stride is `9 + K` where `K` is the per-node object capacity. Links and
//! object indices are stored as `f32` but used as integers; callers keep
//! them within the exactly-representable range (<= 2^24), which the node
//! and AABB capacities bound in practice.
//!
//! Nodes are never freed individually: subdivision only ever adds eight
//! children, and the whole pool rewinds at once through `reset`.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::error::IndexError;
use crate::pool::store::{FloatStore, SharedRegion};

/// Default inline object capacity per node
pub const DEFAULT_LEAF_CAPACITY: u32 = 8;

/// Header floats before the inline object slots
pub const NODE_HEADER_FLOATS: usize = 9;

const OFF_FIRST_CHILD: usize = 6;
const OFF_PARENT: usize = 7;
const OFF_COUNT: usize = 8;

/// Link sentinel for "no child" / "no parent"
pub const NO_NODE: i32 = -1;

/// Fixed-capacity bump allocator over octree node records
#[derive(Debug)]
pub struct NodePool {
    store: FloatStore,
    bump: u32,
    capacity: u32,
    leaf_capacity: u32,
}

impl NodePool {
    /// Construct with the default per-node object capacity
    pub fn new(capacity: u32) -> Self {
        Self::with_leaf_capacity(capacity, DEFAULT_LEAF_CAPACITY)
    }

    /// Construct with an explicit per-node object capacity `K`
    pub fn with_leaf_capacity(capacity: u32, leaf_capacity: u32) -> Self {
        let stride = NODE_HEADER_FLOATS + leaf_capacity as usize;
        Self {
            store: FloatStore::owned(capacity as usize * stride),
            bump: 0,
            capacity,
            leaf_capacity,
        }
    }

    /// Construct over an existing shared region
    pub fn shared_with(
        region: SharedRegion,
        capacity: u32,
        leaf_capacity: u32,
    ) -> Result<Self, IndexError> {
        let stride = NODE_HEADER_FLOATS + leaf_capacity as usize;
        let expected = capacity as usize * stride;
        if region.len() != expected {
            return Err(IndexError::RegionMismatch {
                expected,
                actual: region.len(),
            });
        }
        Ok(Self {
            store: FloatStore::shared(region),
            bump: 0,
            capacity,
            leaf_capacity,
        })
    }

    /// Floats per node record
    #[inline]
    pub fn stride(&self) -> usize {
        NODE_HEADER_FLOATS + self.leaf_capacity as usize
    }

    #[inline]
    fn off(&self, node: u32) -> usize {
        node as usize * self.stride()
    }

    /// Allocate the next node and initialize its sentinels
    ///
    /// `first_child` and `parent` become [`NO_NODE`], the object count
    /// becomes zero. The AABB and object slots are left as-is; the owner
    /// assigns bounds before the node is reachable.
    pub fn allocate(&mut self) -> Result<u32, IndexError> {
        if self.bump >= self.capacity {
            return Err(IndexError::CapacityExceeded {
                what: "node pool",
                capacity: self.capacity,
            });
        }
        let node = self.bump;
        self.bump += 1;
        let off = self.off(node);
        self.store.set(off + OFF_FIRST_CHILD, NO_NODE as f32);
        self.store.set(off + OFF_PARENT, NO_NODE as f32);
        self.store.set(off + OFF_COUNT, 0.0);
        Ok(node)
    }

    /// Nodes still allocatable before the pool is full
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity - self.bump
    }

    /// Write a node's bounds
    #[inline]
    pub fn set_aabb(&mut self, node: u32, min: Vec3, max: Vec3) {
        let off = self.off(node);
        self.store.set(off, min.x);
        self.store.set(off + 1, min.y);
        self.store.set(off + 2, min.z);
        self.store.set(off + 3, max.x);
        self.store.set(off + 4, max.y);
        self.store.set(off + 5, max.z);
    }

    /// Minimum corner of a node's bounds
    #[inline]
    pub fn aabb_min(&self, node: u32) -> Vec3 {
        let off = self.off(node);
        Vec3::new(
            self.store.get(off),
            self.store.get(off + 1),
            self.store.get(off + 2),
        )
    }

    /// Maximum corner of a node's bounds
    #[inline]
    pub fn aabb_max(&self, node: u32) -> Vec3 {
        let off = self.off(node);
        Vec3::new(
            self.store.get(off + 3),
            self.store.get(off + 4),
            self.store.get(off + 5),
        )
    }

    /// Set the first of eight contiguous children, or [`NO_NODE`]
    #[inline]
    pub fn set_first_child(&mut self, node: u32, first_child: i32) {
        let off = self.off(node);
        self.store.set(off + OFF_FIRST_CHILD, first_child as f32);
    }

    /// First child index, or [`NO_NODE`] for a leaf
    #[inline]
    pub fn first_child(&self, node: u32) -> i32 {
        self.store.get(self.off(node) + OFF_FIRST_CHILD) as i32
    }

    /// Set the parent link
    #[inline]
    pub fn set_parent(&mut self, node: u32, parent: i32) {
        let off = self.off(node);
        self.store.set(off + OFF_PARENT, parent as f32);
    }

    /// Parent index, or [`NO_NODE`] for the root
    #[inline]
    pub fn parent(&self, node: u32) -> i32 {
        self.store.get(self.off(node) + OFF_PARENT) as i32
    }

    /// Number of object indices stored at this node
    #[inline]
    pub fn object_count(&self, node: u32) -> u32 {
        self.store.get(self.off(node) + OFF_COUNT) as u32
    }

    /// Append an object index to this node's inline slots
    pub fn add_object(&mut self, node: u32, object: u32) -> Result<(), IndexError> {
        let count = self.object_count(node);
        if count >= self.leaf_capacity {
            return Err(IndexError::CapacityExceeded {
                what: "node object slots",
                capacity: self.leaf_capacity,
            });
        }
        let off = self.off(node);
        self.store
            .set(off + NODE_HEADER_FLOATS + count as usize, object as f32);
        self.store.set(off + OFF_COUNT, (count + 1) as f32);
        Ok(())
    }

    /// Object index stored at `slot` (< `object_count`)
    #[inline]
    pub fn object(&self, node: u32, slot: u32) -> u32 {
        self.store
            .get(self.off(node) + NODE_HEADER_FLOATS + slot as usize) as u32
    }

    /// Zero the object count; the slots themselves are left stale
    #[inline]
    pub fn clear_objects(&mut self, node: u32) {
        let off = self.off(node);
        self.store.set(off + OFF_COUNT, 0.0);
    }

    /// Remove an object by value, swapping the last slot into its place
    ///
    /// Returns whether the object was present.
    pub fn remove_object(&mut self, node: u32, object: u32) -> bool {
        let count = self.object_count(node);
        let off = self.off(node);
        for slot in 0..count {
            if self.object(node, slot) == object {
                let last = self.object(node, count - 1);
                self.store
                    .set(off + NODE_HEADER_FLOATS + slot as usize, last as f32);
                self.store.set(off + OFF_COUNT, (count - 1) as f32);
                return true;
            }
        }
        false
    }

    /// Number of nodes allocated since the last reset
    #[inline]
    pub fn size(&self) -> u32 {
        self.bump
    }

    /// The fixed capacity
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Per-node inline object capacity `K`
    #[inline]
    pub fn leaf_capacity(&self) -> u32 {
        self.leaf_capacity
    }

    /// Rewind the bump allocator; every node index becomes available
    pub fn reset(&mut self) {
        self.bump = 0;
    }

    /// The whole backing buffer, for the flat traversal kernels
    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        self.store.as_slice()
    }

    /// Approximate backing memory in bytes
    #[inline]
    pub fn memory_bytes(&self) -> usize {
        self.store.as_slice().len() * std::mem::size_of::<f32>()
    }
}
