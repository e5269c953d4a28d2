//! Dynamic octree over pooled AABBs
//!
//! The tree is a flat structure: nodes live in a [`NodePool`], objects are
//! indices into an [`AabbPool`], and placement is tracked by a parallel
//! object-to-node array. Operations:
//!
//! - **insert**: descend into the deepest octant that fully contains the
//!   object; subdivide a full leaf and push its residents down.
//! - **update**: rewrite the AABB, keep the object in place when it still
//!   fits, otherwise climb to the nearest fitting ancestor and re-insert.
//! - **remove**: swap-remove from the owning node's inline slots.
//! - **raycast / query_box**: stack-based DFS with a reusable traversal
//!   stack (see [`query`]).
//!
//! # Placement rules
//!
//! Containment is inclusive on both ends, so an object whose face sits
//! exactly on an octant midpoint goes to the lower octant (the octant
//! scan runs in index order and the lower octant's max equals the
//! midpoint). An object that straddles a midpoint stays at the deepest
//! node that contains it, even when that node is internal.
//!
//! A shrinking update never pushes an object further down; it stays where
//! it fits. Workloads dominated by shrinking AABBs can rebuild with
//! `clear` plus bulk re-insert when the tree degrades.
//!
//! Nodes never merge back into leaves; node memory is reclaimed only by
//! `clear`, which rewinds the whole node pool.
//!
//! Author: Moroya Sakamoto

pub mod query;

pub use query::RayHit;

use glam::Vec3;

use crate::error::IndexError;
use crate::kernel;
use crate::pool::aabb::{AabbPool, FLOATS_PER_AABB};
use crate::pool::node::{NodePool, NO_NODE};

/// Hard ceiling on subdivision depth
///
/// Octant extents shrink by half per level; 32 levels exhaust f32
/// precision for any practical world. A full leaf at this depth refuses
/// to split and the insert surfaces `CapacityExceeded` instead of
/// recursing on inseparable objects.
pub const MAX_SUBDIVISION_DEPTH: u32 = 32;

/// Dynamic spatial index over pooled AABBs
#[derive(Debug)]
pub struct Octree {
    nodes: NodePool,
    root: u32,
    /// Placement map: object index -> node index, `NO_NODE` when absent
    object_node: Box<[i32]>,
    /// Reusable DFS scratch; cleared, never shrunk, between queries
    stack: Vec<u32>,
    live: u32,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl Octree {
    /// Build an octree owning `nodes`, tracking up to `object_capacity`
    /// objects
    ///
    /// Allocates the root immediately; fails when `nodes` cannot hold a
    /// single node. Call [`set_bounds`](Self::set_bounds) before the
    /// first insert.
    pub fn new(mut nodes: NodePool, object_capacity: u32) -> Result<Self, IndexError> {
        let root = nodes.allocate()?;
        Ok(Self {
            nodes,
            root,
            object_node: vec![NO_NODE; object_capacity as usize].into_boxed_slice(),
            stack: Vec::with_capacity(1 + 8 * MAX_SUBDIVISION_DEPTH as usize),
            live: 0,
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::ZERO,
        })
    }

    /// Index of the root node
    #[inline]
    pub fn root(&self) -> u32 {
        self.root
    }

    /// Set the world bounds
    ///
    /// Applies to the root node; intended to be called once on an empty
    /// tree (existing children keep their octant bounds).
    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.bounds_min = min;
        self.bounds_max = max;
        self.nodes.set_aabb(self.root, min, max);
    }

    /// World bounds as `(min, max)`
    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    /// Number of objects currently indexed
    #[inline]
    pub fn len(&self) -> usize {
        self.live as usize
    }

    /// True when no object is indexed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `object` is currently indexed
    #[inline]
    pub fn contains(&self, object: u32) -> bool {
        self.object_node
            .get(object as usize)
            .is_some_and(|&n| n >= 0)
    }

    /// Node currently holding `object`, if indexed
    #[inline]
    pub fn node_of(&self, object: u32) -> Option<u32> {
        match self.object_node.get(object as usize) {
            Some(&n) if n >= 0 => Some(n as u32),
            _ => None,
        }
    }

    /// Number of allocated nodes (1 + 8 per subdivision)
    #[inline]
    pub fn node_count(&self) -> u32 {
        self.nodes.size()
    }

    /// The node pool, for inspection
    #[inline]
    pub fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    /// Approximate backing memory in bytes
    pub fn memory_bytes(&self) -> usize {
        self.nodes.memory_bytes() + self.object_node.len() * std::mem::size_of::<i32>()
    }

    /// Insert `object` at the deepest node that contains its AABB
    ///
    /// The AABB must already be written to `aabbs`. Inserting an object
    /// that is already indexed is a no-op. Fails with `CapacityExceeded`
    /// when the node pool cannot subdivide and the target node's inline
    /// slots are full (see [`MAX_SUBDIVISION_DEPTH`]).
    pub fn insert(&mut self, aabbs: &AabbPool, object: u32) -> Result<(), IndexError> {
        if object as usize >= self.object_node.len() {
            return Err(IndexError::InvalidIndex {
                index: object,
                capacity: self.object_node.len() as u32,
            });
        }
        if self.object_node[object as usize] >= 0 {
            return Ok(());
        }
        self.insert_into(aabbs, self.root, object, 0)
    }

    /// Rewrite `object`'s AABB and re-place it if needed
    ///
    /// Unknown objects get their AABB written but are otherwise ignored.
    /// An object that still fits its current node stays put - even when a
    /// descendant would now accept it - so steady-state updates touch no
    /// tree structure.
    pub fn update(
        &mut self,
        aabbs: &mut AabbPool,
        object: u32,
        min: Vec3,
        max: Vec3,
    ) -> Result<(), IndexError> {
        aabbs.set(object, min, max);
        let node = match self.object_node.get(object as usize) {
            Some(&n) if n >= 0 => n as u32,
            _ => return Ok(()),
        };
        if self.fits(aabbs, object, node) {
            return Ok(());
        }
        self.nodes.remove_object(node, object);
        self.object_node[object as usize] = NO_NODE;
        self.live -= 1;
        // Climb to the nearest ancestor that contains the new AABB,
        // falling back to the root for out-of-bounds objects.
        let mut ancestor = self.nodes.parent(node);
        while ancestor >= 0 && !self.fits(aabbs, object, ancestor as u32) {
            ancestor = self.nodes.parent(ancestor as u32);
        }
        let target = if ancestor >= 0 {
            ancestor as u32
        } else {
            self.root
        };
        let depth = self.node_depth(target);
        self.insert_into(aabbs, target, object, depth)
    }

    /// Remove `object` from the index; unknown objects are a no-op
    pub fn remove(&mut self, object: u32) {
        let node = match self.object_node.get(object as usize) {
            Some(&n) if n >= 0 => n as u32,
            _ => return,
        };
        self.nodes.remove_object(node, object);
        self.object_node[object as usize] = NO_NODE;
        self.live -= 1;
    }

    /// Drop every object and node, re-allocating a fresh root
    ///
    /// The world bounds are retained.
    pub fn clear(&mut self) -> Result<(), IndexError> {
        self.nodes.reset();
        self.root = self.nodes.allocate()?;
        self.nodes
            .set_aabb(self.root, self.bounds_min, self.bounds_max);
        self.object_node.fill(NO_NODE);
        self.live = 0;
        self.stack.clear();
        Ok(())
    }

    /// Inclusive containment of `object`'s AABB by `node`'s AABB
    #[inline]
    fn fits(&self, aabbs: &AabbPool, object: u32, node: u32) -> bool {
        kernel::aabb_contains_aabb(
            self.nodes.as_floats(),
            node as usize * self.nodes.stride(),
            aabbs.as_floats(),
            object as usize * FLOATS_PER_AABB,
        )
    }

    fn node_depth(&self, node: u32) -> u32 {
        let mut depth = 0;
        let mut current = self.nodes.parent(node);
        while current >= 0 {
            depth += 1;
            current = self.nodes.parent(current as u32);
        }
        depth
    }

    fn place(&mut self, node: u32, object: u32) -> Result<(), IndexError> {
        self.nodes.add_object(node, object)?;
        self.object_node[object as usize] = node as i32;
        self.live += 1;
        Ok(())
    }

    fn insert_into(
        &mut self,
        aabbs: &AabbPool,
        node: u32,
        object: u32,
        depth: u32,
    ) -> Result<(), IndexError> {
        let first_child = self.nodes.first_child(node);
        if first_child >= 0 {
            // Index-order scan; ties on a midpoint land in the lower octant
            for octant in 0..8 {
                let child = first_child as u32 + octant;
                if self.fits(aabbs, object, child) {
                    return self.insert_into(aabbs, child, object, depth + 1);
                }
            }
            // Straddles a midpoint: lives here
            return self.place(node, object);
        }

        if self.nodes.object_count(node) < self.nodes.leaf_capacity() {
            return self.place(node, object);
        }

        self.subdivide(aabbs, node, depth)?;
        self.insert_into(aabbs, node, object, depth)
    }

    /// Split a full leaf into eight octants and push its residents down
    fn subdivide(&mut self, aabbs: &AabbPool, node: u32, depth: u32) -> Result<(), IndexError> {
        if depth >= MAX_SUBDIVISION_DEPTH {
            return Err(IndexError::CapacityExceeded {
                what: "subdivision depth",
                capacity: MAX_SUBDIVISION_DEPTH,
            });
        }
        if self.nodes.remaining() < 8 {
            return Err(IndexError::CapacityExceeded {
                what: "node pool",
                capacity: self.nodes.capacity(),
            });
        }

        let min = self.nodes.aabb_min(node);
        let max = self.nodes.aabb_max(node);
        let mid = (min + max) * 0.5;

        // Eight bump allocations in a row are contiguous by construction
        let mut first = 0;
        for octant in 0..8u32 {
            let child = self.nodes.allocate()?;
            if octant == 0 {
                first = child;
            }
            // Octant bits: 1 = upper X, 2 = upper Y, 4 = upper Z
            let cmin = Vec3::new(
                if octant & 1 != 0 { mid.x } else { min.x },
                if octant & 2 != 0 { mid.y } else { min.y },
                if octant & 4 != 0 { mid.z } else { min.z },
            );
            let cmax = Vec3::new(
                if octant & 1 != 0 { max.x } else { mid.x },
                if octant & 2 != 0 { max.y } else { mid.y },
                if octant & 4 != 0 { max.z } else { mid.z },
            );
            self.nodes.set_aabb(child, cmin, cmax);
            self.nodes.set_parent(child, node as i32);
        }
        self.nodes.set_first_child(node, first as i32);

        // Re-insert the residents: fitting objects sink into children,
        // straddlers stay. Re-insertion cannot overflow - the node was
        // holding all of them a moment ago.
        let count = self.nodes.object_count(node);
        let mut resident = Vec::with_capacity(count as usize);
        for slot in 0..count {
            resident.push(self.nodes.object(node, slot));
        }
        self.nodes.clear_objects(node);
        self.live -= count;
        for object in resident {
            self.object_node[object as usize] = NO_NODE;
            self.insert_into(aabbs, node, object, depth)?;
        }
        Ok(())
    }
}
