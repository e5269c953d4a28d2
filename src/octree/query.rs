//! Octree traversal: ray and box queries
//!
//! Both queries run the same stack-based DFS over the flat node buffer.
//! No front-to-back octant ordering and no distance pruning: the plain
//! DFS is correct and keeps the kernel branch-light, and the per-call
//! cost is already dominated by the slab tests. The traversal stack is
//! owned by the octree and reused across calls, so steady-state queries
//! allocate nothing.
//!
//! Batch casting mirrors the single-ray path; the rayon variant gives
//! each worker its own stack so the no-allocation property degrades to
//! one stack per thread, not per ray.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;
use rayon::prelude::*;

use crate::kernel::{self, pack_aabb, pack_ray, ray_intersects_aabb};
use crate::pool::aabb::{AabbPool, FLOATS_PER_AABB};
use crate::pool::node::NodePool;
use crate::pool::ray::{RayPool, FLOATS_PER_RAY};

use super::Octree;

/// Result of a ray query: the closest pierced object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the hit object in the AABB pool
    pub object: u32,
    /// Parametric distance along the ray to the hit
    pub t: f32,
}

/// Floats written per ray into a batch results buffer
pub const FLOATS_PER_RESULT: usize = 2;

impl Octree {
    /// Cast the ray stored at `ray_off` in `rays` and return the closest
    /// pierced object
    ///
    /// Returns `None` for an empty tree or a clean miss. `t` is in units
    /// of the ray direction's length.
    pub fn raycast(&mut self, aabbs: &AabbPool, rays: &[f32], ray_off: usize) -> Option<RayHit> {
        let Self {
            nodes, root, stack, ..
        } = self;
        raycast_with_stack(nodes, *root, aabbs, rays, ray_off, stack)
    }

    /// Cast a ray given as origin and direction
    pub fn raycast_ray(
        &mut self,
        aabbs: &AabbPool,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<RayHit> {
        let ray = pack_ray(origin, direction);
        self.raycast(aabbs, &ray, 0)
    }

    /// Cast every ray in `rays`, writing `[object, t]` pairs to `results`
    ///
    /// Misses write `[-1, -1]`. Casts `min(rays.capacity(), results.len() / 2)`
    /// rays.
    pub fn raycast_batch(&mut self, aabbs: &AabbPool, rays: &RayPool, results: &mut [f32]) {
        let count = (results.len() / FLOATS_PER_RESULT).min(rays.capacity() as usize);
        let ray_floats = rays.as_floats();
        for i in 0..count {
            let Self {
                nodes, root, stack, ..
            } = self;
            let hit = raycast_with_stack(nodes, *root, aabbs, ray_floats, i * FLOATS_PER_RAY, stack);
            write_result(&mut results[i * FLOATS_PER_RESULT..], hit);
        }
    }

    /// Parallel [`raycast_batch`](Self::raycast_batch)
    ///
    /// Worth it from a few hundred rays upward; each rayon worker carries
    /// its own traversal stack.
    pub fn raycast_batch_parallel(&self, aabbs: &AabbPool, rays: &RayPool, results: &mut [f32]) {
        let count = (results.len() / FLOATS_PER_RESULT).min(rays.capacity() as usize);
        let ray_floats = rays.as_floats();
        results[..count * FLOATS_PER_RESULT]
            .par_chunks_mut(FLOATS_PER_RESULT)
            .enumerate()
            .for_each_init(Vec::new, |stack, (i, out)| {
                let hit = raycast_with_stack(
                    &self.nodes,
                    self.root,
                    aabbs,
                    ray_floats,
                    i * FLOATS_PER_RAY,
                    stack,
                );
                write_result(out, hit);
            });
    }

    /// Collect every object whose AABB overlaps the query box
    ///
    /// Touching faces count as overlap. Results are appended to `out` in
    /// DFS encounter order, which is stable for a fixed tree; the buffer
    /// is not cleared first so callers can accumulate across queries.
    pub fn query_box(&mut self, aabbs: &AabbPool, min: Vec3, max: Vec3, out: &mut Vec<u32>) {
        let query = pack_aabb(min, max);
        let Self {
            nodes, root, stack, ..
        } = self;
        let node_floats = nodes.as_floats();
        let aabb_floats = aabbs.as_floats();
        let stride = nodes.stride();

        if !kernel::aabb_overlaps_aabb(&query, 0, node_floats, *root as usize * stride) {
            return;
        }
        stack.clear();
        stack.push(*root);

        while let Some(node) = stack.pop() {
            for slot in 0..nodes.object_count(node) {
                let object = nodes.object(node, slot);
                if kernel::aabb_overlaps_aabb(
                    &query,
                    0,
                    aabb_floats,
                    object as usize * FLOATS_PER_AABB,
                ) {
                    out.push(object);
                }
            }
            let first_child = nodes.first_child(node);
            if first_child >= 0 {
                for octant in 0..8 {
                    let child = first_child as u32 + octant;
                    if kernel::aabb_overlaps_aabb(
                        &query,
                        0,
                        node_floats,
                        child as usize * stride,
                    ) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Allocating convenience over [`query_box`](Self::query_box)
    pub fn query_box_collect(&mut self, aabbs: &AabbPool, min: Vec3, max: Vec3) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_box(aabbs, min, max, &mut out);
        out
    }
}

#[inline]
fn write_result(out: &mut [f32], hit: Option<RayHit>) {
    match hit {
        Some(h) => {
            out[0] = h.object as f32;
            out[1] = h.t;
        }
        None => {
            out[0] = -1.0;
            out[1] = -1.0;
        }
    }
}

/// DFS closest-hit raycast with a caller-supplied stack
pub(crate) fn raycast_with_stack(
    nodes: &NodePool,
    root: u32,
    aabbs: &AabbPool,
    rays: &[f32],
    ray_off: usize,
    stack: &mut Vec<u32>,
) -> Option<RayHit> {
    let node_floats = nodes.as_floats();
    let aabb_floats = aabbs.as_floats();
    let stride = nodes.stride();

    if ray_intersects_aabb(rays, ray_off, node_floats, root as usize * stride) < 0.0 {
        return None;
    }
    stack.clear();
    stack.push(root);

    let mut best = None;
    let mut best_t = f32::INFINITY;

    while let Some(node) = stack.pop() {
        for slot in 0..nodes.object_count(node) {
            let object = nodes.object(node, slot);
            let t = ray_intersects_aabb(
                rays,
                ray_off,
                aabb_floats,
                object as usize * FLOATS_PER_AABB,
            );
            if t >= 0.0 && t < best_t {
                best_t = t;
                best = Some(object);
            }
        }
        let first_child = nodes.first_child(node);
        if first_child >= 0 {
            for octant in 0..8 {
                let child = first_child as u32 + octant;
                if ray_intersects_aabb(rays, ray_off, node_floats, child as usize * stride) >= 0.0 {
                    stack.push(child);
                }
            }
        }
    }

    best.map(|object| RayHit { object, t: best_t })
}
