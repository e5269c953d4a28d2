//! Off-thread sweep processor
//!
//! A stateful facade composing the pools and the octree across a
//! shared-memory boundary. The producer side owns four [`SharedRegion`]s
//! (AABBs, nodes, rays, results) and keeps writing object AABBs and rays
//! into them; the processor side ingests the object set incrementally -
//! insert on first sight, update after - and writes one `[object, t]`
//! pair per ray back into the results region.
//!
//! The processor itself is synchronous and single-threaded. The
//! init/sweep/ready/done envelope and the thread hop live in
//! [`worker`]; hosts with their own threading can drive a
//! [`SweepProcessor`] directly, as long as the single-writer discipline
//! on the regions holds (producer writes while the processor is idle,
//! processor writes results while the producer waits).
//!
//! Author: Moroya Sakamoto

pub mod worker;

pub use worker::{SweepReply, SweepRequest, SweepWorker};

use glam::Vec3;
use log::debug;

use crate::error::IndexError;
use crate::octree::query::FLOATS_PER_RESULT;
use crate::octree::Octree;
use crate::pool::aabb::AabbPool;
use crate::pool::node::NodePool;
use crate::pool::ray::RayPool;
use crate::pool::store::SharedRegion;

/// Everything `init` needs to build pools over the shared regions
#[derive(Debug, Clone)]
pub struct SweepParams {
    /// Region holding `object_capacity * 6` floats of AABB records
    pub aabb_region: SharedRegion,
    /// Region holding `node_capacity * (9 + max_objects_per_leaf)` floats
    pub node_region: SharedRegion,
    /// Region holding `ray_count * 6` floats of ray records
    pub ray_region: SharedRegion,
    /// Region holding `ray_count * 2` floats of `[object, t]` results
    pub result_region: SharedRegion,
    /// Maximum number of objects the sweep will ever see
    pub object_capacity: u32,
    /// Node capacity for the octree's pool
    pub node_capacity: u32,
    /// Inline object slots per node (`K`)
    pub max_objects_per_leaf: u32,
    /// Rays cast per sweep
    pub ray_count: u32,
    /// World bounds, minimum corner
    pub world_min: Vec3,
    /// World bounds, maximum corner
    pub world_max: Vec3,
}

impl SweepParams {
    /// Allocate fresh regions sized for the given capacities
    ///
    /// The regions can be cloned out and handed to the producer side
    /// before the params are consumed by `init`.
    pub fn allocate(
        object_capacity: u32,
        node_capacity: u32,
        max_objects_per_leaf: u32,
        ray_count: u32,
        world_min: Vec3,
        world_max: Vec3,
    ) -> Self {
        let stride = crate::pool::node::NODE_HEADER_FLOATS + max_objects_per_leaf as usize;
        Self {
            aabb_region: SharedRegion::new(object_capacity as usize * 6),
            node_region: SharedRegion::new(node_capacity as usize * stride),
            ray_region: SharedRegion::new(ray_count as usize * 6),
            result_region: SharedRegion::new(ray_count as usize * FLOATS_PER_RESULT),
            object_capacity,
            node_capacity,
            max_objects_per_leaf,
            ray_count,
            world_min,
            world_max,
        }
    }
}

struct SweepState {
    octree: Octree,
    aabbs: AabbPool,
    rays: RayPool,
    results: SharedRegion,
    ray_count: u32,
}

/// Stateful sweep processor over shared regions
///
/// Created empty; [`init`](Self::init) builds the pools and the octree,
/// after which [`sweep`](Self::sweep) may be called any number of times.
#[derive(Default)]
pub struct SweepProcessor {
    state: Option<SweepState>,
}

impl SweepProcessor {
    /// An uninitialized processor
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `init` has run
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Build pools and octree over the shared regions
    ///
    /// Re-initializing replaces the previous state wholesale.
    pub fn init(&mut self, params: SweepParams) -> Result<(), IndexError> {
        let aabbs = AabbPool::shared_with(params.aabb_region, params.object_capacity)?;
        let nodes = NodePool::shared_with(
            params.node_region,
            params.node_capacity,
            params.max_objects_per_leaf,
        )?;
        let rays = RayPool::shared_with(params.ray_region, params.ray_count)?;
        let expected = params.ray_count as usize * FLOATS_PER_RESULT;
        if params.result_region.len() != expected {
            return Err(IndexError::RegionMismatch {
                expected,
                actual: params.result_region.len(),
            });
        }

        let mut octree = Octree::new(nodes, params.object_capacity)?;
        octree.set_bounds(params.world_min, params.world_max);

        debug!(
            "sweep processor ready: {} objects, {} nodes, {} rays",
            params.object_capacity, params.node_capacity, params.ray_count
        );
        self.state = Some(SweepState {
            octree,
            aabbs,
            rays,
            results: params.result_region,
            ray_count: params.ray_count,
        });
        Ok(())
    }

    /// Ingest the first `object_count` AABBs and cast every ray
    ///
    /// Assumes the producer has written `object_count` AABB records into
    /// the shared AABB region. Objects seen for the first time are
    /// inserted; objects from earlier sweeps are updated from the values
    /// currently in the region. Returns the number of rays cast.
    pub fn sweep(&mut self, object_count: u32) -> Result<u32, IndexError> {
        let state = self.state.as_mut().ok_or(IndexError::NotInitialized)?;

        if object_count > state.aabbs.capacity() {
            return Err(IndexError::CapacityExceeded {
                what: "AABB pool",
                capacity: state.aabbs.capacity(),
            });
        }
        // Claim pool slots for objects the producer has written so far
        while state.aabbs.size() < object_count {
            state.aabbs.allocate()?;
        }

        for object in 0..object_count {
            if state.octree.contains(object) {
                let min = state.aabbs.min(object);
                let max = state.aabbs.max(object);
                state.octree.update(&mut state.aabbs, object, min, max)?;
            } else {
                state.octree.insert(&state.aabbs, object)?;
            }
        }

        let ray_floats = state.rays.as_floats();
        for ray in 0..state.ray_count {
            let hit = state
                .octree
                .raycast(&state.aabbs, ray_floats, ray as usize * 6);
            let off = ray as usize * FLOATS_PER_RESULT;
            match hit {
                Some(h) => {
                    state.results.set(off, h.object as f32);
                    state.results.set(off + 1, h.t);
                }
                None => {
                    state.results.set(off, -1.0);
                    state.results.set(off + 1, -1.0);
                }
            }
        }

        debug!(
            "sweep done: {} objects indexed, {} rays cast",
            object_count, state.ray_count
        );
        Ok(state.ray_count)
    }
}
