//! # FROST-Octree
//!
//! **F.R.O.S.T. - Flat Ray-queryable Octree for Spatial Tracking**
//!
//! A data-oriented 3D spatial index for dynamic axis-aligned bounding
//! boxes. Built for interactive frame loops: tens of thousands of queries
//! per second with zero per-query heap allocation.
//!
//! ## Features
//!
//! - **Flat everything**: AABBs, rays, and octree nodes are fixed-stride
//!   records in `f32` buffers; the traversal kernels run on raw slices
//!   with caller-supplied offsets.
//! - **Pools, not allocators**: fixed-capacity bump allocation with LIFO
//!   slot recycling; a full `reset`/`clear` is the only bulk free.
//! - **Dynamic updates**: insert, update (stay-if-fits, climb-and-drop
//!   otherwise), and remove without rebuilding.
//! - **Queries**: closest-hit raycast and inclusive box overlap, both
//!   plain DFS with a reusable stack; rayon-parallel batch casting.
//! - **Shared memory**: pools can view a [`SharedRegion`] so a producer
//!   thread and the sweep worker cooperate over one set of buffers with
//!   no copies, no locks, and no atomics.
//!
//! ## Example
//!
//! ```rust
//! use frost_octree::prelude::*;
//! use glam::Vec3;
//!
//! let mut aabbs = AabbPool::new(64);
//! let mut tree = Octree::new(NodePool::new(256), 64).unwrap();
//! tree.set_bounds(Vec3::splat(-50.0), Vec3::splat(50.0));
//!
//! // Write an AABB, index it
//! let obj = aabbs.allocate().unwrap();
//! aabbs.set(obj, Vec3::new(10.0, 10.0, 10.0), Vec3::new(11.0, 11.0, 11.0));
//! tree.insert(&aabbs, obj).unwrap();
//!
//! // Closest pierced object along a ray
//! let hit = tree.raycast_ray(&aabbs, Vec3::new(0.0, 10.5, 10.5), Vec3::X).unwrap();
//! assert_eq!(hit.object, obj);
//! assert!((hit.t - 10.0).abs() < 1e-4);
//!
//! // Everything overlapping a region
//! let hits = tree.query_box_collect(&aabbs, Vec3::splat(5.0), Vec3::splat(50.0));
//! assert_eq!(hits, vec![obj]);
//! ```
//!
//! ## Author
//!
//! Moroya Sakamoto

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod octree;
pub mod pool;
pub mod sweep;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::error::IndexError;
    pub use crate::kernel::{
        aabb_contains_aabb, aabb_overlaps_aabb, ray_intersects_aabb, RAY_MISS,
    };
    pub use crate::octree::{Octree, RayHit, MAX_SUBDIVISION_DEPTH};
    pub use crate::pool::{
        AabbPool, IndexPool, NodePool, RayPool, SharedRegion, DEFAULT_LEAF_CAPACITY,
        FLOATS_PER_AABB, FLOATS_PER_RAY, NODE_HEADER_FLOATS, NO_NODE,
    };
    pub use crate::sweep::{SweepParams, SweepProcessor, SweepWorker};
    pub use glam::Vec3;
}

pub use error::IndexError;
pub use octree::{Octree, RayHit};
pub use pool::{AabbPool, NodePool, RayPool, SharedRegion};
pub use sweep::{SweepParams, SweepProcessor, SweepWorker};
