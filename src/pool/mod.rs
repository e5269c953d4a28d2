//! Pool-backed flat storage
//!
//! All hot data lives in fixed-capacity `f32` buffers so that a frame
//! loop never touches the allocator:
//!
//! - [`IndexPool`]: LIFO free-list over integer indices
//! - [`AabbPool`]: 6-float AABB records, bump + LIFO recycling
//! - [`RayPool`]: 6-float ray records
//! - [`NodePool`]: fixed-stride octree node records, bump only
//! - [`SharedRegion`]: a cross-thread float buffer the pools can view
//!
//! Pools never grow. Construction fixes the capacity; exhaustion is an
//! error, not a reallocation.

pub mod aabb;
pub mod index;
pub mod node;
pub mod ray;
pub mod store;

pub use aabb::{AabbPool, FLOATS_PER_AABB};
pub use index::IndexPool;
pub use node::{NodePool, DEFAULT_LEAF_CAPACITY, NODE_HEADER_FLOATS, NO_NODE};
pub use ray::{RayPool, FLOATS_PER_RAY};
pub use store::SharedRegion;
