//! Error taxonomy for pools, the octree, and the sweep processor
//!
//! Queries never error: a missed raycast is `None` and an empty box query
//! is an empty list. Errors are reserved for capacity exhaustion, bad
//! indices handed to `release`, and protocol misuse of the sweep
//! processor.
//!
//! Author: Moroya Sakamoto

use thiserror::Error;

/// Errors surfaced by the spatial index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A fixed-capacity pool (or a node's inline object array) is full
    #[error("{what} capacity exceeded (capacity {capacity})")]
    CapacityExceeded {
        /// Which store ran out of slots
        what: &'static str,
        /// The fixed capacity that was hit
        capacity: u32,
    },

    /// Release of an index outside `[0, capacity)`
    #[error("index {index} out of range for capacity {capacity}")]
    InvalidIndex {
        /// The offending index
        index: u32,
        /// Capacity of the pool it was released to
        capacity: u32,
    },

    /// `sweep` was called before `init`
    #[error("sweep processor used before init")]
    NotInitialized,

    /// A shared region does not match the capacity it is asked to back
    #[error("shared region holds {actual} floats, expected {expected}")]
    RegionMismatch {
        /// Float count required by the requested capacity
        expected: usize,
        /// Float count the region actually holds
        actual: usize,
    },

    /// The sweep worker thread is gone and its channel is closed
    #[error("sweep worker channel disconnected")]
    Disconnected,
}
