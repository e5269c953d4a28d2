//! Float storage substrate for the pools
//!
//! Every pool stores its records in one flat `f32` buffer. The buffer is
//! either owned outright or a view over a [`SharedRegion`] that another
//! thread also holds, which is how the sweep processor sees the AABBs and
//! rays its producer writes.
//!
//! # Sharing contract
//!
//! A [`SharedRegion`] carries no atomics, fences, or locks. Correctness
//! rests on the cooperative single-writer discipline: for each region, at
//! most one side performs mutating accesses at any instant, and the hand-
//! off between sides happens through a message boundary (see the sweep
//! worker). A host that cannot guarantee this must add its own
//! synchronization layer before sharing a region.
//!
//! Author: Moroya Sakamoto

use std::cell::UnsafeCell;
use std::sync::Arc;

/// A fixed-size `f32` buffer shareable across threads
///
/// Cloning is cheap and yields another view of the same memory. Element
/// access goes through raw cell reads and writes so no long-lived
/// reference to the buffer is ever formed; slice views are available for
/// the read-heavy traversal kernels.
#[derive(Clone)]
pub struct SharedRegion {
    inner: Arc<RegionInner>,
}

struct RegionInner {
    data: Box<[UnsafeCell<f32>]>,
}

// Safety: `UnsafeCell<f32>` removes `Sync` to force this declaration.
// All access follows the cooperative single-writer contract documented
// on the module; under that contract no two threads access the region
// concurrently with at least one writing.
unsafe impl Send for RegionInner {}
unsafe impl Sync for RegionInner {}

impl SharedRegion {
    /// Allocate a zero-filled region of `len` floats
    pub fn new(len: usize) -> Self {
        let data: Box<[UnsafeCell<f32>]> = (0..len).map(|_| UnsafeCell::new(0.0)).collect();
        Self {
            inner: Arc::new(RegionInner { data }),
        }
    }

    /// Number of floats in the region
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// True when the region holds no floats
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Read one float
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        // Safety: in-bounds (indexing panics otherwise); no concurrent
        // writer under the sharing contract.
        unsafe { *self.inner.data[index].get() }
    }

    /// Write one float
    #[inline]
    pub fn set(&self, index: usize, value: f32) {
        // Safety: in-bounds; this side is the unique writer under the
        // sharing contract.
        unsafe { *self.inner.data[index].get() = value }
    }

    /// Copy a record into the region starting at `offset`
    #[inline]
    pub fn write_slice(&self, offset: usize, src: &[f32]) {
        for (i, &v) in src.iter().enumerate() {
            self.set(offset + i, v);
        }
    }

    /// View the whole region as a float slice
    ///
    /// The view is valid for reading while no other side writes, per the
    /// sharing contract. Traversal kernels take this path.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        // Safety: UnsafeCell<f32> is layout-compatible with f32
        // (repr(transparent)); aliasing is governed by the sharing
        // contract.
        unsafe {
            std::slice::from_raw_parts(self.inner.data.as_ptr() as *const f32, self.len())
        }
    }
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("len", &self.len())
            .field("views", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Backing storage for a pool: owned buffer or shared-region view
#[derive(Debug)]
pub(crate) enum FloatStore {
    /// Pool-private heap buffer
    Owned(Box<[f32]>),
    /// View over a region other pool instances (or threads) also hold
    Shared(SharedRegion),
}

impl FloatStore {
    pub(crate) fn owned(len: usize) -> Self {
        Self::Owned(vec![0.0; len].into_boxed_slice())
    }

    pub(crate) fn shared(region: SharedRegion) -> Self {
        Self::Shared(region)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Owned(b) => b.len(),
            Self::Shared(r) => r.len(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> f32 {
        match self {
            Self::Owned(b) => b[index],
            Self::Shared(r) => r.get(index),
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, index: usize, value: f32) {
        match self {
            Self::Owned(b) => b[index] = value,
            Self::Shared(r) => r.set(index, value),
        }
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[f32] {
        match self {
            Self::Owned(b) => b,
            Self::Shared(r) => r.as_slice(),
        }
    }
}
