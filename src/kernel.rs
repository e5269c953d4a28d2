//! Flat numeric kernels over raw `f32` buffers
//!
//! Every kernel reads fixed-layout records from caller-supplied slices at
//! caller-supplied float offsets, so the same code runs against owned
//! pools and shared-memory regions without translation:
//!
//! - AABB record: `[min_x, min_y, min_z, max_x, max_y, max_z]`
//! - Ray record: `[ox, oy, oz, dx, dy, dz]`
//!
//! # Numeric contract
//!
//! - **Slab test**: branchless, IEEE-754 reciprocal based. Zero direction
//!   components become infinite reciprocals; the final comparison is
//!   written NaN-rejecting so a parallel ray outside (or grazing) a slab
//!   is a miss, never a false hit.
//! - **Overlap / containment**: inclusive on both ends; touching faces
//!   count.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

/// Miss sentinel returned by [`ray_intersects_aabb`]
pub const RAY_MISS: f32 = -1.0;

/// Branchless ray-AABB slab intersection
///
/// Returns the parametric distance `t >= 0` to the entry point, the exit
/// distance when the origin is inside the box, or [`RAY_MISS`] when the
/// ray does not pierce the box. Mathematically correct for any non-zero
/// direction; `t` is in units of the direction's length.
#[inline(always)]
pub fn ray_intersects_aabb(ray: &[f32], ray_off: usize, aabb: &[f32], aabb_off: usize) -> f32 {
    let ox = ray[ray_off];
    let oy = ray[ray_off + 1];
    let oz = ray[ray_off + 2];
    let inv_dx = 1.0 / ray[ray_off + 3];
    let inv_dy = 1.0 / ray[ray_off + 4];
    let inv_dz = 1.0 / ray[ray_off + 5];

    let t1x = (aabb[aabb_off] - ox) * inv_dx;
    let t2x = (aabb[aabb_off + 3] - ox) * inv_dx;
    let t1y = (aabb[aabb_off + 1] - oy) * inv_dy;
    let t2y = (aabb[aabb_off + 4] - oy) * inv_dy;
    let t1z = (aabb[aabb_off + 2] - oz) * inv_dz;
    let t2z = (aabb[aabb_off + 5] - oz) * inv_dz;

    let tmin = t1x.min(t2x).max(t1y.min(t2y)).max(t1z.min(t2z));
    let tmax = t1x.max(t2x).min(t1y.max(t2y)).min(t1z.max(t2z));

    // `!(tmin <= tmax)` also rejects the NaN produced by a grazing
    // parallel ray (0 * inf), which a plain `tmin > tmax` would let
    // through.
    if tmax < 0.0 || !(tmin <= tmax) {
        return RAY_MISS;
    }

    if tmin >= 0.0 {
        tmin
    } else {
        tmax
    }
}

/// Inclusive AABB-AABB overlap test; touching faces overlap
#[inline(always)]
pub fn aabb_overlaps_aabb(a: &[f32], a_off: usize, b: &[f32], b_off: usize) -> bool {
    a[a_off] <= b[b_off + 3]
        && a[a_off + 3] >= b[b_off]
        && a[a_off + 1] <= b[b_off + 4]
        && a[a_off + 4] >= b[b_off + 1]
        && a[a_off + 2] <= b[b_off + 5]
        && a[a_off + 5] >= b[b_off + 2]
}

/// Inclusive containment test: does `outer` fully contain `inner`?
///
/// Equality on any face satisfies containment, so an object whose max
/// sits exactly on an octant midpoint still fits the lower octant.
#[inline(always)]
pub fn aabb_contains_aabb(outer: &[f32], outer_off: usize, inner: &[f32], inner_off: usize) -> bool {
    inner[inner_off] >= outer[outer_off]
        && inner[inner_off + 1] >= outer[outer_off + 1]
        && inner[inner_off + 2] >= outer[outer_off + 2]
        && inner[inner_off + 3] <= outer[outer_off + 3]
        && inner[inner_off + 4] <= outer[outer_off + 4]
        && inner[inner_off + 5] <= outer[outer_off + 5]
}

/// Write the union of two AABB records into `out`
#[inline]
pub fn aabb_union(a: &[f32], a_off: usize, b: &[f32], b_off: usize, out: &mut [f32; 6]) {
    out[0] = a[a_off].min(b[b_off]);
    out[1] = a[a_off + 1].min(b[b_off + 1]);
    out[2] = a[a_off + 2].min(b[b_off + 2]);
    out[3] = a[a_off + 3].max(b[b_off + 3]);
    out[4] = a[a_off + 4].max(b[b_off + 4]);
    out[5] = a[a_off + 5].max(b[b_off + 5]);
}

/// Grow an AABB record in place by `amount` on every face
#[inline]
pub fn aabb_expand(aabb: &mut [f32], off: usize, amount: f32) {
    aabb[off] -= amount;
    aabb[off + 1] -= amount;
    aabb[off + 2] -= amount;
    aabb[off + 3] += amount;
    aabb[off + 4] += amount;
    aabb[off + 5] += amount;
}

/// Dot product of two packed 3-vectors
#[inline(always)]
pub fn vec3_dot(a: &[f32], a_off: usize, b: &[f32], b_off: usize) -> f32 {
    a[a_off] * b[b_off] + a[a_off + 1] * b[b_off + 1] + a[a_off + 2] * b[b_off + 2]
}

/// Cross product of two packed 3-vectors, written to `out`
#[inline]
pub fn vec3_cross(a: &[f32], a_off: usize, b: &[f32], b_off: usize, out: &mut [f32; 3]) {
    let (ax, ay, az) = (a[a_off], a[a_off + 1], a[a_off + 2]);
    let (bx, by, bz) = (b[b_off], b[b_off + 1], b[b_off + 2]);
    out[0] = ay * bz - az * by;
    out[1] = az * bx - ax * bz;
    out[2] = ax * by - ay * bx;
}

/// Euclidean distance between two packed 3-vectors
#[inline(always)]
pub fn vec3_distance(a: &[f32], a_off: usize, b: &[f32], b_off: usize) -> f32 {
    let dx = a[a_off] - b[b_off];
    let dy = a[a_off + 1] - b[b_off + 1];
    let dz = a[a_off + 2] - b[b_off + 2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Pack a ray into a 6-float record
#[inline]
pub fn pack_ray(origin: Vec3, direction: Vec3) -> [f32; 6] {
    [
        origin.x,
        origin.y,
        origin.z,
        direction.x,
        direction.y,
        direction.z,
    ]
}

/// Pack an AABB into a 6-float record
#[inline]
pub fn pack_aabb(min: Vec3, max: Vec3) -> [f32; 6] {
    [min.x, min.y, min.z, max.x, max.y, max.z]
}
