//! Common test helpers for FROST-Octree integration tests
//!
//! Author: Moroya Sakamoto

use frost_octree::prelude::*;

/// World half-extent used by the standard scene
#[allow(dead_code)]
pub const WORLD: f32 = 50.0;

/// Standard scene: bounds `[-50, 50]^3`, eight unit boxes centered on
/// the octant corners at `(+/-40, +/-40, +/-40)` (objects 0..8, octant
/// bit order x=1, y=2, z=4), plus one box at `[10, 11]^3` (object 8).
///
/// Nine objects exceed the default leaf capacity, so the root is
/// subdivided and every corner box sits in its own octant child.
#[allow(dead_code)]
pub fn corner_scene() -> (Octree, AabbPool) {
    let mut tree = Octree::new(NodePool::new(512), 64).unwrap();
    tree.set_bounds(Vec3::splat(-WORLD), Vec3::splat(WORLD));
    let mut aabbs = AabbPool::new(64);

    for i in 0..8 {
        let center = corner_center(i);
        let obj = aabbs.allocate().unwrap();
        aabbs.set(obj, center - Vec3::splat(0.5), center + Vec3::splat(0.5));
        tree.insert(&aabbs, obj).unwrap();
    }
    let obj = aabbs.allocate().unwrap();
    aabbs.set(obj, Vec3::splat(10.0), Vec3::splat(11.0));
    tree.insert(&aabbs, obj).unwrap();

    (tree, aabbs)
}

/// Center of the corner box for octant `i`
#[allow(dead_code)]
pub fn corner_center(i: u32) -> Vec3 {
    Vec3::new(
        if i & 1 != 0 { 40.0 } else { -40.0 },
        if i & 2 != 0 { 40.0 } else { -40.0 },
        if i & 4 != 0 { 40.0 } else { -40.0 },
    )
}

/// Assert two f32 values are close within tolerance
#[allow(dead_code)]
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}

/// Brute-force closest hit over every live object, for cross-checking
/// the octree traversal
#[allow(dead_code)]
pub fn brute_force_raycast(
    tree: &Octree,
    aabbs: &AabbPool,
    origin: Vec3,
    direction: Vec3,
) -> Option<RayHit> {
    let ray = [
        origin.x,
        origin.y,
        origin.z,
        direction.x,
        direction.y,
        direction.z,
    ];
    let mut best: Option<RayHit> = None;
    for obj in 0..aabbs.size() {
        if !tree.contains(obj) {
            continue;
        }
        let t = ray_intersects_aabb(&ray, 0, aabbs.as_floats(), obj as usize * FLOATS_PER_AABB);
        if t >= 0.0 && best.map_or(true, |b| t < b.t) {
            best = Some(RayHit { object: obj, t });
        }
    }
    best
}

/// Brute-force overlap set, for cross-checking `query_box`
#[allow(dead_code)]
pub fn brute_force_query_box(tree: &Octree, aabbs: &AabbPool, min: Vec3, max: Vec3) -> Vec<u32> {
    let query = [min.x, min.y, min.z, max.x, max.y, max.z];
    let mut out = Vec::new();
    for obj in 0..aabbs.size() {
        if !tree.contains(obj) {
            continue;
        }
        if aabb_overlaps_aabb(&query, 0, aabbs.as_floats(), obj as usize * FLOATS_PER_AABB) {
            out.push(obj);
        }
    }
    out
}

/// Tiny deterministic LCG so randomized sequences stay reproducible
/// without pulling in a dependency
#[allow(dead_code)]
pub struct Lcg(pub u64);

#[allow(dead_code)]
impl Lcg {
    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform-ish float in `[lo, hi)`
    pub fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (self.next_u32() as f32 / u32::MAX as f32) * (hi - lo)
    }
}
