//! Integration tests: ray and box queries against a populated octree
//!
//! Covers the closest-hit contract, inclusive overlap semantics, and
//! agreement between the DFS traversal and a brute-force scan of every
//! live object.
//!
//! Author: Moroya Sakamoto

mod common;

use common::*;
use frost_octree::prelude::*;

// ============================================================================
// Closest-hit raycast
// ============================================================================

#[test]
fn raycast_picks_nearest_of_several() {
    let (mut tree, aabbs) = corner_scene();

    // Passes through the [10,11]^3 box long before anything else
    let hit = tree
        .raycast_ray(&aabbs, Vec3::new(0.0, 10.5, 10.5), Vec3::X)
        .unwrap();
    assert_eq!(hit.object, 8);
    assert_close(hit.t, 10.0, 1e-4, "entry distance");
}

#[test]
fn raycast_reaches_deep_octant() {
    let (mut tree, aabbs) = corner_scene();

    // Enters the world from outside and hits the (-,-,-) corner box
    let hit = tree
        .raycast_ray(&aabbs, Vec3::new(-60.0, -40.0, -40.0), Vec3::X)
        .unwrap();
    assert_eq!(hit.object, 0);
    assert_close(hit.t, 19.5, 1e-4, "entry distance");
}

#[test]
fn raycast_agrees_with_brute_force() {
    let (mut tree, aabbs) = corner_scene();

    let probes = [
        (Vec3::new(0.0, 10.5, 10.5), Vec3::X),
        (Vec3::new(-60.0, -40.0, -40.0), Vec3::X),
        (Vec3::new(40.0, 60.0, 40.0), Vec3::NEG_Y),
        (Vec3::new(10.5, 10.5, -20.0), Vec3::Z),
        (Vec3::new(0.0, 0.0, 0.0), Vec3::Y),
        (Vec3::new(-40.0, -40.0, -40.0), Vec3::X),
    ];
    for (origin, dir) in probes {
        let dfs = tree.raycast_ray(&aabbs, origin, dir);
        let brute = brute_force_raycast(&tree, &aabbs, origin, dir);
        assert_eq!(
            dfs, brute,
            "traversal disagrees with brute force for origin {:?} dir {:?}",
            origin, dir
        );
    }
}

#[test]
fn raycast_hit_distance_is_reproducible_from_kernel() {
    let (mut tree, aabbs) = corner_scene();
    let origin = Vec3::new(0.0, 10.5, 10.5);
    let ray = [origin.x, origin.y, origin.z, 1.0, 0.0, 0.0];

    let hit = tree.raycast(&aabbs, &ray, 0).unwrap();
    let t = ray_intersects_aabb(
        &ray,
        0,
        aabbs.as_floats(),
        hit.object as usize * FLOATS_PER_AABB,
    );
    assert_eq!(hit.t, t, "reported t must come straight from the kernel");
}

#[test]
fn raycast_outside_world_misses() {
    let (mut tree, aabbs) = corner_scene();
    assert!(tree
        .raycast_ray(&aabbs, Vec3::new(0.0, 100.0, 0.0), Vec3::Y)
        .is_none());
    assert!(tree
        .raycast_ray(&aabbs, Vec3::new(0.0, 25.0, 25.0), Vec3::X)
        .is_none());
}

#[test]
fn raycast_is_deterministic() {
    let (mut tree, aabbs) = corner_scene();
    let a = tree.raycast_ray(&aabbs, Vec3::new(0.0, 10.5, 10.5), Vec3::X);
    let b = tree.raycast_ray(&aabbs, Vec3::new(0.0, 10.5, 10.5), Vec3::X);
    assert_eq!(a, b);
}

// ============================================================================
// Box queries
// ============================================================================

#[test]
fn query_box_finds_exactly_the_overlapping_set() {
    let (mut tree, aabbs) = corner_scene();

    let mut hits = tree.query_box_collect(&aabbs, Vec3::splat(5.0), Vec3::splat(WORLD));
    hits.sort_unstable();
    assert_eq!(hits, vec![7, 8], "(+,+,+) corner and the [10,11]^3 box");
}

#[test]
fn query_box_agrees_with_brute_force() {
    let (mut tree, aabbs) = corner_scene();

    let windows = [
        (Vec3::splat(-WORLD), Vec3::splat(WORLD)),
        (Vec3::splat(5.0), Vec3::splat(WORLD)),
        (Vec3::new(-41.0, -41.0, -41.0), Vec3::new(-39.0, -39.0, -39.0)),
        (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
        (Vec3::new(10.5, 10.5, 10.5), Vec3::new(40.0, 40.0, 40.0)),
    ];
    for (min, max) in windows {
        let mut dfs = tree.query_box_collect(&aabbs, min, max);
        dfs.sort_unstable();
        let mut brute = brute_force_query_box(&tree, &aabbs, min, max);
        brute.sort_unstable();
        assert_eq!(dfs, brute, "window {:?}..{:?}", min, max);
    }
}

#[test]
fn query_box_results_are_duplicate_free() {
    let (mut tree, aabbs) = corner_scene();
    let hits = tree.query_box_collect(&aabbs, Vec3::splat(-WORLD), Vec3::splat(WORLD));
    assert_eq!(hits.len(), 9);
    let mut deduped = hits.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), hits.len());
}

#[test]
fn query_box_appends_without_clearing() {
    let (mut tree, aabbs) = corner_scene();
    let mut out = Vec::new();
    tree.query_box(&aabbs, Vec3::splat(5.0), Vec3::splat(WORLD), &mut out);
    let first = out.len();
    tree.query_box(&aabbs, Vec3::splat(5.0), Vec3::splat(WORLD), &mut out);
    assert_eq!(out.len(), first * 2);
}

// ============================================================================
// Batch casting
// ============================================================================

#[test]
fn batch_parallel_matches_sequential() {
    let (mut tree, aabbs) = corner_scene();

    let count = 64u32;
    let mut rays = RayPool::new(count);
    let mut rng = Lcg(7);
    for i in 0..count {
        let origin = Vec3::new(
            rng.next_f32(-60.0, 60.0),
            rng.next_f32(-60.0, 60.0),
            rng.next_f32(-60.0, 60.0),
        );
        let dir = match i % 3 {
            0 => Vec3::X,
            1 => Vec3::NEG_Y,
            _ => Vec3::Z,
        };
        rays.set(i, origin, dir);
    }

    let mut sequential = vec![0.0f32; count as usize * 2];
    tree.raycast_batch(&aabbs, &rays, &mut sequential);

    let mut parallel = vec![0.0f32; count as usize * 2];
    tree.raycast_batch_parallel(&aabbs, &rays, &mut parallel);

    assert_eq!(sequential, parallel);
}
