// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Sphere BVH: build, inspect the flat node array, move, refit.

use glam::Vec3;
use sphere_bvh::{BuildConfig, Bvh, Sphere};

fn main() {
    let mut spheres = vec![
        Sphere::new(Vec3::new(-5.0, 0.0, 0.0), 1.0),
        Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0),
        Sphere::new(Vec3::new(0.0, -5.0, 0.0), 1.0),
        Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0),
    ];
    let mut bvh = Bvh::new(&spheres, BuildConfig::default());
    println!("built with {:?}", bvh.config());

    for (i, node) in bvh.nodes().iter().enumerate() {
        match node.left_child() {
            Some(left) => println!(
                "node {i}: internal {:?} -> {:?}, children {left} and {}",
                node.min,
                node.max,
                left + 1
            ),
            None => println!(
                "node {i}: leaf {:?} -> {:?}, primitives {:?}",
                node.min,
                node.max,
                bvh.leaf_primitives(i)
            ),
        }
    }

    // Shift everything right and refresh bounds.
    for s in &mut spheres {
        s.center += Vec3::X;
    }
    bvh.refit(&spheres);
    println!("root after refit: {:?}", bvh.root().map(|r| r.aabb()));
    println!("stats: {:?}", bvh.stats());
}
