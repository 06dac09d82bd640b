// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bouncing spheres.
//!
//! Scatter a thousand spheres through a flat box, let them drift and bounce
//! off the walls, and keep the hierarchy current with a refit/rebuild schedule.
//! Prints tree quality per frame so the slow decay under refits and the
//! recovery at each rebuild are visible.
//!
//! Run:
//! - `cargo run -p sphere_bvh_demos --example bouncing_spheres`

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphere_bvh::{
    Aabb3, BuildConfig, DynamicBvh, FrameUpdate, RebuildSchedule, Sphere, motion, sphere_bytes,
};

const SPHERE_COUNT: usize = 1000;
const FRAMES: usize = 48;
const DT: f32 = 1.0 / 60.0;

fn main() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let arena = Aabb3::new(Vec3::new(-100.0, -100.0, -20.0), Vec3::new(100.0, 100.0, 20.0));

    let mut spheres: Vec<Sphere> = (0..SPHERE_COUNT)
        .map(|_| {
            let center = Vec3::new(
                rng.random_range(-95.0..95.0),
                rng.random_range(-95.0..95.0),
                rng.random_range(-15.0..15.0),
            );
            let color = Vec3::new(rng.random(), rng.random(), rng.random());
            Sphere::new(center, rng.random_range(0.3..3.0)).with_appearance(color, 0)
        })
        .collect();
    let mut velocities: Vec<Vec3> = (0..SPHERE_COUNT)
        .map(|_| {
            Vec3::new(
                rng.random_range(-40.0..40.0),
                rng.random_range(-40.0..40.0),
                rng.random_range(-10.0..10.0),
            )
        })
        .collect();

    let mut dynamic = DynamicBvh::new(&spheres, BuildConfig::sah(), RebuildSchedule::default());
    let stats = dynamic.bvh().stats();
    println!(
        "built: {} nodes ({} leaves), depth {}, SAH cost {:.2}",
        stats.nodes_used, stats.leaf_count, stats.max_depth, stats.sah_cost
    );
    println!(
        "upload: {} node bytes, {} index bytes, {} sphere bytes",
        dynamic.bvh().node_bytes().len(),
        dynamic.bvh().index_bytes().len(),
        sphere_bytes(&spheres).len()
    );

    for frame in 0..FRAMES {
        motion::integrate_within(&mut spheres, &mut velocities, DT, arena);
        let update = dynamic.advance_frame(&spheres);
        let stats = dynamic.bvh().stats();
        let marker = match update {
            FrameUpdate::Refit => "refit",
            FrameUpdate::Rebuild => "REBUILD",
        };
        println!(
            "frame {frame:>3}: {marker:<7} SAH cost {:>8.2}  depth {:>2}",
            stats.sah_cost, stats.max_depth
        );
    }

    match dynamic.bvh().validate(&spheres) {
        Ok(()) => println!("final hierarchy is consistent"),
        Err(err) => println!("final hierarchy is broken: {err}"),
    }
}
