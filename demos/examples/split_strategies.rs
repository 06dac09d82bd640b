// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split strategies.
//!
//! Build the same clustered scene with midpoint and binned SAH splitting and
//! compare the resulting tree statistics.
//!
//! Run:
//! - `cargo run -p sphere_bvh_demos --example split_strategies`

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphere_bvh::{BuildConfig, Bvh, Sphere, SplitStrategy};

fn main() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut spheres = Vec::new();
    for _ in 0..24 {
        let hub = Vec3::new(
            rng.random_range(-300.0..300.0),
            rng.random_range(-300.0..300.0),
            rng.random_range(-300.0..300.0),
        );
        for _ in 0..50 {
            let offset = Vec3::new(
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
            );
            spheres.push(Sphere::new(hub + offset, rng.random_range(0.2..0.8)));
        }
    }

    let configs = [
        ("midpoint", BuildConfig::default()),
        ("sah/8", BuildConfig {
            strategy: SplitStrategy::BinnedSah { bins: 8 },
            ..BuildConfig::default()
        }),
        ("sah/16", BuildConfig::sah()),
        ("sah/16 leaf<=4", BuildConfig::sah().with_max_leaf_size(4)),
    ];

    println!("{} spheres in 24 clusters", spheres.len());
    for (label, config) in configs {
        let bvh = Bvh::new(&spheres, config);
        let stats = bvh.stats();
        println!(
            "{label:<15} nodes {:>5}  leaves {:>5}  depth {:>2}  largest leaf {:>2}  SAH cost {:>9.2}",
            stats.nodes_used, stats.leaf_count, stats.max_depth, stats.max_leaf_size, stats.sah_cost
        );
        if let Err(err) = bvh.validate(&spheres) {
            println!("  invalid: {err}");
        }
    }
}
