// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;
use sphere_bvh::{
    Aabb3, BuildConfig, Bvh, DynamicBvh, Node, RebuildSchedule, Sphere, motion, node_capacity,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// A wide, flat slab of spheres with mixed radii.
fn gen_slab(count: usize, seed: u64) -> Vec<Sphere> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let center = Vec3::new(
                rng.range(-95.0, 95.0),
                rng.range(-95.0, 95.0),
                rng.range(-15.0, 15.0),
            );
            Sphere::new(center, rng.range(0.3, 3.0))
        })
        .collect()
}

/// Tight clumps separated by empty space, where SAH pays off.
fn gen_clustered(clusters: usize, per_cluster: usize, seed: u64) -> Vec<Sphere> {
    let mut rng = Rng::new(seed);
    let mut out = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..clusters {
        let hub = Vec3::new(
            rng.range(-200.0, 200.0),
            rng.range(-200.0, 200.0),
            rng.range(-200.0, 200.0),
        );
        for _ in 0..per_cluster {
            let offset = Vec3::new(rng.range(-4.0, 4.0), rng.range(-4.0, 4.0), rng.range(-4.0, 4.0));
            out.push(Sphere::new(hub + offset, rng.range(0.2, 1.0)));
        }
    }
    out
}

fn gen_velocities(count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| Vec3::new(rng.range(-5.0, 5.0), rng.range(-5.0, 5.0), rng.range(-1.0, 1.0)))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000usize, 3_000, 10_000] {
        let spheres = gen_slab(n, 0xDEAD_BEEF_F00D_CAFE ^ n as u64);
        group.throughput(Throughput::Elements(n as u64));
        for (label, config) in [
            ("midpoint", BuildConfig::default()),
            ("sah", BuildConfig::sah()),
            ("sah_leaf4", BuildConfig::sah().with_max_leaf_size(4)),
        ] {
            group.bench_function(format!("{label}_n{n}"), |b| {
                let mut nodes = vec![Node::empty(); node_capacity(n)];
                let mut indices = vec![0_u32; n];
                b.iter(|| {
                    let used = sphere_bvh::build::build(&spheres, &mut nodes, &mut indices, config);
                    black_box(used);
                });
            });
        }
    }
    let clustered = gen_clustered(32, 64, 0x1234_5678_9ABC_DEF0);
    group.throughput(Throughput::Elements(clustered.len() as u64));
    group.bench_function("midpoint_clustered", |b| {
        b.iter(|| black_box(Bvh::new(&clustered, BuildConfig::default()).nodes_used()));
    });
    group.bench_function("sah_clustered", |b| {
        b.iter(|| black_box(Bvh::new(&clustered, BuildConfig::sah()).nodes_used()));
    });
    group.finish();
}

fn bench_refit(c: &mut Criterion) {
    let mut group = c.benchmark_group("refit");
    for &n in &[1_000usize, 3_000, 10_000] {
        let spheres = gen_slab(n, 0xFACE_FEED_CAFE_BABE ^ n as u64);
        let velocities = gen_velocities(n, 0xC0FF_EE00_1234_0000 ^ n as u64);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("after_motion_n{n}"), |b| {
            b.iter_batched(
                || {
                    let bvh = Bvh::new(&spheres, BuildConfig::default());
                    let mut moved = spheres.clone();
                    motion::integrate(&mut moved, &velocities, 1.0 / 60.0);
                    (bvh, moved)
                },
                |(mut bvh, moved)| {
                    bvh.refit(&moved);
                    black_box(bvh.root());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    let n = 1_000;
    let arena = Aabb3::new(Vec3::new(-100.0, -100.0, -20.0), Vec3::new(100.0, 100.0, 20.0));
    for &interval in &[1u32, 4, 16] {
        group.throughput(Throughput::Elements(32));
        group.bench_function(format!("32_frames_interval{interval}"), |b| {
            b.iter_batched(
                || {
                    let spheres = gen_slab(n, 0xABCD_EF01_2345_6789);
                    let velocities = gen_velocities(n, 0x0F0F_0F0F_F0F0_F0F0);
                    let dynamic = DynamicBvh::new(
                        &spheres,
                        BuildConfig::sah(),
                        RebuildSchedule::new(interval),
                    );
                    (spheres, velocities, dynamic)
                },
                |(mut spheres, mut velocities, mut dynamic)| {
                    for _ in 0..32 {
                        motion::integrate_within(&mut spheres, &mut velocities, 1.0 / 60.0, arena);
                        black_box(dynamic.advance_frame(&spheres));
                    }
                    black_box(dynamic.bvh().stats().sah_cost);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_refit, bench_frames);
criterion_main!(benches);
