// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sphere_bvh --heading-base-level=0

//! Sphere BVH: a flat bounding volume hierarchy over moving spheres, laid out for the GPU.
//!
//! Sphere BVH builds the acceleration structure a ray-tracing kernel walks, and keeps it
//! current while the scene moves.
//!
//! - Build a binary hierarchy over any [`Bounded`] primitives into a flat node array.
//! - Refit bounds in one reverse pass when primitives move, without touching topology.
//! - Rebuild on a fixed cadence with [`DynamicBvh`] to undo the quality loss refits accumulate.
//!
//! Nodes, the primitive index permutation, and [`Sphere`] records are `#[repr(C)]` and
//! [`bytemuck::Pod`], so they can be handed to a storage buffer as-is via
//! [`Bvh::node_bytes`], [`Bvh::index_bytes`] and [`sphere_bytes`].
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use sphere_bvh::{Bvh, BuildConfig, Sphere};
//!
//! let mut spheres = vec![
//!     Sphere::new(Vec3::new(-5.0, 0.0, 0.0), 1.0),
//!     Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0),
//! ];
//! let mut bvh = Bvh::new(&spheres, BuildConfig::default());
//! assert_eq!(bvh.nodes_used(), 3);
//!
//! // Move everything and refresh bounds.
//! for s in &mut spheres {
//!     s.center.y += 2.0;
//! }
//! bvh.refit(&spheres);
//! assert_eq!(bvh.root().unwrap().max.y, 3.0);
//! assert!(bvh.validate(&spheres).is_ok());
//! ```
//!
//! Driving a moving scene frame by frame:
//!
//! ```rust
//! use glam::Vec3;
//! use sphere_bvh::{BuildConfig, DynamicBvh, FrameUpdate, RebuildSchedule, Sphere, motion};
//!
//! let mut spheres = vec![Sphere::new(Vec3::ZERO, 1.0), Sphere::new(Vec3::X * 4.0, 1.0)];
//! let velocities = [Vec3::Y, Vec3::NEG_Y];
//! let mut dynamic = DynamicBvh::new(&spheres, BuildConfig::sah(), RebuildSchedule::new(2));
//!
//! let mut updates = Vec::new();
//! for _ in 0..3 {
//!     motion::integrate(&mut spheres, &velocities, 0.1);
//!     updates.push(dynamic.advance_frame(&spheres));
//! }
//! assert_eq!(updates, [FrameUpdate::Refit, FrameUpdate::Refit, FrameUpdate::Rebuild]);
//! ```
//!
//! ## Choosing a split strategy
//!
//! - [`SplitStrategy::Midpoint`] (default): halves the longest axis. Cheap and
//!   deterministic; fine for evenly scattered scenes.
//! - [`SplitStrategy::BinnedSah`]: surface area heuristic over binned centroids.
//!   Slower to build, produces tighter trees for clustered scenes, and may stop
//!   splitting early when a leaf is cheaper than any split.
//!   See the [`split`] docs for the cost model.
//!
//! ### Float semantics
//!
//! This crate assumes finite coordinates and positive radii. Debug builds may assert.
//! Degenerate input (many coincident centers) never fails: nodes that cannot be
//! separated simply stay as larger leaves.
//!
//! ## Features
//!
//! - `std` (default): build glam against `std`.
//! - `libm`: build glam against `libm` for `no_std` targets.
//! - `tracing`: spans around build and refit, and an event per scheduled frame.

#![no_std]

extern crate alloc;

pub mod build;
pub mod bvh;
pub mod motion;
pub mod node;
pub mod primitive;
pub mod refit;
pub mod schedule;
pub mod split;
pub mod types;

pub use build::{BuildConfig, node_capacity};
pub use bvh::{Bvh, BvhStats, TreeError};
pub use node::Node;
pub use primitive::{Bounded, Sphere, sphere_bytes};
pub use schedule::{DynamicBvh, FrameUpdate, RebuildSchedule};
pub use split::{SplitPlane, SplitStrategy};
pub use types::{Aabb3, Axis};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use glam::Vec3;

    #[test]
    fn bouncing_scene_stays_valid_across_rebuilds() {
        let arena = Aabb3::new(Vec3::splat(-20.0), Vec3::splat(20.0));
        let mut spheres: Vec<Sphere> = (0..64)
            .map(|i| {
                let t = i as f32;
                let c = Vec3::new(
                    (t * 7.3) % 36.0 - 18.0,
                    (t * 3.1) % 36.0 - 18.0,
                    (t * 1.3) % 10.0 - 5.0,
                );
                Sphere::new(c, 0.5 + (i % 4) as f32 * 0.25)
            })
            .collect();
        let mut velocities: Vec<Vec3> = (0..64)
            .map(|i| {
                Vec3::new(
                    ((i * 7) % 11) as f32 - 5.0,
                    ((i * 5) % 9) as f32 - 4.0,
                    ((i * 3) % 7) as f32 - 3.0,
                ) * 2.0
            })
            .collect();

        let mut dynamic =
            DynamicBvh::new(&spheres, BuildConfig::sah(), RebuildSchedule::new(5));
        let mut rebuilds = 0;
        for _ in 0..30 {
            motion::integrate_within(&mut spheres, &mut velocities, 1.0 / 30.0, arena);
            if dynamic.advance_frame(&spheres) == FrameUpdate::Rebuild {
                rebuilds += 1;
            }
            dynamic.bvh().validate(&spheres).expect("valid every frame");
            let root = dynamic.bvh().root().expect("built");
            assert!(arena.contains_aabb(&root.aabb()), "arena holds every sphere");
        }
        assert_eq!(rebuilds, 5);
    }

    #[test]
    fn refit_then_rebuild_on_translated_scene_agree_on_bounds() {
        let mut spheres: Vec<Sphere> = (0..40)
            .map(|i| Sphere::new(Vec3::new(i as f32 * 2.0, (i % 3) as f32, 0.0), 0.75))
            .collect();
        let mut bvh = Bvh::new(&spheres, BuildConfig::default());
        for s in &mut spheres {
            s.center += Vec3::new(3.0, -2.0, 1.0);
        }
        bvh.refit(&spheres);
        let refit_root = bvh.root().map(Node::aabb);
        bvh.build(&spheres);
        assert_eq!(bvh.root().map(Node::aabb), refit_root);
    }
}
