// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split plane selection.
//!
//! Both strategies split along the axis of largest extent of the node's bounds.
//! They differ in where the plane goes along that axis:
//!
//! - [`SplitStrategy::Midpoint`] puts it halfway across the node. It never
//!   declines to split; a plane that leaves one side empty is rejected later by
//!   the partition step.
//! - [`SplitStrategy::BinnedSah`] evaluates candidate planes with the surface
//!   area heuristic
//!
//!   `cost = count(L) * area(L) + count(R) * area(R)`
//!
//!   and keeps the node as a leaf when no plane beats `count * area(node)`.
//!   Large nodes drop centroids into equal-width bins and test the planes
//!   between bins. Nodes with fewer primitives than bins test a plane through
//!   every centroid instead.

use alloc::vec::Vec;

use crate::primitive::Bounded;
use crate::types::{Aabb3, Axis, union_aabb};

/// How the builder places split planes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Spatial median of the node's bounds along the longest axis.
    #[default]
    Midpoint,
    /// Surface area heuristic over `bins` equal-width slices of the longest axis.
    BinnedSah {
        /// Number of bins; at least 2.
        bins: u32,
    },
}

impl SplitStrategy {
    /// Binned SAH with 16 bins.
    pub const SAH: Self = Self::BinnedSah { bins: 16 };
}

/// A chosen split: primitives whose centroid lies below `position` on `axis` go left.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitPlane {
    /// Axis the plane is perpendicular to.
    pub axis: Axis,
    /// Plane offset along `axis`.
    pub position: f32,
}

#[derive(Copy, Clone, Debug)]
struct Bin {
    bounds: Aabb3,
    count: u32,
}

impl Bin {
    const EMPTY: Self = Self {
        bounds: Aabb3::EMPTY,
        count: 0,
    };
}

/// Reusable buffers for SAH evaluation, so that splitting allocates at most once per build.
#[derive(Clone, Debug, Default)]
pub(crate) struct SplitScratch {
    bins: Vec<Bin>,
    // Area and count of everything right of plane `i`.
    right: Vec<(f32, u32)>,
}

impl SplitStrategy {
    /// Pick a plane for the primitives `ids` inside `bounds`, or `None` to keep a leaf.
    pub(crate) fn choose<P: Bounded>(
        self,
        primitives: &[P],
        ids: &[u32],
        bounds: &Aabb3,
        scratch: &mut SplitScratch,
    ) -> Option<SplitPlane> {
        let axis = bounds.largest_axis();
        match self {
            Self::Midpoint => {
                let position = axis.of(bounds.min) + 0.5 * axis.of(bounds.extent());
                Some(SplitPlane { axis, position })
            }
            Self::BinnedSah { bins } => {
                let bins = bins.max(2) as usize;
                let best = if ids.len() >= bins {
                    best_binned(primitives, ids, bounds, axis, bins, scratch)
                } else {
                    best_centroid(primitives, ids, axis)
                }?;
                let leaf_cost = ids.len() as f32 * bounds.surface_area();
                (best.1 < leaf_cost).then_some(SplitPlane {
                    axis,
                    position: best.0,
                })
            }
        }
    }
}

/// SAH cost of splitting `ids` at `position` along `axis`.
pub fn evaluate_sah<P: Bounded>(primitives: &[P], ids: &[u32], axis: Axis, position: f32) -> f32 {
    let mut left = Bin::EMPTY;
    let mut right = Bin::EMPTY;
    for &id in ids {
        let p = &primitives[id as usize];
        let side = if axis.of(p.centroid()) < position {
            &mut left
        } else {
            &mut right
        };
        side.bounds.grow(&p.aabb());
        side.count += 1;
    }
    left.count as f32 * left.bounds.surface_area() + right.count as f32 * right.bounds.surface_area()
}

fn best_centroid<P: Bounded>(primitives: &[P], ids: &[u32], axis: Axis) -> Option<(f32, f32)> {
    let mut best: Option<(f32, f32)> = None;
    for &id in ids {
        let position = axis.of(primitives[id as usize].centroid());
        let cost = evaluate_sah(primitives, ids, axis, position);
        if best.is_none_or(|(_, c)| cost < c) {
            best = Some((position, cost));
        }
    }
    best
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Bin indices are clamped to the bin count before use."
)]
fn best_binned<P: Bounded>(
    primitives: &[P],
    ids: &[u32],
    bounds: &Aabb3,
    axis: Axis,
    bins: usize,
    scratch: &mut SplitScratch,
) -> Option<(f32, f32)> {
    let min = axis.of(bounds.min);
    let extent = axis.of(bounds.extent());
    if extent <= 0.0 {
        return None;
    }
    let scale = extent / bins as f32;

    scratch.bins.clear();
    scratch.bins.resize(bins, Bin::EMPTY);
    for &id in ids {
        let p = &primitives[id as usize];
        let offset = (axis.of(p.centroid()) - min).max(0.0);
        let b = ((offset / scale) as usize).min(bins - 1);
        let bin = &mut scratch.bins[b];
        bin.bounds.grow(&p.aabb());
        bin.count += 1;
    }

    // Sweep from the right so plane `i` knows everything in bins `i + 1..`.
    scratch.right.clear();
    scratch.right.resize(bins - 1, (0.0, 0));
    let mut acc = Bin::EMPTY;
    for i in (1..bins).rev() {
        let bin = scratch.bins[i];
        acc.bounds = union_aabb(acc.bounds, bin.bounds);
        acc.count += bin.count;
        scratch.right[i - 1] = (acc.bounds.surface_area(), acc.count);
    }

    let mut best: Option<(f32, f32)> = None;
    let mut left = Bin::EMPTY;
    for i in 0..bins - 1 {
        let bin = scratch.bins[i];
        left.bounds = union_aabb(left.bounds, bin.bounds);
        left.count += bin.count;
        let (right_area, right_count) = scratch.right[i];
        let cost =
            left.count as f32 * left.bounds.surface_area() + right_count as f32 * right_area;
        if best.is_none_or(|(_, c)| cost < c) {
            best = Some((min + (i + 1) as f32 * scale, cost));
        }
    }
    best
}
