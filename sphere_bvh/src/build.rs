// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-down construction.
//!
//! The root starts as a single leaf over every primitive. Each leaf that is
//! large enough picks a split plane, partitions its span of the index array in
//! place, and becomes an internal node over two fresh leaves allocated at the
//! end of the node store. Children are always allocated as an adjacent pair
//! after their parent, so the right child is `left + 1` and every child index is
//! larger than its parent's.

use alloc::vec;
use alloc::vec::Vec;

use crate::node::Node;
use crate::primitive::Bounded;
use crate::split::{SplitPlane, SplitScratch, SplitStrategy};
use crate::types::Aabb3;

/// Knobs for [`build`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Split plane placement.
    pub strategy: SplitStrategy,
    /// Leaves with at most this many primitives are never split. Values below 1 act as 1.
    pub max_leaf_size: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Midpoint,
            max_leaf_size: 1,
        }
    }
}

impl BuildConfig {
    /// Binned SAH splits with single-primitive leaves allowed.
    pub fn sah() -> Self {
        Self {
            strategy: SplitStrategy::SAH,
            ..Self::default()
        }
    }

    /// Same config with a different leaf size cap.
    pub fn with_max_leaf_size(mut self, max_leaf_size: u32) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }
}

/// Node store capacity needed for `primitive_count` primitives.
pub const fn node_capacity(primitive_count: usize) -> usize {
    2 * primitive_count + 1
}

/// Build a hierarchy over `primitives` into `nodes`, returning the number of nodes used.
///
/// `indices` is reset to the identity permutation and then reordered so that
/// every leaf owns a contiguous span of it. Nodes past the returned count are
/// left untouched.
///
/// # Panics
///
/// If `indices.len() != primitives.len()` or `nodes` holds fewer than
/// [`node_capacity`] slots.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Primitive and node counts are checked against the 32-bit GPU layout above."
)]
pub fn build<P: Bounded>(
    primitives: &[P],
    nodes: &mut [Node],
    indices: &mut [u32],
    config: BuildConfig,
) -> u32 {
    let n = primitives.len();
    assert_eq!(indices.len(), n, "index array must match primitive count");
    assert!(
        nodes.len() >= node_capacity(n),
        "node store needs {} slots for {n} primitives, has {}",
        node_capacity(n),
        nodes.len()
    );
    assert!(
        node_capacity(n) <= i32::MAX as usize,
        "primitive count exceeds 32-bit node addressing"
    );

    for (i, slot) in indices.iter_mut().enumerate() {
        *slot = i as u32;
    }
    if n == 0 {
        return 0;
    }

    let mut builder = Builder {
        primitives,
        nodes,
        indices,
        config,
        scratch: SplitScratch::default(),
        nodes_used: 1,
    };
    builder.nodes[0] = Node::leaf(0, n);
    builder.update_bounds(0);
    builder.subdivide(0);
    builder.nodes_used as u32
}

struct Builder<'a, P> {
    primitives: &'a [P],
    nodes: &'a mut [Node],
    indices: &'a mut [u32],
    config: BuildConfig,
    scratch: SplitScratch,
    nodes_used: usize,
}

impl<P: Bounded> Builder<'_, P> {
    fn update_bounds(&mut self, node: usize) {
        if let Some(range) = self.nodes[node].leaf_range() {
            self.nodes[node].set_aabb(leaf_bounds(self.primitives, &self.indices[range]));
        }
    }

    /// Split `root` and its descendants depth first, left subtree before right.
    ///
    /// Numbering matches the recursive formulation: the left subtree's nodes are
    /// all allocated before the right child's children.
    fn subdivide(&mut self, root: usize) {
        let mut stack: Vec<usize> = vec![root];
        while let Some(node) = stack.pop() {
            let Some(left) = self.split(node) else {
                continue;
            };
            stack.push(left + 1);
            stack.push(left);
        }
    }

    /// Try to split one leaf. Returns its new left child on success.
    fn split(&mut self, node: usize) -> Option<usize> {
        let parent = self.nodes[node];
        let range = parent.leaf_range()?;
        let count = range.len();
        if count <= self.config.max_leaf_size.max(1) as usize {
            return None;
        }

        let plane = self.config.strategy.choose(
            self.primitives,
            &self.indices[range.clone()],
            &parent.aabb(),
            &mut self.scratch,
        )?;
        let left_count = partition(self.primitives, &mut self.indices[range.clone()], plane);
        if left_count == 0 || left_count == count {
            return None;
        }

        let left = self.nodes_used;
        self.nodes_used += 2;
        self.nodes[left] = Node::leaf(range.start, left_count);
        self.nodes[left + 1] = Node::leaf(range.start + left_count, count - left_count);
        self.nodes[node].make_internal(left);
        self.update_bounds(left);
        self.update_bounds(left + 1);
        Some(left)
    }
}

/// Bounds of the primitives named by `ids`.
pub(crate) fn leaf_bounds<P: Bounded>(primitives: &[P], ids: &[u32]) -> Aabb3 {
    let mut bounds = Aabb3::EMPTY;
    for &id in ids {
        bounds.grow(&primitives[id as usize].aabb());
    }
    bounds
}

/// Move ids whose centroid lies below the plane to the front, in one pass.
///
/// Returns how many ended up in front. Order within either side is not preserved.
pub(crate) fn partition<P: Bounded>(primitives: &[P], ids: &mut [u32], plane: SplitPlane) -> usize {
    let mut i = 0;
    let mut end = ids.len();
    while i < end {
        let c = plane.axis.of(primitives[ids[i] as usize].centroid());
        if c < plane.position {
            i += 1;
        } else {
            end -= 1;
            ids.swap(i, end);
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Sphere;
    use crate::types::Axis;
    use glam::Vec3;

    fn store(n: usize) -> (Vec<Node>, Vec<u32>) {
        (vec![Node::empty(); node_capacity(n)], vec![0; n])
    }

    #[test]
    fn partition_moves_low_side_to_front() {
        let spheres: Vec<Sphere> = [3.0, -1.0, 2.0, -4.0, 0.5]
            .iter()
            .map(|&x| Sphere::new(Vec3::new(x, 0.0, 0.0), 0.1))
            .collect();
        let mut ids = [0, 1, 2, 3, 4];
        let plane = SplitPlane {
            axis: Axis::X,
            position: 1.0,
        };
        let left = partition(&spheres, &mut ids, plane);
        assert_eq!(left, 3);
        for &id in &ids[..left] {
            assert!(spheres[id as usize].center.x < 1.0, "front holds low side");
        }
        for &id in &ids[left..] {
            assert!(spheres[id as usize].center.x >= 1.0, "back holds high side");
        }
    }

    #[test]
    fn empty_input_uses_no_nodes() {
        let spheres: Vec<Sphere> = Vec::new();
        let (mut nodes, mut ids) = store(0);
        assert_eq!(build(&spheres, &mut nodes, &mut ids, BuildConfig::default()), 0);
    }

    #[test]
    fn single_primitive_is_root_leaf() {
        let spheres = [Sphere::new(Vec3::new(1.0, 2.0, 3.0), 1.0)];
        let (mut nodes, mut ids) = store(1);
        let used = build(&spheres, &mut nodes, &mut ids, BuildConfig::default());
        assert_eq!(used, 1);
        assert_eq!(nodes[0].leaf_range(), Some(0..1));
        assert_eq!(nodes[0].aabb(), spheres[0].aabb());
    }

    #[test]
    fn coincident_centers_abort_to_one_leaf() {
        let spheres: Vec<Sphere> = (1..=8)
            .map(|i| Sphere::new(Vec3::splat(2.0), i as f32 * 0.25))
            .collect();
        let (mut nodes, mut ids) = store(spheres.len());
        let used = build(&spheres, &mut nodes, &mut ids, BuildConfig::default());
        assert_eq!(used, 1, "no plane separates coincident centers");
        assert_eq!(nodes[0].primitive_count, 8);
        assert_eq!(nodes[0].aabb(), spheres[7].aabb());
    }

    #[test]
    fn children_follow_parents_and_pair_up() {
        let spheres: Vec<Sphere> = (0..32)
            .map(|i| Sphere::new(Vec3::new(i as f32 * 3.0, (i % 5) as f32, 0.0), 1.0))
            .collect();
        let (mut nodes, mut ids) = store(spheres.len());
        let used = build(&spheres, &mut nodes, &mut ids, BuildConfig::default()) as usize;
        assert_eq!(used, 2 * spheres.len() - 1, "distinct centers split down to singletons");
        for (i, node) in nodes[..used].iter().enumerate() {
            if let Some(left) = node.left_child() {
                assert!(left > i, "child {left} must come after parent {i}");
                assert!(left + 1 < used, "right child in range");
            }
        }
    }

    #[test]
    fn leaf_size_cap_stops_early() {
        let spheres: Vec<Sphere> = (0..16)
            .map(|i| Sphere::new(Vec3::new(i as f32 * 3.0, 0.0, 0.0), 1.0))
            .collect();
        let (mut nodes, mut ids) = store(spheres.len());
        let config = BuildConfig::default().with_max_leaf_size(4);
        let used = build(&spheres, &mut nodes, &mut ids, config) as usize;
        for node in &nodes[..used] {
            if node.is_leaf() {
                assert!(node.primitive_count <= 4, "leaf exceeds cap");
            }
        }
        assert!(used < 2 * spheres.len() - 1);
    }

    #[test]
    #[should_panic(expected = "node store needs")]
    fn undersized_store_is_rejected() {
        let spheres = [Sphere::new(Vec3::ZERO, 1.0), Sphere::new(Vec3::X * 4.0, 1.0)];
        let mut nodes = vec![Node::empty(); 2];
        let mut ids = vec![0; 2];
        build(&spheres, &mut nodes, &mut ids, BuildConfig::default());
    }
}
