// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bottom-up bounds refresh over an existing topology.

use crate::build::leaf_bounds;
use crate::node::Node;
use crate::primitive::Bounded;
use crate::types::union_aabb;

/// Recompute the bounds of the first `nodes_used` nodes from current primitive positions.
///
/// Topology, `primitive_count`, `contents` and `indices` are left untouched.
/// Nodes are visited in reverse index order; the builder always places children
/// after their parent, so both children are current by the time a parent is
/// reached. Afterwards every box is the tight bound of its subtree.
///
/// # Panics
///
/// If `indices.len() != primitives.len()` or `nodes_used` exceeds the store.
pub fn refit<P: Bounded>(primitives: &[P], nodes: &mut [Node], indices: &[u32], nodes_used: u32) {
    assert_eq!(
        indices.len(),
        primitives.len(),
        "index array must match primitive count"
    );
    let used = nodes_used as usize;
    assert!(used <= nodes.len(), "nodes_used exceeds node store");

    for i in (0..used).rev() {
        let node = nodes[i];
        let bounds = match node.left_child() {
            None => {
                let range = node.leaf_range().unwrap_or(0..0);
                leaf_bounds(primitives, &indices[range])
            }
            Some(left) => {
                debug_assert!(left > i && left + 1 < used, "child index out of order");
                union_aabb(nodes[left].aabb(), nodes[left + 1].aabb())
            }
        };
        nodes[i].set_aabb(bounds);
    }
}
