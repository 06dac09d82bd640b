// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owning [`Bvh`] aggregate and its diagnostics.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::build::{self, BuildConfig, node_capacity};
use crate::node::Node;
use crate::primitive::Bounded;
use crate::refit;

/// Node store, primitive index permutation, and live node count for one primitive set.
///
/// Sized once for a primitive count. [`Bvh::build`] rewrites everything;
/// [`Bvh::refit`] rewrites bounds only.
#[derive(Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
    indices: Vec<u32>,
    nodes_used: u32,
    config: BuildConfig,
}

impl Bvh {
    /// Allocate storage for `primitive_count` primitives. The tree is empty until built.
    pub fn with_capacity(primitive_count: usize, config: BuildConfig) -> Self {
        Self {
            nodes: vec![Node::empty(); node_capacity(primitive_count)],
            indices: vec![0; primitive_count],
            nodes_used: 0,
            config,
        }
    }

    /// Allocate for `primitives` and build over them.
    pub fn new<P: Bounded>(primitives: &[P], config: BuildConfig) -> Self {
        let mut bvh = Self::with_capacity(primitives.len(), config);
        bvh.build(primitives);
        bvh
    }

    /// Rebuild the whole tree from the current primitive positions.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "sphere_bvh::build"))]
    pub fn build<P: Bounded>(&mut self, primitives: &[P]) {
        self.nodes_used = build::build(primitives, &mut self.nodes, &mut self.indices, self.config);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            primitives = primitives.len(),
            nodes_used = self.nodes_used,
            leaves = self.nodes().iter().filter(|n| n.is_leaf()).count(),
            "built hierarchy"
        );
    }

    /// Refresh bounds from the current primitive positions, keeping topology.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "sphere_bvh::refit"))]
    pub fn refit<P: Bounded>(&mut self, primitives: &[P]) {
        refit::refit(primitives, &mut self.nodes, &self.indices, self.nodes_used);
    }

    /// Build settings used by [`Bvh::build`].
    pub fn config(&self) -> BuildConfig {
        self.config
    }

    /// Number of primitives this store was sized for.
    pub fn primitive_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of live nodes at the front of the node store.
    pub fn nodes_used(&self) -> u32 {
        self.nodes_used
    }

    /// Live nodes; the root is at index 0.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes[..self.nodes_used as usize]
    }

    /// Primitive index permutation referenced by leaf ranges.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Root node, if anything has been built.
    pub fn root(&self) -> Option<&Node> {
        self.nodes().first()
    }

    /// Live nodes as bytes, ready for a storage buffer upload.
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.nodes())
    }

    /// Index permutation as bytes, ready for a storage buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Primitive ids owned by the leaf at `node`, or an empty slice for internal nodes.
    pub fn leaf_primitives(&self, node: usize) -> &[u32] {
        match self.nodes().get(node).and_then(Node::leaf_range) {
            Some(range) => &self.indices[range],
            None => &[],
        }
    }

    /// Shape and cost summary of the live tree.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            nodes_used: self.nodes_used,
            ..BvhStats::default()
        };
        if self.nodes_used == 0 {
            return stats;
        }
        let root_area = self.nodes[0].aabb().surface_area();
        let mut stack = vec![(0_usize, 1_u32)];
        while let Some((i, depth)) = stack.pop() {
            let node = &self.nodes[i];
            stats.max_depth = stats.max_depth.max(depth);
            match node.left_child() {
                Some(left) => {
                    stats.internal_count += 1;
                    stack.push((left + 1, depth + 1));
                    stack.push((left, depth + 1));
                }
                None => {
                    stats.leaf_count += 1;
                    stats.max_leaf_size = stats.max_leaf_size.max(node.primitive_count);
                    stats.leaf_cost += node.cost();
                }
            }
        }
        if root_area > 0.0 {
            stats.sah_cost = stats.leaf_cost / root_area;
        }
        stats
    }

    /// Check every structural invariant against `primitives`.
    ///
    /// Verifies that live nodes are either leaves with in-bounds ranges or
    /// internal nodes with in-bounds children, that leaf ranges partition the
    /// index array, that the index array is a permutation, that every box
    /// contains its children's boxes, and that every leaf contains its primitives.
    /// Runs in time and memory linear in the tree size.
    pub fn validate<P: Bounded>(&self, primitives: &[P]) -> Result<(), TreeError> {
        let n = self.indices.len();
        if primitives.len() != n {
            return Err(TreeError::PrimitiveCountMismatch {
                expected: n,
                actual: primitives.len(),
            });
        }
        let used = self.nodes_used as usize;
        if used == 0 {
            return if n == 0 { Ok(()) } else { Err(TreeError::Unbuilt) };
        }

        let mut seen = vec![false; n];
        for &id in &self.indices {
            let slot = seen
                .get_mut(id as usize)
                .ok_or(TreeError::IndexOutOfRange { index: id })?;
            if *slot {
                return Err(TreeError::DuplicateIndex { index: id });
            }
            *slot = true;
        }

        let mut covered = vec![false; n];
        let mut reached = vec![false; used];
        // Each box must hold its children's boxes, and each leaf its primitives;
        // containment of everything below a node follows transitively.
        let mut stack: Vec<(usize, Option<usize>)> = vec![(0, None)];
        while let Some((i, parent)) = stack.pop() {
            if reached[i] {
                return Err(TreeError::NodeShared { node: i });
            }
            reached[i] = true;
            let node = &self.nodes[i];
            let bounds = node.aabb();
            if bounds.is_empty() {
                return Err(TreeError::InvertedBounds { node: i });
            }
            if let Some(p) = parent {
                if !self.nodes[p].aabb().contains_aabb(&bounds) {
                    return Err(TreeError::ChildNotContained { node: i, parent: p });
                }
            }
            if !node.is_leaf() {
                match node.left_child() {
                    Some(left) if left + 1 < used => {
                        stack.push((left + 1, Some(i)));
                        stack.push((left, Some(i)));
                    }
                    _ => return Err(TreeError::ChildOutOfRange { node: i }),
                }
                continue;
            }
            let range = match node.leaf_range() {
                Some(range) if range.end <= n => range,
                _ => return Err(TreeError::LeafOutOfRange { node: i }),
            };
            for pos in range {
                if covered[pos] {
                    return Err(TreeError::OverlappingLeaves { offset: pos });
                }
                covered[pos] = true;
                let id = self.indices[pos];
                if !bounds.contains_aabb(&primitives[id as usize].aabb()) {
                    return Err(TreeError::NotContained {
                        node: i,
                        primitive: id,
                    });
                }
            }
        }
        if let Some(offset) = covered.iter().position(|c| !c) {
            return Err(TreeError::UncoveredIndex { offset });
        }
        Ok(())
    }
}

impl Debug for Bvh {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bvh")
            .field("primitives", &self.indices.len())
            .field("capacity", &self.nodes.len())
            .field("nodes_used", &self.nodes_used)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shape and cost summary returned by [`Bvh::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BvhStats {
    /// Live node count.
    pub nodes_used: u32,
    /// Nodes with children.
    pub internal_count: u32,
    /// Nodes owning primitives.
    pub leaf_count: u32,
    /// Longest root-to-leaf path, counting the root as depth 1.
    pub max_depth: u32,
    /// Most primitives in a single leaf.
    pub max_leaf_size: u32,
    /// Sum of `primitive_count * surface_area` over all leaves.
    pub leaf_cost: f32,
    /// `leaf_cost` normalized by the root's surface area; comparable across scenes.
    pub sah_cost: f32,
}

/// A violated structural invariant, reported by [`Bvh::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The primitive slice does not match the size the tree was built for.
    #[error("expected {expected} primitives, got {actual}")]
    PrimitiveCountMismatch {
        /// Size of the index array.
        expected: usize,
        /// Length of the primitive slice passed in.
        actual: usize,
    },
    /// Primitives exist but no tree has been built.
    #[error("tree has not been built")]
    Unbuilt,
    /// The index array names a primitive that does not exist.
    #[error("index array entry {index} is out of range")]
    IndexOutOfRange {
        /// The offending primitive id.
        index: u32,
    },
    /// The index array names a primitive twice.
    #[error("primitive {index} appears twice in the index array")]
    DuplicateIndex {
        /// The offending primitive id.
        index: u32,
    },
    /// An internal node's children fall outside the live node range.
    #[error("node {node} has children outside the live range")]
    ChildOutOfRange {
        /// The offending node.
        node: usize,
    },
    /// A node is reachable along two paths.
    #[error("node {node} is reachable from two parents")]
    NodeShared {
        /// The offending node.
        node: usize,
    },
    /// A leaf's span runs past the index array.
    #[error("leaf {node} spans past the index array")]
    LeafOutOfRange {
        /// The offending node.
        node: usize,
    },
    /// Two leaves claim the same index array offset.
    #[error("index array offset {offset} is owned by two leaves")]
    OverlappingLeaves {
        /// The doubly owned offset.
        offset: usize,
    },
    /// No leaf claims an index array offset.
    #[error("index array offset {offset} is owned by no leaf")]
    UncoveredIndex {
        /// The orphaned offset.
        offset: usize,
    },
    /// A node's min corner exceeds its max corner.
    #[error("node {node} has inverted bounds")]
    InvertedBounds {
        /// The offending node.
        node: usize,
    },
    /// A primitive pokes out of the leaf that owns it.
    #[error("primitive {primitive} is not contained in leaf {node}")]
    NotContained {
        /// The leaf whose box is too small.
        node: usize,
        /// The escaping primitive.
        primitive: u32,
    },
    /// A child's box pokes out of its parent's box.
    #[error("node {node} is not contained in its parent {parent}")]
    ChildNotContained {
        /// The escaping child.
        node: usize,
        /// The parent whose box is too small.
        parent: usize,
    },
}
