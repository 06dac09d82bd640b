// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat node records shared with the GPU traversal kernel.

use core::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::types::Aabb3;

/// One slot of the node store.
///
/// 32 bytes: `{min_x, min_y, min_z, primitive_count, max_x, max_y, max_z, contents}`.
///
/// A node with `primitive_count == 0` is internal and `contents` is the index of
/// its left child; the right child always sits at `contents + 1`. Otherwise the
/// node is a leaf and `contents` is the first offset into the primitive index
/// array, spanning `primitive_count` entries.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Node {
    /// Minimum corner of the node's bounds.
    pub min: Vec3,
    /// Number of primitives in a leaf, 0 for internal nodes.
    pub primitive_count: u32,
    /// Maximum corner of the node's bounds.
    pub max: Vec3,
    /// Left child index (internal) or first index-array offset (leaf).
    pub contents: i32,
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}

impl Node {
    /// An unused slot: empty bounds, no children, no primitives.
    pub const fn empty() -> Self {
        Self {
            min: Aabb3::EMPTY.min,
            primitive_count: 0,
            max: Aabb3::EMPTY.max,
            contents: -1,
        }
    }

    /// A leaf over `count` index-array entries starting at `first`, with empty bounds.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "Node offsets are 32-bit in the GPU layout; capacity is checked at build entry."
    )]
    pub(crate) const fn leaf(first: usize, count: usize) -> Self {
        Self {
            min: Aabb3::EMPTY.min,
            primitive_count: count as u32,
            max: Aabb3::EMPTY.max,
            contents: first as i32,
        }
    }

    /// Whether this node owns primitives directly.
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.primitive_count > 0
    }

    /// Left child index, if internal.
    ///
    /// Unused slots (see [`Node::empty`]) have no children.
    #[inline]
    pub fn left_child(&self) -> Option<usize> {
        if self.is_leaf() {
            return None;
        }
        usize::try_from(self.contents).ok()
    }

    /// Right child index, if internal.
    #[inline]
    pub fn right_child(&self) -> Option<usize> {
        self.left_child().map(|l| l + 1)
    }

    /// Index-array span owned by this node, if a leaf.
    #[inline]
    pub fn leaf_range(&self) -> Option<Range<usize>> {
        if !self.is_leaf() {
            return None;
        }
        let first = usize::try_from(self.contents).ok()?;
        Some(first..first + self.primitive_count as usize)
    }

    /// Bounds as an [`Aabb3`].
    #[inline]
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::new(self.min, self.max)
    }

    /// Overwrite the bounds, leaving `primitive_count` and `contents` alone.
    #[inline]
    pub fn set_aabb(&mut self, aabb: Aabb3) {
        self.min = aabb.min;
        self.max = aabb.max;
    }

    /// SAH cost `primitive_count * surface_area`. Zero for internal nodes.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.primitive_count as f32 * self.aabb().surface_area()
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "Node indices are 32-bit in the GPU layout; capacity is checked at build entry."
    )]
    pub(crate) fn make_internal(&mut self, left_child: usize) {
        self.primitive_count = 0;
        self.contents = left_child as i32;
    }
}
