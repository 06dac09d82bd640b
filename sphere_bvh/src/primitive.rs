// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitives the hierarchy is built over.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::types::Aabb3;

/// Anything with a centroid and conservative axis-aligned bounds.
///
/// The builder partitions on [`Bounded::centroid`] and sizes nodes from
/// [`Bounded::aabb`]. Both must be cheap; they are called once per primitive
/// per visited node.
pub trait Bounded {
    /// Point used to classify the primitive against split planes.
    fn centroid(&self) -> Vec3;

    /// Bounds enclosing the whole primitive.
    fn aabb(&self) -> Aabb3;
}

/// A sphere as laid out in the GPU primitive buffer.
///
/// 32 bytes: `{x, y, z, radius, r, g, b, material}`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    /// Center in world space.
    pub center: Vec3,
    /// Radius; must be positive.
    pub radius: f32,
    /// Base color, carried for the shader and ignored by the hierarchy.
    pub color: Vec3,
    /// Material slot, carried for the shader and ignored by the hierarchy.
    pub material: u32,
}

impl Sphere {
    /// Create a sphere with a white color and material 0.
    pub fn new(center: Vec3, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "sphere radius must be positive");
        Self {
            center,
            radius,
            color: Vec3::ONE,
            material: 0,
        }
    }

    /// Set the shading payload.
    pub fn with_appearance(mut self, color: Vec3, material: u32) -> Self {
        self.color = color;
        self.material = material;
        self
    }
}

impl Bounded for Sphere {
    #[inline]
    fn centroid(&self) -> Vec3 {
        self.center
    }

    #[inline]
    fn aabb(&self) -> Aabb3 {
        Aabb3::from_sphere(self.center, self.radius)
    }
}

/// View a sphere slice as raw bytes for upload.
pub fn sphere_bytes(spheres: &[Sphere]) -> &[u8] {
    bytemuck::cast_slice(spheres)
}
