// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use glam::Vec3;

/// Coordinate axis, ordered so that ties resolve toward `X`, then `Y`, then `Z`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    X = 0,
    /// The y axis.
    Y = 1,
    /// The z axis.
    Z = 2,
}

impl Axis {
    /// All axes in tie-break order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis (0, 1 or 2).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The component of `v` along this axis.
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        v[self.index()]
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb3 {
    /// The inverted box: growing it by anything yields that thing's bounds.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a new AABB from min/max corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds of a sphere.
    #[inline]
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius);
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Return true if the box is inverted on any axis (contains nothing). Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Expand to include `p`.
    #[inline]
    pub fn grow_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand to include `other`.
    #[inline]
    pub fn grow(&mut self, other: &Self) {
        self.grow_point(other.min);
        self.grow_point(other.max);
    }

    /// Size along each axis. Negative for empty boxes.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Axis of largest extent. Ties prefer `X`, then `Y`, then `Z`.
    pub fn largest_axis(&self) -> Axis {
        let e = self.extent();
        let mut best = Axis::X;
        if e.y > best.of(e) {
            best = Axis::Y;
        }
        if e.z > best.of(e) {
            best = Axis::Z;
        }
        best
    }

    /// Surface area `2 * (ex*ey + ey*ez + ex*ez)`; zero for empty boxes.
    #[inline]
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.x * e.z)
    }

    /// Whether `other` lies entirely inside this box (boundaries inclusive).
    #[inline]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }
}

pub(crate) fn union_aabb(a: Aabb3, b: Aabb3) -> Aabb3 {
    Aabb3 {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grows_to_exact_bounds() {
        let mut b = Aabb3::EMPTY;
        assert!(b.is_empty());
        b.grow(&Aabb3::from_sphere(Vec3::new(1.0, 2.0, 3.0), 0.5));
        assert_eq!(b, Aabb3::new(Vec3::new(0.5, 1.5, 2.5), Vec3::new(1.5, 2.5, 3.5)));
        b.grow_point(Vec3::new(-1.0, 2.0, 3.0));
        assert_eq!(b.min.x, -1.0);
        assert!(!b.is_empty());
    }

    #[test]
    fn largest_axis_breaks_ties_toward_x_then_y() {
        let cube = Aabb3::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.largest_axis(), Axis::X);
        let yz = Aabb3::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(yz.largest_axis(), Axis::Y);
        let z = Aabb3::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(z.largest_axis(), Axis::Z);
    }

    #[test]
    fn surface_area_of_box_and_empty() {
        let b = Aabb3::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.surface_area(), 22.0);
        assert_eq!(Aabb3::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn containment_is_inclusive() {
        let outer = Aabb3::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(outer.contains_aabb(&outer));
        assert!(outer.contains_aabb(&Aabb3::from_sphere(Vec3::ZERO, 0.5)));
        assert!(!outer.contains_aabb(&Aabb3::from_sphere(Vec3::X, 0.5)));
        let u = union_aabb(outer, Aabb3::from_sphere(Vec3::X * 3.0, 1.0));
        assert_eq!(u.max, Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(u.center(), Vec3::new(1.5, 0.0, 0.0));
    }
}
