// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear motion for sphere scenes.
//!
//! Integration must finish before the hierarchy is refit or rebuilt for the frame.

use glam::Vec3;

use crate::primitive::Sphere;
use crate::types::{Aabb3, Axis};

/// Advance every center by `velocity * dt`.
///
/// # Panics
///
/// If `spheres` and `velocities` differ in length.
pub fn integrate(spheres: &mut [Sphere], velocities: &[Vec3], dt: f32) {
    assert_eq!(spheres.len(), velocities.len(), "one velocity per sphere");
    for (s, v) in spheres.iter_mut().zip(velocities) {
        s.center += *v * dt;
    }
}

/// Like [`integrate`], but keep every sphere inside `arena`.
///
/// A sphere whose bounds cross a wall is pushed back to touch it and its
/// velocity on that axis is reversed. Spheres wider than the arena are
/// centered on that axis.
///
/// # Panics
///
/// If `spheres` and `velocities` differ in length.
pub fn integrate_within(spheres: &mut [Sphere], velocities: &mut [Vec3], dt: f32, arena: Aabb3) {
    integrate(spheres, velocities, dt);
    let mid = arena.center();
    for (s, v) in spheres.iter_mut().zip(velocities.iter_mut()) {
        for axis in Axis::ALL {
            let i = axis.index();
            let lo = arena.min[i] + s.radius;
            let hi = arena.max[i] - s.radius;
            if lo > hi {
                s.center[i] = mid[i];
                continue;
            }
            if s.center[i] < lo {
                s.center[i] = lo;
                if v[i] < 0.0 {
                    v[i] = -v[i];
                }
            } else if s.center[i] > hi {
                s.center[i] = hi;
                if v[i] > 0.0 {
                    v[i] = -v[i];
                }
            }
        }
    }
}
