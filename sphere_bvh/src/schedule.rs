// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Refit-or-rebuild policy for scenes that move every frame.
//!
//! Refitting costs one bounds computation per node but never fixes topology, so
//! boxes loosen as primitives drift. A full build restores quality at
//! `O(n log n)`. [`RebuildSchedule`] refits `interval` frames in a row and then
//! rebuilds once. Any interval of at least 1 is correct; it only trades average
//! frame cost against worst-case traversal cost.

use crate::build::BuildConfig;
use crate::bvh::Bvh;
use crate::primitive::Bounded;

/// What a frame did to the hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameUpdate {
    /// Bounds were refreshed; topology and indices are unchanged.
    Refit,
    /// The tree was rebuilt from scratch.
    Rebuild,
}

/// Frame counter deciding between refit and rebuild.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RebuildSchedule {
    interval: u32,
    frame: u32,
}

impl Default for RebuildSchedule {
    fn default() -> Self {
        Self::new(16)
    }
}

impl RebuildSchedule {
    /// Refit `interval` consecutive frames between rebuilds.
    ///
    /// # Panics
    ///
    /// If `interval` is 0.
    pub fn new(interval: u32) -> Self {
        assert!(interval >= 1, "rebuild interval must be at least 1");
        Self { interval, frame: 0 }
    }

    /// Refits between rebuilds.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Refits performed since the last rebuild.
    pub fn frames_since_rebuild(&self) -> u32 {
        self.frame
    }

    /// Decide this frame's update and advance the counter.
    pub fn advance(&mut self) -> FrameUpdate {
        if self.frame >= self.interval {
            self.frame = 0;
            FrameUpdate::Rebuild
        } else {
            self.frame += 1;
            FrameUpdate::Refit
        }
    }

    /// Restart the count, as after an out-of-band rebuild.
    pub fn reset(&mut self) {
        self.frame = 0;
    }
}

/// A [`Bvh`] kept current across frames by a [`RebuildSchedule`].
#[derive(Clone, Debug)]
pub struct DynamicBvh {
    bvh: Bvh,
    schedule: RebuildSchedule,
}

impl DynamicBvh {
    /// Build over `primitives` and start the schedule.
    pub fn new<P: Bounded>(
        primitives: &[P],
        config: BuildConfig,
        schedule: RebuildSchedule,
    ) -> Self {
        Self {
            bvh: Bvh::new(primitives, config),
            schedule,
        }
    }

    /// Bring the hierarchy up to date after this tick's motion has been integrated.
    pub fn advance_frame<P: Bounded>(&mut self, primitives: &[P]) -> FrameUpdate {
        let update = self.schedule.advance();
        match update {
            FrameUpdate::Refit => self.bvh.refit(primitives),
            FrameUpdate::Rebuild => self.bvh.build(primitives),
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            ?update,
            since_rebuild = self.schedule.frames_since_rebuild(),
            nodes_used = self.bvh.nodes_used(),
            "frame update"
        );
        update
    }

    /// Rebuild now and restart the schedule.
    pub fn rebuild<P: Bounded>(&mut self, primitives: &[P]) {
        self.bvh.build(primitives);
        self.schedule.reset();
    }

    /// The current hierarchy.
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// The schedule state.
    pub fn schedule(&self) -> &RebuildSchedule {
        &self.schedule
    }
}
