//! Scroll engine: owns the offset and playback state, advances on ticks.
//!
//! The engine is deterministic: `advance` is a pure function of
//! `(offset, speed, dt, bounds)` and never reads a clock. Elapsed time is
//! measured by the tick scheduler and handed in; geometry is installed via
//! `set_bounds` by the single owner that serializes ticks and measurement
//! updates. Every mutation re-clamps, so `min_offset <= offset <=
//! max_offset` holds after any public call.

use core_geometry::GeometryBounds;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Slowest configurable scroll speed (points per second).
pub const SPEED_MIN: f64 = 10.0;
/// Fastest configurable scroll speed (points per second).
pub const SPEED_MAX: f64 = 100.0;
/// Default scroll speed (points per second).
pub const SPEED_DEFAULT: f64 = 50.0;
/// Manual back/forward skip distance in points.
pub const JUMP_STEP: f64 = 60.0;

/// Playback state read by the presentation surface each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    /// Vertical displacement in points; negative means scrolled upward.
    pub offset: f64,
    pub is_playing: bool,
    /// Points per second.
    pub speed: f64,
    /// Instant the last tick was applied (diagnostic only; never read by
    /// `advance`).
    pub last_tick: Option<Instant>,
}

/// Owns `ScrollState` and applies the clamp invariant on every mutation.
#[derive(Debug)]
pub struct ScrollEngine {
    state: ScrollState,
    bounds: GeometryBounds,
}

impl ScrollEngine {
    pub fn new(speed: f64) -> Self {
        let bounds = GeometryBounds::default();
        Self {
            state: ScrollState {
                offset: bounds.max_offset,
                is_playing: false,
                speed,
                last_tick: None,
            },
            bounds,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn bounds(&self) -> GeometryBounds {
        self.bounds
    }

    /// Advance the offset by `speed × dt` (downward content motion) and
    /// clamp. No-op while paused; a zero `dt` leaves the offset untouched.
    pub fn advance(&mut self, dt: Duration) {
        if !self.state.is_playing {
            return;
        }
        let next = self.state.offset - self.state.speed * dt.as_secs_f64();
        self.state.offset = self.bounds.clamp(next);
        trace!(
            target: "scroll.engine",
            offset = self.state.offset,
            dt_us = dt.as_micros() as u64,
            "advance"
        );
    }

    /// Record when a tick was applied. Kept out of `advance` so the math
    /// stays clock-free.
    pub fn note_tick(&mut self, at: Instant) {
        self.state.last_tick = Some(at);
    }

    /// Resume playback. Never mutates the offset: resuming continues from
    /// the paused position.
    pub fn play(&mut self) {
        if !self.state.is_playing {
            debug!(target: "scroll.engine", offset = self.state.offset, "play");
        }
        self.state.is_playing = true;
    }

    /// Pause playback. Never mutates the offset.
    pub fn pause(&mut self) {
        if self.state.is_playing {
            debug!(target: "scroll.engine", offset = self.state.offset, "pause");
        }
        self.state.is_playing = false;
    }

    /// Flip playback state; returns the new `is_playing`.
    pub fn toggle(&mut self) -> bool {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
        self.state.is_playing
    }

    /// Manual skip: add `delta` points (positive rewinds toward the top),
    /// then clamp. Allowed while playing or paused.
    pub fn jump(&mut self, delta: f64) {
        self.state.offset = self.bounds.clamp(self.state.offset + delta);
        debug!(target: "scroll.engine", delta, offset = self.state.offset, "jump");
    }

    /// Reset to the top-aligned position (`max_offset`).
    pub fn seek_to_top(&mut self) {
        self.state.offset = self.bounds.max_offset;
        debug!(target: "scroll.engine", offset = self.state.offset, "seek_to_top");
    }

    /// Update the speed. Non-finite or negative values are rejected and the
    /// current speed kept.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() || speed < 0.0 {
            warn!(target: "scroll.engine", speed, "invalid_speed_rejected");
            return;
        }
        self.state.speed = speed;
    }

    /// Install new bounds and re-clamp the current offset into them. The
    /// caller decides separately whether a geometry change warrants a
    /// `seek_to_top`.
    pub fn set_bounds(&mut self, bounds: GeometryBounds) {
        self.bounds = bounds;
        self.state.offset = bounds.clamp(self.state.offset);
    }
}

impl Default for ScrollEngine {
    fn default() -> Self {
        Self::new(SPEED_DEFAULT)
    }
}
