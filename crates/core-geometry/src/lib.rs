//! Scroll geometry: measured heights and the clamp bounds they imply.
//!
//! The presentation surface reports two measures after each layout pass:
//! the viewport height and the rendered content height, both in points.
//! From those this crate derives the offset bounds
//! `[-(content - viewport/2), viewport/2]`: the first line starts at the
//! vertical center and the last line scrolls no further than the center.
//!
//! Invariants (hold after every public call):
//! * Stored measures are finite and non-negative (invalid inputs are
//!   sanitized to zero and logged, never propagated).
//! * `clamp` is total: a degenerate range (`min > max`) collapses to the
//!   single point `max`.
//! * Content no taller than the viewport never scrolls; its bounds pin to
//!   `max_offset`.

use tracing::{trace, warn};

/// Clamp `value` into `[min, max]`. Degenerate ranges (`min > max`) resolve
/// to `max`; the tie-break is part of the public contract and is relied on
/// by the scroll engine for short content.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if min > max {
        return max;
    }
    value.max(min).min(max)
}

/// Offset bounds derived from one (viewport, content) measurement pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryBounds {
    pub viewport_height: f64,
    pub content_height: f64,
    pub min_offset: f64,
    pub max_offset: f64,
}

impl GeometryBounds {
    /// Derive bounds from raw measures. Pure apart from the sanitization
    /// log on invalid input.
    pub fn from_measures(viewport_height: f64, content_height: f64) -> Self {
        let viewport_height = sanitize(viewport_height, "viewport_height");
        let content_height = sanitize(content_height, "content_height");
        let max_offset = viewport_height / 2.0;
        // Short content is pinned at the top: collapse the range so the
        // clamp tie-break yields `max_offset` for every input.
        let min_offset = if content_height <= viewport_height {
            max_offset
        } else {
            -(content_height - viewport_height / 2.0)
        };
        Self {
            viewport_height,
            content_height,
            min_offset,
            max_offset,
        }
    }

    /// Clamp `value` into these bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        clamp(value, self.min_offset, self.max_offset)
    }

    /// True when the range has collapsed to the single point `max_offset`.
    pub fn is_pinned(&self) -> bool {
        self.min_offset >= self.max_offset
    }
}

impl Default for GeometryBounds {
    fn default() -> Self {
        Self::from_measures(0.0, 0.0)
    }
}

fn sanitize(value: f64, what: &'static str) -> f64 {
    if !value.is_finite() || value < 0.0 {
        warn!(
            target: "scroll.geometry",
            value,
            measure = what,
            "invalid_measure_sanitized"
        );
        return 0.0;
    }
    value
}

/// Result of feeding a measurement pair to the tracker: the new bounds plus
/// which dimension actually changed, so the owner can apply its
/// reset-versus-reclamp policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryUpdate {
    pub bounds: GeometryBounds,
    pub viewport_changed: bool,
    pub content_changed: bool,
}

impl GeometryUpdate {
    pub fn changed(&self) -> bool {
        self.viewport_changed || self.content_changed
    }
}

/// Holds the last-measured geometry and recomputes bounds when either
/// measure changes.
#[derive(Debug, Default)]
pub struct GeometryTracker {
    bounds: GeometryBounds,
}

impl GeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new measurement pair, returning the derived bounds and
    /// change flags. Comparison happens on sanitized values so a repeated
    /// invalid measure does not register as a change.
    pub fn update(&mut self, viewport_height: f64, content_height: f64) -> GeometryUpdate {
        let bounds = GeometryBounds::from_measures(viewport_height, content_height);
        let viewport_changed = bounds.viewport_height != self.bounds.viewport_height;
        let content_changed = bounds.content_height != self.bounds.content_height;
        if viewport_changed || content_changed {
            trace!(
                target: "scroll.geometry",
                viewport = bounds.viewport_height,
                content = bounds.content_height,
                min = bounds.min_offset,
                max = bounds.max_offset,
                "bounds_recomputed"
            );
        }
        self.bounds = bounds;
        GeometryUpdate {
            bounds,
            viewport_changed,
            content_changed,
        }
    }

    pub fn bounds(&self) -> GeometryBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_for_tall_content() {
        let b = GeometryBounds::from_measures(200.0, 400.0);
        assert_eq!(b.min_offset, -300.0);
        assert_eq!(b.max_offset, 100.0);
        assert!(!b.is_pinned());
    }

    #[test]
    fn seeded_offset_clamps_to_min() {
        let b = GeometryBounds::from_measures(200.0, 400.0);
        assert_eq!(b.clamp(-1000.0), -300.0);
    }

    #[test]
    fn short_content_pins_to_max_for_any_input() {
        let b = GeometryBounds::from_measures(300.0, 100.0);
        assert_eq!(b.max_offset, 150.0);
        assert!(b.is_pinned());
        for seed in [-1e9, -50.0, 0.0, 149.9, 150.0, 151.0, 1e9] {
            assert_eq!(b.clamp(seed), 150.0, "seed {seed} must pin to max");
        }
    }

    #[test]
    fn content_equal_to_viewport_is_pinned() {
        let b = GeometryBounds::from_measures(200.0, 200.0);
        assert!(b.is_pinned());
        assert_eq!(b.clamp(-500.0), 100.0);
    }

    #[test]
    fn clamp_tie_break_is_max() {
        assert_eq!(clamp(3.0, 5.0, 1.0), 1.0);
        assert_eq!(clamp(-10.0, 5.0, 1.0), 1.0);
    }

    #[test]
    fn invalid_measures_sanitize_to_zero() {
        let b = GeometryBounds::from_measures(f64::NAN, -42.0);
        assert_eq!(b.viewport_height, 0.0);
        assert_eq!(b.content_height, 0.0);
        assert_eq!(b.clamp(123.0), 0.0);
    }

    #[test]
    fn infinite_content_sanitizes() {
        let b = GeometryBounds::from_measures(100.0, f64::INFINITY);
        assert_eq!(b.content_height, 0.0);
        assert!(b.is_pinned());
    }

    #[test]
    fn tracker_reports_what_changed() {
        let mut t = GeometryTracker::new();
        let first = t.update(200.0, 400.0);
        assert!(first.viewport_changed && first.content_changed);

        let same = t.update(200.0, 400.0);
        assert!(!same.changed());

        let content_only = t.update(200.0, 500.0);
        assert!(content_only.content_changed);
        assert!(!content_only.viewport_changed);

        let viewport_only = t.update(180.0, 500.0);
        assert!(viewport_only.viewport_changed);
        assert!(!viewport_only.content_changed);
    }

    #[test]
    fn repeated_invalid_measure_is_not_a_change() {
        let mut t = GeometryTracker::new();
        t.update(f64::NAN, -1.0);
        let second = t.update(f64::NAN, -1.0);
        assert!(!second.changed());
    }
}
