//! Presentation layout: maps the point-based scroll model onto the
//! terminal row grid.
//!
//! The core works in points; the terminal paints rows. One wrapped line
//! spans `line_height = font_size + line_spacing` points and is allotted
//! `row_step = round(line_height / POINTS_PER_ROW)` whole rows (minimum
//! one), so a larger font both spreads lines further apart on screen and
//! stretches the content height the engine scrolls through. All
//! measurement feeding `GeometryTracker` comes from here.
//!
//! Screen mapping: a wrapped line `i` tops out at
//! `offset + i × line_height` points; dividing by `pts_per_row =
//! line_height / row_step` yields its terminal row. Because `row_step` is
//! whole, consecutive lines stay exactly `row_step` rows apart and the
//! block shifts rigidly as the offset animates.

use core_state::StyleSettings;
use core_text::wrap_text;
use std::ops::Range;

/// Points represented by one terminal row at the base font size.
pub const POINTS_PER_ROW: f64 = 16.0;

/// Horizontal padding (columns) on each side of the content.
pub const H_PADDING: u16 = 2;

/// One presentation layout pass: wrapped rows plus the point/row mapping
/// for the current style and terminal size.
#[derive(Debug, Clone)]
pub struct PresentLayout {
    pub lines: Vec<String>,
    /// Whole terminal rows allotted to one wrapped line.
    pub row_step: u16,
    /// Points spanned by one terminal row under this layout.
    pub pts_per_row: f64,
    /// Rows available to content (viewport rows minus chrome).
    pub text_rows: u16,
    pub cols: u16,
    /// Measured viewport height in points.
    pub viewport_height: f64,
    /// Measured content height in points.
    pub content_height: f64,
}

impl PresentLayout {
    pub fn compute(text: &str, style: &StyleSettings, cols: u16, text_rows: u16) -> Self {
        let wrap_cols = cols.saturating_sub(2 * H_PADDING).max(1) as usize;
        let lines = wrap_text(text, wrap_cols);
        let line_height = style.line_height();
        let row_step = (line_height / POINTS_PER_ROW).round().max(1.0) as u16;
        let pts_per_row = line_height / f64::from(row_step);
        Self {
            row_step,
            pts_per_row,
            text_rows,
            cols,
            viewport_height: f64::from(text_rows) * pts_per_row,
            content_height: lines.len() as f64 * line_height,
            lines,
        }
    }

    /// Rigid row shift of the whole content block at `offset`.
    fn shift(&self, offset: f64) -> i64 {
        (offset / self.pts_per_row).round() as i64
    }

    /// Terminal row (relative to the text area top) of wrapped line
    /// `index` at `offset`. May be negative or past the bottom.
    pub fn row_of_line(&self, index: usize, offset: f64) -> i64 {
        self.shift(offset) + index as i64 * i64::from(self.row_step)
    }

    /// Indices of the wrapped lines whose row lands inside the text area.
    pub fn visible_lines(&self, offset: f64) -> Range<usize> {
        if self.text_rows == 0 || self.lines.is_empty() {
            return 0..0;
        }
        let step = i64::from(self.row_step);
        let shift = self.shift(offset);
        let first = if shift >= 0 {
            0
        } else {
            (-shift + step - 1).div_euclid(step)
        };
        let last_excl = (i64::from(self.text_rows) - 1 - shift).div_euclid(step) + 1;
        let first = usize::try_from(first.max(0)).unwrap_or(0).min(self.lines.len());
        let last = usize::try_from(last_excl.max(0))
            .unwrap_or(0)
            .min(self.lines.len());
        first..last.max(first)
    }

    /// Row the reading marker sits on (vertical center of the text area).
    pub fn center_row(&self) -> u16 {
        self.text_rows / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font: f64, spacing: f64) -> StyleSettings {
        StyleSettings {
            font_size: font,
            line_spacing: spacing,
            ..StyleSettings::default()
        }
    }

    #[test]
    fn default_style_spans_four_rows_per_line() {
        // 48 + 8 = 56 points -> round(56/16) = 4 rows.
        let l = PresentLayout::compute("hello", &style(48.0, 8.0), 80, 40);
        assert_eq!(l.row_step, 4);
        assert_eq!(l.pts_per_row, 14.0);
        assert_eq!(l.viewport_height, 40.0 * 14.0);
        assert_eq!(l.content_height, 56.0);
    }

    #[test]
    fn tiny_font_still_gets_one_row() {
        let l = PresentLayout::compute("hello", &style(10.0, 0.0), 80, 40);
        assert_eq!(l.row_step, 1);
        assert_eq!(l.pts_per_row, 10.0);
    }

    #[test]
    fn content_height_scales_with_wrapped_lines() {
        let text = "word ".repeat(100);
        let narrow = PresentLayout::compute(&text, &style(48.0, 8.0), 30, 40);
        let wide = PresentLayout::compute(&text, &style(48.0, 8.0), 120, 40);
        assert!(narrow.lines.len() > wide.lines.len());
        assert!(narrow.content_height > wide.content_height);
    }

    #[test]
    fn font_growth_increases_content_height() {
        let text = "a\nb\nc";
        let small = PresentLayout::compute(text, &style(16.0, 8.0), 80, 40);
        let large = PresentLayout::compute(text, &style(48.0, 8.0), 80, 40);
        assert!(large.content_height > small.content_height);
    }

    #[test]
    fn top_aligned_offset_puts_first_line_at_center() {
        let l = PresentLayout::compute("a\nb\nc", &style(48.0, 8.0), 80, 40);
        let top = l.viewport_height / 2.0;
        assert_eq!(l.row_of_line(0, top), i64::from(l.center_row()));
    }

    #[test]
    fn lines_stay_row_step_apart() {
        let l = PresentLayout::compute("a\nb\nc\nd", &style(48.0, 8.0), 80, 40);
        let offset = -37.3;
        for i in 1..l.lines.len() {
            assert_eq!(
                l.row_of_line(i, offset) - l.row_of_line(i - 1, offset),
                i64::from(l.row_step)
            );
        }
    }

    #[test]
    fn visible_lines_excludes_offscreen_rows() {
        let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let l = PresentLayout::compute(&text, &style(16.0, 0.0), 80, 10);
        // row_step = 1; shift = -20 hides the first 20 lines.
        let visible = l.visible_lines(-20.0 * l.pts_per_row);
        assert_eq!(visible, 20..30);
        for i in visible {
            let row = l.row_of_line(i, -20.0 * l.pts_per_row);
            assert!((0..10).contains(&row));
        }
    }

    #[test]
    fn visible_lines_clamps_to_content() {
        let l = PresentLayout::compute("only", &style(16.0, 0.0), 80, 10);
        let all = l.visible_lines(0.0);
        assert_eq!(all, 0..1);
        assert_eq!(l.visible_lines(1.0e6), 0..0);
    }

    #[test]
    fn zero_rows_shows_nothing() {
        let l = PresentLayout::compute("text", &style(16.0, 0.0), 80, 0);
        assert_eq!(l.visible_lines(0.0), 0..0);
        assert_eq!(l.viewport_height, 0.0);
    }
}
