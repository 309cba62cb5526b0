//! Full-frame renderer for the edit and presentation views.
//!
//! Every frame repaints the whole surface: rows are padded to the
//! terminal width so no stale cells survive and no per-line clear
//! commands are needed. Commands are queued into the caller's buffered
//! writer and flushed once per frame.

use anyhow::Result;
use core_scroll::ScrollEngine;
use core_state::PrompterState;
use core_terminal::TerminalCapabilities;
use core_text::{display_width, grapheme, truncate_to_width};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use std::io::Write;

pub mod color;
pub mod layout;
pub mod status;

pub use color::parse_color;
pub use layout::{H_PADDING, POINTS_PER_ROW, PresentLayout};
pub use status::build_status;

/// Rows reserved below the text area.
pub const STATUS_ROWS: u16 = 1;

const FALLBACK_BG: Color = Color::Black;
const FALLBACK_FG: Color = Color::White;

pub struct RenderEngine {
    caps: TerminalCapabilities,
    /// First visible logical line of the edit view.
    edit_first_line: usize,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::with_capabilities(TerminalCapabilities::detect())
    }

    pub fn with_capabilities(caps: TerminalCapabilities) -> Self {
        Self {
            caps,
            edit_first_line: 0,
        }
    }

    pub fn capabilities(&self) -> &TerminalCapabilities {
        &self.caps
    }

    /// Paint the edit view: logical lines (unwrapped, width-truncated), a
    /// visible caret, and the status row.
    pub fn render_edit(
        &mut self,
        out: &mut impl Write,
        state: &PrompterState,
        engine: &ScrollEngine,
        cols: u16,
        rows: u16,
    ) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let text_rows = rows.saturating_sub(STATUS_ROWS) as usize;
        let text = state.text();
        let lines: Vec<&str> = text.split('\n').collect();
        let (caret_line, caret_col) = caret_position(text, state.cursor);
        self.follow_caret(caret_line, text_rows);

        queue!(out, Hide, ResetColor)?;
        for row in 0..text_rows {
            let line = lines.get(self.edit_first_line + row).copied().unwrap_or("");
            let shown = truncate_to_width(line, cols as usize);
            queue!(out, MoveTo(0, row as u16), Print(shown))?;
            pad_row(out, display_width(shown), cols)?;
        }
        draw_status(out, state, engine, cols, rows)?;

        // Caret: place the hardware cursor when it is inside the visible
        // area; otherwise leave it hidden.
        if caret_line >= self.edit_first_line && caret_line < self.edit_first_line + text_rows {
            let row = (caret_line - self.edit_first_line) as u16;
            let col = (caret_col as u16).min(cols.saturating_sub(1));
            queue!(out, MoveTo(col, row), Show)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Paint the presentation view: wrapped content positioned by the
    /// scroll offset, a reading marker on the center row, and the status
    /// row.
    pub fn render_present(
        &mut self,
        out: &mut impl Write,
        state: &PrompterState,
        engine: &ScrollEngine,
        layout: &PresentLayout,
        cols: u16,
        rows: u16,
    ) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let bg = parse_color(&state.style.background, &self.caps).unwrap_or(FALLBACK_BG);
        let fg = parse_color(&state.style.foreground, &self.caps).unwrap_or(FALLBACK_FG);
        let offset = engine.offset();

        queue!(out, Hide, SetBackgroundColor(bg), SetForegroundColor(fg))?;
        let mut painted = vec![false; layout.text_rows as usize];
        for index in layout.visible_lines(offset) {
            let row = layout.row_of_line(index, offset);
            let Ok(row) = u16::try_from(row) else {
                continue;
            };
            if row >= layout.text_rows {
                continue;
            }
            let line = &layout.lines[index];
            let width = display_width(line);
            let pad = (cols as usize).saturating_sub(width) / 2;
            queue!(out, MoveTo(0, row))?;
            pad_cells(out, pad)?;
            queue!(out, Print(line))?;
            pad_row(out, pad + width, cols)?;
            painted[row as usize] = true;
        }
        for (row, done) in painted.iter().enumerate() {
            if !done {
                queue!(out, MoveTo(0, row as u16))?;
                pad_row(out, 0, cols)?;
            }
        }
        // Reading marker on the center row.
        if layout.text_rows > 0 {
            queue!(out, MoveTo(0, layout.center_row()), Print(">"))?;
        }
        queue!(out, ResetColor)?;
        draw_status(out, state, engine, cols, rows)?;
        out.flush()?;
        Ok(())
    }

    fn follow_caret(&mut self, caret_line: usize, text_rows: usize) {
        if text_rows == 0 {
            return;
        }
        if caret_line < self.edit_first_line {
            self.edit_first_line = caret_line;
        } else if caret_line >= self.edit_first_line + text_rows {
            self.edit_first_line = caret_line + 1 - text_rows;
        }
    }

    /// First visible edit line (exposed for tests).
    pub fn edit_first_line(&self) -> usize {
        self.edit_first_line
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_status(
    out: &mut impl Write,
    state: &PrompterState,
    engine: &ScrollEngine,
    cols: u16,
    rows: u16,
) -> Result<()> {
    if rows < 1 {
        return Ok(());
    }
    let line = build_status(state, engine, cols);
    queue!(out, MoveTo(0, rows - 1), Print(line))?;
    Ok(())
}

fn pad_row(out: &mut impl Write, used_cols: usize, cols: u16) -> Result<()> {
    pad_cells(out, (cols as usize).saturating_sub(used_cols))
}

fn pad_cells(out: &mut impl Write, n: usize) -> Result<()> {
    for _ in 0..n {
        queue!(out, Print(" "))?;
    }
    Ok(())
}

/// Logical line index and visual column of the caret.
fn caret_position(text: &str, cursor: usize) -> (usize, usize) {
    let before = &text[..cursor];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = grapheme::visual_col(&text[line_start..], cursor - line_start);
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::StyleSettings;

    #[test]
    fn caret_position_tracks_lines_and_columns() {
        let text = "ab\ncdef";
        assert_eq!(caret_position(text, 0), (0, 0));
        assert_eq!(caret_position(text, 2), (0, 2));
        assert_eq!(caret_position(text, 3), (1, 0));
        assert_eq!(caret_position(text, 7), (1, 4));
    }

    #[test]
    fn follow_caret_scrolls_down_and_up() {
        let mut r = RenderEngine::with_capabilities(TerminalCapabilities::with_truecolor(true));
        r.follow_caret(0, 10);
        assert_eq!(r.edit_first_line(), 0);
        r.follow_caret(12, 10);
        assert_eq!(r.edit_first_line(), 3);
        r.follow_caret(1, 10);
        assert_eq!(r.edit_first_line(), 1);
    }

    #[test]
    fn edit_frame_renders_into_buffer() {
        let mut r = RenderEngine::with_capabilities(TerminalCapabilities::with_truecolor(true));
        let mut state = PrompterState::new("hello\nworld");
        state.cursor = 3;
        let mut buf = Vec::new();
        r.render_edit(&mut buf, &state, &ScrollEngine::default(), 40, 10)
            .unwrap();
        let frame = String::from_utf8_lossy(&buf);
        assert!(frame.contains("hello"));
        assert!(frame.contains("world"));
        assert!(frame.contains("EDIT"));
    }

    #[test]
    fn present_frame_contains_visible_text_and_marker() {
        let mut r = RenderEngine::with_capabilities(TerminalCapabilities::with_truecolor(true));
        let mut state = PrompterState::new("first line\nsecond line");
        state.mode = core_state::Mode::Present;
        let mut engine = ScrollEngine::default();
        let layout = PresentLayout::compute(state.text(), &StyleSettings::default(), 60, 19);
        engine.set_bounds(core_geometry::GeometryBounds::from_measures(
            layout.viewport_height,
            layout.content_height,
        ));
        engine.seek_to_top();
        let mut buf = Vec::new();
        r.render_present(&mut buf, &state, &engine, &layout, 60, 20)
            .unwrap();
        let frame = String::from_utf8_lossy(&buf);
        assert!(frame.contains("first line"));
        assert!(frame.contains(">"));
    }

    #[test]
    fn zero_sized_terminal_is_a_noop() {
        let mut r = RenderEngine::with_capabilities(TerminalCapabilities::with_truecolor(true));
        let state = PrompterState::new("x");
        let mut buf = Vec::new();
        r.render_edit(&mut buf, &state, &ScrollEngine::default(), 0, 0)
            .unwrap();
        assert!(buf.is_empty());
    }
}
