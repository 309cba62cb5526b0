//! Prompter session state: mode, style settings, file metadata, ephemeral
//! status, and the undo history that owns the prompt text.
//!
//! The state is mutated only from the runtime event loop; there is no
//! interior locking because there is exactly one writer. Edit operations
//! are grapheme-aware (cursor motion never lands inside a cluster) and
//! every text mutation flows through `UndoHistory::record`.

use core_text::grapheme;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::trace;

pub mod history;
pub use history::{HISTORY_MAX, HistoryError, UndoHistory};

/// Font size step applied by the grow/shrink controls (points).
pub const FONT_STEP: f64 = 4.0;
/// Smallest permitted font size (points).
pub const FONT_MIN: f64 = 10.0;
/// Default font size (points).
pub const FONT_DEFAULT: f64 = 48.0;
/// Default extra spacing between lines (points).
pub const LINE_SPACING_DEFAULT: f64 = 8.0;
/// Largest permitted line spacing (points).
pub const LINE_SPACING_MAX: f64 = 40.0;

/// Top-level surface the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Composing the prompt text.
    #[default]
    Edit,
    /// Reading: the scroll engine drives the view.
    Present,
}

/// Visual settings for the presentation surface. Font size and line
/// spacing feed content-height measurement; colors are parsed by the
/// renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettings {
    /// Points; together with `line_spacing` this determines line height.
    pub font_size: f64,
    /// Extra points between lines.
    pub line_spacing: f64,
    /// Color name or `#rrggbb`.
    pub background: String,
    pub foreground: String,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            font_size: FONT_DEFAULT,
            line_spacing: LINE_SPACING_DEFAULT,
            background: "black".to_string(),
            foreground: "white".to_string(),
        }
    }
}

impl StyleSettings {
    /// Height of one rendered line in points.
    pub fn line_height(&self) -> f64 {
        self.font_size + self.line_spacing
    }

    pub fn grow_font(&mut self) {
        self.font_size += FONT_STEP;
    }

    pub fn shrink_font(&mut self) {
        self.font_size = (self.font_size - FONT_STEP).max(FONT_MIN);
    }

    pub fn set_line_spacing(&mut self, spacing: f64) {
        self.line_spacing = spacing.clamp(0.0, LINE_SPACING_MAX);
    }
}

/// Transient status message shown until it expires or is dismissed.
#[derive(Debug, Clone)]
pub struct EphemeralMessage {
    pub text: String,
    pub expires_at: Instant,
}

/// Line ending style detected in a loaded file; saved files restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Result of normalizing loaded text to LF-only form.
pub struct NormalizedText {
    pub normalized: String,
    pub original: LineEnding,
    pub had_trailing_newline: bool,
    /// True when both CRLF and bare LF/CR were present.
    pub mixed: bool,
}

/// Normalize `input` to LF-only content, remembering the dominant original
/// style so saves can round-trip it.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let crlf = input.matches("\r\n").count();
    let total_cr = input.matches('\r').count();
    let lone = total_cr - crlf;
    let lf_only = input.matches('\n').count() - crlf;
    let original = if crlf > 0 && crlf >= lf_only + lone {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    };
    let mixed = (crlf > 0) as usize + (lf_only > 0) as usize + (lone > 0) as usize > 1;
    let had_trailing_newline =
        input.ends_with('\n') || input.ends_with('\r');
    let normalized = if total_cr == 0 {
        input.to_string()
    } else {
        input.replace("\r\n", "\n").replace('\r', "\n")
    };
    NormalizedText {
        normalized,
        original,
        had_trailing_newline,
        mixed,
    }
}

/// Re-apply the original line-ending style for saving.
pub fn denormalize_line_endings(text: &str, ending: LineEnding) -> String {
    match ending {
        LineEnding::Lf => text.to_string(),
        LineEnding::Crlf => text.replace('\n', "\r\n"),
    }
}

/// Top-level session state container.
pub struct PrompterState {
    history: UndoHistory,
    /// Byte offset of the edit caret; always on a grapheme boundary.
    pub cursor: usize,
    pub mode: Mode,
    pub style: StyleSettings,
    pub file_name: Option<PathBuf>,
    pub dirty: bool,
    pub ephemeral_status: Option<EphemeralMessage>,
    pub original_line_ending: LineEnding,
    pub had_trailing_newline: bool,
}

impl PrompterState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            history: UndoHistory::new(text),
            cursor: 0,
            mode: Mode::Edit,
            style: StyleSettings::default(),
            file_name: None,
            dirty: false,
            ephemeral_status: None,
            original_line_ending: LineEnding::Lf,
            had_trailing_newline: true,
        }
    }

    /// The prompt text (owned by the undo history).
    pub fn text(&self) -> &str {
        self.history.current()
    }

    /// Undo/redo stack depths, surfaced for diagnostics.
    pub fn history_depths(&self) -> (usize, usize) {
        (self.history.undo_depth(), self.history.redo_depth())
    }

    // ---- editing -------------------------------------------------------

    /// Insert already-normalized text at the caret.
    pub fn insert(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let text = self.history.current();
        let mut next = String::with_capacity(text.len() + s.len());
        next.push_str(&text[..self.cursor]);
        next.push_str(s);
        next.push_str(&text[self.cursor..]);
        self.history.record(next);
        self.cursor += s.len();
        self.dirty = true;
        trace!(target: "state.edit", len = s.len(), cursor = self.cursor, "insert");
    }

    /// Remove the cluster before the caret. Returns false at the start of
    /// the text.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let text = self.history.current();
        let start = grapheme::prev_boundary(text, self.cursor);
        let mut next = String::with_capacity(text.len());
        next.push_str(&text[..start]);
        next.push_str(&text[self.cursor..]);
        self.history.record(next);
        self.cursor = start;
        self.dirty = true;
        true
    }

    pub fn newline(&mut self) {
        self.insert("\n");
    }

    /// Undo the last edit; the caret snaps inside the restored text.
    pub fn undo_edit(&mut self) -> Result<(), HistoryError> {
        self.history.undo()?;
        self.clamp_cursor();
        self.dirty = true;
        Ok(())
    }

    /// Redo the last undone edit.
    pub fn redo_edit(&mut self) -> Result<(), HistoryError> {
        self.history.redo()?;
        self.clamp_cursor();
        self.dirty = true;
        Ok(())
    }

    fn clamp_cursor(&mut self) {
        let text = self.history.current();
        if self.cursor > text.len() {
            self.cursor = text.len();
        }
        while self.cursor > 0 && !text.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    // ---- caret motion --------------------------------------------------

    pub fn move_left(&mut self) {
        self.cursor = grapheme::prev_boundary(self.text(), self.cursor);
    }

    pub fn move_right(&mut self) {
        self.cursor = grapheme::next_boundary(self.text(), self.cursor);
    }

    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_line_end(&mut self) {
        let text = self.text();
        self.cursor = text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(text.len());
    }

    pub fn move_up(&mut self) {
        let col = self.caret_column();
        let line_start = self.line_start(self.cursor);
        if line_start == 0 {
            self.cursor = 0;
            return;
        }
        let prev_start = self.line_start(line_start - 1);
        self.cursor = self.seek_column(prev_start, col);
    }

    pub fn move_down(&mut self) {
        let col = self.caret_column();
        let text = self.text();
        let Some(next_nl) = text[self.cursor..].find('\n') else {
            self.cursor = text.len();
            return;
        };
        let next_start = self.cursor + next_nl + 1;
        self.cursor = self.seek_column(next_start, col);
    }

    fn line_start(&self, byte: usize) -> usize {
        self.text()[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Grapheme column of the caret within its line.
    fn caret_column(&self) -> usize {
        let start = self.line_start(self.cursor);
        grapheme::iter(&self.text()[start..self.cursor]).count()
    }

    /// Byte offset `col` clusters into the line starting at `line_start`,
    /// stopping at the line's end.
    fn seek_column(&self, line_start: usize, col: usize) -> usize {
        let text = self.text();
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());
        let mut byte = line_start;
        for _ in 0..col {
            if byte >= line_end {
                break;
            }
            byte = grapheme::next_boundary(text, byte);
        }
        byte.min(line_end)
    }

    // ---- status --------------------------------------------------------

    /// Set an ephemeral status message with a fixed time-to-live.
    pub fn set_ephemeral(&mut self, msg: impl Into<String>, ttl: Duration) {
        self.ephemeral_status = Some(EphemeralMessage {
            text: msg.into(),
            expires_at: Instant::now() + ttl,
        });
    }

    /// Clear the ephemeral message if expired; returns true on expiry.
    pub fn tick_ephemeral(&mut self) -> bool {
        if let Some(m) = &self.ephemeral_status
            && Instant::now() >= m.expires_at
        {
            self.ephemeral_status = None;
            return true;
        }
        false
    }

    /// Explicit dismissal (Esc in edit mode). Returns true if a message
    /// was showing.
    pub fn dismiss_ephemeral(&mut self) -> bool {
        self.ephemeral_status.take().is_some()
    }
}
