//! Display-width-aware word wrap.
//!
//! The prompt text is wrapped once per layout pass to the content column
//! width; the wrapped line count is the sole input for content-height
//! measurement. Invariants:
//! * Explicit newlines always break; an empty paragraph yields one blank row
//!   so vertical gaps between paragraphs survive wrapping.
//! * Breaks prefer word boundaries; a word wider than the wrap width is
//!   hard-broken at cluster boundaries rather than overflowing.
//! * No wrapped line exceeds `max_cols` display columns.

use crate::grapheme;
use unicode_segmentation::UnicodeSegmentation;

/// Wrap `text` to `max_cols` display columns. Returns owned rows in render
/// order. `max_cols == 0` yields no rows (nothing can be displayed).
pub fn wrap_text(text: &str, max_cols: usize) -> Vec<String> {
    if max_cols == 0 {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for para in text.split('\n') {
        wrap_paragraph(para, max_cols, &mut rows);
    }
    rows
}

/// Number of rows `text` occupies at `max_cols` columns.
pub fn wrapped_line_count(text: &str, max_cols: usize) -> usize {
    wrap_text(text, max_cols).len()
}

fn wrap_paragraph(para: &str, max_cols: usize, out: &mut Vec<String>) {
    if para.is_empty() {
        out.push(String::new());
        return;
    }
    let mut line = String::new();
    let mut cols = 0usize;
    for word in para.split_word_bounds() {
        let width = crate::display_width(word);
        if cols + width <= max_cols {
            line.push_str(word);
            cols += width;
            continue;
        }
        if width <= max_cols {
            out.push(std::mem::take(&mut line));
            cols = 0;
            // A break consumes the whitespace that forced it.
            if word.trim().is_empty() {
                continue;
            }
            line.push_str(word);
            cols = width;
        } else {
            // Over-long word: spill cluster by cluster.
            for g in grapheme::iter(word) {
                let gw = grapheme::cluster_width(g);
                if cols + gw > max_cols && cols > 0 {
                    out.push(std::mem::take(&mut line));
                    cols = 0;
                }
                line.push_str(g);
                cols += gw;
            }
        }
    }
    out.push(line);
}
