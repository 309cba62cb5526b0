//! Text primitives for the prompter: grapheme-cluster helpers, input
//! normalization, and display-width-aware word wrap.
//!
//! All cursor movement and width decisions flow through the `grapheme`
//! module so the editor surface and the wrap engine slice text at identical
//! boundaries. Wrapping (`wrap`) is the measurement authority: content
//! height is derived from the wrapped line count, never from raw newline
//! counts.

pub mod wrap;

pub use wrap::{wrap_text, wrapped_line_count};

/// Normalize committed input (typed characters, paste payloads) to NFC so
/// buffer content and wrap measurement agree on cluster identity.
pub fn normalize_input(input: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    input.nfc().collect()
}

pub mod grapheme {
    //! Grapheme-cluster boundary and width helpers.

    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate extended grapheme clusters of `text`.
    pub fn iter(text: &str) -> impl Iterator<Item = &str> {
        text.graphemes(true)
    }

    /// Byte index of the cluster boundary preceding `byte` (0 if already at
    /// the start). `byte` must lie on a boundary.
    pub fn prev_boundary(text: &str, byte: usize) -> usize {
        debug_assert!(byte <= text.len());
        let mut prev = 0usize;
        for (idx, _) in text.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            prev = idx;
        }
        prev
    }

    /// Byte index of the cluster boundary following `byte` (`text.len()` if
    /// already at the end). `byte` must lie on a boundary.
    pub fn next_boundary(text: &str, byte: usize) -> usize {
        debug_assert!(byte <= text.len());
        for (idx, g) in text.grapheme_indices(true) {
            if idx == byte {
                return idx + g.len();
            }
            if idx > byte {
                return idx;
            }
        }
        text.len()
    }

    /// Terminal column width of a single cluster. Control clusters render as
    /// zero columns; anything visible occupies at least one.
    pub fn cluster_width(g: &str) -> usize {
        if g.chars().all(char::is_control) {
            return 0;
        }
        UnicodeWidthStr::width(g).max(1)
    }

    /// Visual column of `byte` within `text` (sum of preceding cluster widths).
    pub fn visual_col(text: &str, byte: usize) -> usize {
        let mut col = 0usize;
        for (idx, g) in text.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_width(g);
        }
        col
    }
}

/// Display width of a full string (sum of its clusters' widths).
pub fn display_width(text: &str) -> usize {
    grapheme::iter(text).map(grapheme::cluster_width).sum()
}

/// Longest prefix of `text` that fits in `max_cols` display columns,
/// cut at a cluster boundary.
pub fn truncate_to_width(text: &str, max_cols: usize) -> &str {
    let mut cols = 0usize;
    let mut end = 0usize;
    for g in grapheme::iter(text) {
        let w = grapheme::cluster_width(g);
        if cols + w > max_cols {
            break;
        }
        cols += w;
        end += g.len();
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_normalization_composes() {
        // "e" + combining acute -> precomposed é
        let decomposed = "e\u{0301}";
        let normalized = normalize_input(decomposed);
        assert_eq!(normalized, "\u{e9}");
    }

    #[test]
    fn display_width_ascii() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn display_width_wide_clusters() {
        // CJK ideographs are two columns each.
        assert_eq!(display_width("\u{4f60}\u{597d}"), 4);
    }

    #[test]
    fn boundaries_round_trip() {
        let s = "a\u{e9}b";
        let mut byte = 0usize;
        let mut clusters = 0usize;
        while byte < s.len() {
            byte = grapheme::next_boundary(s, byte);
            clusters += 1;
        }
        assert_eq!(clusters, 3);
        assert_eq!(grapheme::prev_boundary(s, byte), s.len() - 1);
        assert_eq!(grapheme::prev_boundary(s, 0), 0);
    }

    #[test]
    fn truncate_respects_cluster_widths() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("hello", 10), "hello");
        // An ideograph that would straddle the limit is dropped whole.
        assert_eq!(truncate_to_width("a\u{4f60}b", 2), "a");
    }

    #[test]
    fn visual_col_counts_cluster_widths() {
        let s = "a\u{4f60}b";
        assert_eq!(grapheme::visual_col(s, 0), 0);
        assert_eq!(grapheme::visual_col(s, 1), 1);
        // After the ideograph: 1 + 2 columns.
        assert_eq!(grapheme::visual_col(s, 1 + "\u{4f60}".len()), 3);
    }
}
