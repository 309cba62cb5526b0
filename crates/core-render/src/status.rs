//! Status line assembly: one row of mode, playback, and file context.

use core_scroll::ScrollEngine;
use core_state::{Mode, PrompterState};
use core_text::{display_width, truncate_to_width};

/// Build the status line text, exactly `cols` columns wide.
///
/// Left segment: mode (and playback state in present mode), file name,
/// dirty marker. Right segment: an ephemeral message when one is active,
/// otherwise speed/font readouts in present mode or a key hint in edit
/// mode.
pub fn build_status(state: &PrompterState, engine: &ScrollEngine, cols: u16) -> String {
    let cols = cols as usize;
    let name = state
        .file_name
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let dirty = if state.dirty { " [+]" } else { "" };
    let left = match state.mode {
        Mode::Edit => format!(" EDIT  {name}{dirty}"),
        Mode::Present => {
            let play = if engine.is_playing() { "PLAY" } else { "PAUSE" };
            format!(" {play}  {name}{dirty}")
        }
    };
    let right = if let Some(m) = &state.ephemeral_status {
        format!("{} ", m.text)
    } else {
        match state.mode {
            Mode::Edit => "ctrl-p present  ctrl-s save ".to_string(),
            Mode::Present => format!(
                "{:.0} pt/s  {:.0} pt ",
                engine.speed(),
                state.style.font_size
            ),
        }
    };

    compose(&left, &right, cols)
}

/// Left-align `left`, right-align `right`, pad or truncate to `cols`.
fn compose(left: &str, right: &str, cols: usize) -> String {
    let left = truncate_to_width(left, cols);
    let left_w = display_width(left);
    let remaining = cols - left_w;
    let right = truncate_to_width(right, remaining);
    let right_w = display_width(right);
    let mut out = String::with_capacity(cols + 8);
    out.push_str(left);
    for _ in 0..remaining - right_w {
        out.push(' ');
    }
    out.push_str(right);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> PrompterState {
        PrompterState::new("text")
    }

    #[test]
    fn edit_mode_shows_mode_and_hint() {
        let s = build_status(&state(), &ScrollEngine::default(), 60);
        assert!(s.contains("EDIT"));
        assert!(s.contains("untitled"));
        assert!(s.contains("ctrl-p"));
        assert_eq!(display_width(&s), 60);
    }

    #[test]
    fn present_mode_shows_playback_and_speed() {
        let mut st = state();
        st.mode = Mode::Present;
        let mut engine = ScrollEngine::default();
        engine.play();
        let s = build_status(&st, &engine, 60);
        assert!(s.contains("PLAY"));
        assert!(s.contains("50 pt/s"));
    }

    #[test]
    fn paused_state_is_visible() {
        let mut st = state();
        st.mode = Mode::Present;
        let s = build_status(&st, &ScrollEngine::default(), 60);
        assert!(s.contains("PAUSE"));
    }

    #[test]
    fn ephemeral_message_wins_the_right_side() {
        let mut st = state();
        st.set_ephemeral("Save failed", Duration::from_secs(3));
        let s = build_status(&st, &ScrollEngine::default(), 60);
        assert!(s.contains("Save failed"));
    }

    #[test]
    fn dirty_marker_appears_after_edits() {
        let mut st = state();
        st.insert("x");
        let s = build_status(&st, &ScrollEngine::default(), 60);
        assert!(s.contains("[+]"));
    }

    #[test]
    fn narrow_terminal_never_overflows() {
        let s = build_status(&state(), &ScrollEngine::default(), 10);
        assert_eq!(display_width(&s), 10);
    }
}
