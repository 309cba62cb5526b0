//! Key-to-action translation, per mode.
//!
//! The bindings are deliberately flat: one key, one action, resolved
//! against the current mode. Space reaches the engine as the abstract
//! playback toggle only in present mode; in edit mode it is ordinary
//! input.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_state::Mode;

/// Speed change applied per `]`/`[` press (points per second).
pub const SPEED_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    // mode switching
    EnterPresent,
    LeaveToEdit,
    // playback
    TogglePlayback,
    JumpBack,
    JumpForward,
    SeekTop,
    SpeedUp,
    SpeedDown,
    FontGrow,
    FontShrink,
    // editing
    Insert(char),
    Newline,
    Backspace,
    CaretLeft,
    CaretRight,
    CaretUp,
    CaretDown,
    CaretLineStart,
    CaretLineEnd,
    Undo,
    Redo,
    Save,
    DismissStatus,
    Quit,
}

/// Resolve a key event against the current mode. Unbound keys yield
/// `None`.
pub fn translate(key: KeyEvent, mode: Mode) -> Option<Action> {
    use KeyCode::*;

    if key.mods.contains(KeyModifiers::CTRL) {
        return match key.code {
            Char('q') | Char('Q') => Some(Action::Quit),
            Char('s') | Char('S') if mode == Mode::Edit => Some(Action::Save),
            Char('z') | Char('Z') if mode == Mode::Edit => Some(Action::Undo),
            Char('y') | Char('Y') if mode == Mode::Edit => Some(Action::Redo),
            Char('p') | Char('P') if mode == Mode::Edit => Some(Action::EnterPresent),
            _ => None,
        };
    }

    match mode {
        Mode::Edit => match key.code {
            Char(c) => Some(Action::Insert(c)),
            Enter => Some(Action::Newline),
            Backspace => Some(Action::Backspace),
            Left => Some(Action::CaretLeft),
            Right => Some(Action::CaretRight),
            Up => Some(Action::CaretUp),
            Down => Some(Action::CaretDown),
            Home => Some(Action::CaretLineStart),
            End => Some(Action::CaretLineEnd),
            Esc => Some(Action::DismissStatus),
            _ => None,
        },
        Mode::Present => match key.code {
            Char(' ') => Some(Action::TogglePlayback),
            Char(']') => Some(Action::SpeedUp),
            Char('[') => Some(Action::SpeedDown),
            Char('+') | Char('=') => Some(Action::FontGrow),
            Char('-') => Some(Action::FontShrink),
            Char('q') => Some(Action::Quit),
            Left | PageUp => Some(Action::JumpBack),
            Right | PageDown => Some(Action::JumpForward),
            Home => Some(Action::SeekTop),
            Esc => Some(Action::LeaveToEdit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    #[test]
    fn space_toggles_playback_only_while_presenting() {
        let space = plain(KeyCode::Char(' '));
        assert_eq!(translate(space, Mode::Present), Some(Action::TogglePlayback));
        assert_eq!(translate(space, Mode::Edit), Some(Action::Insert(' ')));
    }

    #[test]
    fn escape_leaves_presentation() {
        assert_eq!(
            translate(plain(KeyCode::Esc), Mode::Present),
            Some(Action::LeaveToEdit)
        );
        assert_eq!(
            translate(plain(KeyCode::Esc), Mode::Edit),
            Some(Action::DismissStatus)
        );
    }

    #[test]
    fn arrows_jump_while_presenting_and_move_while_editing() {
        assert_eq!(
            translate(plain(KeyCode::Left), Mode::Present),
            Some(Action::JumpBack)
        );
        assert_eq!(
            translate(plain(KeyCode::Right), Mode::Present),
            Some(Action::JumpForward)
        );
        assert_eq!(
            translate(plain(KeyCode::Left), Mode::Edit),
            Some(Action::CaretLeft)
        );
    }

    #[test]
    fn speed_and_font_keys_bind_in_present_mode() {
        assert_eq!(
            translate(plain(KeyCode::Char(']')), Mode::Present),
            Some(Action::SpeedUp)
        );
        assert_eq!(
            translate(plain(KeyCode::Char('[')), Mode::Present),
            Some(Action::SpeedDown)
        );
        assert_eq!(
            translate(plain(KeyCode::Char('+')), Mode::Present),
            Some(Action::FontGrow)
        );
        assert_eq!(
            translate(plain(KeyCode::Char('-')), Mode::Present),
            Some(Action::FontShrink)
        );
    }

    #[test]
    fn ctrl_bindings_resolve_by_mode() {
        let ctrl_p = KeyEvent::ctrl(KeyCode::Char('p'));
        assert_eq!(translate(ctrl_p, Mode::Edit), Some(Action::EnterPresent));
        assert_eq!(translate(ctrl_p, Mode::Present), None);
        assert_eq!(
            translate(KeyEvent::ctrl(KeyCode::Char('q')), Mode::Present),
            Some(Action::Quit)
        );
        assert_eq!(
            translate(KeyEvent::ctrl(KeyCode::Char('z')), Mode::Edit),
            Some(Action::Undo)
        );
    }

    #[test]
    fn typing_inserts_in_edit_mode() {
        assert_eq!(
            translate(plain(KeyCode::Char('x')), Mode::Edit),
            Some(Action::Insert('x'))
        );
        assert_eq!(translate(plain(KeyCode::Enter), Mode::Edit), Some(Action::Newline));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(translate(plain(KeyCode::Tab), Mode::Present), None);
        assert_eq!(translate(plain(KeyCode::Delete), Mode::Present), None);
        assert_eq!(
            translate(KeyEvent::ctrl(KeyCode::Char('x')), Mode::Edit),
            None
        );
    }
}
