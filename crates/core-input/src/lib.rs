//! Async terminal input service: translates crossterm events into the
//! normalized `core_events::InputEvent` stream consumed by the runtime.

use core_events::{InputEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKind,
    KeyModifiers as CKeyModifiers,
};

mod async_service;
pub use async_service::{InputShutdown, spawn_input_task};

/// Translate one crossterm key event. Release events and keys the prompter
/// has no binding surface for yield `None`. Ctrl-C is surfaced as its own
/// variant so quit handling stays uniform across modes.
pub fn translate_key(key: CKeyEvent) -> Option<InputEvent> {
    if !matches!(key.kind, CKind::Press | CKind::Repeat) {
        return None;
    }
    let mut mods = KeyModifiers::empty();
    if key.modifiers.contains(CKeyModifiers::CONTROL) {
        mods |= KeyModifiers::CTRL;
    }
    if key.modifiers.contains(CKeyModifiers::ALT) {
        mods |= KeyModifiers::ALT;
    }
    if key.modifiers.contains(CKeyModifiers::SHIFT) {
        mods |= KeyModifiers::SHIFT;
    }
    let code = match key.code {
        CKeyCode::Char(c) => {
            if mods.contains(KeyModifiers::CTRL) && (c == 'c' || c == 'C') {
                return Some(InputEvent::CtrlC);
            }
            KeyCode::Char(c)
        }
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::Delete => KeyCode::Delete,
        _ => return None,
    };
    Some(InputEvent::Key(KeyEvent { code, mods }))
}
