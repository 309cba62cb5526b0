//! Core event types and channel policy for the prompter runtime.
//!
//! All producers (input task, tick scheduler) push into one bounded mpsc
//! channel consumed by the runtime loop, so every state mutation is
//! serialized through a single owner. Producers use `send().await`: with a
//! single consumer the backpressure parks the producer instead of dropping
//! events, and a tick delayed by backpressure still carries the measured
//! elapsed time.

use std::fmt;
use std::sync::atomic::AtomicU64;

pub mod tick;
pub use tick::{DEFAULT_TICK_INTERVAL, TickEvent, TickScheduler};

/// Bounded capacity of the runtime event channel.
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Lightweight telemetry counters (relaxed atomics). Inspected by tests and
// logged once at shutdown.
pub static TICKS_EMITTED: AtomicU64 = AtomicU64::new(0);
pub static TICKS_DISCARDED: AtomicU64 = AtomicU64::new(0);
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the runtime loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Periodic scroll tick with measured elapsed time.
    Tick(TickEvent),
}

/// Normalized input events produced by the terminal input task.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Bracketed-paste payload (raw; the runtime normalizes it).
    Paste(String),
    /// Ctrl-C surfaced distinctly so quit handling stays uniform.
    CtrlC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::CTRL,
        }
    }
}

/// Logical key identities the prompter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}
