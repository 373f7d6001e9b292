// Cuebridge Input Layer - Raw Events
// Event kind and key state decoding

use std::fmt;

use evdev::InputEvent;

use crate::Keycode;

/// EV_KEY event type code from input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// Kind of a raw input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Key,
    /// Sync markers, LED state, relative axes, ... carrying the raw type code
    Other(u16),
}

impl EventKind {
    pub fn from_type(event_type: u16) -> Self {
        if event_type == EV_KEY {
            EventKind::Key
        } else {
            EventKind::Other(event_type)
        }
    }
}

/// State carried by a key event.
///
/// From `evtest` output:
///   0 == 'released'
///   1 == 'pressed'
///   2 == 'repeated'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyState {
    Up = 0,
    Down = 1,
    Repeat = 2,
}

impl KeyState {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Up),
            1 => Some(KeyState::Down),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyState::Up => write!(f, "up"),
            KeyState::Down => write!(f, "down"),
            KeyState::Repeat => write!(f, "repeat"),
        }
    }
}

/// One event read from the device. Consumed immediately, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub keycode: Keycode,
    /// Raw event value; the key state for key events
    pub value: i32,
}

impl RawEvent {
    /// Key event with the given state
    pub fn key(keycode: Keycode, state: KeyState) -> Self {
        Self {
            kind: EventKind::Key,
            keycode,
            value: state as i32,
        }
    }

    /// Key event for a numeric key code
    pub fn key_code(code: u16, state: KeyState) -> Self {
        Self::key(Keycode::from_code(code), state)
    }

    /// State of a key event; `None` for other kinds or unknown values
    pub fn key_state(&self) -> Option<KeyState> {
        match self.kind {
            EventKind::Key => KeyState::from_value(self.value),
            EventKind::Other(_) => None,
        }
    }
}

impl From<&InputEvent> for RawEvent {
    fn from(event: &InputEvent) -> Self {
        Self {
            kind: EventKind::from_type(event.event_type().0),
            keycode: Keycode::from_code(event.code()),
            value: event.value(),
        }
    }
}
