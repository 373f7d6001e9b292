// Cuebridge Input Layer - Key Filter
// Reduces raw events to key presses and resolves them against the action map

use crate::{ActionMap, Coordinate};

use super::event::{EventKind, KeyState, RawEvent};

/// What the filter decided for one raw event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Not a key-down event; dropped without any report
    Ignored,
    /// Key-down for a keycode with no configured action
    Unmapped { keycode: String },
    /// Key-down for a mapped keycode
    Mapped {
        keycode: String,
        coordinate: Coordinate,
    },
}

impl FilterOutcome {
    /// Coordinate to press, if any
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            FilterOutcome::Mapped { coordinate, .. } => Some(*coordinate),
            _ => None,
        }
    }
}

/// Two-stage filter: only key events pass, and of those only key-down.
///
/// Releases and autorepeats are dropped so a held button fires once.
#[derive(Debug, Clone, Copy)]
pub struct KeyFilter<'a> {
    map: &'a ActionMap,
}

impl<'a> KeyFilter<'a> {
    pub fn new(map: &'a ActionMap) -> Self {
        Self { map }
    }

    pub fn accept(&self, event: &RawEvent) -> FilterOutcome {
        if event.kind != EventKind::Key {
            return FilterOutcome::Ignored;
        }
        if event.key_state() != Some(KeyState::Down) {
            return FilterOutcome::Ignored;
        }

        let keycode = event.keycode.canonical().into_owned();
        match self.map.lookup(&keycode) {
            Some(coordinate) => FilterOutcome::Mapped {
                keycode,
                coordinate,
            },
            None => FilterOutcome::Unmapped { keycode },
        }
    }
}
