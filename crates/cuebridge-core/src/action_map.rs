// Cuebridge Action Map
// Static keycode -> coordinate lookup

use indexmap::IndexMap;

use crate::config::ConfigError;
use crate::Coordinate;

/// Immutable mapping from symbolic keycode to remote [`Coordinate`].
///
/// Built once at startup and never mutated afterwards. Keys are matched
/// exactly; there is no prefix or wildcard matching. Insertion order is kept
/// so the table prints the way it was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMap {
    entries: IndexMap<String, Coordinate>,
}

impl ActionMap {
    /// Build a map from `(keycode, coordinate)` pairs.
    ///
    /// Empty keycodes and duplicate keycodes are rejected.
    pub fn new<I, K>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, Coordinate)>,
        K: Into<String>,
    {
        let mut map = IndexMap::new();
        for (keycode, coordinate) in entries {
            let keycode = keycode.into();
            if keycode.trim().is_empty() {
                return Err(ConfigError::EmptyKeycode);
            }
            if map.insert(keycode.clone(), coordinate).is_some() {
                return Err(ConfigError::DuplicateKeycode(keycode));
            }
        }
        Ok(Self { entries: map })
    }

    /// Look up the coordinate bound to `keycode`
    pub fn lookup(&self, keycode: &str) -> Option<Coordinate> {
        self.entries.get(keycode).copied()
    }

    /// Iterate entries in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionMap {
    /// Back, forward and B buttons of the Perfect Cue remote on page 2
    fn default() -> Self {
        let entries = [
            ("KEY_LEFT", Coordinate::from_parts(2, 1, 1)),
            ("KEY_RIGHT", Coordinate::from_parts(2, 1, 2)),
            ("KEY_B", Coordinate::from_parts(2, 1, 3)),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(k, c)| (k.to_string(), c))
                .collect(),
        }
    }
}
