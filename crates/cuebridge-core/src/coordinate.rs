// Cuebridge Coordinate
// Page/row/column address of a button on the remote control surface

use std::fmt;
use std::str::FromStr;

/// Errors produced when building a [`Coordinate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("{component} must be a positive integer, got 0")]
    Zero { component: &'static str },

    #[error("Invalid coordinate '{0}', expected PAGE/ROW/COLUMN")]
    Malformed(String),
}

/// Immutable (page, row, column) triple identifying a remote action target.
///
/// All three components are positive; zero is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    page: u32,
    row: u32,
    column: u32,
}

impl Coordinate {
    /// Create a coordinate, rejecting zero components
    pub fn new(page: u32, row: u32, column: u32) -> Result<Self, CoordinateError> {
        for (component, value) in [("page", page), ("row", row), ("column", column)] {
            if value == 0 {
                return Err(CoordinateError::Zero { component });
            }
        }
        Ok(Self { page, row, column })
    }

    /// Build from components known to be positive
    pub(crate) const fn from_parts(page: u32, row: u32, column: u32) -> Self {
        Self { page, row, column }
    }

    pub fn page(self) -> u32 {
        self.page
    }

    pub fn row(self) -> u32 {
        self.row
    }

    pub fn column(self) -> u32 {
        self.column
    }

    /// Path of the press action for this coordinate on the remote API
    pub fn press_path(self) -> String {
        format!("/api/location/{}/{}/{}/press", self.page, self.row, self.column)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.page, self.row, self.column)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse `PAGE/ROW/COLUMN`, e.g. `2/1/3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordinateError::Malformed(s.to_string());
        let parts: Vec<u32> = s
            .trim()
            .split('/')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed())?;

        match parts.as_slice() {
            [page, row, column] => Coordinate::new(*page, *row, *column),
            _ => Err(malformed()),
        }
    }
}
