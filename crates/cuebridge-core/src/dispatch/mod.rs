// Cuebridge Dispatch Layer
// Synchronous, at-most-once button presses against the remote

mod http;

pub use http::HttpDispatcher;

use crate::Coordinate;

/// Outcome of one press attempt
pub type DispatchResult = Result<(), DispatchError>;

/// Why a press attempt failed. None of these stop the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Could not reach remote: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Remote answered with something other than 200
    #[error("Remote responded with HTTP {0}")]
    Status(u16),
}

/// Reachability probe failure; informational only
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Remote API unreachable: {0}")]
pub struct ProbeError(#[from] pub DispatchError);

/// Performs actions on the remote control surface.
///
/// Calls block until the remote answers or the configured timeout expires.
/// There is no retry: a failed press is reported once and forgotten.
pub trait Dispatch {
    /// Press the button at `coordinate`
    fn press(&self, coordinate: Coordinate) -> DispatchResult;

    /// Lightweight status query used for startup diagnostics
    fn probe(&self) -> Result<(), ProbeError>;
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn press(&self, coordinate: Coordinate) -> DispatchResult {
        (**self).press(coordinate)
    }

    fn probe(&self) -> Result<(), ProbeError> {
        (**self).probe()
    }
}
