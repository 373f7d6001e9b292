// Cuebridge Core Library
// Remote-control input to HTTP action bridge

pub mod action_map;
pub mod bridge;
pub mod config;
pub mod coordinate;
pub mod dispatch;
pub mod input;
pub mod keycode;
pub mod signal;

pub use action_map::ActionMap;
pub use bridge::{
    Bridge, BridgeError, BridgeResult, BridgeState, BridgeStats, EventReport, Shutdown,
};
pub use config::{BridgeConfig, ConfigError, RemoteEndpoint};
pub use coordinate::{Coordinate, CoordinateError};
pub use dispatch::{Dispatch, DispatchError, DispatchResult, HttpDispatcher, ProbeError};
pub use input::{
    select_device, DeviceIdentity, DeviceInfo, DeviceLocator, EventKind, EventSource,
    EventSourceError, EventSourceResult, EvdevEventSource, EvdevLocator, FilterOutcome,
    IdentifiedDevice, KeyFilter, KeyState, LocateError, LocateResult, RawEvent,
};
pub use keycode::Keycode;
pub use signal::ShutdownSignal;
