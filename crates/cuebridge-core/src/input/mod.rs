// Cuebridge Input Layer
// Device discovery, raw event reading and key filtering

mod device;
mod event;
mod filter;
mod source;

pub use device::{
    select_device, DeviceIdentity, DeviceInfo, DeviceLocator, EvdevLocator, IdentifiedDevice,
    LocateError, LocateResult,
};
pub use event::{EventKind, KeyState, RawEvent, EV_KEY};
pub use filter::{FilterOutcome, KeyFilter};
pub use source::{EventSource, EventSourceError, EventSourceResult, EvdevEventSource};
