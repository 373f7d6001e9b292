// Cuebridge Input Layer - Device Discovery
// Locating the remote's receiver by USB vendor/product identity

use std::fmt;
use std::path::PathBuf;

use evdev::Device;
use log::debug;

use super::source::{EventSource, EvdevEventSource};
use crate::ShutdownSignal;

/// USB vendor/product pair reported by an input device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor: u16,
    pub product: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor: u16, product: u16) -> Self {
        Self { vendor, product }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vendor: 0x{:04x}, Product: 0x{:04x}", self.vendor, self.product)
    }
}

/// Description of an input device for listing and diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device name as reported by the kernel
    pub name: String,
    /// Device node (e.g. "/dev/input/event5")
    pub path: PathBuf,
    pub identity: DeviceIdentity,
}

/// Anything carrying a hardware identity that can be matched against
pub trait IdentifiedDevice {
    fn identity(&self) -> DeviceIdentity;
}

impl IdentifiedDevice for DeviceInfo {
    fn identity(&self) -> DeviceIdentity {
        self.identity
    }
}

/// Pick the first candidate whose identity equals `wanted`.
///
/// Candidates are consumed: every non-matching candidate is dropped, which
/// closes its handle.
pub fn select_device<D, I>(wanted: DeviceIdentity, candidates: I) -> Option<D>
where
    D: IdentifiedDevice,
    I: IntoIterator<Item = D>,
{
    candidates
        .into_iter()
        .find(|candidate| candidate.identity() == wanted)
}

/// Result type for device discovery
pub type LocateResult<T> = Result<T, LocateError>;

/// Errors that can occur while locating the device
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// No readable device reported the wanted identity
    #[error("Device not found ({identity}); scanned {scanned} readable input device(s)")]
    DeviceNotFound {
        identity: DeviceIdentity,
        scanned: usize,
    },
}

/// Finds the configured device and binds an [`EventSource`] to it
pub trait DeviceLocator {
    type Source: EventSource;

    fn locate(&self, identity: DeviceIdentity) -> LocateResult<Self::Source>;
}

/// evdev-backed locator scanning `/dev/input/event*`
pub struct EvdevLocator {
    shutdown: ShutdownSignal,
}

/// An opened evdev node under inspection
struct Candidate {
    path: PathBuf,
    device: Device,
}

impl IdentifiedDevice for Candidate {
    fn identity(&self) -> DeviceIdentity {
        let id = self.device.input_id();
        DeviceIdentity::new(id.vendor(), id.product())
    }
}

impl Candidate {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.device.name().unwrap_or("Unknown").to_string(),
            path: self.path.clone(),
            identity: self.identity(),
        }
    }
}

impl EvdevLocator {
    /// The shutdown signal is handed to the event source of the located device
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self { shutdown }
    }

    /// List every input device that could be opened
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices: Vec<DeviceInfo> = Self::candidates().map(|c| c.info()).collect();
        devices.sort_by(|a, b| a.path.cmp(&b.path));
        devices
    }

    /// Open every input device node. Nodes that fail to open (permissions,
    /// unplugged mid-scan) are skipped by `evdev::enumerate`.
    fn candidates() -> impl Iterator<Item = Candidate> {
        evdev::enumerate().map(|(path, device)| Candidate { path, device })
    }
}

impl DeviceLocator for EvdevLocator {
    type Source = EvdevEventSource;

    fn locate(&self, identity: DeviceIdentity) -> LocateResult<EvdevEventSource> {
        let mut scanned = 0;
        let inspected = Self::candidates().inspect(|candidate| {
            scanned += 1;
            debug!(
                "Inspecting {} ({}): {}",
                candidate.path.display(),
                candidate.device.name().unwrap_or("Unknown"),
                candidate.identity()
            );
        });

        match select_device(identity, inspected) {
            Some(candidate) => {
                let info = candidate.info();
                Ok(EvdevEventSource::new(
                    candidate.device,
                    info,
                    self.shutdown.clone(),
                ))
            }
            None => Err(LocateError::DeviceNotFound { identity, scanned }),
        }
    }
}
