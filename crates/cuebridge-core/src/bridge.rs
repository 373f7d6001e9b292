// Cuebridge Orchestration
// Startup diagnostics, the listening loop and failure reporting

use log::{debug, error, info, warn};

use crate::input::{
    DeviceLocator, EventSource, EventSourceError, FilterOutcome, KeyFilter, LocateError, RawEvent,
};
use crate::{BridgeConfig, Coordinate, Dispatch, DispatchResult};

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fatal bridge failures. Dispatch failures never appear here.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("Device I/O failure: {0}")]
    Device(#[from] EventSourceError),
}

/// Lifecycle of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Starting,
    Locating,
    Found,
    NotFound,
    Listening,
    ProcessingEvent,
    Stopped,
}

/// Why the listening loop ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Operator interrupt (SIGINT/SIGTERM)
    Interrupted,
}

/// Per-event feedback produced by the listening loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventReport {
    /// Not a key-down event; nothing reported
    Ignored,
    NotMapped {
        keycode: String,
    },
    Pressed {
        keycode: String,
        coordinate: Coordinate,
        result: DispatchResult,
    },
}

/// Counters accumulated while listening
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub presses_ok: u64,
    pub presses_failed: u64,
    pub not_mapped: u64,
}

/// Drives locator, event source, key filter and dispatcher.
///
/// Single-threaded: while a press is in flight no further events are read, so
/// presses go out strictly in the order their key-down events arrived.
pub struct Bridge<'a, D: Dispatch> {
    config: &'a BridgeConfig,
    dispatcher: D,
    state: BridgeState,
    stats: BridgeStats,
}

impl<'a, D: Dispatch> Bridge<'a, D> {
    pub fn new(config: &'a BridgeConfig, dispatcher: D) -> Self {
        Self {
            config,
            dispatcher,
            state: BridgeState::Starting,
            stats: BridgeStats::default(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    fn transition(&mut self, next: BridgeState) {
        debug!("Bridge state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Locate the device and run startup diagnostics, then listen until
    /// interrupted or until the device fails.
    pub fn run<L: DeviceLocator>(&mut self, locator: &L) -> BridgeResult<Shutdown> {
        let mut source = self.start(locator)?;
        self.listen(&mut source)
    }

    /// Starting -> Locating -> Found | NotFound.
    ///
    /// Device absence is the only fatal startup condition; the reachability
    /// probe is reported and otherwise ignored.
    pub fn start<L: DeviceLocator>(&mut self, locator: &L) -> BridgeResult<L::Source> {
        self.transition(BridgeState::Locating);
        info!("Looking for device ({})", self.config.device);

        let source = match locator.locate(self.config.device) {
            Ok(source) => source,
            Err(e) => {
                // Reported by the caller
                self.transition(BridgeState::NotFound);
                self.transition(BridgeState::Stopped);
                return Err(e.into());
            }
        };
        self.transition(BridgeState::Found);

        let device = source.device();
        info!("Found: {}", device.name);
        info!("Path: {}", device.path.display());

        info!("Button mapping:");
        for (keycode, coordinate) in self.config.action_map.iter() {
            info!("  {:<12} -> {}", keycode, coordinate);
        }
        info!("Remote: {}", self.config.remote);

        if self.config.probe {
            match self.dispatcher.probe() {
                Ok(()) => info!("Remote is online"),
                Err(e) => warn!("{} - continuing anyway", e),
            }
        }

        Ok(source)
    }

    /// Listening loop. Returns on interrupt, fails on device I/O errors.
    pub fn listen<S: EventSource>(&mut self, source: &mut S) -> BridgeResult<Shutdown> {
        self.transition(BridgeState::Listening);
        info!("Listening for input... (Ctrl+C to stop)");

        loop {
            match source.next_event() {
                Ok(Some(event)) => {
                    self.handle_event(&event);
                }
                Ok(None) => {
                    self.transition(BridgeState::Stopped);
                    info!(
                        "Stopped. {} press(es) ok, {} failed, {} not mapped",
                        self.stats.presses_ok, self.stats.presses_failed, self.stats.not_mapped
                    );
                    return Ok(Shutdown::Interrupted);
                }
                Err(e) => {
                    self.transition(BridgeState::Stopped);
                    error!("Device I/O failure: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Filter one event and, for a mapped key-down, press its coordinate.
    ///
    /// Produces exactly one feedback line for every key-down.
    pub fn handle_event(&mut self, event: &RawEvent) -> EventReport {
        let filter = KeyFilter::new(&self.config.action_map);
        match filter.accept(event) {
            FilterOutcome::Ignored => EventReport::Ignored,
            FilterOutcome::Unmapped { keycode } => {
                self.stats.not_mapped += 1;
                info!("{} (not mapped)", keycode);
                EventReport::NotMapped { keycode }
            }
            FilterOutcome::Mapped {
                keycode,
                coordinate,
            } => {
                let previous = self.state;
                self.transition(BridgeState::ProcessingEvent);
                let result = self.dispatcher.press(coordinate);
                self.transition(previous);

                match &result {
                    Ok(()) => {
                        self.stats.presses_ok += 1;
                        info!("{} -> {} [OK]", keycode, coordinate);
                    }
                    Err(e) => {
                        self.stats.presses_failed += 1;
                        warn!("{} -> {} [FAIL] {}", keycode, coordinate, e);
                    }
                }
                EventReport::Pressed {
                    keycode,
                    coordinate,
                    result,
                }
            }
        }
    }
}
