// Cuebridge Input Layer - Event Source
// Blocking, ordered event stream bound to the located device

use std::collections::VecDeque;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use evdev::Device;

use super::device::DeviceInfo;
use super::event::RawEvent;
use crate::ShutdownSignal;

/// Result type for event source operations
pub type EventSourceResult<T> = Result<T, EventSourceError>;

/// Terminal failures of the event stream
#[derive(Debug, thiserror::Error)]
pub enum EventSourceError {
    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl EventSourceError {
    /// Classify a read error; ENODEV means the device went away
    pub fn from_read(err: io::Error) -> Self {
        if err.raw_os_error() == Some(libc::ENODEV) {
            EventSourceError::Disconnected
        } else {
            EventSourceError::Io(err)
        }
    }
}

/// Infinite, blocking, non-restartable sequence of raw events.
///
/// `next_event` blocks until the device produces an event. `Ok(None)` means
/// the operator asked to stop; any `Err` is terminal.
pub trait EventSource {
    /// The device this source is bound to
    fn device(&self) -> &DeviceInfo;

    fn next_event(&mut self) -> EventSourceResult<Option<RawEvent>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Device,
    Shutdown,
}

/// Block until either descriptor is readable. Shutdown wins when both are.
fn wait_readable(device_fd: RawFd, shutdown: &ShutdownSignal) -> EventSourceResult<Readiness> {
    let mut poll_fds = [
        libc::pollfd {
            fd: device_fd,
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: shutdown.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    loop {
        let poll_result = unsafe {
            libc::poll(
                poll_fds.as_mut_ptr(),
                poll_fds.len() as libc::nfds_t,
                -1,
            )
        };

        if poll_result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(EventSourceError::Io(err));
        }

        if poll_fds[1].revents != 0 {
            return Ok(Readiness::Shutdown);
        }

        let revents = poll_fds[0].revents;
        if revents & libc::POLLNVAL != 0 {
            return Err(EventSourceError::Disconnected);
        }
        // POLLERR/POLLHUP fall through to the read, which reports the cause
        if revents != 0 {
            return Ok(Readiness::Device);
        }
    }
}

/// Event source reading an evdev device node.
///
/// Waits with `poll(2)` on the device descriptor and the shutdown pipe with no
/// timeout, so the only wakeups are device input or an operator signal.
pub struct EvdevEventSource {
    device: Device,
    info: DeviceInfo,
    shutdown: ShutdownSignal,
    /// Events of the last read not yet handed out, in hardware order
    pending: VecDeque<RawEvent>,
}

impl EvdevEventSource {
    pub fn new(device: Device, info: DeviceInfo, shutdown: ShutdownSignal) -> Self {
        Self {
            device,
            info,
            shutdown,
            pending: VecDeque::new(),
        }
    }
}

impl EventSource for EvdevEventSource {
    fn device(&self) -> &DeviceInfo {
        &self.info
    }

    fn next_event(&mut self) -> EventSourceResult<Option<RawEvent>> {
        loop {
            // Checked before pending events so an interrupt drops the rest of a read
            if self.shutdown.is_triggered() {
                return Ok(None);
            }
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            match wait_readable(self.device.as_raw_fd(), &self.shutdown)? {
                Readiness::Shutdown => continue,
                Readiness::Device => {
                    let events = self
                        .device
                        .fetch_events()
                        .map_err(EventSourceError::from_read)?;
                    self.pending.extend(events.map(|event| RawEvent::from(&event)));
                }
            }
        }
    }
}
