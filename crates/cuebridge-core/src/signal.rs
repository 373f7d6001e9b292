// Cuebridge Shutdown Signal
// SIGINT/SIGTERM delivered through a self-pipe that can be polled

use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::low_level::pipe;

/// Operator interrupt, observable both as a flag and as a readable descriptor.
///
/// The read end is polled next to the device descriptor so a blocked read
/// wakes up on Ctrl+C without any timeout.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    reader: UnixStream,
    writer: UnixStream,
    triggered: AtomicBool,
}

impl ShutdownSignal {
    /// Create a signal that is only triggered through [`ShutdownSignal::trigger`]
    pub fn new() -> io::Result<Self> {
        let (reader, writer) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;
        writer.set_nonblocking(true)?;
        Ok(Self {
            inner: Arc::new(Inner {
                reader,
                writer,
                triggered: AtomicBool::new(false),
            }),
        })
    }

    /// Create a signal wired to SIGINT and SIGTERM
    pub fn install() -> io::Result<Self> {
        let signal = Self::new()?;
        for sig in [SIGINT, SIGTERM] {
            pipe::register(sig, signal.inner.writer.try_clone()?)?;
        }
        Ok(signal)
    }

    /// Request shutdown from the current process
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
        // A full pipe already wakes the reader
        let _ = (&self.inner.writer).write(&[1]);
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        if self.inner.triggered.load(Ordering::SeqCst) {
            return true;
        }
        let mut buf = [0u8; 16];
        match (&self.inner.reader).read(&mut buf) {
            Ok(n) if n > 0 => {
                self.inner.triggered.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }
}

impl AsRawFd for ShutdownSignal {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.reader.as_raw_fd()
    }
}
