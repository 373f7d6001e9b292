// Cuebridge Dispatch Layer - HTTP
// Blocking ureq client for the remote's location API

use std::error::Error as _;
use std::io;
use std::time::Duration;

use log::debug;

use super::{Dispatch, DispatchError, DispatchResult, ProbeError};
use crate::{Coordinate, RemoteEndpoint};

/// Dispatcher issuing `POST /api/location/{page}/{row}/{column}/press`.
///
/// Only a 200 response counts as success. Redirects are not followed so a 3xx
/// is reported as a failure like any other non-200 status.
pub struct HttpDispatcher {
    agent: ureq::Agent,
    remote: RemoteEndpoint,
}

impl HttpDispatcher {
    pub fn new(remote: RemoteEndpoint, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(0)
            .build();
        Self { agent, remote }
    }

    fn check(result: Result<ureq::Response, ureq::Error>) -> DispatchResult {
        match result {
            Ok(response) if response.status() == 200 => Ok(()),
            Ok(response) => Err(DispatchError::Status(response.status())),
            Err(ureq::Error::Status(code, _)) => Err(DispatchError::Status(code)),
            Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport)),
        }
    }
}

/// Map a transport failure to a timeout or a generic network failure
fn classify_transport(transport: &ureq::Transport) -> DispatchError {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return DispatchError::Timeout;
            }
        }
        source = err.source();
    }
    DispatchError::Network(transport.to_string())
}

impl Dispatch for HttpDispatcher {
    fn press(&self, coordinate: Coordinate) -> DispatchResult {
        let url = self.remote.press_url(coordinate);
        debug!("POST {}", url);
        Self::check(self.agent.post(&url).call())
    }

    fn probe(&self) -> Result<(), ProbeError> {
        let url = self.remote.version_url();
        debug!("GET {}", url);
        Self::check(self.agent.get(&url).call()).map_err(ProbeError)
    }
}
