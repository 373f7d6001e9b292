// Cuebridge HTTP Dispatcher Tests
//
// A minimal TCP listener stands in for the remote API so status handling,
// timeouts and connection failures are exercised over real sockets.
//
// Run with: cargo test -p cuebridge-core --test http_dispatcher

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use cuebridge_core::{
    ActionMap, Bridge, BridgeConfig, Coordinate, DeviceIdentity, DeviceInfo, Dispatch,
    DispatchError, EventSource, EventSourceResult, HttpDispatcher, KeyState, RawEvent,
    RemoteEndpoint, Shutdown,
};

// =========================================================================
// Stub server
// =========================================================================

/// How the stub answers one connection
#[derive(Clone, Copy)]
enum Reply {
    Status(u16),
    /// Hold the connection open without answering
    Stall(Duration),
}

/// Serve one connection per reply, in order. Received request lines are sent
/// back on the returned channel.
fn spawn_stub(replies: Vec<Reply>) -> (RemoteEndpoint, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for reply in replies {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let request_line = read_request_line(&mut stream);
            let _ = tx.send(request_line);

            match reply {
                Reply::Status(code) => {
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        code
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
                Reply::Stall(duration) => thread::sleep(duration),
            }
        }
    });

    (RemoteEndpoint::new("127.0.0.1", port), rx)
}

fn read_request_line(stream: &mut TcpStream) -> String {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&received)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn coord(page: u32, row: u32, column: u32) -> Coordinate {
    Coordinate::new(page, row, column).unwrap()
}

const TIMEOUT: Duration = Duration::from_millis(300);

// =========================================================================
// Dispatcher behaviour
// =========================================================================

#[test]
fn test_press_ok_on_200() {
    let (remote, requests) = spawn_stub(vec![Reply::Status(200)]);
    let dispatcher = HttpDispatcher::new(remote, TIMEOUT);

    assert_eq!(dispatcher.press(coord(2, 1, 1)), Ok(()));
    assert_eq!(
        requests.recv().unwrap(),
        "POST /api/location/2/1/1/press HTTP/1.1"
    );
}

#[test]
fn test_press_fails_on_500() {
    let (remote, _requests) = spawn_stub(vec![Reply::Status(500)]);
    let dispatcher = HttpDispatcher::new(remote, TIMEOUT);

    assert_eq!(
        dispatcher.press(coord(2, 1, 1)),
        Err(DispatchError::Status(500))
    );
}

#[test]
fn test_press_fails_on_non_200_success_codes() {
    let (remote, _requests) = spawn_stub(vec![Reply::Status(204), Reply::Status(404)]);
    let dispatcher = HttpDispatcher::new(remote, TIMEOUT);

    assert_eq!(
        dispatcher.press(coord(1, 1, 1)),
        Err(DispatchError::Status(204))
    );
    assert_eq!(
        dispatcher.press(coord(1, 1, 1)),
        Err(DispatchError::Status(404))
    );
}

#[test]
fn test_press_times_out() {
    let (remote, _requests) = spawn_stub(vec![Reply::Stall(Duration::from_secs(2))]);
    let dispatcher = HttpDispatcher::new(remote, TIMEOUT);

    let started = Instant::now();
    assert_eq!(dispatcher.press(coord(2, 1, 1)), Err(DispatchError::Timeout));
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[test]
fn test_press_connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dispatcher = HttpDispatcher::new(RemoteEndpoint::new("127.0.0.1", port), TIMEOUT);

    assert!(matches!(
        dispatcher.press(coord(2, 1, 1)),
        Err(DispatchError::Network(_))
    ));
}

#[test]
fn test_probe_queries_version() {
    let (remote, requests) = spawn_stub(vec![Reply::Status(200), Reply::Status(503)]);
    let dispatcher = HttpDispatcher::new(remote, TIMEOUT);

    assert!(dispatcher.probe().is_ok());
    assert_eq!(requests.recv().unwrap(), "GET /api/version HTTP/1.1");

    let err = dispatcher.probe().unwrap_err();
    assert_eq!(err.0, DispatchError::Status(503));
}

// =========================================================================
// Bridge over HTTP
// =========================================================================

struct ScriptedSource {
    info: DeviceInfo,
    events: VecDeque<RawEvent>,
}

impl EventSource for ScriptedSource {
    fn device(&self) -> &DeviceInfo {
        &self.info
    }

    fn next_event(&mut self) -> EventSourceResult<Option<RawEvent>> {
        Ok(self.events.pop_front())
    }
}

#[test]
fn test_loop_continues_after_server_error() {
    let (remote, requests) = spawn_stub(vec![Reply::Status(500), Reply::Status(200)]);
    let dispatcher = HttpDispatcher::new(remote.clone(), TIMEOUT);
    let map = ActionMap::new([
        ("KEY_LEFT", coord(2, 1, 1)),
        ("KEY_RIGHT", coord(2, 1, 2)),
    ])
    .unwrap();
    let config = BridgeConfig::default()
        .with_remote(remote)
        .with_action_map(map);

    let mut source = ScriptedSource {
        info: DeviceInfo {
            name: "CueLight".to_string(),
            path: PathBuf::from("/dev/input/event7"),
            identity: DeviceIdentity::new(0x0483, 0x2080),
        },
        events: VecDeque::from(vec![
            RawEvent::key_code(105, KeyState::Down),
            RawEvent::key_code(105, KeyState::Up),
            RawEvent::key_code(106, KeyState::Down),
        ]),
    };

    let mut bridge = Bridge::new(&config, &dispatcher);
    assert_eq!(bridge.listen(&mut source).unwrap(), Shutdown::Interrupted);

    let stats = bridge.stats();
    assert_eq!(stats.presses_failed, 1);
    assert_eq!(stats.presses_ok, 1);
    assert_eq!(
        requests.recv().unwrap(),
        "POST /api/location/2/1/1/press HTTP/1.1"
    );
    assert_eq!(
        requests.recv().unwrap(),
        "POST /api/location/2/1/2/press HTTP/1.1"
    );
}
