// Cuebridge Configuration
// Immutable runtime configuration assembled once at startup

use std::fmt;
use std::time::Duration;

use crate::input::DeviceIdentity;
use crate::{ActionMap, Coordinate, CoordinateError};

/// Vendor id of the DSAN Perfect Cue USB receiver
pub const DEFAULT_VENDOR_ID: u16 = 0x0483;
/// Product id of the DSAN Perfect Cue USB receiver
pub const DEFAULT_PRODUCT_ID: u16 = 0x2080;
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
/// Bound on every outbound HTTP call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid 16-bit hex id: {0}")]
    InvalidHexId(String),

    #[error("Invalid mapping '{0}', expected KEYCODE=PAGE/ROW/COLUMN")]
    InvalidMapping(String),

    #[error("Keycode must not be empty")]
    EmptyKeycode,

    #[error("Keycode mapped more than once: {0}")]
    DuplicateKeycode(String),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

/// Host and port of the remote HTTP control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub host: String,
    pub port: u16,
}

impl RemoteEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `POST` target that presses the button at `coordinate`
    pub fn press_url(&self, coordinate: Coordinate) -> String {
        format!("{}{}", self, coordinate.press_path())
    }

    /// `GET` target used for the reachability probe
    pub fn version_url(&self) -> String {
        format!("{}/api/version", self)
    }
}

impl Default for RemoteEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}", self.host, self.port)
    }
}

/// All runtime configuration for the bridge.
///
/// Constructed once in `main` and passed by reference; nothing mutates it
/// after startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Hardware identity of the remote's receiver
    pub device: DeviceIdentity,
    /// Remote control surface
    pub remote: RemoteEndpoint,
    /// Timeout for press and probe requests
    pub timeout: Duration,
    /// Whether to query the remote's version before listening
    pub probe: bool,
    /// Button semantics
    pub action_map: ActionMap,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device: DeviceIdentity::new(DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID),
            remote: RemoteEndpoint::default(),
            timeout: DEFAULT_TIMEOUT,
            probe: true,
            action_map: ActionMap::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_device(mut self, device: DeviceIdentity) -> Self {
        self.device = device;
        self
    }

    pub fn with_remote(mut self, remote: RemoteEndpoint) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_action_map(mut self, action_map: ActionMap) -> Self {
        self.action_map = action_map;
        self
    }
}

/// Parse a 16-bit id written in hex, with or without a `0x` prefix
pub fn parse_hex_id(s: &str) -> Result<u16, ConfigError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ConfigError::InvalidHexId(s.to_string()));
    }
    u16::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidHexId(s.to_string()))
}

/// Parse a `KEYCODE=PAGE/ROW/COLUMN` mapping entry
pub fn parse_mapping(s: &str) -> Result<(String, Coordinate), ConfigError> {
    let (keycode, coordinate) = s
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidMapping(s.to_string()))?;
    let keycode = keycode.trim();
    if keycode.is_empty() {
        return Err(ConfigError::EmptyKeycode);
    }
    Ok((keycode.to_string(), coordinate.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_id() {
        assert_eq!(parse_hex_id("0x0483"), Ok(0x0483));
        assert_eq!(parse_hex_id("0X2080"), Ok(0x2080));
        assert_eq!(parse_hex_id("2080"), Ok(0x2080));
        assert_eq!(parse_hex_id("ffff"), Ok(0xffff));
    }

    #[test]
    fn test_parse_hex_id_rejects_invalid() {
        assert!(parse_hex_id("").is_err());
        assert!(parse_hex_id("0x").is_err());
        assert!(parse_hex_id("0x10000").is_err());
        assert!(parse_hex_id("zz").is_err());
    }

    #[test]
    fn test_parse_mapping() {
        let (keycode, coord) = parse_mapping("KEY_PAGEUP=1/2/3").unwrap();
        assert_eq!(keycode, "KEY_PAGEUP");
        assert_eq!(coord, Coordinate::new(1, 2, 3).unwrap());
    }

    #[test]
    fn test_parse_mapping_rejects_invalid() {
        assert!(matches!(
            parse_mapping("KEY_PAGEUP"),
            Err(ConfigError::InvalidMapping(_))
        ));
        assert_eq!(parse_mapping("=1/1/1"), Err(ConfigError::EmptyKeycode));
        assert_eq!(
            parse_mapping("KEY_A=0/1/1"),
            Err(ConfigError::Coordinate(CoordinateError::Zero {
                component: "page"
            }))
        );
    }

    #[test]
    fn test_remote_endpoint_urls() {
        let remote = RemoteEndpoint::new("companion.local", 8888);
        let coord = Coordinate::new(2, 1, 1).unwrap();
        assert_eq!(
            remote.press_url(coord),
            "http://companion.local:8888/api/location/2/1/1/press"
        );
        assert_eq!(remote.version_url(), "http://companion.local:8888/api/version");
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.device, DeviceIdentity::new(0x0483, 0x2080));
        assert_eq!(config.remote.to_string(), "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert!(config.probe);
        assert_eq!(config.action_map.len(), 3);
    }
}
