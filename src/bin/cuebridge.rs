// Cuebridge CLI
// Bridges a USB presenter remote to a Companion-style HTTP button API

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::error;

use cuebridge_core::config::{self, parse_hex_id, parse_mapping};
use cuebridge_core::{
    ActionMap, Bridge, BridgeConfig, BridgeError, ConfigError, Coordinate, DeviceIdentity,
    EvdevLocator, HttpDispatcher, LocateError, RemoteEndpoint, Shutdown, ShutdownSignal,
};

/// Trigger remote buttons from a USB presenter remote
#[derive(Parser, Debug)]
#[command(name = "cuebridge")]
#[command(author = "cuebridge contributors")]
#[command(version)]
#[command(about = "Trigger remote HTTP buttons from a USB presenter remote", long_about = None)]
struct Args {
    /// USB vendor id of the remote's receiver (hex)
    #[arg(long, value_name = "HEX", default_value = "0x0483", value_parser = parse_hex_id)]
    vendor_id: u16,

    /// USB product id of the remote's receiver (hex)
    #[arg(long, value_name = "HEX", default_value = "0x2080", value_parser = parse_hex_id)]
    product_id: u16,

    /// Host of the remote HTTP API
    #[arg(long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port of the remote HTTP API
    #[arg(long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Timeout for each HTTP request in milliseconds
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_ms: u64,

    /// Map a keycode to a button, e.g. KEY_LEFT=2/1/1 (can be used multiple
    /// times; replaces the built-in table)
    #[arg(short, long = "map", value_name = "KEYCODE=PAGE/ROW/COLUMN", value_parser = parse_mapping)]
    mappings: Vec<(String, Coordinate)>,

    /// Do not query the remote API version at startup
    #[arg(long)]
    skip_probe: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// List readable input devices with their ids and exit
    #[arg(long)]
    list_devices: bool,
}

impl Args {
    fn to_config(&self) -> Result<BridgeConfig, ConfigError> {
        let action_map = if self.mappings.is_empty() {
            ActionMap::default()
        } else {
            ActionMap::new(self.mappings.iter().cloned())?
        };

        Ok(BridgeConfig::default()
            .with_device(DeviceIdentity::new(self.vendor_id, self.product_id))
            .with_remote(RemoteEndpoint::new(self.host.clone(), self.port))
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_probe(!self.skip_probe)
            .with_action_map(action_map))
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

fn print_banner() {
    println!("\n{}", "=".repeat(60));
    println!("   CUEBRIDGE: PRESENTER REMOTE -> HTTP BUTTONS");
    println!("{}\n", "=".repeat(60));
}

fn list_devices() {
    let devices = EvdevLocator::list_devices();
    if devices.is_empty() {
        println!("No readable input devices found.");
        println!("Run as root or add your user to the 'input' group.");
        return;
    }
    println!("Found {} input device(s):", devices.len());
    for device in &devices {
        println!(
            "  {}: {} (0x{:04x}:0x{:04x})",
            device.path.display(),
            device.name,
            device.identity.vendor,
            device.identity.product
        );
    }
}

/// Operator hints for a device that is absent at startup
fn not_found_report(identity: DeviceIdentity, scanned: usize) -> Vec<String> {
    let mut lines = vec![
        "[!] Device not found!".to_string(),
        "    Make sure the USB receiver is connected.".to_string(),
        format!("    (Looking for {})", identity),
    ];
    if scanned == 0 {
        lines.push(
            "    No input device could be opened; run as root or join the 'input' group."
                .to_string(),
        );
    }
    lines
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = args.to_config().context("Invalid configuration")?;

    print_banner();

    let shutdown = ShutdownSignal::install().context("Failed to install signal handlers")?;
    let locator = EvdevLocator::new(shutdown);
    let dispatcher = HttpDispatcher::new(config.remote.clone(), config.timeout);
    let mut bridge = Bridge::new(&config, &dispatcher);

    match bridge.run(&locator) {
        Ok(Shutdown::Interrupted) => {
            println!("\n[*] Stopped.");
            Ok(ExitCode::SUCCESS)
        }
        Err(BridgeError::Locate(LocateError::DeviceNotFound { identity, scanned })) => {
            for line in not_found_report(identity, scanned) {
                println!("{}", line);
            }
            Ok(ExitCode::FAILURE)
        }
        // Cause already logged by the bridge
        Err(BridgeError::Device(_)) => Ok(ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    if args.list_devices {
        list_devices();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["cuebridge"]);

        assert_eq!(args.vendor_id, 0x0483);
        assert_eq!(args.product_id, 0x2080);
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 8000);
        assert_eq!(args.timeout_ms, 2000);
        assert!(args.mappings.is_empty());
        assert!(!args.skip_probe);
        assert!(!args.verbose);
        assert!(!args.list_devices);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "cuebridge",
            "--vendor-id",
            "1d57",
            "--product-id",
            "0xad03",
            "--host",
            "10.0.0.5",
            "--port",
            "8888",
            "--timeout-ms",
            "500",
            "--map",
            "KEY_PAGEUP=1/1/1",
            "-m",
            "KEY_PAGEDOWN=1/1/2",
            "--skip-probe",
            "--verbose",
        ]);

        assert_eq!(args.vendor_id, 0x1d57);
        assert_eq!(args.product_id, 0xad03);
        assert_eq!(args.mappings.len(), 2);
        assert_eq!(args.mappings[0].0, "KEY_PAGEUP");
        assert!(args.skip_probe);
        assert!(args.verbose);

        let config = args.to_config().unwrap();
        assert_eq!(config.device, DeviceIdentity::new(0x1d57, 0xad03));
        assert_eq!(config.remote.to_string(), "http://10.0.0.5:8888");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert!(!config.probe);
        assert_eq!(config.action_map.len(), 2);
        assert_eq!(
            config.action_map.lookup("KEY_PAGEDOWN"),
            Some(Coordinate::new(1, 1, 2).unwrap())
        );
        assert_eq!(config.action_map.lookup("KEY_LEFT"), None);
    }

    #[test]
    fn test_args_default_table() {
        let args = Args::parse_from(["cuebridge"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.action_map, ActionMap::default());
        assert!(config.probe);
    }

    #[test]
    fn test_args_reject_bad_values() {
        assert!(Args::try_parse_from(["cuebridge", "--vendor-id", "xyz"]).is_err());
        assert!(Args::try_parse_from(["cuebridge", "--map", "KEY_A"]).is_err());
        assert!(Args::try_parse_from(["cuebridge", "--map", "KEY_A=0/1/1"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Args::try_parse_from(["cuebridge", "--timeout-ms", "0"]).is_err());
        let args = Args::try_parse_from(["cuebridge", "--timeout-ms", "1"]).unwrap();
        assert_eq!(args.timeout_ms, 1);
    }

    #[test]
    fn test_duplicate_mapping_rejected() {
        let args = Args::parse_from(["cuebridge", "-m", "KEY_A=1/1/1", "-m", "KEY_A=1/1/2"]);
        assert_eq!(
            args.to_config().unwrap_err(),
            ConfigError::DuplicateKeycode("KEY_A".to_string())
        );
    }

    #[test]
    fn test_not_found_report() {
        let identity = DeviceIdentity::new(0x0483, 0x2080);

        let lines = not_found_report(identity, 3);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[!] Device not found!");
        assert_eq!(lines[2], "    (Looking for Vendor: 0x0483, Product: 0x2080)");

        let lines = not_found_report(identity, 0);
        assert_eq!(lines.len(), 4);
        assert!(lines[3].contains("'input' group"));
    }

    #[test]
    fn test_args_list_devices() {
        let args = Args::parse_from(["cuebridge", "--list-devices"]);
        assert!(args.list_devices);
    }
}
