use crate::error::{SamplingError, SamplingResult};
use crate::sampler::{RssiReading, SignalReader};
use log::{debug, trace};
use macaddr::MacAddr6;
use std::io::ErrorKind;
use std::process::Command;

const NETSH: &str = "netsh";
const NETSH_ARGS: [&str; 3] = ["wlan", "show", "interfaces"];

/// Convert a Windows signal quality percentage to approximate dBm
pub fn quality_to_dbm(quality_percent: u8) -> f64 {
    f64::from(quality_percent) * 0.5 - 100.0
}

/// Reads the current connection's signal through `netsh wlan show interfaces`
#[derive(Debug)]
pub struct NetshReader {
    program: String,
}

impl NetshReader {
    /// Fails with `UnsupportedPlatform` anywhere but Windows
    pub fn new() -> SamplingResult<Self> {
        if !cfg!(windows) {
            return Err(SamplingError::UnsupportedPlatform(
                std::env::consts::OS.to_string(),
            ));
        }
        Ok(NetshReader {
            program: NETSH.to_string(),
        })
    }

    fn query(&self) -> SamplingResult<String> {
        let output = match Command::new(&self.program).args(NETSH_ARGS).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SamplingError::UnsupportedPlatform(format!(
                    "{} not available: {}",
                    self.program, e
                )));
            }
            Err(e) => {
                return Err(SamplingError::query_failed(
                    None,
                    format!("failed to execute {}: {}", self.program, e),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SamplingError::query_failed(
                output.status.code(),
                stderr.trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SignalReader for NetshReader {
    fn read(&mut self) -> SamplingResult<Vec<RssiReading>> {
        let stdout = self.query()?;
        trace!("netsh output:\n{}", stdout);
        Ok(parse_netsh_interfaces(&stdout))
    }
}

/// The signal reader for the current host
pub fn platform_reader() -> SamplingResult<Box<dyn SignalReader>> {
    Ok(Box::new(NetshReader::new()?))
}

#[derive(Default)]
struct PendingInterface {
    ssid: Option<String>,
    bssid: Option<MacAddr6>,
}

/// Parse `netsh wlan show interfaces` output into readings
///
/// Every interface block that reports an SSID and a `Signal : NN%` line yields
/// one reading. Disconnected interfaces report no signal and yield nothing.
pub fn parse_netsh_interfaces(output: &str) -> Vec<RssiReading> {
    let mut readings = Vec::new();
    let mut current = PendingInterface::default();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "Name" => current = PendingInterface::default(),
            "SSID" => current.ssid = Some(value.to_string()),
            "BSSID" | "AP BSSID" => {
                current.bssid = value.parse().ok();
                if current.bssid.is_none() {
                    debug!("Unparsable BSSID: {}", value);
                }
            }
            "Signal" => {
                let Some(quality) = value
                    .strip_suffix('%')
                    .and_then(|q| q.trim().parse::<u8>().ok())
                else {
                    debug!("Unparsable signal value: {}", value);
                    continue;
                };
                let Some(ssid) = current.ssid.take() else {
                    continue;
                };

                let mut reading = RssiReading::new(ssid, quality_to_dbm(quality));
                if let Some(bssid) = current.bssid.take() {
                    reading = reading.with_bssid(bssid);
                }
                readings.push(reading);
            }
            _ => {}
        }
    }

    readings
}
