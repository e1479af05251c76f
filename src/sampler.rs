use crate::error::{SamplingError, SamplingResult};
use log::{debug, info, warn};
use macaddr::MacAddr6;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// One instantaneous signal measurement for a reported network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiReading {
    pub ssid: String,
    pub bssid: Option<MacAddr6>,
    pub rssi_dbm: f64,
}

impl RssiReading {
    pub fn new(ssid: impl Into<String>, rssi_dbm: f64) -> Self {
        RssiReading {
            ssid: ssid.into(),
            bssid: None,
            rssi_dbm,
        }
    }

    pub fn with_bssid(mut self, bssid: MacAddr6) -> Self {
        self.bssid = Some(bssid);
        self
    }
}

/// Source of signal readings, queried once per sampling attempt
///
/// An empty result means no connection is active right now. Any closure
/// returning the same type is a reader too.
pub trait SignalReader {
    fn read(&mut self) -> SamplingResult<Vec<RssiReading>>;
}

impl<F> SignalReader for F
where
    F: FnMut() -> SamplingResult<Vec<RssiReading>>,
{
    fn read(&mut self) -> SamplingResult<Vec<RssiReading>> {
        self()
    }
}

/// All readings collected in one sampling session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleSet {
    readings: Vec<RssiReading>,
    attempts: usize,
}

impl SampleSet {
    pub fn readings(&self) -> &[RssiReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of reader invocations that contributed
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Unweighted arithmetic mean, None when nothing was collected
    pub fn mean(&self) -> Option<f64> {
        if self.readings.is_empty() {
            return None;
        }
        let sum: f64 = self.readings.iter().map(|r| r.rssi_dbm).sum();
        Some(sum / self.readings.len() as f64)
    }
}

pub struct Sampler {
    sample_count: usize,
    inter_sample_delay: Duration,
}

impl Sampler {
    pub fn new(sample_count: usize, inter_sample_delay: Duration) -> Self {
        Sampler {
            sample_count,
            inter_sample_delay,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn inter_sample_delay(&self) -> Duration {
        self.inter_sample_delay
    }

    /// Query the reader `sample_count` times, pausing between attempts.
    ///
    /// The first reader error ends the session; nothing collected before it
    /// is returned.
    pub async fn collect<R>(&self, reader: &mut R) -> SamplingResult<SampleSet>
    where
        R: SignalReader + ?Sized,
    {
        let mut set = SampleSet::default();

        for attempt in 1..=self.sample_count {
            let readings = match reader.read() {
                Ok(readings) => readings,
                Err(e) => {
                    warn!(
                        "Sampling aborted on attempt {}/{}: {}",
                        attempt, self.sample_count, e
                    );
                    return Err(e);
                }
            };

            if readings.is_empty() {
                debug!("Attempt {}/{}: no networks reported", attempt, self.sample_count);
            }
            for reading in &readings {
                debug!(
                    "Sample RSSI for SSID '{}': {:.1} dBm",
                    reading.ssid, reading.rssi_dbm
                );
            }

            set.readings.extend(readings);
            set.attempts = attempt;

            if attempt < self.sample_count && !self.inter_sample_delay.is_zero() {
                sleep(self.inter_sample_delay).await;
            }
        }

        Ok(set)
    }

    /// Collect a session and reduce it to its average RSSI
    pub async fn aggregate<R>(&self, reader: &mut R) -> SamplingResult<f64>
    where
        R: SignalReader + ?Sized,
    {
        let set = self.collect(reader).await?;
        let average = set.mean().ok_or(SamplingError::NoSignal {
            attempts: set.attempts(),
        })?;

        info!(
            "Average RSSI after {} samples: {:.2} dBm",
            set.attempts(),
            average
        );
        Ok(average)
    }
}
