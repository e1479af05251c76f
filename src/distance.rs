//! Distance estimation from RSSI signal strength
//!
//! Two models are kept side by side:
//! - Bucketed lookup: fixed RSSI ranges mapped to distances in meters
//! - Log-distance path loss: distance = 10 ^ ((tx_power - rssi) / (10 * n)), in centimeters
//!
//! Where:
//! - tx_power: Reference signal strength at 1 meter (dBm)
//! - rssi: Measured signal strength (dBm)
//! - n: Path loss exponent (environment dependent)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default reference signal at 1 meter for the path-loss model (dBm)
pub const DEFAULT_TX_POWER_DBM: f64 = -59.0;

/// Default path-loss exponent (free space)
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = environments::FREE_SPACE;

/// Lookup buckets, strongest first: (lower bound in dBm, distance in meters)
const LOOKUP_BUCKETS: [(f64, f64); 6] = [
    (-40.0, 0.1),
    (-50.0, 0.5),
    (-55.0, 1.0),
    (-60.0, 1.5),
    (-65.0, 2.0),
    (-70.0, 3.0),
];

/// Distance for anything weaker than the last bucket
const LOOKUP_FLOOR_M: f64 = 5.0;

/// Estimate distance in meters with the bucketed lookup table
///
/// Buckets are half-open `[lower, upper)`, so -50 dBm lands in the 0.5m bucket
/// and -70 dBm in the 3.0m bucket.
/// Inputs that fall below every bound (including NaN) map to 5.0m.
pub fn lookup_distance_m(rssi_dbm: f64) -> f64 {
    LOOKUP_BUCKETS
        .iter()
        .find(|(lower, _)| rssi_dbm >= *lower)
        .map(|&(_, distance)| distance)
        .unwrap_or(LOOKUP_FLOOR_M)
}

/// Estimate distance in centimeters with the log-distance path loss model
///
/// # Arguments
/// * `rssi_dbm` - Received signal strength in dBm
/// * `tx_power_dbm` - Reference signal at 1 meter
/// * `path_loss_exponent` - Environment factor (2.0=free space, 3.0=indoor, 4.0=dense obstacles)
///
/// At `rssi_dbm == tx_power_dbm` the result is exactly 100cm.
pub fn path_loss_distance_cm(rssi_dbm: f64, tx_power_dbm: f64, path_loss_exponent: f64) -> f64 {
    let exponent = (tx_power_dbm - rssi_dbm) / (10.0 * path_loss_exponent);
    10.0_f64.powf(exponent) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Meters,
    Centimeters,
}

impl DistanceUnit {
    fn per_meter(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Centimeters => 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "meters",
            DistanceUnit::Centimeters => "cm",
        }
    }
}

/// A distance value together with the unit its model produces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl DistanceEstimate {
    pub fn meters(value: f64) -> Self {
        DistanceEstimate {
            value,
            unit: DistanceUnit::Meters,
        }
    }

    pub fn centimeters(value: f64) -> Self {
        DistanceEstimate {
            value,
            unit: DistanceUnit::Centimeters,
        }
    }

    pub fn as_meters(&self) -> f64 {
        self.value / self.unit.per_meter()
    }

    pub fn category(&self) -> &'static str {
        distance_category(self.as_meters())
    }
}

impl fmt::Display for DistanceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.label())
    }
}

/// Propagation model used to turn an aggregate RSSI into a distance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceModel {
    /// Bucketed lookup table, meters
    #[default]
    Lookup,
    /// Log-distance path loss, centimeters
    PathLoss {
        tx_power_dbm: f64,
        path_loss_exponent: f64,
    },
}

impl DistanceModel {
    pub fn path_loss(tx_power_dbm: f64, path_loss_exponent: f64) -> Self {
        DistanceModel::PathLoss {
            tx_power_dbm,
            path_loss_exponent,
        }
    }

    pub fn estimate(&self, rssi_dbm: f64) -> DistanceEstimate {
        match *self {
            DistanceModel::Lookup => DistanceEstimate::meters(lookup_distance_m(rssi_dbm)),
            DistanceModel::PathLoss {
                tx_power_dbm,
                path_loss_exponent,
            } => DistanceEstimate::centimeters(path_loss_distance_cm(
                rssi_dbm,
                tx_power_dbm,
                path_loss_exponent,
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceModel::Lookup => "lookup",
            DistanceModel::PathLoss { .. } => "path_loss",
        }
    }
}

/// Get a human-readable distance category
pub fn distance_category(distance_m: f64) -> &'static str {
    match distance_m {
        d if d < 1.0 => "immediate (<1m)",
        d if d < 3.0 => "very close (1-3m)",
        d if d < 10.0 => "close (3-10m)",
        d if d < 20.0 => "nearby (10-20m)",
        d if d < 40.0 => "far (20-40m)",
        _ => "very far (>40m)",
    }
}

/// Typical path loss exponents for different environments
pub mod environments {
    pub const FREE_SPACE: f64 = 2.0;
    pub const OPEN_INDOOR: f64 = 2.5;
    pub const TYPICAL_INDOOR: f64 = 3.0;
    pub const DENSE_INDOOR: f64 = 3.5;
    pub const HEAVY_OBSTACLES: f64 = 4.0;
}
