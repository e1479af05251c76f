pub mod config;
pub mod distance;
pub mod error;
pub mod measurement;
pub mod report;
pub mod sampler;
pub mod wlan;

pub use config::Config;
pub use distance::{DistanceEstimate, DistanceModel};
pub use error::SamplingError;
pub use measurement::{measure, Measurement};
pub use sampler::{RssiReading, Sampler, SignalReader};
