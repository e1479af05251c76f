use crate::distance::{DistanceModel, DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_TX_POWER_DBM};
use crate::sampler::Sampler;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Lookup,
    PathLoss,
}

impl ModelKind {
    /// Samples taken per session when none are configured
    pub fn default_sample_count(self) -> usize {
        match self {
            ModelKind::Lookup => 5,
            ModelKind::PathLoss => 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of signal queries per session; defaults by model when unset
    pub sample_count: Option<usize>,
    /// Pause between consecutive queries, in seconds
    pub inter_sample_delay_secs: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            sample_count: None,
            inter_sample_delay_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub model: ModelKind,
    /// Reference signal strength at 1 meter (dBm)
    pub tx_power_dbm: f64,
    /// Path loss exponent: 2.0 = free space, 2.5-4.0 = indoors with obstacles
    pub path_loss_exponent: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            model: ModelKind::Lookup,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
        }
    }
}

impl EstimatorConfig {
    pub fn distance_model(&self) -> DistanceModel {
        match self.model {
            ModelKind::Lookup => DistanceModel::Lookup,
            ModelKind::PathLoss => {
                DistanceModel::path_loss(self.tx_power_dbm, self.path_loss_exponent)
            }
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.sampler
            .sample_count
            .unwrap_or_else(|| self.estimator.model.default_sample_count())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_count() == 0 {
            bail!("sample_count must be at least 1");
        }
        let delay = self.sampler.inter_sample_delay_secs;
        if !delay.is_finite() || delay < 0.0 {
            bail!("inter_sample_delay_secs must be a non-negative number, got {}", delay);
        }
        if !self.estimator.tx_power_dbm.is_finite() {
            bail!("tx_power_dbm must be finite");
        }
        let n = self.estimator.path_loss_exponent;
        if !n.is_finite() || n <= 0.0 {
            bail!("path_loss_exponent must be positive, got {}", n);
        }
        Ok(())
    }

    pub fn build_sampler(&self) -> Result<Sampler> {
        self.validate()?;
        let delay = Duration::try_from_secs_f64(self.sampler.inter_sample_delay_secs)
            .context("Invalid inter-sample delay")?;
        Ok(Sampler::new(self.sample_count(), delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.sample_count(), 5);
        assert_eq!(config.estimator.distance_model(), DistanceModel::Lookup);

        let sampler = config.build_sampler().unwrap();
        assert_eq!(sampler.sample_count(), 5);
        assert_eq!(sampler.inter_sample_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_sample_count_defaults_by_model() {
        let mut config = Config::default();
        config.estimator.model = ModelKind::PathLoss;
        assert_eq!(config.sample_count(), 10);

        config.sampler.sample_count = Some(3);
        assert_eq!(config.sample_count(), 3);
    }

    #[test]
    fn test_path_loss_model_uses_overrides() {
        let mut config = Config::default();
        config.estimator.model = ModelKind::PathLoss;
        config.estimator.tx_power_dbm = -45.0;
        config.estimator.path_loss_exponent = 3.0;

        assert_eq!(
            config.estimator.distance_model(),
            DistanceModel::path_loss(-45.0, 3.0)
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.sampler.sample_count = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sampler.inter_sample_delay_secs = -0.1;
        assert!(config.validate().is_err());
        assert!(config.build_sampler().is_err());

        let mut config = Config::default();
        config.sampler.inter_sample_delay_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.estimator.path_loss_exponent = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.estimator.tx_power_dbm = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "estimator": { "model": "path_loss" } }"#).unwrap();
        assert_eq!(config.estimator.model, ModelKind::PathLoss);
        assert_eq!(config.estimator.tx_power_dbm, -59.0);
        assert_eq!(config.estimator.path_loss_exponent, 2.0);
        assert_eq!(config.sampler.inter_sample_delay_secs, 0.5);
        assert_eq!(config.sample_count(), 10);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");

        let mut original = Config::default();
        original.sampler.sample_count = Some(7);
        original.estimator.model = ModelKind::PathLoss;
        original.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.sampler.sample_count, Some(7));
        assert_eq!(loaded.estimator.model, ModelKind::PathLoss);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempdir().unwrap();
        assert!(Config::load(tmp.path().join("absent.json")).is_err());
    }
}
