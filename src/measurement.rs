use crate::distance::{DistanceEstimate, DistanceModel};
use crate::error::{SamplingError, SamplingResult};
use crate::sampler::{Sampler, SignalReader};
use log::info;
use serde::Serialize;

/// Outcome of one sampling-and-estimation session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub average_rssi_dbm: f64,
    pub reading_count: usize,
    pub attempts: usize,
    pub model: DistanceModel,
    pub distance: DistanceEstimate,
}

/// Sample the reader once and estimate distance from the average
pub async fn measure<R>(
    reader: &mut R,
    sampler: &Sampler,
    model: &DistanceModel,
) -> SamplingResult<Measurement>
where
    R: SignalReader + ?Sized,
{
    let set = sampler.collect(reader).await?;
    let average_rssi_dbm = set.mean().ok_or(SamplingError::NoSignal {
        attempts: set.attempts(),
    })?;

    let distance = model.estimate(average_rssi_dbm);
    info!(
        "Average RSSI {:.2} dBm over {} readings, {} model estimate {}",
        average_rssi_dbm,
        set.len(),
        model.name(),
        distance
    );

    Ok(Measurement {
        average_rssi_dbm,
        reading_count: set.len(),
        attempts: set.attempts(),
        model: *model,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceUnit;
    use crate::sampler::RssiReading;
    use std::time::Duration;

    fn constant(rssi: f64) -> impl FnMut() -> SamplingResult<Vec<RssiReading>> {
        move || -> SamplingResult<Vec<RssiReading>> { Ok(vec![RssiReading::new("HomeNet", rssi)]) }
    }

    #[tokio::test]
    async fn test_end_to_end_lookup() {
        let sampler = Sampler::new(5, Duration::ZERO);
        let mut reader = constant(-55.0);

        let m = measure(&mut reader, &sampler, &DistanceModel::Lookup)
            .await
            .unwrap();
        assert_eq!(m.average_rssi_dbm, -55.0);
        assert_eq!(m.reading_count, 5);
        assert_eq!(m.attempts, 5);
        assert_eq!(m.distance, DistanceEstimate::meters(1.0));
    }

    #[tokio::test]
    async fn test_end_to_end_path_loss() {
        let sampler = Sampler::new(5, Duration::ZERO);
        let mut reader = constant(-55.0);
        let model = DistanceModel::path_loss(-59.0, 2.0);

        let m = measure(&mut reader, &sampler, &model).await.unwrap();
        assert_eq!(m.distance.unit, DistanceUnit::Centimeters);
        assert!((m.distance.value - 63.10).abs() < 0.01);
        assert_eq!(m.model, model);
    }

    #[tokio::test]
    async fn test_no_signal_produces_no_estimate() {
        let sampler = Sampler::new(3, Duration::ZERO);
        let mut reader = || -> SamplingResult<Vec<RssiReading>> { Ok(Vec::new()) };

        let err = measure(&mut reader, &sampler, &DistanceModel::Lookup)
            .await
            .unwrap_err();
        assert_eq!(err, SamplingError::NoSignal { attempts: 3 });
    }

    #[tokio::test]
    async fn test_query_failure_produces_no_estimate() {
        let sampler = Sampler::new(10, Duration::ZERO);
        let mut calls = 0;
        let mut reader = || -> SamplingResult<Vec<RssiReading>> {
            calls += 1;
            if calls == 3 {
                return Err(SamplingError::query_failed(Some(1), "netsh exited"));
            }
            Ok(vec![RssiReading::new("HomeNet", -40.0)])
        };

        let err = measure(&mut reader, &sampler, &DistanceModel::Lookup)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_serializes_to_json() {
        let m = Measurement {
            average_rssi_dbm: -55.0,
            reading_count: 5,
            attempts: 5,
            model: DistanceModel::Lookup,
            distance: DistanceEstimate::meters(1.0),
        };
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["average_rssi_dbm"], -55.0);
        assert_eq!(value["model"]["kind"], "lookup");
        assert_eq!(value["distance"]["unit"], "meters");
    }
}
