use crate::measurement::Measurement;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: DateTime<Utc>,
    #[serde(flatten)]
    measurement: &'a Measurement,
    category: &'static str,
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate_measurement_report(
        measurement: &Measurement,
        output: Option<&Path>,
        json: bool,
    ) -> Result<()> {
        let mut writer: Box<dyn Write> = match output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };

        if json {
            Self::write_json(&mut writer, measurement, Utc::now())
        } else {
            Self::write_text(&mut writer, measurement, Utc::now())
        }
    }

    fn write_text(
        writer: &mut dyn Write,
        measurement: &Measurement,
        generated: DateTime<Utc>,
    ) -> Result<()> {
        writeln!(writer, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(
            writer,
            "Readings: {} over {} samples",
            measurement.reading_count, measurement.attempts
        )?;
        writeln!(
            writer,
            "Average RSSI after {} samples: {:.2} dBm",
            measurement.attempts, measurement.average_rssi_dbm
        )?;
        writeln!(
            writer,
            "Estimated Distance: {} ({} model)",
            measurement.distance,
            measurement.model.name()
        )?;
        writeln!(writer, "Category: {}", measurement.distance.category())?;
        Ok(())
    }

    fn write_json(
        writer: &mut dyn Write,
        measurement: &Measurement,
        generated: DateTime<Utc>,
    ) -> Result<()> {
        let report = JsonReport {
            generated,
            measurement,
            category: measurement.distance.category(),
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceEstimate, DistanceModel};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample() -> Measurement {
        Measurement {
            average_rssi_dbm: -55.0,
            reading_count: 5,
            attempts: 5,
            model: DistanceModel::path_loss(-59.0, 2.0),
            distance: DistanceEstimate::centimeters(63.0957),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_text_report() {
        let mut buf = Vec::new();
        ReportGenerator::write_text(&mut buf, &sample(), fixed_time()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Generated: 2024-03-01 12:00:00 UTC"));
        assert!(text.contains("Average RSSI after 5 samples: -55.00 dBm"));
        assert!(text.contains("Estimated Distance: 63.10 cm (path_loss model)"));
        assert!(text.contains("Category: immediate (<1m)"));
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        ReportGenerator::write_json(&mut buf, &sample(), fixed_time()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["average_rssi_dbm"], -55.0);
        assert_eq!(value["model"]["kind"], "path_loss");
        assert_eq!(value["model"]["tx_power_dbm"], -59.0);
        assert_eq!(value["distance"]["unit"], "centimeters");
        assert_eq!(value["category"], "immediate (<1m)");
        assert_eq!(value["generated"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_report_to_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("report.txt");

        ReportGenerator::generate_measurement_report(&sample(), Some(path.as_path()), false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Estimated Distance: 63.10 cm"));
    }
}
