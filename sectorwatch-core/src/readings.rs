//! Telemetry data model
//!
//! Transient values flowing between pipeline stages. Every field that a
//! sensor outage can knock out is an `Option`; the stages downstream decide
//! what absence means (fallback substitution, skipped update, excluded
//! calibration station) instead of the fetch layer inventing placeholders.

use serde::{Deserialize, Serialize};

use crate::{time::Timestamp, zone::Zone};

/// Live temperature/humidity reading from one station
///
/// Either field may be absent when the station's sensor is down or the feed
/// omitted it. Non-finite values are treated as absent by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Station identifier as used by the weather source
    pub station_id: String,
    /// Dry-bulb temperature in degrees Celsius
    pub temperature: Option<f32>,
    /// Relative humidity in percent
    pub relative_humidity: Option<f32>,
    /// When the source observed these values
    pub timestamp: Option<Timestamp>,
}

impl Reading {
    /// Reading with no usable fields, for a station that is entirely offline
    pub fn empty(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            temperature: None,
            relative_humidity: None,
            timestamp: None,
        }
    }

    /// Temperature and humidity, if both present and finite
    pub fn complete(&self) -> Option<(f32, f32)> {
        match (self.temperature, self.relative_humidity) {
            (Some(t), Some(rh)) if t.is_finite() && rh.is_finite() => Some((t, rh)),
            _ => None,
        }
    }
}

/// Officially measured heat index at a reference station
///
/// Used only by the calibration engine to derive the correction offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObservation {
    /// Station identifier as used by the weather source
    pub station_id: String,
    /// Officially published heat-index value
    pub actual_heat_index: Option<f32>,
    /// Dry-bulb temperature in degrees Celsius
    pub temperature: Option<f32>,
    /// Relative humidity in percent
    pub relative_humidity: Option<f32>,
}

/// Outcome of a successful calibration pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Mean of (actual - estimated) over the valid reference stations
    pub offset: f32,
    /// Number of stations that contributed to the mean (at least 1)
    pub valid_station_count: usize,
}

/// Classified heat-index estimate for the target location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatIndexEstimate {
    /// Calibrated heat-index value
    pub value: f32,
    /// Risk zone the value falls in
    pub zone: Zone,
    /// True when the fallback station supplied the inputs
    pub used_fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_requires_both_fields() {
        let mut r = Reading::empty("S106");
        assert_eq!(r.complete(), None);

        r.temperature = Some(30.0);
        assert_eq!(r.complete(), None);

        r.relative_humidity = Some(80.0);
        assert_eq!(r.complete(), Some((30.0, 80.0)));
    }

    #[test]
    fn complete_rejects_non_finite() {
        let r = Reading {
            station_id: "S106".into(),
            temperature: Some(f32::NAN),
            relative_humidity: Some(80.0),
            timestamp: None,
        };
        assert_eq!(r.complete(), None);
    }
}
