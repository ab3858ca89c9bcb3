//! Cross-station calibration
//!
//! The linear temperature/humidity blend systematically under- or
//! over-shoots the officially measured heat index depending on local
//! conditions. Reference stations publish both the official value and the
//! raw inputs, so each one yields a correction `actual - estimated`; the
//! mean over the stations that reported everything becomes the cycle's
//! offset.
//!
//! A station missing any of the three values, or reporting a non-finite
//! one, is excluded rather than defaulted - a silent zero would drag the
//! mean toward garbage. Zero usable stations is a hard
//! [`CalibrationUnavailable`](crate::errors::MonitorError::CalibrationUnavailable):
//! the engine never emits NaN, and the caller's configured fallback policy
//! takes over.

use heapless::Vec;
use log::{debug, warn};

use crate::{
    constants::{
        calibration::MAX_REFERENCE_STATIONS,
        estimate::{HUMIDITY_WEIGHT, TEMP_WEIGHT},
    },
    errors::{MonitorError, MonitorResult},
    readings::{CalibrationResult, ReferenceObservation},
};

/// Uncalibrated heat-index estimate from raw inputs
///
/// Shared by the calibration engine (to reconstruct what the estimator
/// would have produced at a reference station) and the estimator itself.
#[inline]
pub fn estimated_index(temperature: f32, relative_humidity: f32) -> f32 {
    TEMP_WEIGHT * temperature + HUMIDITY_WEIGHT * relative_humidity
}

/// Derive the correction offset from reference observations
///
/// Observations beyond [`MAX_REFERENCE_STATIONS`] are ignored with a
/// warning; the deployment's station map should never exceed the bound.
pub fn calibrate(observations: &[ReferenceObservation]) -> MonitorResult<CalibrationResult> {
    let mut offsets: Vec<f32, MAX_REFERENCE_STATIONS> = Vec::new();

    for obs in observations {
        let Some(offset) = station_offset(obs) else {
            debug!(
                "calibration: excluding station {} (incomplete observation)",
                obs.station_id
            );
            continue;
        };

        if offsets.push(offset).is_err() {
            warn!(
                "calibration: more than {} reference stations, ignoring {}",
                MAX_REFERENCE_STATIONS, obs.station_id
            );
            break;
        }
        debug!("calibration: station {} offset {:.3}", obs.station_id, offset);
    }

    if offsets.is_empty() {
        return Err(MonitorError::CalibrationUnavailable {
            stations_seen: observations.len(),
        });
    }

    let offset = offsets.iter().sum::<f32>() / offsets.len() as f32;
    Ok(CalibrationResult {
        offset,
        valid_station_count: offsets.len(),
    })
}

/// Per-station correction, if the observation is usable
fn station_offset(obs: &ReferenceObservation) -> Option<f32> {
    let actual = obs.actual_heat_index.filter(|v| v.is_finite())?;
    let temp = obs.temperature.filter(|v| v.is_finite())?;
    let rh = obs.relative_humidity.filter(|v| v.is_finite())?;
    Some(actual - estimated_index(temp, rh))
}
