//! Target-location heat-index estimation
//!
//! Applies the calibrated linear blend to the target station's live inputs,
//! substituting the fallback station's inputs wholesale when the target is
//! incomplete. Substitution is all-or-nothing: mixing one station's
//! temperature with another's humidity would produce a value neither
//! location ever saw.
//!
//! When both stations are incomplete the estimator fails with
//! [`NoDataAvailable`](crate::errors::MonitorError::NoDataAvailable) and the
//! cycle keeps the last known zone instead of fabricating one.

use log::warn;

use crate::{
    calibration::estimated_index,
    errors::{MonitorError, MonitorResult},
    readings::{HeatIndexEstimate, Reading},
    zone::ZoneThresholds,
};

/// Computes classified heat-index estimates for the target location
#[derive(Debug, Clone)]
pub struct HeatIndexEstimator {
    thresholds: ZoneThresholds,
}

impl HeatIndexEstimator {
    /// Estimator over a validated threshold table
    pub fn new(thresholds: ZoneThresholds) -> Self {
        Self { thresholds }
    }

    /// Estimate and classify using target inputs, falling back if needed
    ///
    /// `offset` is the effective calibration offset already resolved by the
    /// caller's fallback policy (zero when calibration failed and no prior
    /// offset is being reused).
    pub fn estimate(
        &self,
        target: &Reading,
        fallback: &Reading,
        offset: f32,
    ) -> MonitorResult<HeatIndexEstimate> {
        let (temp, rh, used_fallback) = if let Some((t, rh)) = target.complete() {
            (t, rh, false)
        } else if let Some((t, rh)) = fallback.complete() {
            warn!(
                "estimator: target station {} incomplete, using fallback {}",
                target.station_id, fallback.station_id
            );
            (t, rh, true)
        } else {
            return Err(MonitorError::NoDataAvailable);
        };

        let value = estimated_index(temp, rh) + offset;
        Ok(HeatIndexEstimate {
            value,
            zone: self.thresholds.classify(value),
            used_fallback,
        })
    }
}
