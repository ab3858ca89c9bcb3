//! Monitor configuration
//!
//! Everything that is deployment policy rather than pipeline mechanics:
//! which stations feed the estimate, which sector the advisory filter
//! watches, where the zone boundaries sit, and what happens when
//! calibration fails. Deserializable so deployments ship it as a config
//! file.

use serde::{Deserialize, Serialize};

use crate::{
    constants::schedule::{DEFAULT_CHANGE_POLL_SECS, DEFAULT_SCHEDULED_BROADCAST_SECS},
    zone::ZoneThresholds,
};

/// What to do when no reference station calibrates this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationFallback {
    /// Reuse the offset from the last successful calibration (default);
    /// zero if there has never been one
    #[default]
    ReuseLast,
    /// Proceed with offset zero
    Zero,
}

/// Poll intervals handed to the external scheduler, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollIntervals {
    /// Change-detection cycle interval
    pub change_poll_secs: u64,
    /// Scheduled full-broadcast interval
    pub scheduled_broadcast_secs: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            change_poll_secs: DEFAULT_CHANGE_POLL_SECS,
            scheduled_broadcast_secs: DEFAULT_SCHEDULED_BROADCAST_SECS,
        }
    }
}

/// Deployment policy for one monitored sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sector identifier watched in the advisory feed
    pub sector: String,
    /// Station whose readings drive the estimate
    pub target_station: String,
    /// Station substituted when the target is incomplete
    pub fallback_station: String,
    /// Stations with officially measured heat index, for calibration
    pub reference_stations: Vec<String>,
    /// Zone boundary table
    #[serde(default)]
    pub thresholds: ZoneThresholds,
    /// Policy when calibration fails
    #[serde(default)]
    pub calibration_fallback: CalibrationFallback,
    /// Poll intervals for the external scheduler
    #[serde(default)]
    pub intervals: PollIntervals,
}
