//! Shared constants for the monitoring core
//!
//! Centralizes the numeric policy of the pipeline so the formula weights,
//! station limits, and reference intervals are documented in one place
//! rather than scattered as magic numbers.

/// Heat-index estimation weights
///
/// The estimate is a linear blend of dry-bulb temperature and relative
/// humidity, calibrated against officially measured heat-index stations:
///
/// ```text
/// estimate = TEMP_WEIGHT * temperature + HUMIDITY_WEIGHT * humidity + offset
/// ```
///
/// The weights match the deployed service's empirical fit for the target
/// region; the per-cycle `offset` absorbs local drift.
pub mod estimate {
    /// Weight applied to dry-bulb temperature (degrees Celsius)
    pub const TEMP_WEIGHT: f32 = 0.7;

    /// Weight applied to relative humidity (percent)
    pub const HUMIDITY_WEIGHT: f32 = 0.2;
}

/// Calibration limits
pub mod calibration {
    /// Maximum number of reference stations consulted per cycle
    ///
    /// Bounds the per-cycle offset buffer; observations beyond this are
    /// ignored with a warning.
    pub const MAX_REFERENCE_STATIONS: usize = 3;
}

/// Default zone boundaries (degrees, heat-index units)
///
/// These reproduce the deployed WBGT table; deployments override them
/// through [`ZoneThresholds`](crate::zone::ZoneThresholds) in configuration.
pub mod zones {
    /// Readings at or above this are at least Yellow
    pub const DEFAULT_YELLOW_FROM: f32 = 31.0;

    /// Readings at or above this are at least Red
    pub const DEFAULT_RED_FROM: f32 = 32.0;

    /// Readings at or above this are Black
    pub const DEFAULT_BLACK_FROM: f32 = 33.0;
}

/// Reference polling intervals (seconds)
///
/// The core never schedules anything itself; these are the defaults handed
/// to whatever timer drives [`Monitor::run_cycle`](crate::monitor::Monitor).
pub mod schedule {
    /// Change-detection cycle interval
    pub const DEFAULT_CHANGE_POLL_SECS: u64 = 120;

    /// Scheduled-broadcast cycle interval
    pub const DEFAULT_SCHEDULED_BROADCAST_SECS: u64 = 600;
}
