//! Heat-stress zone classification
//!
//! Maps a numeric heat-index value onto the four-step risk ladder used by
//! the deployed advisory scheme. Classification is a pure function of the
//! value and the configured thresholds: same input, same zone, always.
//!
//! Thresholds are policy, not physics, so they arrive through configuration
//! and are validated once at construction. The defaults reproduce the WBGT
//! table the service shipped with (31/32/33).

use serde::{Deserialize, Serialize};

use crate::{
    constants::zones::{DEFAULT_BLACK_FROM, DEFAULT_RED_FROM, DEFAULT_YELLOW_FROM},
    errors::{MonitorError, MonitorResult},
};

/// Discrete heat-stress risk category, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Normal outdoor activity
    Green,
    /// Elevated caution, shortened work cycles
    Yellow,
    /// High risk, frequent rest
    Red,
    /// Severe risk, curtail outdoor activity
    Black,
}

impl Zone {
    /// Short code line used in message headers
    pub const fn code(&self) -> &'static str {
        match self {
            Zone::Green => "Code Green",
            Zone::Yellow => "Code Yellow",
            Zone::Red => "Code Red",
            Zone::Black => "Code Black",
        }
    }

    /// Advisory content attached to this zone
    pub const fn advisory(&self) -> ZoneAdvisory {
        match self {
            Zone::Green => ZoneAdvisory {
                work_rest: "45min work : 15min rest",
                hydration: "Consume 0.5L/hour of water during activity",
            },
            Zone::Yellow => ZoneAdvisory {
                work_rest: "30min work : 15min rest",
                hydration: "Hydrate 0.5L/hour of water! Monitor body for signs \
                            and symptoms of heat-related illness!",
            },
            Zone::Red => ZoneAdvisory {
                work_rest: "30min work : 30min rest",
                hydration: "Take frequent breaks & hydrate 0.75L/hour of water! \
                            Monitor body for signs and symptoms of heat-related illness!",
            },
            Zone::Black => ZoneAdvisory {
                work_rest: "15min work : 30min rest",
                hydration: "Hydrate 0.75L/hour of water! Delay & postpone \
                            outdoor activity if possible",
            },
        }
    }
}

/// Work-rest cycle and hydration guidance for a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneAdvisory {
    /// Recommended work-to-rest ratio
    pub work_rest: &'static str,
    /// Hydration and monitoring guidance
    pub hydration: &'static str,
}

/// Ascending zone boundaries
///
/// A value below `yellow_from` is Green; at or above `black_from` it is
/// Black. Boundaries are half-open lower bounds, so the mapping is total and
/// non-overlapping by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdTable")]
pub struct ZoneThresholds {
    yellow_from: f32,
    red_from: f32,
    black_from: f32,
}

/// Raw threshold table as it appears in configuration
///
/// Deserialization funnels through [`ZoneThresholds::new`] so a config file
/// cannot smuggle in unordered boundaries.
#[derive(Debug, Clone, Copy, Deserialize)]
struct ThresholdTable {
    yellow_from: f32,
    red_from: f32,
    black_from: f32,
}

impl TryFrom<ThresholdTable> for ZoneThresholds {
    type Error = MonitorError;

    fn try_from(table: ThresholdTable) -> MonitorResult<Self> {
        Self::new(table.yellow_from, table.red_from, table.black_from)
    }
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            yellow_from: DEFAULT_YELLOW_FROM,
            red_from: DEFAULT_RED_FROM,
            black_from: DEFAULT_BLACK_FROM,
        }
    }
}

impl ZoneThresholds {
    /// Create thresholds, rejecting boundaries that are not strictly ascending
    pub fn new(yellow_from: f32, red_from: f32, black_from: f32) -> MonitorResult<Self> {
        if !(yellow_from.is_finite() && red_from.is_finite() && black_from.is_finite()) {
            return Err(MonitorError::InvalidConfig("zone thresholds must be finite"));
        }
        if !(yellow_from < red_from && red_from < black_from) {
            return Err(MonitorError::InvalidConfig(
                "zone thresholds must be strictly ascending",
            ));
        }
        Ok(Self {
            yellow_from,
            red_from,
            black_from,
        })
    }

    /// Classify a heat-index value
    pub fn classify(&self, value: f32) -> Zone {
        if value >= self.black_from {
            Zone::Black
        } else if value >= self.red_from {
            Zone::Red
        } else if value >= self.yellow_from {
            Zone::Yellow
        } else {
            Zone::Green
        }
    }
}
