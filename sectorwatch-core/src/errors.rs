//! Error types for the decision pipeline
//!
//! Every failure in the core is recoverable by design: a bad cycle degrades
//! to "no update this cycle" and the polling loop carries on. The enum stays
//! small and `Copy` so errors can be returned from hot paths and matched on
//! without allocation.
//!
//! ## Taxonomy
//!
//! - `CalibrationUnavailable`: no reference station produced a usable
//!   actual-vs-estimated pair this cycle. The caller decides between reusing
//!   the last good offset and falling back to zero (see
//!   [`CalibrationFallback`](crate::config::CalibrationFallback)).
//! - `NoDataAvailable`: target and fallback stations both missing a required
//!   field. The zone update is skipped; the last known zone is kept.
//! - `InvalidConfig`: construction-time rejection of nonsensical policy
//!   (e.g. unordered zone thresholds). The only error surfaced before the
//!   polling loop starts.
//!
//! Malformed advisory blocks are *not* errors: they are recorded as
//! [`ParseWarning`](crate::advisory::ParseWarning) values and parsing
//! continues. Collaborator-boundary failures (`SourceError`,
//! `DeliveryError`) live with their seams in [`crate::sources`].

use thiserror_no_std::Error;

/// Result type for core pipeline operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Recoverable failures inside the decision pipeline
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// No reference station had actual, temperature, and humidity all valid
    #[error("no valid reference stations ({stations_seen} observed)")]
    CalibrationUnavailable {
        /// How many reference observations were examined
        stations_seen: usize,
    },

    /// Target and fallback stations both missing temperature or humidity
    #[error("target and fallback stations both missing required fields")]
    NoDataAvailable,

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
