//! Decision core for sector heat-stress and lightning-risk monitoring
//!
//! Turns live weather telemetry and scraped lightning-risk text into a
//! classified heat-stress zone and a structured lightning status for one
//! geographic sector, then decides what to broadcast and when.
//!
//! The pipeline, leaves first:
//!
//! ```text
//! readings ──► calibration ──► estimator ──► zone ─┐
//!                                                  ├─► state ──► notify ──► broadcast
//! advisory text ──► parser ───────────────────────┘
//! ```
//!
//! Fetching, persistence, scheduling, and delivery are collaborator-owned
//! and reach the core only through the seams in [`sources`]. Nothing in the
//! core is fatal: every failure degrades to "no update for that part this
//! cycle".
//!
//! ```no_run
//! use sectorwatch_core::{
//!     config::MonitorConfig, monitor::Monitor, notify::NotifyMode, time::SystemClock,
//! };
//! # use sectorwatch_core::sources::{AdvisorySource, SourceError, WeatherSource, WeatherSnapshot};
//! # struct Weather;
//! # impl WeatherSource for Weather {
//! #     fn observations(&mut self) -> Result<WeatherSnapshot, SourceError> {
//! #         Err(SourceError::Unavailable)
//! #     }
//! # }
//! # struct Advisory;
//! # impl AdvisorySource for Advisory {
//! #     fn recent_blocks(&mut self) -> Result<Vec<String>, SourceError> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//!
//! let config: MonitorConfig = serde_json::from_str(
//!     r#"{
//!         "sector": "17",
//!         "target_station": "S106",
//!         "fallback_station": "S24",
//!         "reference_stations": ["S124", "S126", "S130"]
//!     }"#,
//! )
//! .unwrap();
//! let mut monitor = Monitor::new(config, Weather, Advisory, SystemClock);
//!
//! // Driven by external timers: every 2 minutes ...
//! let report = monitor.run_cycle(NotifyMode::Triggered);
//! if let Some(text) = report.message {
//!     // hand to the broadcaster
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod advisory;
pub mod broadcast;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod estimator;
pub mod monitor;
pub mod notify;
pub mod readings;
pub mod sources;
pub mod state;
pub mod time;
pub mod zone;

// Public API
pub use advisory::{LightningBlock, LightningStatus, LightningStatusParser, ParseWarning};
pub use config::{CalibrationFallback, MonitorConfig};
pub use errors::{MonitorError, MonitorResult};
pub use estimator::HeatIndexEstimator;
pub use monitor::{CycleReport, Monitor};
pub use notify::{Notification, NotificationComposer, NotifyMode};
pub use readings::{CalibrationResult, HeatIndexEstimate, Reading, ReferenceObservation};
pub use state::{ChangeSet, MonitorState, StateTracker};
pub use zone::{Zone, ZoneThresholds};

/// Crate version, from the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
