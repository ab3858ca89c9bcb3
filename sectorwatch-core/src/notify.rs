//! Notification scope selection and message content
//!
//! Decides, for one cycle, whether anything gets broadcast and what goes in
//! it. The outcome is a tagged [`Notification`] variant - never an ad hoc
//! string concatenation - so the broadcaster consumes every shape the same
//! way and the selection rules stay testable on their own.
//!
//! ## Startup silence
//!
//! Until the first successful cycle establishes the baseline
//! (`has_broadcast_once = false`), nothing is ever sent: a change-triggered
//! cycle would otherwise fire a false "change" against empty state, and the
//! first scheduled tick establishes the baseline silently instead of
//! broadcasting it.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    advisory::LightningStatus,
    readings::HeatIndexEstimate,
    state::ChangeSet,
};

/// Why this cycle is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyMode {
    /// Fixed-interval full status broadcast
    Scheduled,
    /// Change-detection cycle; broadcasts only deltas
    Triggered,
}

/// Zone half of a message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSection {
    /// The estimate whose zone and advisory content get rendered
    pub estimate: HeatIndexEstimate,
}

/// How the lightning half of a message should read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightningKind {
    /// Risk window newly covers the sector
    Activated,
    /// An announced window has not started yet
    Forecast,
    /// An already-alerting window was pushed later
    Extended,
    /// Window over or no advisory in force
    AllClear,
    /// Active and unchanged (scheduled summaries)
    Ongoing,
}

/// Lightning half of a message
#[derive(Debug, Clone, PartialEq)]
pub struct LightningSection {
    /// The status being reported
    pub status: LightningStatus,
    /// How the section should read
    pub kind: LightningKind,
}

/// What this cycle broadcasts
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Full message with both sections
    Both {
        /// Heat-stress half
        zone: ZoneSection,
        /// Lightning half
        lightning: LightningSection,
    },
    /// Only the heat-stress section changed or was requested
    ZoneOnly(ZoneSection),
    /// Only the lightning section changed or was requested
    LightningOnly(LightningSection),
    /// Nothing to broadcast this cycle
    None,
}

impl Notification {
    /// True for the no-op variant
    pub fn is_none(&self) -> bool {
        matches!(self, Notification::None)
    }
}

/// Selects notification scope and renders message text
#[derive(Debug, Clone, Default)]
pub struct NotificationComposer;

impl NotificationComposer {
    /// Stateless composer
    pub fn new() -> Self {
        Self
    }

    /// Decide what to broadcast this cycle
    ///
    /// `estimate` is `None` when estimation failed this cycle; a scheduled
    /// broadcast then degrades to the lightning section alone rather than
    /// inventing a zone.
    pub fn compose(
        &self,
        mode: NotifyMode,
        changes: ChangeSet,
        estimate: Option<HeatIndexEstimate>,
        lightning: &LightningStatus,
        has_broadcast_once: bool,
    ) -> Notification {
        if !has_broadcast_once {
            return Notification::None;
        }

        match mode {
            NotifyMode::Scheduled => {
                let section = self.lightning_section(changes, lightning);
                match estimate {
                    Some(estimate) => Notification::Both {
                        zone: ZoneSection { estimate },
                        lightning: section,
                    },
                    None => Notification::LightningOnly(section),
                }
            }
            NotifyMode::Triggered => {
                let zone = changes
                    .zone_changed
                    .then(|| estimate.map(|estimate| ZoneSection { estimate }))
                    .flatten();
                let lightning = changes
                    .lightning_changed
                    .then(|| self.lightning_section(changes, lightning));

                match (zone, lightning) {
                    (Some(zone), Some(lightning)) => Notification::Both { zone, lightning },
                    (Some(zone), None) => Notification::ZoneOnly(zone),
                    (None, Some(lightning)) => Notification::LightningOnly(lightning),
                    (None, None) => Notification::None,
                }
            }
        }
    }

    /// Render a notification to broadcast text
    ///
    /// Returns `None` for the no-op variant so callers never send empty
    /// messages.
    pub fn render(&self, notification: &Notification, mode: NotifyMode) -> Option<String> {
        let header = match mode {
            NotifyMode::Scheduled => "*Sector Status Update*",
            NotifyMode::Triggered => "*Immediate Update Detected*",
        };

        let body = match notification {
            Notification::Both { zone, lightning } => format!(
                "{}\n\n{}\n\n{}",
                header,
                render_zone(zone),
                render_lightning(lightning)
            ),
            Notification::ZoneOnly(zone) => format!("{}\n\n{}", header, render_zone(zone)),
            Notification::LightningOnly(lightning) => {
                format!("{}\n\n{}", header, render_lightning(lightning))
            }
            Notification::None => return None,
        };
        Some(body)
    }

    fn lightning_section(&self, changes: ChangeSet, status: &LightningStatus) -> LightningSection {
        let kind = if !status.alerting() {
            LightningKind::AllClear
        } else if changes.extended {
            LightningKind::Extended
        } else if status.forecast {
            LightningKind::Forecast
        } else if changes.lightning_changed {
            LightningKind::Activated
        } else {
            LightningKind::Ongoing
        };
        LightningSection {
            status: status.clone(),
            kind,
        }
    }
}

fn render_zone(section: &ZoneSection) -> String {
    let estimate = &section.estimate;
    let advisory = estimate.zone.advisory();
    let source_note = if estimate.used_fallback {
        " (fallback station)"
    } else {
        ""
    };

    format!(
        "*HEAT STRESS STATUS*\n\
         Heat index: {:.1} ({}){}\n\
         Work-rest cycle: {}\n\
         Advisory: {}",
        estimate.value,
        estimate.zone.code(),
        source_note,
        advisory.work_rest,
        advisory.hydration,
    )
}

fn render_lightning(section: &LightningSection) -> String {
    let status = &section.status;
    let window = match (status.active_from, status.active_until) {
        (Some(from), Some(until)) => format!(
            "{}-{}",
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            until.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        _ => String::new(),
    };

    let line = match section.kind {
        LightningKind::Activated => format!(
            "Lightning risk ALERT: sector {} under advisory ({}). Head to the nearest shelter!",
            status.sector, window
        ),
        LightningKind::Forecast => format!(
            "Lightning risk FORECAST: sector {} expected under advisory ({}). \
             Prepare to head to shelter!",
            status.sector, window
        ),
        LightningKind::Extended if status.forecast => format!(
            "Lightning risk EXTENDED: sector {} expected window extended ({}). \
             Prepare to head to shelter!",
            status.sector, window
        ),
        LightningKind::Extended => format!(
            "Lightning risk EXTENDED: sector {} advisory extended ({}). \
             Stay sheltered until further notice.",
            status.sector, window
        ),
        LightningKind::Ongoing => format!(
            "Lightning risk ongoing: sector {} under advisory ({}).",
            status.sector, window
        ),
        LightningKind::AllClear => {
            format!("Sector {} is currently clear of lightning risk.", status.sector)
        }
    };

    format!("*LIGHTNING RISK STATUS*\n{}", line)
}
