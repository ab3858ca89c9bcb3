//! Cross-cycle state tracking and change detection
//!
//! The tracker owns the only mutable state in the core: the last known
//! zone, the last lightning status, and whether the startup baseline has
//! been established. One call to [`StateTracker::observe`] per poll cycle
//! compares freshly computed values against that state, produces a
//! [`ChangeSet`], and commits the new values - all under one `&mut self`,
//! so a cycle can never interleave with another.
//!
//! ## Failure semantics
//!
//! A failed zone estimation arrives as `None` and never overwrites the last
//! known zone. A failed advisory fetch arrives as `None` and keeps the last
//! lightning status, with the auto-expiry rule still applied against the
//! current instant: an advisory whose window has passed goes inactive even
//! if no fresh scrape ever said so.

use serde::{Deserialize, Serialize};

use crate::{advisory::LightningStatus, time::Timestamp, zone::Zone};

/// Last-known pipeline outputs, single-writer
///
/// Created empty at process start; mutated exactly once per poll cycle by
/// the tracker after a successful computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    /// Zone from the most recent successful estimation
    pub last_zone: Option<Zone>,
    /// Lightning status from the most recent cycle
    pub last_lightning: Option<LightningStatus>,
    /// False until the first successful cycle establishes the baseline
    pub has_broadcast_once: bool,
}

/// Deltas between a cycle's computed values and the tracked state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Zone differs from the last known zone (both known)
    pub zone_changed: bool,
    /// Lightning activity flipped, or an active window was pushed later
    pub lightning_changed: bool,
    /// The lightning change is an extension of an already-active window
    pub extended: bool,
}

impl ChangeSet {
    /// True when anything changed this cycle
    pub fn any(&self) -> bool {
        self.zone_changed || self.lightning_changed
    }
}

/// Owns [`MonitorState`] and computes per-cycle deltas
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    state: MonitorState,
}

impl StateTracker {
    /// Tracker with empty state (process start)
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from persisted state (collaborator-provided)
    pub fn from_state(state: MonitorState) -> Self {
        Self { state }
    }

    /// Current tracked state
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Ingest one cycle's computed values and commit them
    ///
    /// `new_zone` is `None` when estimation failed this cycle;
    /// `new_lightning` is `None` when the advisory source was unreachable.
    /// Either `None` leaves the corresponding last-known value in place.
    pub fn observe(
        &mut self,
        new_zone: Option<Zone>,
        new_lightning: Option<LightningStatus>,
        now: Timestamp,
    ) -> ChangeSet {
        let zone_changed = match (new_zone, self.state.last_zone) {
            (Some(new), Some(last)) => new != last,
            _ => false,
        };

        // Fall back to the stored status when nothing fresh arrived, then
        // apply expiry so a stale "active" cannot outlive its window.
        let mut effective = new_lightning.or_else(|| self.state.last_lightning.clone());
        if let Some(status) = effective.as_mut() {
            status.apply_expiry(now);
        }

        // Forecast and active are both alerting states; the transition
        // between them is window progression, not a new alert.
        let (lightning_changed, extended) = match (&effective, &self.state.last_lightning) {
            (Some(new), Some(last)) => {
                let flipped = new.alerting() != last.alerting();
                let pushed_later = new.alerting()
                    && last.alerting()
                    && matches!(
                        (new.active_until, last.active_until),
                        (Some(n), Some(l)) if n > l
                    );
                (flipped || pushed_later, pushed_later)
            }
            (Some(new), None) => (new.alerting(), false),
            _ => (false, false),
        };

        if let Some(zone) = new_zone {
            self.state.last_zone = Some(zone);
        }
        if let Some(status) = effective {
            self.state.last_lightning = Some(status);
        }

        ChangeSet {
            zone_changed,
            lightning_changed,
            extended,
        }
    }

    /// Mark the startup baseline as established
    ///
    /// Called by the monitor after the first successful cycle; from then on
    /// change-triggered and scheduled output is allowed.
    pub fn mark_baseline(&mut self) {
        self.state.has_broadcast_once = true;
    }
}
