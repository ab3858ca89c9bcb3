//! Poll-cycle orchestration
//!
//! [`Monitor`] wires the pipeline stages together over the collaborator
//! seams and runs one cycle at a time: calibrate → estimate → classify →
//! parse → track → compose. It owns the [`StateTracker`] and the last
//! successful calibration offset, and takes `&mut self` for a whole cycle,
//! so all state reads and mutations within a cycle are one atomic unit.
//!
//! ## Failure flow
//!
//! Nothing in a cycle is fatal. A weather-source failure or incomplete
//! readings skip the zone update; an advisory-source failure keeps the last
//! lightning status (with auto-expiry still applied); a partially failed
//! cycle commits the part that succeeded. The polling loop just calls
//! [`Monitor::run_cycle`] again next interval.

use log::{debug, info, warn};

use crate::{
    advisory::{LightningStatus, LightningStatusParser, ParseWarning},
    calibration::calibrate,
    config::{CalibrationFallback, MonitorConfig},
    estimator::HeatIndexEstimator,
    notify::{Notification, NotificationComposer, NotifyMode},
    readings::{HeatIndexEstimate, ReferenceObservation},
    sources::{AdvisorySource, WeatherSource},
    state::{ChangeSet, MonitorState, StateTracker},
    time::{Clock, Timestamp},
};

/// Everything one poll cycle produced
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Why the cycle ran
    pub mode: NotifyMode,
    /// Scope decision for this cycle
    pub notification: Notification,
    /// Rendered broadcast text, `None` for no-op cycles
    pub message: Option<String>,
    /// This cycle's estimate, `None` when estimation failed
    pub estimate: Option<HeatIndexEstimate>,
    /// Deltas against the previous cycle
    pub changes: ChangeSet,
    /// Advisory blocks dropped during parsing
    pub warnings: Vec<ParseWarning>,
}

/// Runs the decision pipeline against the collaborator seams
pub struct Monitor<W, A, C> {
    config: MonitorConfig,
    weather: W,
    advisory: A,
    clock: C,
    parser: LightningStatusParser,
    estimator: HeatIndexEstimator,
    composer: NotificationComposer,
    tracker: StateTracker,
    last_offset: Option<f32>,
}

impl<W, A, C> Monitor<W, A, C>
where
    W: WeatherSource,
    A: AdvisorySource,
    C: Clock,
{
    /// Assemble the pipeline for one monitored sector
    pub fn new(config: MonitorConfig, weather: W, advisory: A, clock: C) -> Self {
        let parser = LightningStatusParser::new(&config.sector);
        let estimator = HeatIndexEstimator::new(config.thresholds);
        Self {
            config,
            weather,
            advisory,
            clock,
            parser,
            estimator,
            composer: NotificationComposer::new(),
            tracker: StateTracker::new(),
            last_offset: None,
        }
    }

    /// Resume with previously persisted state
    pub fn with_state(mut self, state: MonitorState) -> Self {
        self.tracker = StateTracker::from_state(state);
        self
    }

    /// Deployment policy this monitor runs under
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Current tracked state (for persistence between restarts)
    pub fn state(&self) -> &MonitorState {
        self.tracker.state()
    }

    /// Run one poll cycle
    pub fn run_cycle(&mut self, mode: NotifyMode) -> CycleReport {
        let now = self.clock.now();
        debug!("cycle start: mode {:?} at {}", mode, now);

        let estimate = self.compute_estimate();
        let (lightning, warnings) = self.compute_lightning(now);

        let baseline_established = self.tracker.state().has_broadcast_once;
        let computed_anything = estimate.is_some() || lightning.is_some();

        let changes = self
            .tracker
            .observe(estimate.map(|e| e.zone), lightning, now);

        // The tracker holds the post-expiry effective status.
        let current = self
            .tracker
            .state()
            .last_lightning
            .clone()
            .unwrap_or_else(|| LightningStatus::clear(self.parser.sector()));

        let notification =
            self.composer
                .compose(mode, changes, estimate, &current, baseline_established);
        let message = self.composer.render(&notification, mode);

        if computed_anything && !baseline_established {
            info!("baseline established, broadcasts enabled from next change");
            self.tracker.mark_baseline();
        }

        if changes.any() {
            info!(
                "cycle changes: zone_changed={} lightning_changed={} extended={}",
                changes.zone_changed, changes.lightning_changed, changes.extended
            );
        }

        CycleReport {
            mode,
            notification,
            message,
            estimate,
            changes,
            warnings,
        }
    }

    /// On-demand status reply, without touching the change-detection baseline
    ///
    /// Computes a full scheduled-style message from fresh fetches. The
    /// tracked zone/lightning baseline is left exactly as it was (the
    /// retained calibration offset may refresh; it is not part of the
    /// baseline). Returns `None` when neither side could be computed, so
    /// the command handler can apologize instead of sending an empty reply.
    pub fn peek(&mut self) -> Option<String> {
        let now = self.clock.now();

        let estimate = self.compute_estimate();
        let (lightning, _) = self.compute_lightning(now);
        if estimate.is_none() && lightning.is_none() {
            return None;
        }

        let mut current =
            lightning.unwrap_or_else(|| LightningStatus::clear(self.parser.sector()));
        current.apply_expiry(now);

        let notification = self.composer.compose(
            NotifyMode::Scheduled,
            ChangeSet::default(),
            estimate,
            &current,
            true,
        );
        self.composer.render(&notification, NotifyMode::Scheduled)
    }

    /// Estimate via the configured fallback policy, updating the retained offset
    fn compute_estimate(&mut self) -> Option<HeatIndexEstimate> {
        let snapshot = match self.weather.observations() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("weather source failed: {}", e);
                return None;
            }
        };

        let offset = self.resolve_offset(&snapshot.references);
        match self
            .estimator
            .estimate(&snapshot.target, &snapshot.fallback, offset)
        {
            Ok(estimate) => {
                info!(
                    "heat index {:.1} -> {:?} (offset {:.3}, fallback: {})",
                    estimate.value, estimate.zone, offset, estimate.used_fallback
                );
                Some(estimate)
            }
            Err(e) => {
                warn!("estimation failed: {}", e);
                None
            }
        }
    }

    /// Calibration offset for this cycle, applying the fallback policy
    fn resolve_offset(&mut self, references: &[ReferenceObservation]) -> f32 {
        match calibrate(references) {
            Ok(result) => {
                debug!(
                    "calibration offset {:.3} from {} stations",
                    result.offset, result.valid_station_count
                );
                self.last_offset = Some(result.offset);
                result.offset
            }
            Err(e) => {
                warn!("calibration failed: {}", e);
                match self.config.calibration_fallback {
                    CalibrationFallback::ReuseLast => self.last_offset.unwrap_or(0.0),
                    CalibrationFallback::Zero => 0.0,
                }
            }
        }
    }

    /// Fetch and parse the advisory feed
    ///
    /// `None` status means the source was unreachable and the last known
    /// status should stand; an empty feed is a genuine all-clear.
    fn compute_lightning(&mut self, now: Timestamp) -> (Option<LightningStatus>, Vec<ParseWarning>) {
        let raw = match self.advisory.recent_blocks() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("advisory source failed: {}", e);
                return (None, Vec::new());
            }
        };

        let (blocks, warnings) = self.parser.parse(&raw, now);
        for w in &warnings {
            debug!("dropped advisory block {}: {}", w.block_index, w.reason);
        }
        (Some(self.parser.status(&blocks, now)), warnings)
    }
}
