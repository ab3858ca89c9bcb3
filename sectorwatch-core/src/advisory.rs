//! Lightning-risk advisory parsing
//!
//! The advisory feed publishes free-text blocks of the form
//!
//! ```text
//! (1030-1130) 5, 17, 21
//! ```
//!
//! naming a local `HHMM` window and the sectors under elevated risk, with
//! supersessions marked by "extended" wording. This module turns those
//! blocks into structured [`LightningBlock`] records for one sector of
//! interest and reduces them to a single [`LightningStatus`].
//!
//! ## Degradation contract
//!
//! One corrupt block must never take down the whole sector status. A block
//! that fails to parse is dropped and recorded as a [`ParseWarning`];
//! parsing continues with the rest of the feed.
//!
//! ## Precedence
//!
//! When several blocks cover the sector, the one whose window ends latest
//! is current; equal end times are broken by announcement order, latest
//! wins. The rule lives in [`block_precedence`] so it can be tested in
//! isolation rather than hiding in scan order.

use chrono::{Duration, NaiveTime};
use core::cmp::Ordering;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Pattern for one advisory window: `(HHMM-HHMM) sector, sector, ...`
///
/// ASCII digits only. `\d` would also match Unicode decimal digits, whose
/// multi-byte captures cannot be sliced as `HHMM` positions.
const WINDOW_PATTERN: &str = r"\(([0-9]{4})-([0-9]{4})\)\s*([^\n()]+)";

/// Structured risk window for the sector of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningBlock {
    /// Normalized sector identifier this block was matched against
    pub sector: String,
    /// Start of the risk window (inclusive)
    pub active_from: Timestamp,
    /// End of the risk window (exclusive)
    pub active_until: Timestamp,
    /// True when the announcement superseded/extended a prior block
    pub extended: bool,
    /// Position in the announcement sequence, used for precedence
    pub announced_seq: usize,
}

impl LightningBlock {
    /// A block is active at `t` iff `active_from <= t < active_until`
    pub fn is_active_at(&self, t: Timestamp) -> bool {
        self.active_from <= t && t < self.active_until
    }
}

/// Record of one advisory block that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Index of the raw block in the scraped sequence
    pub block_index: usize,
    /// What went wrong
    pub reason: &'static str,
    /// The offending raw text, for the log
    pub raw: String,
}

/// Reduced lightning-risk status for the sector of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningStatus {
    /// Normalized sector identifier
    pub sector: String,
    /// True when the current block covers the evaluation instant
    pub active: bool,
    /// True when the current block's window has not yet begun
    #[serde(default)]
    pub forecast: bool,
    /// True when the current block extended a prior window
    pub extended: bool,
    /// Window start of the current block, if any block exists
    pub active_from: Option<Timestamp>,
    /// Window end of the current block, if any block exists
    pub active_until: Option<Timestamp>,
}

impl LightningStatus {
    /// Status for a sector with no advisory blocks at all
    pub fn clear(sector: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            active: false,
            forecast: false,
            extended: false,
            active_from: None,
            active_until: None,
        }
    }

    /// True when the sector is under advisory now or is about to be
    ///
    /// An announced window that has not started yet is already
    /// broadcast-worthy: subscribers get time to prepare.
    pub fn alerting(&self) -> bool {
        self.active || self.forecast
    }

    /// Advance the status against the clock
    ///
    /// No fresh scrape is needed for the status to move through its window:
    /// a forecast whose start has passed becomes active, and any status
    /// whose window end has passed goes inactive.
    pub fn apply_expiry(&mut self, now: Timestamp) {
        if self.forecast {
            if let Some(from) = self.active_from {
                if now >= from {
                    self.forecast = false;
                    self.active = true;
                }
            }
        }
        if let Some(until) = self.active_until {
            if now >= until {
                self.active = false;
                self.forecast = false;
            }
        }
    }
}

/// Precedence between two blocks for the same sector
///
/// Greater means "more current": latest `active_until` wins, ties fall to
/// the block announced later in the sequence.
pub fn block_precedence(a: &LightningBlock, b: &LightningBlock) -> Ordering {
    a.active_until
        .cmp(&b.active_until)
        .then(a.announced_seq.cmp(&b.announced_seq))
}

/// Extracts lightning blocks for one sector from scraped advisory text
#[derive(Debug)]
pub struct LightningStatusParser {
    sector: String,
    window: Regex,
}

impl LightningStatusParser {
    /// Create a parser for the given sector identifier
    ///
    /// The identifier is normalized the same way announced sector tokens
    /// are, so `"07"` and `"7"` configure the same parser.
    pub fn new(sector: &str) -> Self {
        Self {
            sector: normalize_sector(sector),
            // The pattern is a checked constant; compilation cannot fail.
            window: Regex::new(WINDOW_PATTERN).expect("window pattern is valid"),
        }
    }

    /// Normalized sector this parser filters for
    pub fn sector(&self) -> &str {
        &self.sector
    }

    /// Parse an ordered sequence of raw advisory blocks
    ///
    /// `now` anchors announced `HHMM` windows to a calendar date; a window
    /// whose end does not come after its start rolls over to the next day.
    /// Returns the blocks naming this parser's sector plus warnings for
    /// every raw block that was dropped.
    pub fn parse(&self, raw_blocks: &[String], now: Timestamp) -> (Vec<LightningBlock>, Vec<ParseWarning>) {
        let mut blocks = Vec::new();
        let mut warnings = Vec::new();
        let mut seq = 0usize;

        for (index, raw) in raw_blocks.iter().enumerate() {
            let extended = is_extension_marker(raw);
            let mut matched_any = false;

            for caps in self.window.captures_iter(raw) {
                matched_any = true;
                let announced_seq = seq;
                seq += 1;

                if !self.names_sector(&caps[3]) {
                    continue;
                }

                let window = parse_window(&caps[1], &caps[2], now);
                let Some((active_from, active_until)) = window else {
                    warn!("advisory: invalid time range in block {}: {:?}", index, raw);
                    warnings.push(ParseWarning {
                        block_index: index,
                        reason: "invalid time range",
                        raw: raw.clone(),
                    });
                    continue;
                };

                blocks.push(LightningBlock {
                    sector: self.sector.clone(),
                    active_from,
                    active_until,
                    extended,
                    announced_seq,
                });
            }

            if !matched_any {
                warn!("advisory: no risk window found in block {}: {:?}", index, raw);
                warnings.push(ParseWarning {
                    block_index: index,
                    reason: "no risk window found",
                    raw: raw.clone(),
                });
            }
        }

        (blocks, warnings)
    }

    /// Reduce parsed blocks to the sector's current status
    ///
    /// A current block whose window has not started yet is reported as a
    /// forecast rather than clear; subscribers are warned before the window
    /// begins.
    pub fn status(&self, blocks: &[LightningBlock], now: Timestamp) -> LightningStatus {
        let Some(current) = blocks.iter().max_by(|a, b| block_precedence(a, b)) else {
            return LightningStatus::clear(self.sector.clone());
        };

        LightningStatus {
            sector: self.sector.clone(),
            active: current.is_active_at(now),
            forecast: now < current.active_from,
            extended: current.extended,
            active_from: Some(current.active_from),
            active_until: Some(current.active_until),
        }
    }

    /// Whether an announced sector list names this parser's sector
    fn names_sector(&self, sector_list: &str) -> bool {
        sector_list
            .split(',')
            .any(|token| normalize_sector(token) == self.sector)
    }
}

/// Normalize an announced sector token: trim, uppercase, strip leading zeros
fn normalize_sector(token: &str) -> String {
    let trimmed = token.trim();
    let stripped = trimmed.trim_start_matches('0');
    let kept = if stripped.is_empty() && !trimmed.is_empty() {
        "0"
    } else {
        stripped
    };
    kept.to_uppercase()
}

/// Whether the raw announcement marks a supersession of a prior block
fn is_extension_marker(raw: &str) -> bool {
    raw.to_lowercase().contains("extend")
}

/// Anchor an announced `HHMM` pair to the date of `now`
///
/// Returns `None` when either time is not a valid clock reading. An end at
/// or before its start is an overnight window and rolls to the next day.
fn parse_window(start: &str, end: &str, now: Timestamp) -> Option<(Timestamp, Timestamp)> {
    let start = parse_hhmm(start)?;
    let end = parse_hhmm(end)?;

    let date = now.date_naive();
    let active_from = date.and_time(start).and_utc();
    let mut active_until = date.and_time(end).and_utc();
    if active_until <= active_from {
        active_until += Duration::days(1);
    }
    Some((active_from, active_until))
}

fn parse_hhmm(digits: &str) -> Option<NaiveTime> {
    // The pattern guarantees four ASCII digits; range-check them as a time.
    let hours: u32 = digits.get(..2)?.parse().ok()?;
    let minutes: u32 = digits.get(2..)?.parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}
