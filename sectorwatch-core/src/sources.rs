//! Collaborator seams
//!
//! The core never performs I/O. Everything it needs from the outside world
//! comes through these traits: live weather telemetry, scraped advisory
//! text, message delivery, and the subscriber set. Timeouts, retries, and
//! backoff live behind the seam; the core maps a failed fetch into "no data
//! this cycle" and moves on.
//!
//! Implementations are expected to be synchronous from the core's point of
//! view - the polling loop is single-threaded and each cycle runs to
//! completion before the next starts.

use thiserror_no_std::Error;

use crate::readings::{Reading, ReferenceObservation};

/// Identifier of a subscribed chat
pub type ChatId = i64;

/// Failure at a read-side collaborator boundary
///
/// The core treats every variant the same way (skip the affected part of
/// the cycle); the distinction exists for the logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// The fetch did not complete within the collaborator's deadline
    #[error("source timed out")]
    Timeout,
    /// The source was reachable but returned an error
    #[error("source unavailable")]
    Unavailable,
    /// The response could not be decoded at all
    #[error("source response malformed")]
    Malformed,
}

/// Failure delivering one message
///
/// Owned by the transport; the core logs it and never retries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Send did not complete within the transport's deadline
    #[error("delivery timed out")]
    Timeout,
    /// The transport asked us to slow down
    #[error("delivery rate limited")]
    RateLimited,
    /// The recipient rejected the message (e.g. blocked the bot)
    #[error("delivery rejected by recipient")]
    Rejected,
}

/// One fetch's worth of weather telemetry
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Target-location reading
    pub target: Reading,
    /// Fallback-station reading
    pub fallback: Reading,
    /// Reference-station observations for calibration
    pub references: Vec<ReferenceObservation>,
}

/// Read access to live temperature/humidity/heat-index telemetry
pub trait WeatherSource {
    /// Fetch the current snapshot for the configured stations
    fn observations(&mut self) -> Result<WeatherSnapshot, SourceError>;
}

/// Read access to the scraped lightning advisory feed
pub trait AdvisorySource {
    /// Recent raw advisory blocks, oldest first
    fn recent_blocks(&mut self) -> Result<Vec<String>, SourceError>;
}

/// Outbound message delivery
pub trait MessageTransport {
    /// Deliver `text` to one chat
    fn send(&mut self, chat: ChatId, text: &str) -> Result<(), DeliveryError>;
}

/// Subscriber membership
///
/// `list` returns an owned snapshot so a broadcast can iterate it while
/// subscribe/unsubscribe commands mutate the store.
pub trait SubscriberStore {
    /// Record a subscription (idempotent)
    fn add(&mut self, chat: ChatId);
    /// Drop a subscription if present
    fn remove(&mut self, chat: ChatId);
    /// Owned snapshot of the current subscriber set
    fn list(&self) -> Vec<ChatId>;
}
