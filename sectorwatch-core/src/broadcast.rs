//! Fan-out of rendered notifications to subscribers
//!
//! Thin adapter between the composed message and the delivery seams. The
//! subscriber list is snapshotted once per broadcast, so subscribe and
//! unsubscribe commands can mutate the store while a broadcast is in
//! flight without racing the iteration. Delivery failures are logged and
//! counted, never retried here - retry and backoff belong to the
//! transport.

use log::{info, warn};

use crate::sources::{ChatId, MessageTransport, SubscriberStore};

/// Per-broadcast delivery tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Messages accepted by the transport
    pub delivered: usize,
    /// Messages the transport refused (logged, not retried)
    pub failed: usize,
}

/// Delivers messages to every subscriber
pub struct Broadcaster<T, S> {
    transport: T,
    store: S,
}

impl<T, S> Broadcaster<T, S>
where
    T: MessageTransport,
    S: SubscriberStore,
{
    /// Wrap the delivery seams
    pub fn new(transport: T, store: S) -> Self {
        Self { transport, store }
    }

    /// Handle a subscribe command
    pub fn subscribe(&mut self, chat: ChatId) {
        self.store.add(chat);
        info!("subscribed: {}", chat);
    }

    /// Handle an unsubscribe command
    pub fn unsubscribe(&mut self, chat: ChatId) {
        self.store.remove(chat);
        info!("unsubscribed: {}", chat);
    }

    /// Reply to a single chat (on-demand command responses)
    pub fn reply(&mut self, chat: ChatId, text: &str) {
        if let Err(e) = self.transport.send(chat, text) {
            warn!("reply to {} failed: {}", chat, e);
        }
    }

    /// Send `text` to a snapshot of the current subscribers
    pub fn broadcast(&mut self, text: &str) -> BroadcastSummary {
        let snapshot = self.store.list();
        if snapshot.is_empty() {
            info!("no subscribers to broadcast to");
            return BroadcastSummary::default();
        }

        let mut summary = BroadcastSummary::default();
        for chat in snapshot {
            match self.transport.send(chat, text) {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!("delivery to {} failed: {}", chat, e);
                    summary.failed += 1;
                }
            }
        }
        info!(
            "broadcast complete: {} delivered, {} failed",
            summary.delivered, summary.failed
        );
        summary
    }
}
