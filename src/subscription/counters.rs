//! # Per-subscription usage counters.
//!
//! [`Counters`] is shared (`Arc`) between the subscription handle, the dispatcher's
//! fan-out list and the bus registry used for rendering.
//!
//! ## Backlog
//! `backlog = sent - delivered`. A message is counted as `sent` before it is pushed,
//! and `delivered` only after it is popped, so `delivered <= sent` always holds.
//! Readers load `delivered` first and `sent` second; with acquire/release ordering the
//! `sent` they observe is never older than the `delivered` they observed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Atomic counters for one subscription.
#[derive(Debug)]
pub(crate) struct Counters {
    name: Arc<str>,
    sent: AtomicU64,
    delivered: AtomicU64,
    published: AtomicU64,
}

impl Counters {
    pub(crate) fn new(name: Arc<str>) -> Self {
        Self {
            name,
            sent: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Messages sitting in the delivery queue.
    #[inline]
    pub(crate) fn backlog(&self) -> u64 {
        let delivered = self.delivered.load(Ordering::Acquire);
        let sent = self.sent.load(Ordering::Acquire);
        sent.saturating_sub(delivered)
    }

    #[inline]
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::AcqRel);
    }

    /// Undoes [`record_sent`](Self::record_sent) when the push did not happen.
    #[inline]
    pub(crate) fn revert_sent(&self) {
        self.sent.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn snapshot(&self) -> SubscriptionStats {
        let delivered = self.delivered.load(Ordering::Acquire);
        let sent = self.sent.load(Ordering::Acquire);
        SubscriptionStats {
            name: Arc::clone(&self.name),
            sent,
            delivered,
            published: self.published.load(Ordering::Acquire),
        }
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

/// Point-in-time copy of a subscription's counters.
///
/// Renders as `"<name> - sent: <n> delivered: <n> published: <n> intoqueue: <n>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStats {
    /// Subscription name.
    pub name: Arc<str>,
    /// Messages the dispatcher pushed into the delivery queue.
    pub sent: u64,
    /// Messages the owner pulled out of the delivery queue.
    pub delivered: u64,
    /// Messages the owner published into the bus.
    pub published: u64,
}

impl SubscriptionStats {
    /// Messages queued but not yet received (`sent - delivered`).
    #[inline]
    pub fn backlog(&self) -> u64 {
        self.sent.saturating_sub(self.delivered)
    }
}

impl fmt::Display for SubscriptionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - sent: {} delivered: {} published: {} intoqueue: {}",
            self.name,
            self.sent,
            self.delivered,
            self.published,
            self.backlog()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backlog_tracks_sent_minus_delivered() {
        let c = Counters::new("a".into());
        c.record_sent();
        c.record_sent();
        c.record_sent();
        c.record_delivered();
        assert_eq!(c.backlog(), 2);

        c.revert_sent();
        assert_eq!(c.backlog(), 1);
    }

    #[test]
    fn test_display_format() {
        let c = Counters::new("test1".into());
        c.record_sent();
        c.record_sent();
        c.record_delivered();
        c.record_published();
        assert_eq!(
            c.to_string(),
            "test1 - sent: 2 delivered: 1 published: 1 intoqueue: 1"
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let c = Counters::new("a".into());
        let before = c.snapshot();
        c.record_published();
        assert_eq!(before.published, 0);
        assert_eq!(c.snapshot().published, 1);
    }
}
