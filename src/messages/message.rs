//! # Message envelope.
//!
//! A [`Message`] wraps a user payload with the metadata the bus stamps on publish:
//! the discriminating `kind`, the creation time and the publishing subscription.
//!
//! ## Payload typing
//! The payload is a type parameter of the bus. Applications that publish several
//! kinds usually pick a closed enum and document which variant goes with which
//! `kind`:
//!
//! ```rust
//! #[derive(Debug)]
//! enum Payload {
//!     /// kind = "price"
//!     Price(u64),
//!     /// kind = "halt"
//!     Halt { reason: String },
//! }
//! ```
//!
//! ## Example
//! ```rust
//! use fanbus::Message;
//!
//! let msg = Message::new("type1", "producer", 1234_u32).with_target("consumer");
//!
//! assert_eq!(msg.kind, "type1");
//! assert_eq!(msg.sender.as_ref(), "producer");
//! assert_eq!(msg.target.as_deref(), Some("consumer"));
//! assert_eq!(msg.payload, 1234);
//! ```

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Immutable message delivered to every subscription.
///
/// Subscribers receive it as `Arc<Message<P>>`: fan-out shares one allocation
/// instead of cloning the payload per subscriber.
#[derive(Debug, Clone)]
pub struct Message<P> {
    /// Application-defined discriminator.
    pub kind: String,
    /// Wall-clock creation time.
    pub timestamp: SystemTime,
    /// Name of the publishing subscription.
    pub sender: Arc<str>,
    /// Optional addressee. Carried as metadata only; delivery is always broadcast.
    pub target: Option<Arc<str>>,
    /// User payload.
    pub payload: P,
}

impl<P> Message<P> {
    /// Creates a message stamped with the current time.
    pub fn new(kind: impl Into<String>, sender: impl Into<Arc<str>>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            timestamp: SystemTime::now(),
            sender: sender.into(),
            target: None,
            payload,
        }
    }

    /// Attaches an addressee name.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Creation time as nanoseconds since the Unix epoch (0 if the clock is before it).
    #[inline]
    pub fn unix_nanos(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_target() {
        let msg = Message::new("type1", "a", ());
        assert!(msg.target.is_none());
        assert_eq!(msg.sender.as_ref(), "a");
    }

    #[test]
    fn test_unix_nanos_is_recent() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let msg = Message::new("type1", "a", 0_u8);
        assert!(msg.unix_nanos() >= before);
    }

    #[test]
    fn test_subscribe_kind_is_plain_data() {
        let msg = Message::new("subscribe", "a", 7_i32);
        assert_eq!(msg.kind, "subscribe");
        assert_eq!(msg.payload, 7);
    }
}
