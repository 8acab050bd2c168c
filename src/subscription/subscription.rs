//! # Subscription handle.
//!
//! A [`Subscription`] is returned by [`Bus::subscribe`](crate::Bus::subscribe). It
//! carries a sender into the bus input queue and the receiving half of its own
//! delivery queue, so one handle can both publish and receive. The two sides are
//! independent: a subscription may publish without ever receiving, and vice versa.
//!
//! ## Waiting
//! - [`publish`](Subscription::publish) waits while the bus input queue is full.
//! - [`receive`](Subscription::receive) waits while the delivery queue is empty.
//!
//! Both wait indefinitely. The `*_timeout` and [`receive_until`](Subscription::receive_until)
//! variants bound the wait and report [`BusError::Timeout`] / [`BusError::Cancelled`].
//!
//! ## Example
//! ```rust
//! use fanbus::Bus;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), fanbus::BusError> {
//!     let bus: Bus<u32> = Bus::default();
//!     bus.start();
//!
//!     let mut a = bus.subscribe("A").await?;
//!     a.publish("type1", 1234).await?;
//!
//!     let msg = a.receive().await?;
//!     assert_eq!(msg.payload, 1234);
//!     assert_eq!(msg.sender.as_ref(), "A");
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{Counters, SubscriptionStats};
use crate::error::BusError;
use crate::messages::{Command, Message, Registration};

/// Named endpoint with a private delivery queue.
pub struct Subscription<P> {
    counters: Arc<Counters>,
    inbox: mpsc::UnboundedReceiver<Arc<Message<P>>>,
    input: mpsc::Sender<Command<P>>,
}

impl<P> Subscription<P> {
    /// Builds the owner handle and the dispatcher-side registration for it.
    pub(crate) fn new(name: Arc<str>, input: mpsc::Sender<Command<P>>) -> (Self, Registration<P>) {
        let counters = Arc::new(Counters::new(name));
        let (outbox, inbox) = mpsc::unbounded_channel();

        let sub = Self {
            counters: Arc::clone(&counters),
            inbox,
            input,
        };
        (sub, Registration { counters, outbox })
    }

    /// Subscription name.
    #[inline]
    pub fn name(&self) -> &str {
        self.counters.name()
    }

    /// Current counter values.
    pub fn stats(&self) -> SubscriptionStats {
        self.counters.snapshot()
    }

    /// Messages queued for this subscription but not yet received.
    #[inline]
    pub fn backlog(&self) -> u64 {
        self.counters.backlog()
    }
}

impl<P: Send + Sync + 'static> Subscription<P> {
    /// Publishes a message into the bus, waiting while the input queue is full.
    ///
    /// The message is stamped with the current time and this subscription's name.
    /// Returns [`BusError::Closed`] if the dispatcher has stopped.
    pub async fn publish(&self, kind: impl Into<String>, payload: P) -> Result<(), BusError> {
        let msg = Message::new(kind, Arc::clone(self.counters.name()), payload);
        self.enqueue(msg).await
    }

    /// Same as [`publish`](Self::publish), with `target` set on the message.
    ///
    /// The target is metadata for receivers; the message is still delivered to
    /// every subscription.
    pub async fn publish_to(
        &self,
        target: impl Into<Arc<str>>,
        kind: impl Into<String>,
        payload: P,
    ) -> Result<(), BusError> {
        let msg = Message::new(kind, Arc::clone(self.counters.name()), payload).with_target(target);
        self.enqueue(msg).await
    }

    /// Publishes, giving up after `timeout` if the input queue stays full.
    ///
    /// On timeout the message is discarded and `published` is not incremented.
    pub async fn publish_timeout(
        &self,
        kind: impl Into<String>,
        payload: P,
        timeout: Duration,
    ) -> Result<(), BusError> {
        let msg = Message::new(kind, Arc::clone(self.counters.name()), payload);
        match tokio::time::timeout(timeout, self.enqueue(msg)).await {
            Ok(res) => res,
            Err(_) => Err(BusError::Timeout { timeout }),
        }
    }

    /// Receives the next message, waiting until one is available.
    ///
    /// Returns [`BusError::Closed`] once the dispatcher has stopped and the queue is drained.
    pub async fn receive(&mut self) -> Result<Arc<Message<P>>, BusError> {
        let msg = self.inbox.recv().await.ok_or(BusError::Closed)?;
        self.counters.record_delivered();
        Ok(msg)
    }

    /// Receives, giving up after `timeout` if nothing arrives.
    pub async fn receive_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Arc<Message<P>>, BusError> {
        match tokio::time::timeout(timeout, self.receive()).await {
            Ok(res) => res,
            Err(_) => Err(BusError::Timeout { timeout }),
        }
    }

    /// Receives, giving up with [`BusError::Cancelled`] when `token` fires first.
    ///
    /// No message is lost on cancellation: a message is only counted as delivered
    /// once it has been handed out.
    pub async fn receive_until(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Arc<Message<P>>, BusError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(BusError::Cancelled),
            res = self.receive() => res,
        }
    }

    /// Turns the subscription into a stream of received messages.
    ///
    /// The stream ends when the bus shuts down and the delivery queue is drained.
    pub fn into_stream(self) -> impl Stream<Item = Arc<Message<P>>> + Send {
        stream::unfold(self, |mut sub| async move {
            match sub.receive().await {
                Ok(msg) => Some((msg, sub)),
                Err(_) => None,
            }
        })
    }

    async fn enqueue(&self, msg: Message<P>) -> Result<(), BusError> {
        self.input
            .send(Command::Deliver(Arc::new(msg)))
            .await
            .map_err(|_| BusError::Closed)?;
        self.counters.record_published();
        Ok(())
    }
}

impl<P> fmt::Display for Subscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.counters, f)
    }
}

impl<P> fmt::Debug for Subscription<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("stats", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Detached = (
        Subscription<u32>,
        Registration<u32>,
        mpsc::Receiver<Command<u32>>,
    );

    fn detached(name: &str) -> Detached {
        let (tx, rx) = mpsc::channel(4);
        let (sub, reg) = Subscription::new(name.into(), tx);
        (sub, reg, rx)
    }

    #[tokio::test]
    async fn test_publish_enqueues_deliver_command() {
        let (sub, _reg, mut rx) = detached("a");
        sub.publish("type1", 1234).await.unwrap();

        match rx.recv().await {
            Some(Command::Deliver(msg)) => {
                assert_eq!(msg.kind, "type1");
                assert_eq!(msg.sender.as_ref(), "a");
                assert_eq!(msg.payload, 1234);
                assert!(msg.target.is_none());
            }
            _ => panic!("expected a deliver command"),
        }
        assert_eq!(sub.stats().published, 1);
    }

    #[tokio::test]
    async fn test_publish_to_sets_target() {
        let (sub, _reg, mut rx) = detached("a");
        sub.publish_to("b", "direct", 1).await.unwrap();

        match rx.recv().await {
            Some(Command::Deliver(msg)) => assert_eq!(msg.target.as_deref(), Some("b")),
            _ => panic!("expected a deliver command"),
        }
    }

    #[tokio::test]
    async fn test_publish_on_closed_input_fails() {
        let (sub, _reg, rx) = detached("a");
        drop(rx);

        assert_eq!(sub.publish("type1", 1).await, Err(BusError::Closed));
        assert_eq!(sub.stats().published, 0);
    }

    #[tokio::test]
    async fn test_receive_counts_delivery() {
        let (mut sub, reg, _rx) = detached("a");
        reg.counters.record_sent();
        reg.outbox
            .send(Arc::new(Message::new("type1", "x", 5)))
            .unwrap();

        let msg = sub.receive().await.unwrap();
        assert_eq!(msg.payload, 5);

        let stats = sub.stats();
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.backlog(), 0);
    }

    #[tokio::test]
    async fn test_receive_closed_after_outbox_dropped() {
        let (mut sub, reg, _rx) = detached("a");
        drop(reg);
        assert_eq!(sub.receive().await.unwrap_err(), BusError::Closed);
    }

    #[tokio::test]
    async fn test_receive_timeout_on_empty_queue() {
        let (mut sub, _reg, _rx) = detached("a");
        let timeout = Duration::from_millis(20);

        assert_eq!(
            sub.receive_timeout(timeout).await.unwrap_err(),
            BusError::Timeout { timeout }
        );
        assert_eq!(sub.stats().delivered, 0);
    }

    #[tokio::test]
    async fn test_receive_until_cancelled() {
        let (mut sub, _reg, _rx) = detached("a");
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(
            sub.receive_until(&token).await.unwrap_err(),
            BusError::Cancelled
        );
    }

    #[tokio::test]
    async fn test_publish_timeout_when_input_full() {
        let (tx, _rx) = mpsc::channel(1);
        let (sub, _reg) = Subscription::<u32>::new("a".into(), tx);
        sub.publish("type1", 1).await.unwrap();

        let timeout = Duration::from_millis(20);
        assert_eq!(
            sub.publish_timeout("type1", 2, timeout).await,
            Err(BusError::Timeout { timeout })
        );
        assert_eq!(sub.stats().published, 1);
    }
}
