//! # Bus: input queue, registry and dispatcher lifecycle.
//!
//! The [`Bus`] owns the bounded input queue shared by every publisher, the
//! registry of subscriptions, and the handle of the single dispatcher task.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                       Subscriptions (many):
//!   sub A.publish() ──┐                                 ┌──► [queue A] ──► A.receive()
//!   sub B.publish() ──┼──► [input queue] ──► dispatcher ┼──► [queue B] ──► B.receive()
//!   bus.subscribe() ──┘     (bounded, FIFO)  (one task) └──► [queue N] ──► N.receive()
//! ```
//!
//! ## Rules
//! - **Inert until started**: commands queue up (and publishers eventually wait) until
//!   [`Bus::start`] spawns the dispatcher.
//! - **Asynchronous registration**: `subscribe` only enqueues a registration; anything
//!   published after it returns is dispatched after the registration.
//! - **Per-subscriber admission**: a subscription whose backlog reached `capacity - 1`
//!   misses the message; a `warn!` event is emitted and nobody else is affected.
//! - **Cloneable**: clones share the same queue, registry and dispatcher.
//!
//! ## Example
//! ```rust
//! use fanbus::Bus;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), fanbus::BusError> {
//!     let bus: Bus<u32> = Bus::with_capacity(10);
//!     bus.start();
//!
//!     let mut a = bus.subscribe("A").await?;
//!     let mut b = bus.subscribe("B").await?;
//!
//!     a.publish("type1", 1234).await?;
//!     assert_eq!(a.receive().await?.payload, 1234);
//!     assert_eq!(b.receive().await?.payload, 1234);
//!
//!     print!("{bus}");
//!     bus.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::dispatcher::{Dispatcher, SharedRegistry};
use crate::config::BusConfig;
use crate::error::BusError;
use crate::messages::Command;
use crate::subscription::{Subscription, SubscriptionStats};

/// In-process publish/subscribe bus.
///
/// `P` is the payload type carried by every message on this bus.
pub struct Bus<P> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    cfg: BusConfig,
    input: mpsc::Sender<Command<P>>,
    /// Receiving half of the input queue until the dispatcher takes it.
    pending: Mutex<Option<mpsc::Receiver<Command<P>>>>,
    registry: SharedRegistry,
    token: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl<P> Bus<P> {
    /// Creates a bus from the given configuration. The dispatcher is not started.
    #[must_use]
    pub fn new(cfg: BusConfig) -> Self {
        let (input, rx) = mpsc::channel(cfg.capacity_clamped());

        Self {
            inner: Arc::new(Inner {
                cfg,
                input,
                pending: Mutex::new(Some(rx)),
                registry: Arc::new(RwLock::new(Vec::new())),
                token: CancellationToken::new(),
                dispatcher: Mutex::new(None),
            }),
        }
    }

    /// Creates a bus whose input queue and backlog bound are `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(BusConfig::with_capacity(capacity))
    }

    /// Input queue bound, also used as the per-subscription backlog bound.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.cfg.capacity_clamped()
    }

    /// Configuration the bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.inner.cfg
    }

    /// True once [`start`](Self::start) spawned the dispatcher and until it stops.
    pub fn is_running(&self) -> bool {
        lock(&self.inner.dispatcher)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Number of registered subscriptions (registrations already dispatched).
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Counter snapshots of every registered subscription, in registration order.
    pub fn subscriptions(&self) -> Vec<SubscriptionStats> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.snapshot())
            .collect()
    }

    /// Stops the dispatcher and waits for it to exit.
    ///
    /// Afterwards `subscribe`/`publish` return [`BusError::Closed`]; `receive` hands
    /// out what was already queued, then returns [`BusError::Closed`].
    pub async fn shutdown(&self) {
        self.inner.token.cancel();
        drop(lock(&self.inner.pending).take());

        let handle = lock(&self.inner.dispatcher).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "dispatcher task failed");
            }
        }
        debug!("bus shut down");
    }
}

impl<P: Send + Sync + 'static> Bus<P> {
    /// Spawns the dispatcher on the current tokio runtime and returns immediately.
    ///
    /// Calling it again is a no-op: the input queue has a single consumer.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime (see [`tokio::spawn`]).
    pub fn start(&self) {
        let Some(rx) = lock(&self.inner.pending).take() else {
            warn!("dispatcher already started");
            return;
        };

        let dispatcher = Dispatcher::new(
            rx,
            self.inner.cfg.backlog_threshold(),
            Arc::clone(&self.inner.registry),
            self.inner.token.clone(),
        );
        let handle = tokio::spawn(dispatcher.run());
        *lock(&self.inner.dispatcher) = Some(handle);
    }

    /// Creates a subscription and enqueues its registration.
    ///
    /// Returns as soon as the registration is queued; the dispatcher adds the
    /// subscription to the fan-out list when it reaches it. Waits while the input
    /// queue is full.
    pub async fn subscribe(
        &self,
        name: impl Into<Arc<str>>,
    ) -> Result<Subscription<P>, BusError> {
        let (sub, reg) = Subscription::new(name.into(), self.inner.input.clone());
        self.inner
            .input
            .send(Command::Subscribe(reg))
            .await
            .map_err(|_| BusError::Closed)?;
        Ok(sub)
    }
}

impl<P> Clone for Bus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> Default for Bus<P> {
    /// Bus with [`DEFAULT_CAPACITY`](crate::DEFAULT_CAPACITY).
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

/// Renders the configured capacity (before clamping), then one line per subscription.
impl<P> fmt::Display for Bus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Capacity: {}", self.inner.cfg.capacity)?;
        let registry = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for counters in registry.iter() {
            writeln!(f, "{counters}")?;
        }
        Ok(())
    }
}

impl<P> fmt::Debug for Bus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("capacity", &self.capacity())
            .field("running", &self.is_running())
            .field("subscriptions", &self.subscriptions())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
