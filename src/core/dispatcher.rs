//! # Dispatcher: the single consumer of the bus input queue.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► wait: token.cancelled() | input.recv()
//!   │     ├─ cancelled / channel closed ─► exit (drops every delivery sender)
//!   │     └─ Command
//!   └─► dispatch(Command)
//!         ├─ Subscribe(reg) ─► append to fan-out list and registry
//!         └─ Deliver(msg)   ─► for each subscription (registration order):
//!                                ├─ backlog < threshold ─► sent += 1, push
//!                                └─ otherwise           ─► drop for this one, warn
//! }
//! ```
//!
//! ## Rules
//! - The fan-out list is owned by the dispatcher; nothing else mutates it.
//! - Pushes go to unbounded channels, so a saturated subscription never blocks the loop.
//! - The registry mirror is written here only; the bus reads it for rendering.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::messages::{Command, Message, Registration};
use crate::subscription::Counters;

/// Registry mirror shared with [`Bus`](crate::Bus) for introspection.
pub(crate) type SharedRegistry = Arc<RwLock<Vec<Arc<Counters>>>>;

pub(crate) struct Dispatcher<P> {
    input: mpsc::Receiver<Command<P>>,
    subscribers: Vec<Registration<P>>,
    threshold: u64,
    registry: SharedRegistry,
    token: CancellationToken,
}

impl<P> Dispatcher<P> {
    pub(crate) fn new(
        input: mpsc::Receiver<Command<P>>,
        threshold: u64,
        registry: SharedRegistry,
        token: CancellationToken,
    ) -> Self {
        Self {
            input,
            subscribers: Vec::new(),
            threshold,
            registry,
            token,
        }
    }

    /// Runs until the token is cancelled or every input sender is gone.
    pub(crate) async fn run(mut self) {
        debug!(threshold = self.threshold, "dispatcher started");

        loop {
            let cmd = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                cmd = self.input.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            self.dispatch(cmd);
        }

        debug!(subscriptions = self.subscribers.len(), "dispatcher stopped");
    }

    fn dispatch(&mut self, cmd: Command<P>) {
        match cmd {
            Command::Subscribe(reg) => self.register(reg),
            Command::Deliver(msg) => self.fan_out(&msg),
        }
    }

    fn register(&mut self, reg: Registration<P>) {
        debug!(subscription = %reg.counters.name(), "subscription registered");

        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&reg.counters));
        self.subscribers.push(reg);
    }

    fn fan_out(&self, msg: &Arc<Message<P>>) {
        for sub in &self.subscribers {
            let backlog = sub.counters.backlog();
            if backlog >= self.threshold {
                warn!(
                    subscription = %sub.counters.name(),
                    kind = %msg.kind,
                    backlog,
                    "capacity exhausted"
                );
                continue;
            }

            sub.counters.record_sent();
            if sub.outbox.send(Arc::clone(msg)).is_err() {
                // owner dropped its handle
                sub.counters.revert_sent();
                debug!(
                    subscription = %sub.counters.name(),
                    "delivery queue closed; message discarded"
                );
            }
        }
    }
}
