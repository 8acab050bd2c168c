use std::sync::Arc;

use tokio::sync::mpsc;

use super::Message;
use crate::subscription::Counters;

/// Item on the bus input queue.
pub(crate) enum Command<P> {
    /// Append a subscription to the fan-out list.
    Subscribe(Registration<P>),
    /// Fan a message out to every registered subscription.
    Deliver(Arc<Message<P>>),
}

/// Dispatcher-side half of a subscription.
pub(crate) struct Registration<P> {
    pub(crate) counters: Arc<Counters>,
    pub(crate) outbox: mpsc::UnboundedSender<Arc<Message<P>>>,
}
