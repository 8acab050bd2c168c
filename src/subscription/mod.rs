//! Subscriptions: named endpoints with a private delivery queue.
//!
//! ## Contents
//! - [`Subscription`] owner handle used to publish into the bus and receive from it
//! - [`SubscriptionStats`] point-in-time copy of a subscription's counters
//! - `Counters` atomic counters shared between the owner and the dispatcher
//!
//! ## Who writes what
//! ```text
//!   dispatcher ──► sent        (before each push into the delivery queue)
//!   receive()  ──► delivered   (after each pop from the delivery queue)
//!   publish()  ──► published   (after each push into the bus input queue)
//! ```
//! Every counter is an `AtomicU64`, so `Display`/`stats()` may run from any task.

mod counters;
mod subscription;

pub(crate) use counters::Counters;
pub use counters::SubscriptionStats;
pub use subscription::Subscription;
