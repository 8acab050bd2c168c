//! # fanbus
//!
//! **fanbus** is an in-process publish/subscribe message bus for tokio applications.
//!
//! Producers publish messages, a single dispatcher task fans each message out to
//! every registered subscription, and each subscription pulls from its own private
//! delivery queue. It is meant for decoupling components inside one process: no
//! persistence, no networking, no topic filtering.
//!
//! ## Architecture
//! ```text
//!   ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!   │ Subscription │  │ Subscription │  │ Bus          │
//!   │  .publish()  │  │  .publish()  │  │ .subscribe() │
//!   └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!          │ Deliver(msg)    │ Deliver(msg)    │ Subscribe(reg)
//!          ▼                 ▼                 ▼
//! ┌─────────────────────────────────────────────────────┐
//! │          input queue (bounded mpsc, FIFO)           │
//! │               (capacity: BusConfig::capacity)       │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//!               ┌───────────────────────┐
//!               │  dispatcher (1 task)  │
//!               │  - registry (append)  │
//!               │  - admission check    │
//!               └───┬───────┬───────┬───┘
//!                   ▼       ▼       ▼
//!              [queue A] [queue B] [queue N]   (unbounded mpsc, one per subscription)
//!                   ▼       ▼       ▼
//!              A.receive() ...    N.receive()
//! ```
//!
//! ### Admission
//! ```text
//! for each subscription, in registration order:
//!   backlog = sent - delivered
//!   ├─ backlog <  capacity - 1 ─► sent += 1, push message
//!   └─ backlog >= capacity - 1 ─► drop for this subscription, warn!("capacity exhausted")
//! ```
//! Drops are never reported to the publisher; they surface only as `tracing` events.
//!
//! ## Features
//! | Area              | Description                                                 | Key types                          |
//! |-------------------|-------------------------------------------------------------|------------------------------------|
//! | **Bus**           | Input queue, dispatcher lifecycle, registry rendering.      | [`Bus`]                            |
//! | **Subscriptions** | Publish, receive (plain / timeout / cancellable / stream).  | [`Subscription`], [`SubscriptionStats`] |
//! | **Messages**      | Immutable envelope around a typed payload.                  | [`Message`]                        |
//! | **Errors**        | Closed bus, elapsed timeouts, cancelled waits.              | [`BusError`]                       |
//! | **Configuration** | Capacity for the input queue and the backlog bound.         | [`BusConfig`]                      |
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
//!     let mut b = bus.subscribe("B").await?;
//!     let mut c = bus.subscribe("C").await?;
//!
//!     a.publish("type1", 1234).await?;
//!
//!     for sub in [&mut a, &mut b, &mut c] {
//!         assert_eq!(sub.receive().await?.payload, 1234);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod messages;
mod subscription;

// ---- Public re-exports ----

pub use crate::core::Bus;
pub use config::{BusConfig, DEFAULT_CAPACITY};
pub use error::BusError;
pub use messages::Message;
pub use subscription::{Subscription, SubscriptionStats};
