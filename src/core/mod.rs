//! Bus core: input queue, registry and dispatch.
//!
//! The only public API from this module is [`Bus`]. Internal modules:
//! - [`bus`]: construction, lifecycle (`start`/`shutdown`), subscribe, rendering;
//! - [`dispatcher`]: the single task that registers subscriptions and fans messages out.

mod bus;
mod dispatcher;

pub use bus::Bus;
