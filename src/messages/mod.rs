//! Messages carried by the bus.
//!
//! ## Contents
//! - [`Message`] immutable envelope around a user payload
//! - `Command` input-queue item: either a registration or a message to fan out
//!
//! Control and data never share a representation: registering a subscription is
//! a distinct `Command` variant, so a user message may use any `kind` string.

mod command;
mod message;

pub(crate) use command::{Command, Registration};
pub use message::Message;
