//! # Bus configuration.
//!
//! Provides [`BusConfig`], the settings a [`Bus`](crate::Bus) is built from.
//!
//! ## Capacity
//! A single number drives two limits:
//! - the **input queue** bound: publishers wait once `capacity` commands are pending;
//! - the **backlog threshold**: a subscription whose `sent - delivered` reaches
//!   `capacity - 1` stops receiving new messages until it drains.
//!
//! ## Sentinel values
//! - `capacity = 0` → clamped to 1 (a zero-sized channel is invalid). With a capacity
//!   of 1 the backlog threshold is 0, so every message is dropped for every subscriber.

/// Capacity used by [`BusConfig::default`] and [`Bus::default`](crate::Bus).
pub const DEFAULT_CAPACITY: usize = 10;

/// Configuration for a [`Bus`](crate::Bus).
///
/// ## Field semantics
/// - `capacity`: input queue bound and per-subscriber backlog bound (min 1; clamped)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Bound of the input queue and of each subscription's backlog.
    pub capacity: usize,
}

impl BusConfig {
    /// Creates a config with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Returns the capacity clamped to a minimum of 1.
    ///
    /// The `Bus` uses this value to size its input channel.
    #[inline]
    pub fn capacity_clamped(&self) -> usize {
        self.capacity.max(1)
    }

    /// Returns the backlog at or above which a subscription stops receiving messages.
    #[inline]
    pub fn backlog_threshold(&self) -> u64 {
        (self.capacity_clamped() - 1) as u64
    }
}

impl Default for BusConfig {
    /// Default configuration: `capacity = 10`.
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let cfg = BusConfig::default();
        assert_eq!(cfg.capacity, 10);
        assert_eq!(cfg.backlog_threshold(), 9);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = BusConfig::with_capacity(0);
        assert_eq!(cfg.capacity_clamped(), 1);
        assert_eq!(cfg.backlog_threshold(), 0);
    }
}
