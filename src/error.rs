//! Error type returned by bus operations.
//!
//! The bus itself never fails a delivery: messages dropped on a saturated
//! subscription are only logged. [`BusError`] covers what callers can observe:
//!
//! - the dispatcher is gone ([`BusError::Closed`]);
//! - a bounded wait elapsed ([`BusError::Timeout`]);
//! - a caller-supplied token fired ([`BusError::Cancelled`]).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by bus operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The dispatcher has stopped; the input or delivery queue is closed.
    #[error("bus closed")]
    Closed,

    /// A bounded publish or receive did not complete in time.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The wait was abandoned because the caller's cancellation token fired.
    #[error("wait cancelled")]
    Cancelled,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fanbus::BusError;
    /// use std::time::Duration;
    ///
    /// let err = BusError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "bus_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Closed => "bus_closed",
            BusError::Timeout { .. } => "bus_timeout",
            BusError::Cancelled => "bus_cancelled",
        }
    }

    /// Indicates whether retrying the same operation may succeed.
    ///
    /// Returns `true` for [`BusError::Timeout`] only; a closed bus stays closed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BusError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(BusError::Closed.as_label(), "bus_closed");
        assert_eq!(BusError::Cancelled.as_label(), "bus_cancelled");
    }

    #[test]
    fn test_only_timeout_is_retryable() {
        let timeout = BusError::Timeout {
            timeout: Duration::from_millis(5),
        };
        assert!(timeout.is_retryable());
        assert!(!BusError::Closed.is_retryable());
        assert!(!BusError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = BusError::Timeout {
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "timed out after 250ms");
    }
}
