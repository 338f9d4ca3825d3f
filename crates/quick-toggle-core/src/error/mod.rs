use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use thiserror::Error;

/// Boxed cause carried by [`BridgeError::OperationFailure`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Scheduler and remote-bridge errors with source location tracking.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The connection to the control service could not be established.
    #[error("Connect failure: {reason} {location}")]
    ConnectFailure {
        /// Why the connection could not be established.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A connection or an operation exceeded its deadline.
    #[error("{operation} timed out after {after:?} {location}")]
    Timeout {
        /// Name of the step that overran.
        operation: &'static str,
        /// The deadline that was exceeded.
        after: Duration,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A remote call failed, including the remote process having died.
    #[error("{operation} failed: {source} {location}")]
    OperationFailure {
        /// Name of the remote operation.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: BoxedCause,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The work queue no longer accepts items.
    #[error("Work queue closed {location}")]
    QueueClosed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The work item was abandoned before it finished.
    #[error("Work cancelled {location}")]
    Cancelled {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The host rejected a render command.
    #[error("Render failed: {reason} {location}")]
    RenderFailed {
        /// Human-readable reason reported by the host.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl BridgeError {
    /// Build a [`BridgeError::ConnectFailure`] at the caller's location.
    #[track_caller]
    pub fn connect_failure(reason: impl Into<String>) -> Self {
        BridgeError::ConnectFailure {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`BridgeError::OperationFailure`] at the caller's location.
    #[track_caller]
    pub fn operation_failure(operation: &'static str, source: impl Into<BoxedCause>) -> Self {
        BridgeError::OperationFailure {
            operation,
            source: source.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`BridgeError::Timeout`] at the caller's location.
    #[track_caller]
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        BridgeError::Timeout {
            operation,
            after,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`BridgeError::RenderFailed`] at the caller's location.
    #[track_caller]
    pub fn render_failed(reason: impl Into<String>) -> Self {
        BridgeError::RenderFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// True when the control service simply could not be reached in time.
    ///
    /// Status queries treat this as "not running" instead of a failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BridgeError::ConnectFailure { .. } | BridgeError::Timeout { .. }
        )
    }

    /// True for [`BridgeError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BridgeError::Cancelled { .. })
    }

    /// True for [`BridgeError::QueueClosed`].
    pub fn is_queue_closed(&self) -> bool {
        matches!(self, BridgeError::QueueClosed { .. })
    }
}

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;
