//! Errors reported by the node transport itself.

use common::RpcStatusCode;

use thiserror::Error as ThisError;

/// A failure reported by the transport for a call or a readiness signal.
///
/// Passed through the dispatcher verbatim; it is never reclassified.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{status}: {message}")]
pub struct RemoteError {
    pub status: RpcStatusCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: impl Into<RpcStatusCode>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RpcStatusCode::UNAVAILABLE, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(RpcStatusCode::UNKNOWN, message)
    }
}
