//! Errors returned to call sites by the dispatcher.
//!
//! Each precondition has its own variant so callers can tell "not ready yet"
//! from "permanently disconnected" from "bad method name". Transport failures
//! keep the original [`RemoteError`] as their source.

use crate::dispatch::RpcService;
use crate::error::remote::RemoteError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DispatchError {
    #[error("Not Ready Error: {message} {location}")]
    NotReady {
        service: RpcService,
        message: String,
        location: ErrorLocation,
    },

    #[error("Disconnected Error: {message} {location}")]
    Disconnected {
        service: RpcService,
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Method Error: {message} {location}")]
    InvalidMethod {
        method: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote Call Failed Error: {method}: {source} {location}")]
    RemoteCallFailed {
        method: String,
        location: ErrorLocation,
        #[source]
        source: RemoteError,
    },
}

impl DispatchError {
    #[track_caller]
    pub(crate) fn not_ready(service: RpcService) -> Self {
        DispatchError::NotReady {
            service,
            message: format!("Server still starting ({service})"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn disconnected(service: RpcService) -> Self {
        DispatchError::Disconnected {
            service,
            message: format!("Could not connect over RPC ({service})"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn invalid_method(method: &str, reason: &str) -> Self {
        DispatchError::InvalidMethod {
            method: method.to_string(),
            message: format!("Invalid rpc method '{method}': {reason}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn remote_call_failed(method: &str, source: RemoteError) -> Self {
        DispatchError::RemoteCallFailed {
            method: method.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    /// The transport error behind a failed call, exactly as reported.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            DispatchError::RemoteCallFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether retrying later could succeed without a new session.
    ///
    /// Only `NotReady` clears on its own; a missing handle or an unknown
    /// method never does. Remote failures are left to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, DispatchError::NotReady { .. })
    }
}
