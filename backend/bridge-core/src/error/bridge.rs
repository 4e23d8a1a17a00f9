//! Errors raised by a [`BackendBridge`](crate::dispatch::BackendBridge) while
//! handing over capabilities.
//!
//! The dispatcher never propagates these. They are logged at construction and
//! the matching capability is left unset.

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BridgeError {
    #[error("Client Unavailable Error: {capability}: {message} {location}")]
    ClientUnavailable {
        capability: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Credential Error: {message} {location}")]
    Credential {
        message: String,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub fn client_unavailable(capability: &'static str, message: impl Into<String>) -> Self {
        BridgeError::ClientUnavailable {
            capability,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn credential(message: impl Into<String>) -> Self {
        BridgeError::Credential {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
