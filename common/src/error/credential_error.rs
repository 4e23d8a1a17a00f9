use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Raised when a [`Credential`](crate::Credential) is handled in a way that
/// would leak its secret.
#[derive(Debug, ThisError)]
pub enum CredentialError {
    #[error("Credential Leak Error: {message} {location}")]
    Leak {
        message: String,
        location: ErrorLocation,
    },
}
