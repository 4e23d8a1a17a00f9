//! Per-call authentication metadata with redacted Debug output.

use crate::{CredentialError, ErrorLocation};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// Metadata key used by the node for macaroon authentication.
pub const MACAROON_METADATA_KEY: &str = "macaroon";

/// A credential attached to outgoing calls as a single metadata entry.
///
/// The secret value never shows up in logs or debug output and is wiped
/// from memory when the credential is dropped.
#[derive(Clone)]
pub struct Credential {
    key: String,
    secret: String,
}

impl Credential {
    /// Create a credential sent under the given metadata key.
    pub fn new(key: impl Into<String>, secret: String) -> Self {
        Self {
            key: key.into(),
            secret,
        }
    }

    /// Create a macaroon credential from its hex encoding.
    pub fn macaroon(hex: String) -> Self {
        Self::new(MACAROON_METADATA_KEY, hex)
    }

    /// Metadata key the secret is sent under (safe to log).
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the secret value for transmission.
    ///
    /// # Security Note
    /// Only call this when actually attaching the credential to a request.
    #[inline]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Secret length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.secret.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}: [REDACTED])", self.key)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} CREDENTIAL]", self.key)
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.secret == other.secret
    }
}

impl Eq for Credential {}

// Prevent accidental serialization
impl serde::Serialize for Credential {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(CredentialError::Leak {
            message: String::from("Credential cannot be serialized - use secret() explicitly"),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
