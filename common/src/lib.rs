//! Shared types for the node bridge.
//!
//! This crate holds the small, dependency-light pieces used on both sides of
//! the dispatch layer: error location tracking, the redacted per-call
//! credential, and RPC status codes. It has no knowledge of transports or
//! readiness; that lives in **bridge-core**.

pub mod credential;
pub mod error;
pub mod rpc_status;

pub use credential::Credential;
pub use error::error_location::ErrorLocation;
pub use error::credential_error::CredentialError;
pub use rpc_status::RpcStatusCode;

#[cfg(test)]
mod tests;
