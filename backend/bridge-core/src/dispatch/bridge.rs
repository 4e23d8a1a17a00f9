//! Seam between the dispatcher and whatever hands it backend capabilities.

use crate::dispatch::RpcHandle;
use crate::error::{BridgeError, RemoteError};

use common::Credential;

use std::sync::Arc;

/// Error-first readiness callback, invoked at most once.
pub type ReadyCallback = Box<dyn FnOnce(Result<(), RemoteError>) + Send + 'static>;

/// Registers a [`ReadyCallback`] for one backend phase.
pub type ReadinessRegistrar = Box<dyn FnOnce(ReadyCallback) + Send + 'static>;

/// Capabilities a backend connection exposes to the dispatcher.
///
/// Every lookup may fail. The dispatcher queries each capability exactly once
/// during construction and never retries.
pub trait BackendBridge {
    /// Registrar for the unlock phase, if the backend publishes one.
    fn unlocker_ready(&self) -> Option<ReadinessRegistrar>;

    /// Client for the unlock-phase service.
    fn unlocker(&self) -> Result<Arc<dyn RpcHandle>, BridgeError>;

    /// Registrar for the main service, if the backend publishes one.
    fn server_ready(&self) -> Option<ReadinessRegistrar>;

    /// Client for the main service.
    fn connection(&self) -> Result<Arc<dyn RpcHandle>, BridgeError>;

    /// Per-call credential. Only asked for when authentication is enabled.
    fn credential(&self) -> Result<Credential, BridgeError>;
}
