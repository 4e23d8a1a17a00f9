use crate::config::DispatcherConfig;
use crate::dispatch::{
    BackendBridge, CallKind, CallOptions, Clock, PendingCall, ReadinessRegistrar, ReadinessState,
    RpcHandle, RpcMethod, RpcService, RpcStream, SystemClock,
};
use crate::error::{BridgeError, DispatchError, RemoteError};

use common::Credential;

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future;
use log::{error, info, warn};
use serde_json::Value;

/// Deadline applied to every unary call, counted from the moment it is issued.
pub const RPC_DEADLINE: Duration = Duration::from_millis(300_000);

/// Routes unary and streaming calls to the node backend.
///
/// Built once per session. Construction never fails: a missing registrar, a
/// client that could not be acquired or a missing credential is logged and
/// leaves the dispatcher with less capability. Calls report what is missing
/// through [`DispatchError`].
///
/// # Thread Safety
///
/// The dispatcher is `Send + Sync`. Readiness flags may be raised from any
/// thread while calls are in flight.
pub struct RpcCommandDispatcher {
    readiness: Arc<ReadinessState>,
    unlocker: Option<Arc<dyn RpcHandle>>,
    client: Option<Arc<dyn RpcHandle>>,
    credential: Option<Credential>,
    auth_enabled: bool,
    clock: Arc<dyn Clock>,
}

impl RpcCommandDispatcher {
    /// Wire up a dispatcher against `bridge`.
    ///
    /// # Arguments
    ///
    /// * `bridge` - Source of readiness registrars, client handles and the credential
    /// * `auth_enabled` - Whether every call must carry the bridge's credential
    pub fn new(bridge: &dyn BackendBridge, auth_enabled: bool) -> Self {
        Self::with_clock(bridge, auth_enabled, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new), taking the authentication policy from config.
    pub fn from_config(bridge: &dyn BackendBridge, config: &DispatcherConfig) -> Self {
        Self::new(bridge, config.auth.macaroons_enabled)
    }

    /// Like [`new`](Self::new), with an explicit clock for deadlines.
    pub fn with_clock(bridge: &dyn BackendBridge, auth_enabled: bool, clock: Arc<dyn Clock>) -> Self {
        let readiness = Arc::new(ReadinessState::new());

        register_readiness(bridge.unlocker_ready(), RpcService::Unlocker, &readiness);
        let unlocker = acquire_handle(bridge.unlocker(), RpcService::Unlocker);

        register_readiness(bridge.server_ready(), RpcService::Lightning, &readiness);
        let client = acquire_handle(bridge.connection(), RpcService::Lightning);

        let credential = if auth_enabled {
            let credential = match bridge.credential() {
                Ok(credential) => Some(credential),
                Err(e) => {
                    error!("RPC: Error getting credential: {e}");
                    warn!("RPC: Authentication enabled but no credential available - calls will be sent without metadata");
                    None
                }
            };
            info!("RPC: Macaroons enabled");
            credential
        } else {
            info!("RPC: Macaroons disabled");
            None
        };

        Self {
            readiness,
            unlocker,
            client,
            credential,
            auth_enabled,
            clock,
        }
    }

    /// Read-only view of the readiness flags.
    pub fn readiness(&self) -> &ReadinessState {
        &self.readiness
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    /// Unary call against the unlock-phase service.
    pub fn send_unlocker_command(&self, method: &str, body: Value) -> PendingCall {
        self.dispatch_unary(RpcService::Unlocker, method, body)
    }

    /// Unary call against the main service.
    pub fn send_command(&self, method: &str, body: Value) -> PendingCall {
        self.dispatch_unary(RpcService::Lightning, method, body)
    }

    /// Open a server-streaming call against the main service.
    ///
    /// Returns as soon as the stream is established; no deadline is applied.
    ///
    /// # Errors
    ///
    /// Returns the same precondition errors as the unary calls, or
    /// [`DispatchError::RemoteCallFailed`] if the transport refuses to open
    /// the stream.
    pub fn send_stream_command(&self, method: &str, body: Value) -> Result<RpcStream, DispatchError> {
        let (method, handle) =
            self.check_preconditions(RpcService::Lightning, method, CallKind::ServerStreaming)?;

        handle
            .server_stream(method, body, self.credential.as_ref())
            .map_err(|e| {
                error!("RPC: Error from stream method {method}: {e}");
                DispatchError::remote_call_failed(method.name(), e)
            })
    }

    fn dispatch_unary(&self, service: RpcService, method: &str, body: Value) -> PendingCall {
        let (method, handle) = match self.check_preconditions(service, method, CallKind::Unary) {
            Ok(checked) => checked,
            Err(e) => return future::ready(Err(e)).boxed(),
        };

        let options = CallOptions {
            deadline: self.clock.now() + RPC_DEADLINE,
        };
        let missing_credential = self.auth_enabled && self.credential.is_none();
        let call = handle.unary(method, body, self.credential.as_ref(), options);

        async move {
            call.await.map_err(|e| {
                log_remote_failure(method, &e, missing_credential);
                DispatchError::remote_call_failed(method.name(), e)
            })
        }
        .boxed()
    }

    /// Readiness, then handle presence, then method support.
    ///
    /// Unknown names fail before any of those, since they never resolve to a
    /// method at all.
    fn check_preconditions(
        &self,
        service: RpcService,
        name: &str,
        kind: CallKind,
    ) -> Result<(RpcMethod, &Arc<dyn RpcHandle>), DispatchError> {
        let method: RpcMethod = name.parse().map_err(|_| {
            warn!("RPC: Rejected unknown method {name}");
            DispatchError::invalid_method(name, "unknown method")
        })?;

        if !self.readiness.is_ready(service) {
            warn!("RPC: Rejected {method}, {service} server still starting");
            return Err(DispatchError::not_ready(service));
        }

        let handle = self.handle(service).ok_or_else(|| {
            warn!("RPC: Rejected {method}, no {service} connection");
            DispatchError::disconnected(service)
        })?;

        if !handle.supports(method) {
            warn!("RPC: Rejected {method}, not available on the {service} service");
            return Err(DispatchError::invalid_method(
                name,
                &format!("not available on the {service} service"),
            ));
        }

        if method.kind() != kind {
            warn!("RPC: Rejected {method}, wrong call shape ({:?})", method.kind());
            let reason = match kind {
                CallKind::Unary => "streaming method called as unary",
                CallKind::ServerStreaming => "unary method called as stream",
            };
            return Err(DispatchError::invalid_method(name, reason));
        }

        Ok((method, handle))
    }

    fn handle(&self, service: RpcService) -> Option<&Arc<dyn RpcHandle>> {
        match service {
            RpcService::Unlocker => self.unlocker.as_ref(),
            RpcService::Lightning => self.client.as_ref(),
        }
    }
}

fn register_readiness(
    registrar: Option<ReadinessRegistrar>,
    service: RpcService,
    readiness: &Arc<ReadinessState>,
) {
    let Some(registrar) = registrar else {
        error!("RPC: ERROR no {service} readiness registrar");
        return;
    };

    let readiness = Arc::clone(readiness);
    registrar(Box::new(move |result: Result<(), RemoteError>| match result {
        Ok(()) => {
            if readiness.mark_ready(service) {
                info!("RPC: {service} ready");
            }
        }
        Err(e) => error!("RPC: {service} readiness ERROR: {e}"),
    }));
}

fn acquire_handle(
    handle: Result<Arc<dyn RpcHandle>, BridgeError>,
    service: RpcService,
) -> Option<Arc<dyn RpcHandle>> {
    match handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("RPC: Error connecting to {service} server: {e}");
            None
        }
    }
}

fn log_remote_failure(method: RpcMethod, error: &RemoteError, missing_credential: bool) {
    error!("RPC: Error from method {method}: {error}");

    if error.status.is_deadline_exceeded() {
        warn!(
            "RPC: {method} exceeded its {}s deadline",
            RPC_DEADLINE.as_secs()
        );
    }

    if error.status.is_auth_failure() && missing_credential {
        warn!("RPC: {method} rejected for authentication while no credential is configured");
    }
}
