//! Test helpers for dispatcher integration tests.
//!
//! - `FakeHandle`: in-memory `RpcHandle` that records every invocation
//! - `FakeBridge`: `BackendBridge` whose capabilities can be removed one by one
//! - `FixedClock`: deterministic clock for deadline checks
//! - Log capture scoped to the current test thread

use bridge_core::dispatch::{
    BackendBridge, CallOptions, Clock, ReadinessNotifier, ReadinessRegistrar, ReadinessSignal,
    RpcHandle, RpcMethod, RpcService, RpcStream,
};
use bridge_core::error::{BridgeError, RemoteError};
use bridge_core::RpcCommandDispatcher;

use common::Credential;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::SystemTime;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, stream};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::Value;

pub const TEST_MACAROON: &str = "0201036c6e6402f801030a1041";

// ============================================
// FAKE HANDLE
// ============================================

/// How a call reached the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Unary,
    Stream,
}

/// One invocation seen by a `FakeHandle`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: RpcMethod,
    pub shape: Shape,
    pub request: Value,
    pub credential: Option<Credential>,
    pub deadline: Option<SystemTime>,
}

/// In-memory client handle with scripted responses.
pub struct FakeHandle {
    service: RpcService,
    unary_responses: Mutex<HashMap<RpcMethod, Result<Value, RemoteError>>>,
    stream_items: Mutex<HashMap<RpcMethod, Vec<Result<Value, RemoteError>>>>,
    stream_open_error: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHandle {
    pub fn new(service: RpcService) -> Arc<Self> {
        Arc::new(Self {
            service,
            unary_responses: Mutex::new(HashMap::new()),
            stream_items: Mutex::new(HashMap::new()),
            stream_open_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(&self, method: RpcMethod, response: Result<Value, RemoteError>) {
        self.unary_responses.lock().unwrap().insert(method, response);
    }

    pub fn stream(&self, method: RpcMethod, items: Vec<Result<Value, RemoteError>>) {
        self.stream_items.lock().unwrap().insert(method, items);
    }

    pub fn fail_stream_open(&self, error: RemoteError) {
        *self.stream_open_error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(
        &self,
        method: RpcMethod,
        shape: Shape,
        request: Value,
        credential: Option<&Credential>,
        deadline: Option<SystemTime>,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            shape,
            request,
            credential: credential.cloned(),
            deadline,
        });
    }
}

impl RpcHandle for FakeHandle {
    fn service(&self) -> RpcService {
        self.service
    }

    fn unary(
        &self,
        method: RpcMethod,
        request: Value,
        credential: Option<&Credential>,
        options: CallOptions,
    ) -> BoxFuture<'static, Result<Value, RemoteError>> {
        self.record(method, Shape::Unary, request, credential, Some(options.deadline));

        let response = self
            .unary_responses
            .lock()
            .unwrap()
            .get(&method)
            .cloned()
            .unwrap_or_else(|| Ok(Value::Object(Default::default())));

        async move { response }.boxed()
    }

    fn server_stream(
        &self,
        method: RpcMethod,
        request: Value,
        credential: Option<&Credential>,
    ) -> Result<RpcStream, RemoteError> {
        self.record(method, Shape::Stream, request, credential, None);

        if let Some(error) = self.stream_open_error.lock().unwrap().clone() {
            return Err(error);
        }

        let items = self
            .stream_items
            .lock()
            .unwrap()
            .get(&method)
            .cloned()
            .unwrap_or_default();

        Ok(stream::iter(items).boxed())
    }
}

// ============================================
// FAKE BRIDGE
// ============================================

/// Bridge exposing fake handles and readiness signals.
///
/// Every capability is present by default; the `without_*` builders remove one.
pub struct FakeBridge {
    unlocker_ready: Mutex<Option<ReadinessRegistrar>>,
    server_ready: Mutex<Option<ReadinessRegistrar>>,
    unlocker: Option<Arc<FakeHandle>>,
    connection: Option<Arc<FakeHandle>>,
    credential: Option<Credential>,
    credential_requests: AtomicUsize,
}

/// Producer ends of the bridge's readiness signals.
pub struct Notifiers {
    pub unlocker: ReadinessNotifier,
    pub server: ReadinessNotifier,
}

impl FakeBridge {
    pub fn new() -> (Self, Notifiers) {
        let (unlocker_notifier, unlocker_registrar) = ReadinessSignal::channel("unlocker");
        let (server_notifier, server_registrar) = ReadinessSignal::channel("server");

        let bridge = Self {
            unlocker_ready: Mutex::new(Some(unlocker_registrar)),
            server_ready: Mutex::new(Some(server_registrar)),
            unlocker: Some(FakeHandle::new(RpcService::Unlocker)),
            connection: Some(FakeHandle::new(RpcService::Lightning)),
            credential: Some(Credential::macaroon(TEST_MACAROON.to_string())),
            credential_requests: AtomicUsize::new(0),
        };

        let notifiers = Notifiers {
            unlocker: unlocker_notifier,
            server: server_notifier,
        };

        (bridge, notifiers)
    }

    pub fn without_unlocker_registrar(self) -> Self {
        *self.unlocker_ready.lock().unwrap() = None;
        self
    }

    pub fn without_server_registrar(self) -> Self {
        *self.server_ready.lock().unwrap() = None;
        self
    }

    pub fn without_unlocker(mut self) -> Self {
        self.unlocker = None;
        self
    }

    pub fn without_connection(mut self) -> Self {
        self.connection = None;
        self
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = None;
        self
    }

    pub fn unlocker_handle(&self) -> Arc<FakeHandle> {
        self.unlocker.clone().expect("bridge has no unlocker handle")
    }

    pub fn lightning_handle(&self) -> Arc<FakeHandle> {
        self.connection.clone().expect("bridge has no lightning handle")
    }

    pub fn credential_requests(&self) -> usize {
        self.credential_requests.load(Ordering::SeqCst)
    }
}

impl BackendBridge for FakeBridge {
    fn unlocker_ready(&self) -> Option<ReadinessRegistrar> {
        self.unlocker_ready.lock().unwrap().take()
    }

    fn unlocker(&self) -> Result<Arc<dyn RpcHandle>, BridgeError> {
        match &self.unlocker {
            Some(handle) => Ok(Arc::clone(handle) as Arc<dyn RpcHandle>),
            None => Err(BridgeError::client_unavailable("unlocker", "not exposed")),
        }
    }

    fn server_ready(&self) -> Option<ReadinessRegistrar> {
        self.server_ready.lock().unwrap().take()
    }

    fn connection(&self) -> Result<Arc<dyn RpcHandle>, BridgeError> {
        match &self.connection {
            Some(handle) => Ok(Arc::clone(handle) as Arc<dyn RpcHandle>),
            None => Err(BridgeError::client_unavailable("connection", "not exposed")),
        }
    }

    fn credential(&self) -> Result<Credential, BridgeError> {
        self.credential_requests.fetch_add(1, Ordering::SeqCst);
        self.credential
            .clone()
            .ok_or_else(|| BridgeError::credential("macaroon file missing"))
    }
}

/// Dispatcher with both phases ready, plus its handles.
pub fn ready_dispatcher(auth_enabled: bool) -> (RpcCommandDispatcher, Arc<FakeHandle>, Arc<FakeHandle>) {
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, auth_enabled);
    notifiers.unlocker.ready();
    notifiers.server.ready();
    (dispatcher, bridge.unlocker_handle(), bridge.lightning_handle())
}

// ============================================
// CLOCK
// ============================================

pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

// ============================================
// LOG CAPTURE
// ============================================

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|captured| {
            captured
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;
static INSTALL_CAPTURE: Once = Once::new();

/// Start capturing log records emitted on this thread.
///
/// `#[tokio::test]` runs on a current-thread runtime, so everything the
/// dispatcher logs during a test lands here.
pub fn capture_logs() {
    INSTALL_CAPTURE.call_once(|| {
        if log::set_logger(&CAPTURE_LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

pub fn captured_logs() -> Vec<(Level, String)> {
    CAPTURED.with(|captured| captured.borrow().clone())
}

/// Captured messages at `level` containing every fragment in `needles`.
pub fn logs_matching(level: Level, needles: &[&str]) -> Vec<String> {
    captured_logs()
        .into_iter()
        .filter(|(l, message)| *l == level && needles.iter().all(|n| message.contains(n)))
        .map(|(_, message)| message)
        .collect()
}
