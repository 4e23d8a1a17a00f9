use crate::dispatch::{ReadinessSignal, ReadyCallback};
use crate::error::RemoteError;

use common::RpcStatusCode;

use std::sync::{Arc, Mutex};

type Deliveries = Arc<Mutex<Vec<Result<(), RemoteError>>>>;

fn recording_callback() -> (Deliveries, ReadyCallback) {
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deliveries);
    let callback: ReadyCallback = Box::new(move |result| sink.lock().unwrap().push(result));
    (deliveries, callback)
}

/// **VALUE**: Verifies that a callback registered before the backend is ready fires
/// when the notifier fires.
#[test]
fn given_registered_callback_when_notifier_ready_then_callback_receives_ok() {
    // GIVEN: A signal with a registered callback
    let (notifier, registrar) = ReadinessSignal::channel("server");
    let (deliveries, callback) = recording_callback();
    registrar(callback);
    assert!(deliveries.lock().unwrap().is_empty(), "Should not fire early");

    // WHEN: The backend becomes ready
    notifier.ready();

    // THEN: Exactly one Ok delivery
    assert_eq!(*deliveries.lock().unwrap(), vec![Ok(())]);
}

/// **VALUE**: Verifies that registering after the backend is ready still fires.
///
/// **WHY THIS MATTERS**: The dispatcher is built after the backend process starts; the
/// unlocker is often ready before the dispatcher registers. Losing that notification
/// would leave the app stuck on "Server still starting" forever.
#[test]
fn given_notifier_already_ready_when_callback_registered_then_fires_immediately() {
    let (notifier, registrar) = ReadinessSignal::channel("unlocker");
    notifier.ready();

    let (deliveries, callback) = recording_callback();
    registrar(callback);

    assert_eq!(*deliveries.lock().unwrap(), vec![Ok(())]);
}

/// **VALUE**: Verifies that a readiness failure is passed through as-is.
#[test]
fn given_registered_callback_when_notifier_fails_then_callback_receives_error() {
    let (notifier, registrar) = ReadinessSignal::channel("server");
    let (deliveries, callback) = recording_callback();
    registrar(callback);

    let error = RemoteError::new(RpcStatusCode::INTERNAL, "wallet db corrupted");
    notifier.failed(error.clone());

    assert_eq!(*deliveries.lock().unwrap(), vec![Err(error)]);
}

/// **VALUE**: Verifies that dropping the notifier reports UNAVAILABLE.
///
/// **BUG THIS CATCHES**: Would catch a backend crash during startup leaving the
/// callback pending forever with no error logged.
#[test]
fn given_registered_callback_when_notifier_dropped_then_callback_receives_unavailable() {
    let (notifier, registrar) = ReadinessSignal::channel("server");
    let (deliveries, callback) = recording_callback();
    registrar(callback);

    drop(notifier);

    let deliveries = deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 1);
    let error = deliveries[0].as_ref().expect_err("should be an error");
    assert_eq!(error.status, RpcStatusCode::UNAVAILABLE);
}
