use crate::helpers::{FakeBridge, capture_logs, logs_matching};

use bridge_core::RpcCommandDispatcher;
use bridge_core::config::DispatcherConfig;
use bridge_core::error::{DispatchError, RemoteError};

use common::RpcStatusCode;

use log::Level;
use serde_json::json;

// ============================================================================
// Construction: readiness wiring, handle acquisition, credential policy
// Construction never fails; every missing capability is logged and degrades.
// ============================================================================

/// **VALUE**: Verifies that both readiness flags start false and follow their own signal.
///
/// **WHY THIS MATTERS**: The unlock phase and the main service come up at different
/// times. If the unlocker signal also raised the main flag, the app would fire main
/// service calls at a node that only speaks the unlocker protocol.
///
/// **BUG THIS CATCHES**: Would catch callbacks wired to the wrong flag.
#[test]
fn given_new_dispatcher_when_signals_fire_then_each_flag_follows_its_own_signal() {
    // GIVEN: A fully wired bridge
    capture_logs();
    let (bridge, notifiers) = FakeBridge::new();

    // WHEN: Constructing the dispatcher
    let dispatcher = RpcCommandDispatcher::new(&bridge, true);

    // THEN: Nothing is ready yet
    assert!(!dispatcher.readiness().is_unlocker_ready());
    assert!(!dispatcher.readiness().is_server_ready());

    // WHEN: Only the unlocker becomes ready
    notifiers.unlocker.ready();

    // THEN: Only the unlocker flag is raised
    assert!(dispatcher.readiness().is_unlocker_ready());
    assert!(!dispatcher.readiness().is_server_ready());
    assert_eq!(logs_matching(Level::Info, &["unlocker ready"]).len(), 1);

    // WHEN: The main service becomes ready
    notifiers.server.ready();

    // THEN: Both flags are raised
    assert!(dispatcher.readiness().is_server_ready());
    assert_eq!(logs_matching(Level::Info, &["lightning ready"]).len(), 1);
}

/// **VALUE**: Verifies that a readiness signal fired before construction is not lost.
///
/// **WHY THIS MATTERS**: The dispatcher is built after the backend starts. A fast
/// unlocker can be ready before anyone registers.
#[test]
fn given_signals_fired_before_construction_when_dispatcher_built_then_flags_are_set() {
    let (bridge, notifiers) = FakeBridge::new();
    notifiers.unlocker.ready();
    notifiers.server.ready();

    let dispatcher = RpcCommandDispatcher::new(&bridge, false);

    assert!(dispatcher.readiness().is_unlocker_ready());
    assert!(dispatcher.readiness().is_server_ready());
}

/// **VALUE**: Verifies that a readiness error is logged and leaves the flag false.
///
/// **BUG THIS CATCHES**: Would catch the callback ignoring the error argument and
/// marking the service ready anyway.
#[tokio::test]
async fn given_server_readiness_error_when_delivered_then_flag_stays_false_and_error_logged() {
    // GIVEN: A dispatcher waiting on the main service
    capture_logs();
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);

    // WHEN: The backend reports a startup failure
    notifiers
        .server
        .failed(RemoteError::new(RpcStatusCode::INTERNAL, "chain backend unreachable"));

    // THEN: Flag stays false, error is logged, calls keep failing with NotReady
    assert!(!dispatcher.readiness().is_server_ready());
    assert_eq!(
        logs_matching(Level::Error, &["lightning readiness ERROR", "chain backend unreachable"])
            .len(),
        1
    );
    let result = dispatcher.send_command("GetInfo", json!({})).await;
    assert!(matches!(result, Err(DispatchError::NotReady { .. })));
}

/// **VALUE**: Verifies that a missing registrar is logged and does not abort construction.
///
/// **WHY THIS MATTERS**: Construction runs during app startup. A panic or error here
/// would take the whole UI down for what is a degraded-but-usable state.
#[test]
fn given_missing_registrars_when_constructed_then_logs_errors_and_never_becomes_ready() {
    // GIVEN: A bridge without any readiness registrar
    capture_logs();
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge
        .without_unlocker_registrar()
        .without_server_registrar();

    // WHEN: Constructing and firing the (now unwired) signals
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.unlocker.ready();
    notifiers.server.ready();

    // THEN: One error per missing registrar, flags never set
    assert_eq!(
        logs_matching(Level::Error, &["no unlocker readiness registrar"]).len(),
        1
    );
    assert_eq!(
        logs_matching(Level::Error, &["no lightning readiness registrar"]).len(),
        1
    );
    assert!(!dispatcher.readiness().is_unlocker_ready());
    assert!(!dispatcher.readiness().is_server_ready());
}

/// **VALUE**: Verifies that failing to acquire a handle is logged per service.
#[test]
fn given_unavailable_handles_when_constructed_then_logs_connection_errors() {
    capture_logs();
    let (bridge, _notifiers) = FakeBridge::new();
    let bridge = bridge.without_unlocker().without_connection();

    let _dispatcher = RpcCommandDispatcher::new(&bridge, false);

    assert_eq!(
        logs_matching(Level::Error, &["Error connecting to unlocker server"]).len(),
        1
    );
    assert_eq!(
        logs_matching(Level::Error, &["Error connecting to lightning server"]).len(),
        1
    );
}

/// **VALUE**: Verifies that the credential is only requested when auth is enabled.
///
/// **WHY THIS MATTERS**: Reading the macaroon touches the node's data directory. With
/// auth disabled that read is pointless and may fail noisily on setups that have no
/// macaroon at all.
#[test]
fn given_auth_disabled_when_constructed_then_credential_never_requested() {
    capture_logs();
    let (bridge, _notifiers) = FakeBridge::new();

    let dispatcher = RpcCommandDispatcher::new(&bridge, false);

    assert_eq!(bridge.credential_requests(), 0);
    assert!(!dispatcher.auth_enabled());
    assert_eq!(logs_matching(Level::Info, &["Macaroons disabled"]).len(), 1);
}

/// **VALUE**: Verifies that the credential is requested exactly once when auth is enabled.
#[test]
fn given_auth_enabled_when_constructed_then_credential_requested_once() {
    capture_logs();
    let (bridge, _notifiers) = FakeBridge::new();

    let dispatcher = RpcCommandDispatcher::new(&bridge, true);

    assert_eq!(bridge.credential_requests(), 1);
    assert!(dispatcher.auth_enabled());
    assert_eq!(logs_matching(Level::Info, &["Macaroons enabled"]).len(), 1);
}

/// **VALUE**: Verifies that a missing credential under enabled auth is logged and flagged.
///
/// **WHY THIS MATTERS**: The dispatcher keeps going without metadata, which the node
/// will most likely reject. The warning is the only hint that the real problem is a
/// missing macaroon rather than a broken node.
#[test]
fn given_auth_enabled_and_credential_missing_when_constructed_then_logs_error_and_warning() {
    capture_logs();
    let (bridge, _notifiers) = FakeBridge::new();
    let bridge = bridge.without_credential();

    let _dispatcher = RpcCommandDispatcher::new(&bridge, true);

    assert_eq!(
        logs_matching(Level::Error, &["Error getting credential", "macaroon file missing"]).len(),
        1
    );
    assert_eq!(
        logs_matching(Level::Warn, &["sent without metadata"]).len(),
        1
    );
}

/// **VALUE**: Verifies that the config-driven constructor honours the auth policy.
#[test]
fn given_config_with_auth_disabled_when_constructed_from_config_then_auth_is_disabled() {
    let (bridge, _notifiers) = FakeBridge::new();
    let mut config = DispatcherConfig::default();
    config.auth.macaroons_enabled = false;

    let dispatcher = RpcCommandDispatcher::from_config(&bridge, &config);

    assert!(!dispatcher.auth_enabled());
    assert_eq!(bridge.credential_requests(), 0);
}

/// **VALUE**: Verifies that the dispatcher can be shared across threads.
///
/// **BUG THIS CATCHES**: Would catch a non-`Sync` field (e.g. `Rc`, `RefCell`) sneaking
/// into the dispatcher and breaking every `Arc<RpcCommandDispatcher>` in the app.
#[test]
fn given_dispatcher_type_when_checked_then_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RpcCommandDispatcher>();
}
