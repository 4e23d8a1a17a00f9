use crate::helpers::{
    FakeBridge, FixedClock, Shape, TEST_MACAROON, capture_logs, captured_logs, logs_matching,
    ready_dispatcher,
};

use bridge_core::RpcCommandDispatcher;
use bridge_core::dispatch::{RPC_DEADLINE, RpcMethod, RpcService};
use bridge_core::error::{DispatchError, RemoteError};

use common::RpcStatusCode;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use log::Level;
use serde_json::json;

// ============================================================================
// Unary dispatch: send_command / send_unlocker_command
// ============================================================================

/// **VALUE**: Verifies that a call before the main service is ready rejects with NotReady
/// and never reaches the transport.
///
/// **WHY THIS MATTERS**: During startup the UI polls the node. Those calls must fail
/// fast and locally; sending them would only produce confusing transport errors.
///
/// **BUG THIS CATCHES**: Would catch the readiness check being skipped or moved after
/// the transport invocation.
#[tokio::test]
async fn given_server_not_ready_when_send_command_then_rejects_not_ready_without_transport_call() {
    // GIVEN: Handles present, GetInfo available, main service not ready
    capture_logs();
    let (bridge, _notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, true);
    let lightning = bridge.lightning_handle();

    // WHEN: Calling GetInfo
    let result = dispatcher.send_command("GetInfo", json!({})).await;

    // THEN: NotReady for the main service, no transport call, rejection logged
    match result {
        Err(DispatchError::NotReady { service, message, .. }) => {
            assert_eq!(service, RpcService::Lightning);
            assert!(message.contains("Server still starting"), "got: {message}");
        }
        other => panic!("Expected NotReady, got {other:?}"),
    }
    assert_eq!(lightning.call_count(), 0);
    assert_eq!(logs_matching(Level::Warn, &["GetInfo", "still starting"]).len(), 1);
}

/// **VALUE**: Verifies that NotReady holds for every known unary method.
#[tokio::test]
async fn given_server_not_ready_when_any_unary_method_called_then_all_reject_not_ready() {
    let (bridge, _notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);

    for method in RpcMethod::ALL {
        let result = dispatcher
            .send_command(method.name(), json!({"probe": method.name()}))
            .await;
        assert!(
            matches!(result, Err(DispatchError::NotReady { .. })),
            "{method} should be NotReady, got {result:?}"
        );
    }
    assert_eq!(bridge.lightning_handle().call_count(), 0);
}

/// **VALUE**: Verifies that unlocker calls are gated on the unlocker flag only.
///
/// **WHY THIS MATTERS**: Unlocking the wallet is what makes the main service start.
/// Gating the unlocker on the main flag would deadlock startup: the wallet could never
/// be unlocked because the node is not ready, and the node is not ready because the
/// wallet is locked.
///
/// **BUG THIS CATCHES**: Would catch `send_unlocker_command` checking the wrong flag.
#[tokio::test]
async fn given_only_unlocker_ready_when_unlocker_and_main_called_then_only_unlocker_succeeds() {
    // GIVEN: Unlocker ready, main service not ready
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.unlocker.ready();
    let unlocker = bridge.unlocker_handle();
    unlocker.respond(RpcMethod::UnlockWallet, Ok(json!({})));

    // WHEN: Calling both services
    let unlock = dispatcher
        .send_unlocker_command("UnlockWallet", json!({"wallet_password": "c2VjcmV0"}))
        .await;
    let info = dispatcher.send_command("GetInfo", json!({})).await;

    // THEN: Unlocker call goes through, main call is NotReady
    assert_eq!(unlock.unwrap(), json!({}));
    assert!(matches!(info, Err(DispatchError::NotReady { .. })));
    assert_eq!(unlocker.call_count(), 1);
    assert_eq!(bridge.lightning_handle().call_count(), 0);
}

/// **VALUE**: Verifies that the unlocker rejects with NotReady before its own signal.
#[tokio::test]
async fn given_unlocker_not_ready_when_send_unlocker_command_then_rejects_not_ready() {
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.server.ready();

    let result = dispatcher.send_unlocker_command("GenSeed", json!({})).await;

    match result {
        Err(DispatchError::NotReady { service, .. }) => assert_eq!(service, RpcService::Unlocker),
        other => panic!("Expected NotReady, got {other:?}"),
    }
    assert_eq!(bridge.unlocker_handle().call_count(), 0);
}

/// **VALUE**: Verifies that a missing main handle rejects with Disconnected.
///
/// **WHY THIS MATTERS**: "Disconnected" is permanent for the session, unlike
/// "NotReady". The UI shows a different message and stops polling.
#[tokio::test]
async fn given_ready_but_no_connection_when_send_command_then_rejects_disconnected() {
    // GIVEN: Main service ready, but its handle could not be acquired
    capture_logs();
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_connection();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.server.ready();

    // WHEN: Calling GetInfo
    let result = dispatcher.send_command("GetInfo", json!({})).await;

    // THEN: Disconnected
    match result {
        Err(DispatchError::Disconnected { service, message, .. }) => {
            assert_eq!(service, RpcService::Lightning);
            assert!(message.contains("Could not connect"), "got: {message}");
        }
        other => panic!("Expected Disconnected, got {other:?}"),
    }
    assert_eq!(logs_matching(Level::Warn, &["GetInfo", "no lightning connection"]).len(), 1);
}

/// **VALUE**: Verifies Disconnected for the unlocker handle.
#[tokio::test]
async fn given_unlocker_ready_but_no_unlocker_handle_when_called_then_rejects_disconnected() {
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_unlocker();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.unlocker.ready();

    let result = dispatcher.send_unlocker_command("InitWallet", json!({})).await;

    assert!(matches!(
        result,
        Err(DispatchError::Disconnected {
            service: RpcService::Unlocker,
            ..
        })
    ));
}

/// **VALUE**: Verifies that an unknown method name rejects with InvalidMethod.
#[tokio::test]
async fn given_ready_and_unknown_method_when_send_command_then_rejects_invalid_method() {
    // GIVEN: Everything ready
    capture_logs();
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);

    // WHEN: Calling a method the node does not have
    let result = dispatcher.send_command("Bogus", json!({})).await;

    // THEN: InvalidMethod naming the method, nothing sent
    match result {
        Err(DispatchError::InvalidMethod { method, message, .. }) => {
            assert_eq!(method, "Bogus");
            assert!(message.contains("Invalid rpc method"), "got: {message}");
        }
        other => panic!("Expected InvalidMethod, got {other:?}"),
    }
    assert_eq!(lightning.call_count(), 0);
    assert_eq!(logs_matching(Level::Warn, &["unknown method Bogus"]).len(), 1);
}

/// **VALUE**: Verifies that unknown names are rejected even before readiness.
///
/// **WHY THIS MATTERS**: A typo at a call site is a programming error. Reporting it as
/// "still starting" would hide it until the node happened to be up.
#[tokio::test]
async fn given_not_ready_and_unknown_method_when_called_then_rejects_invalid_method() {
    let (bridge, _notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);

    let main = dispatcher.send_command("Bogus", json!({})).await;
    let unlocker = dispatcher.send_unlocker_command("Bogus", json!({})).await;

    assert!(matches!(main, Err(DispatchError::InvalidMethod { .. })));
    assert!(matches!(unlocker, Err(DispatchError::InvalidMethod { .. })));
}

/// **VALUE**: Verifies that a method from the other service is InvalidMethod.
///
/// **BUG THIS CATCHES**: Would catch `GetInfo` being sent to the unlocker service
/// (which the node answers with UNIMPLEMENTED after a full round trip).
#[tokio::test]
async fn given_ready_when_method_of_other_service_called_then_rejects_invalid_method() {
    let (dispatcher, unlocker, lightning) = ready_dispatcher(false);

    let on_unlocker = dispatcher.send_unlocker_command("GetInfo", json!({})).await;
    let on_main = dispatcher.send_command("UnlockWallet", json!({})).await;

    assert!(matches!(on_unlocker, Err(DispatchError::InvalidMethod { .. })));
    assert!(matches!(on_main, Err(DispatchError::InvalidMethod { .. })));
    assert_eq!(unlocker.call_count(), 0);
    assert_eq!(lightning.call_count(), 0);
}

/// **VALUE**: Verifies that a streaming method cannot be called as unary.
#[tokio::test]
async fn given_ready_when_streaming_method_called_as_unary_then_rejects_invalid_method() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);

    let result = dispatcher.send_command("SubscribeInvoices", json!({})).await;

    match result {
        Err(DispatchError::InvalidMethod { message, .. }) => {
            assert!(message.contains("streaming method called as unary"), "got: {message}");
        }
        other => panic!("Expected InvalidMethod, got {other:?}"),
    }
    assert_eq!(lightning.call_count(), 0);
}

/// **VALUE**: Verifies the happy path: the response payload is returned unchanged.
#[tokio::test]
async fn given_ready_and_transport_succeeds_when_send_command_then_resolves_with_payload() {
    // GIVEN: Node answers GetInfo with a block height, construction logs discarded
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);
    lightning.respond(RpcMethod::GetInfo, Ok(json!({"height": 100})));
    capture_logs();

    // WHEN: Calling GetInfo
    let result = dispatcher.send_command("GetInfo", json!({})).await;

    // THEN: Resolves with the payload, request forwarded as-is, nothing logged
    assert_eq!(result.unwrap(), json!({"height": 100}));
    let calls = lightning.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, RpcMethod::GetInfo);
    assert_eq!(calls[0].shape, Shape::Unary);
    assert_eq!(calls[0].request, json!({}));
    assert!(
        captured_logs().is_empty(),
        "Successful calls must not log: {:?}",
        captured_logs()
    );
}

/// **VALUE**: Verifies that transport failures are wrapped, unchanged, and logged.
///
/// **WHY THIS MATTERS**: The UI decides what to show from the status code (e.g.
/// UNAVAILABLE → "node offline"). Reclassifying the error would lose that.
///
/// **BUG THIS CATCHES**: Would catch the underlying error being replaced by a generic
/// message, or the failure going unlogged.
#[tokio::test]
async fn given_ready_and_transport_fails_when_send_command_then_rejects_remote_call_failed() {
    // GIVEN: Node answers with UNAVAILABLE
    capture_logs();
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);
    let remote = RemoteError::unavailable("unavailable");
    lightning.respond(RpcMethod::GetInfo, Err(remote.clone()));

    // WHEN: Calling GetInfo
    let result = dispatcher.send_command("GetInfo", json!({})).await;

    // THEN: RemoteCallFailed carrying the exact error, and an error log with the method
    let err = result.expect_err("call should fail");
    match &err {
        DispatchError::RemoteCallFailed { method, source, .. } => {
            assert_eq!(method, "GetInfo");
            assert_eq!(source, &remote);
        }
        other => panic!("Expected RemoteCallFailed, got {other:?}"),
    }
    assert_eq!(err.remote_error(), Some(&remote));
    assert_eq!(
        logs_matching(Level::Error, &["GetInfo", "UNAVAILABLE: unavailable"]).len(),
        1
    );
}

/// **VALUE**: Verifies that unlocker failures are surfaced the same way.
#[tokio::test]
async fn given_unlocker_transport_fails_when_called_then_rejects_remote_call_failed() {
    capture_logs();
    let (dispatcher, unlocker, _lightning) = ready_dispatcher(false);
    let remote = RemoteError::new(RpcStatusCode::UNKNOWN, "invalid passphrase");
    unlocker.respond(RpcMethod::UnlockWallet, Err(remote.clone()));

    let result = dispatcher
        .send_unlocker_command("UnlockWallet", json!({"wallet_password": "d3Jvbmc="}))
        .await;

    assert_eq!(result.unwrap_err().remote_error(), Some(&remote));
    assert_eq!(
        logs_matching(Level::Error, &["UnlockWallet", "invalid passphrase"]).len(),
        1
    );
}

/// **VALUE**: Verifies that the deadline is exactly call time + 300,000 ms.
///
/// **BUG THIS CATCHES**: Would catch seconds/milliseconds mix-ups (300 ms or 300,000 s)
/// and the deadline being computed at construction instead of per call.
#[tokio::test]
async fn given_fixed_clock_when_send_command_then_deadline_is_now_plus_five_minutes() {
    // GIVEN: A dispatcher on a fixed clock
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::with_clock(&bridge, false, Arc::new(FixedClock(now)));
    notifiers.unlocker.ready();
    notifiers.server.ready();

    // WHEN: Issuing one call per service
    dispatcher.send_command("GetInfo", json!({})).await.unwrap();
    dispatcher.send_unlocker_command("GenSeed", json!({})).await.unwrap();

    // THEN: Both deadlines are now + 300,000 ms
    let expected = now + Duration::from_millis(300_000);
    assert_eq!(RPC_DEADLINE, Duration::from_millis(300_000));
    assert_eq!(bridge.lightning_handle().calls()[0].deadline, Some(expected));
    assert_eq!(bridge.unlocker_handle().calls()[0].deadline, Some(expected));
}

/// **VALUE**: Verifies that the credential accompanies every call when auth is enabled.
#[tokio::test]
async fn given_auth_enabled_when_unary_calls_sent_then_credential_attached() {
    let (dispatcher, unlocker, lightning) = ready_dispatcher(true);

    dispatcher.send_command("WalletBalance", json!({})).await.unwrap();
    dispatcher.send_unlocker_command("GenSeed", json!({})).await.unwrap();

    for call in lightning.calls().into_iter().chain(unlocker.calls()) {
        let credential = call.credential.expect("credential should be attached");
        assert_eq!(credential.key(), "macaroon");
        assert_eq!(credential.secret(), TEST_MACAROON);
    }
}

/// **VALUE**: Verifies that no metadata at all is sent when auth is disabled.
///
/// **BUG THIS CATCHES**: Would catch an empty credential being sent in place of none,
/// which some nodes reject as a malformed macaroon.
#[tokio::test]
async fn given_auth_disabled_when_unary_calls_sent_then_credential_omitted() {
    let (dispatcher, unlocker, lightning) = ready_dispatcher(false);

    dispatcher.send_command("ListChannels", json!({})).await.unwrap();
    dispatcher.send_unlocker_command("GenSeed", json!({})).await.unwrap();

    assert!(lightning.calls()[0].credential.is_none());
    assert!(unlocker.calls()[0].credential.is_none());
}

/// **VALUE**: Verifies that a missing credential under enabled auth degrades to no metadata.
#[tokio::test]
async fn given_auth_enabled_but_credential_missing_when_called_then_sent_without_credential() {
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_credential();
    let dispatcher = RpcCommandDispatcher::new(&bridge, true);
    notifiers.server.ready();

    dispatcher.send_command("GetInfo", json!({})).await.unwrap();

    assert!(bridge.lightning_handle().calls()[0].credential.is_none());
}

/// **VALUE**: Verifies that an auth rejection without a credential points at the cause.
#[tokio::test]
async fn given_credential_missing_and_node_rejects_auth_when_called_then_warns_about_credential() {
    capture_logs();
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_credential();
    let dispatcher = RpcCommandDispatcher::new(&bridge, true);
    notifiers.server.ready();
    bridge.lightning_handle().respond(
        RpcMethod::GetInfo,
        Err(RemoteError::new(RpcStatusCode::UNAUTHENTICATED, "expected 1 macaroon")),
    );

    let result = dispatcher.send_command("GetInfo", json!({})).await;

    assert!(matches!(result, Err(DispatchError::RemoteCallFailed { .. })));
    assert_eq!(
        logs_matching(Level::Warn, &["GetInfo", "no credential is configured"]).len(),
        1
    );
}

/// **VALUE**: Verifies that a deadline expiry is called out in the log.
#[tokio::test]
async fn given_transport_deadline_exceeded_when_called_then_logs_deadline_warning() {
    capture_logs();
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);
    lightning.respond(
        RpcMethod::QueryRoutes,
        Err(RemoteError::new(RpcStatusCode::DEADLINE_EXCEEDED, "context deadline exceeded")),
    );

    let result = dispatcher.send_command("QueryRoutes", json!({"amt": 1000})).await;

    assert!(result.is_err());
    assert_eq!(
        logs_matching(Level::Warn, &["QueryRoutes", "300s deadline"]).len(),
        1
    );
}

/// **VALUE**: Verifies that the transport is invoked when the call is issued, not when
/// the returned future is first polled.
///
/// **WHY THIS MATTERS**: Call sites sometimes fire-and-forget (e.g. `StopDaemon` on
/// shutdown). The request must already be on its way when `send_command` returns.
#[test]
fn given_ready_when_send_command_returns_then_transport_already_invoked() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);

    let pending = dispatcher.send_command("StopDaemon", json!({}));

    assert_eq!(lightning.call_count(), 1);
    drop(pending);
}
