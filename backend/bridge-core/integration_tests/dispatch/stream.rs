use crate::helpers::{FakeBridge, Shape, TEST_MACAROON, capture_logs, logs_matching, ready_dispatcher};

use bridge_core::RpcCommandDispatcher;
use bridge_core::dispatch::{RpcMethod, RpcService};
use bridge_core::error::{DispatchError, RemoteError};

use common::RpcStatusCode;

use futures_util::StreamExt;
use log::Level;
use serde_json::json;

// ============================================================================
// Streaming dispatch: send_stream_command
// ============================================================================

/// **VALUE**: Verifies that an open stream yields the node's items in order.
///
/// **WHY THIS MATTERS**: Invoice and transaction subscriptions drive live UI updates.
/// Dropped or reordered items show up as wrong balances.
#[tokio::test]
async fn given_ready_when_send_stream_command_then_stream_yields_items_in_order() {
    // GIVEN: Node will push two invoice updates
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);
    lightning.stream(
        RpcMethod::SubscribeInvoices,
        vec![Ok(json!({"add_index": 1})), Ok(json!({"add_index": 2}))],
    );

    // WHEN: Opening the subscription and draining it
    let stream = dispatcher
        .send_stream_command("SubscribeInvoices", json!({"add_index": 0}))
        .expect("stream should open");
    let items: Vec<_> = stream.collect().await;

    // THEN: Both items arrive in order
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), &json!({"add_index": 1}));
    assert_eq!(items[1].as_ref().unwrap(), &json!({"add_index": 2}));

    let calls = lightning.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].shape, Shape::Stream);
    assert_eq!(calls[0].request, json!({"add_index": 0}));
}

/// **VALUE**: Verifies that errors inside an open stream are passed through untouched.
#[tokio::test]
async fn given_stream_item_error_when_consumed_then_error_passed_through() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);
    let remote = RemoteError::new(RpcStatusCode::CANCELLED, "subscription cancelled");
    lightning.stream(
        RpcMethod::SubscribeTransactions,
        vec![Ok(json!({"tx_hash": "ab"})), Err(remote.clone())],
    );

    let items: Vec<_> = dispatcher
        .send_stream_command("SubscribeTransactions", json!({}))
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].as_ref().unwrap_err(), &remote);
}

/// **VALUE**: Verifies that streams are opened without a deadline.
///
/// **BUG THIS CATCHES**: Would catch the unary deadline leaking into subscriptions,
/// which would cut every long-lived subscription off after five minutes.
#[test]
fn given_ready_when_stream_opened_then_no_deadline_applied() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);

    let _stream = dispatcher
        .send_stream_command("SubscribeChannelGraph", json!({}))
        .unwrap();

    assert_eq!(lightning.calls()[0].deadline, None);
}

/// **VALUE**: Verifies that streams carry the credential under the same policy as unary calls.
#[test]
fn given_auth_policy_when_stream_opened_then_credential_follows_policy() {
    let (enabled, _u, enabled_handle) = ready_dispatcher(true);
    let (disabled, _u, disabled_handle) = ready_dispatcher(false);

    let _a = enabled.send_stream_command("OpenChannel", json!({})).unwrap();
    let _b = disabled.send_stream_command("OpenChannel", json!({})).unwrap();

    let credential = enabled_handle.calls()[0]
        .credential
        .clone()
        .expect("credential should be attached");
    assert_eq!(credential.secret(), TEST_MACAROON);
    assert!(disabled_handle.calls()[0].credential.is_none());
}

/// **VALUE**: Verifies that precondition failures are returned immediately.
///
/// **WHY THIS MATTERS**: Streams are returned synchronously, so there is no future to
/// carry the error. A caller must learn about NotReady before it starts consuming.
#[test]
fn given_server_not_ready_when_send_stream_command_then_returns_not_ready() {
    let (bridge, notifiers) = FakeBridge::new();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.unlocker.ready();

    let result = dispatcher.send_stream_command("SubscribeInvoices", json!({}));

    match result {
        Err(DispatchError::NotReady { service, .. }) => assert_eq!(service, RpcService::Lightning),
        Err(other) => panic!("Expected NotReady, got {other:?}"),
        Ok(_) => panic!("Expected NotReady, got an open stream"),
    }
    assert_eq!(bridge.lightning_handle().call_count(), 0);
}

/// **VALUE**: Verifies Disconnected for streams when the main handle is missing.
#[test]
fn given_ready_but_no_connection_when_send_stream_command_then_returns_disconnected() {
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_connection();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.server.ready();

    let result = dispatcher.send_stream_command("SubscribeInvoices", json!({}));

    assert!(matches!(result, Err(DispatchError::Disconnected { .. })));
}

/// **VALUE**: Verifies InvalidMethod for unknown names and for unary methods.
///
/// **BUG THIS CATCHES**: Would catch `GetInfo` being opened as a stream, which the node
/// answers with a single message and then an opaque protocol error.
#[test]
fn given_ready_when_unknown_or_unary_method_streamed_then_returns_invalid_method() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);

    let unknown = dispatcher.send_stream_command("Bogus", json!({}));
    let unary = dispatcher.send_stream_command("GetInfo", json!({}));
    let unlocker = dispatcher.send_stream_command("InitWallet", json!({}));

    assert!(matches!(unknown, Err(DispatchError::InvalidMethod { .. })));
    match unary {
        Err(DispatchError::InvalidMethod { message, .. }) => {
            assert!(message.contains("unary method called as stream"), "got: {message}");
        }
        Err(other) => panic!("Expected InvalidMethod, got {other:?}"),
        Ok(_) => panic!("Expected InvalidMethod, got an open stream"),
    }
    assert!(matches!(unlocker, Err(DispatchError::InvalidMethod { .. })));
    assert_eq!(lightning.call_count(), 0);
}

/// **VALUE**: Verifies that a refused stream is wrapped, unchanged, and logged.
#[test]
fn given_transport_refuses_stream_when_opened_then_returns_remote_call_failed() {
    // GIVEN: Node refuses to open any stream
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(true);
    let remote = RemoteError::new(RpcStatusCode::PERMISSION_DENIED, "permission denied");
    lightning.fail_stream_open(remote.clone());
    capture_logs();

    // WHEN: Opening a payment stream
    let result = dispatcher.send_stream_command("SendPayment", json!({"amt": 10}));

    // THEN: RemoteCallFailed with the exact error, logged with the method name
    match result {
        Err(err) => {
            assert!(matches!(err, DispatchError::RemoteCallFailed { .. }));
            assert_eq!(err.remote_error(), Some(&remote));
        }
        Ok(_) => panic!("Expected RemoteCallFailed, got an open stream"),
    }
    assert_eq!(
        logs_matching(Level::Error, &["stream method SendPayment", "permission denied"]).len(),
        1
    );
}
