use crate::helpers::{FakeBridge, ready_dispatcher};

use bridge_core::RpcCommandDispatcher;
use bridge_core::dispatch::RpcMethod;
use bridge_core::error::{CoreError, DispatchError, RemoteError};

use std::error::Error;

use serde_json::json;

/// **VALUE**: Verifies that every error displays its kind and where it was raised.
///
/// **WHY THIS MATTERS**: Dispatch errors end up in the app log and in bug reports.
/// Without the location there is no telling which check rejected the call.
#[tokio::test]
async fn given_each_precondition_failure_when_displayed_then_shows_kind_and_location() {
    let (bridge, _notifiers) = FakeBridge::new();
    let not_ready = RpcCommandDispatcher::new(&bridge, false);
    let (ready, _unlocker, _lightning) = ready_dispatcher(false);

    let cases = [
        (
            not_ready.send_command("GetInfo", json!({})).await.unwrap_err(),
            "Not Ready Error: Server still starting (lightning)",
        ),
        (
            ready.send_command("Bogus", json!({})).await.unwrap_err(),
            "Invalid Method Error: Invalid rpc method 'Bogus'",
        ),
    ];

    for (err, expected) in cases {
        let display = err.to_string();
        assert!(display.starts_with(expected), "got: {display}");
        assert!(display.contains(".rs:"), "missing location: {display}");
    }
}

/// **VALUE**: Verifies that Disconnected reads differently from NotReady.
#[tokio::test]
async fn given_disconnected_error_when_displayed_then_mentions_connection() {
    let (bridge, notifiers) = FakeBridge::new();
    let bridge = bridge.without_unlocker();
    let dispatcher = RpcCommandDispatcher::new(&bridge, false);
    notifiers.unlocker.ready();

    let err = dispatcher
        .send_unlocker_command("GenSeed", json!({}))
        .await
        .unwrap_err();

    assert!(
        err.to_string()
            .starts_with("Disconnected Error: Could not connect over RPC (unlocker)"),
        "got: {err}"
    );
}

/// **VALUE**: Verifies that a remote failure exposes the transport error as its source.
///
/// **BUG THIS CATCHES**: Would catch `#[source]` being dropped, which breaks error
/// chain reporting (`anyhow`-style `{:#}` output) in embedding apps.
#[tokio::test]
async fn given_remote_call_failed_when_source_inspected_then_is_transport_error() {
    let (dispatcher, _unlocker, lightning) = ready_dispatcher(false);
    let remote = RemoteError::unknown("wallet locked");
    lightning.respond(RpcMethod::NewAddress, Err(remote.clone()));

    let err = dispatcher
        .send_command("NewAddress", json!({"type": 0}))
        .await
        .unwrap_err();

    let source = err.source().expect("remote failure should have a source");
    assert_eq!(source.to_string(), "UNKNOWN: wallet locked");
    assert!(err.to_string().contains("NewAddress: UNKNOWN: wallet locked"));
    assert_eq!(err.remote_error(), Some(&remote));
}

/// **VALUE**: Verifies that only NotReady is reported as transient.
///
/// **WHY THIS MATTERS**: The UI retries transient errors on a timer. Retrying a
/// disconnected handle or a bad method name would spin forever.
#[tokio::test]
async fn given_dispatch_errors_when_checked_for_transience_then_only_not_ready_is_transient() {
    let (bridge, _notifiers) = FakeBridge::new();
    let not_ready = RpcCommandDispatcher::new(&bridge, false);
    let (ready, _unlocker, lightning) = ready_dispatcher(false);
    lightning.respond(RpcMethod::GetInfo, Err(RemoteError::unavailable("down")));

    let not_ready_err = not_ready.send_command("GetInfo", json!({})).await.unwrap_err();
    let invalid_err = ready.send_command("Bogus", json!({})).await.unwrap_err();
    let remote_err = ready.send_command("GetInfo", json!({})).await.unwrap_err();

    assert!(not_ready_err.is_transient());
    assert!(!invalid_err.is_transient());
    assert!(!remote_err.is_transient());
    assert_eq!(not_ready_err.remote_error(), None);
}

/// **VALUE**: Verifies that dispatch errors convert into the crate-level error unchanged.
#[tokio::test]
async fn given_dispatch_error_when_converted_to_core_error_then_display_is_preserved() {
    let (dispatcher, _unlocker, _lightning) = ready_dispatcher(false);
    let err: DispatchError = dispatcher.send_command("Bogus", json!({})).await.unwrap_err();
    let display = err.to_string();

    let core: CoreError = err.into();

    assert!(matches!(core, CoreError::Dispatch(_)));
    assert_eq!(core.to_string(), display);
}
