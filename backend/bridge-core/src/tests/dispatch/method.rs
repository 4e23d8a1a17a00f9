use crate::dispatch::{CallKind, RpcMethod, RpcService};

use std::collections::HashSet;

/// **VALUE**: Verifies that every method's wire name parses back to the same method.
///
/// **WHY THIS MATTERS**: Call sites address methods by name. If a variant's name and
/// its parse entry drift apart, that method becomes unreachable and every call to it
/// is rejected as invalid.
///
/// **BUG THIS CATCHES**: Would catch a hand-edited name table falling out of sync with
/// the enum.
#[test]
fn given_every_method_when_name_parsed_then_resolves_to_same_method() {
    for method in RpcMethod::ALL {
        let parsed: RpcMethod = method.name().parse().expect("name should parse");
        assert_eq!(parsed, *method, "round trip failed for {}", method.name());
    }
}

/// **VALUE**: Verifies that wire names are unique.
///
/// **BUG THIS CATCHES**: Would catch two variants sharing a name, which would make
/// `from_str` silently route to the first one.
#[test]
fn given_method_table_when_names_collected_then_all_are_unique() {
    let names: HashSet<&str> = RpcMethod::ALL.iter().map(|m| m.name()).collect();
    assert_eq!(names.len(), RpcMethod::ALL.len());
}

/// **VALUE**: Verifies that lookups are exact (case-sensitive, no trimming).
///
/// **WHY THIS MATTERS**: The node's method names are case-sensitive. Accepting
/// "getinfo" would hide typos at call sites until they hit the transport.
#[test]
fn given_unknown_or_miscased_name_when_parsed_then_returns_unknown_method() {
    for name in ["Bogus", "getinfo", " GetInfo", "", "GetInfo "] {
        let result = name.parse::<RpcMethod>();
        assert!(result.is_err(), "'{name}' should not resolve");
        assert_eq!(result.unwrap_err().0, name);
    }
}

/// **VALUE**: Verifies the service and call shape of representative methods.
///
/// **BUG THIS CATCHES**: Would catch an unlocker method being registered under the
/// main service (making it unreachable before the node starts) or a subscription
/// registered as unary.
#[test]
fn given_known_methods_when_classified_then_service_and_kind_match_node() {
    assert_eq!(RpcMethod::UnlockWallet.service(), RpcService::Unlocker);
    assert_eq!(RpcMethod::GenSeed.kind(), CallKind::Unary);
    assert_eq!(RpcMethod::GetInfo.service(), RpcService::Lightning);
    assert_eq!(RpcMethod::GetInfo.kind(), CallKind::Unary);
    assert_eq!(RpcMethod::SubscribeInvoices.kind(), CallKind::ServerStreaming);
    assert_eq!(RpcMethod::CloseChannel.kind(), CallKind::ServerStreaming);
    assert_eq!(RpcMethod::OpenChannelSync.kind(), CallKind::Unary);
}

/// **VALUE**: Verifies that no unlocker method is a stream.
///
/// **WHY THIS MATTERS**: Streams are only dispatched against the main service, so a
/// streaming unlocker method could never be called.
#[test]
fn given_unlocker_methods_when_inspected_then_all_are_unary() {
    for method in RpcMethod::ALL
        .iter()
        .filter(|m| m.service() == RpcService::Unlocker)
    {
        assert_eq!(method.kind(), CallKind::Unary, "{method} should be unary");
    }
}
