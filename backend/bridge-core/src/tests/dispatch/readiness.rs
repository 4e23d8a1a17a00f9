use crate::dispatch::{ReadinessState, RpcService};

use std::sync::Arc;
use std::thread;

/// **VALUE**: Verifies both flags start false.
#[test]
fn given_new_state_when_inspected_then_nothing_is_ready() {
    let state = ReadinessState::new();

    assert!(!state.is_unlocker_ready());
    assert!(!state.is_server_ready());
    assert!(!state.is_ready(RpcService::Unlocker));
    assert!(!state.is_ready(RpcService::Lightning));
}

/// **VALUE**: Verifies that the two phases are tracked independently.
///
/// **BUG THIS CATCHES**: Would catch the unlocker callback raising the main-service
/// flag, which let unlock-phase calls through while the node was still starting.
#[test]
fn given_unlocker_marked_ready_when_inspected_then_server_is_still_not_ready() {
    let state = ReadinessState::new();

    state.mark_ready(RpcService::Unlocker);

    assert!(state.is_unlocker_ready());
    assert!(!state.is_server_ready());
}

/// **VALUE**: Verifies that only the first mark reports a transition.
///
/// **WHY THIS MATTERS**: The "ready" log line is emitted on transition. A duplicate
/// readiness notification must not log twice or reset anything.
#[test]
fn given_flag_already_set_when_marked_again_then_reports_no_transition() {
    let state = ReadinessState::new();

    assert!(state.mark_ready(RpcService::Lightning));
    assert!(!state.mark_ready(RpcService::Lightning));
    assert!(state.is_server_ready());
}

/// **VALUE**: Verifies that concurrent marks produce exactly one transition.
///
/// **BUG THIS CATCHES**: Would catch a load-then-store replacing the atomic swap.
#[test]
fn given_concurrent_marks_when_raced_then_exactly_one_transition() {
    let state = Arc::new(ReadinessState::new());

    let transitions: usize = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || state.mark_ready(RpcService::Lightning))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .filter(|flipped| *flipped)
        .count();

    assert_eq!(transitions, 1);
    assert!(state.is_server_ready());
}
