use crate::RpcStatusCode;

/// **VALUE**: Verifies that status codes render by name in log lines.
///
/// **BUG THIS CATCHES**: Would catch a mismatch between the numeric table and the
/// constants, e.g. UNAVAILABLE printing as INTERNAL.
#[test]
fn given_known_codes_when_displayed_then_render_canonical_names() {
    assert_eq!(RpcStatusCode::UNAVAILABLE.to_string(), "UNAVAILABLE");
    assert_eq!(RpcStatusCode::DEADLINE_EXCEEDED.to_string(), "DEADLINE_EXCEEDED");
    assert_eq!(RpcStatusCode::from(9).to_string(), "FAILED_PRECONDITION");
}

/// **VALUE**: Verifies that unknown codes still render something useful.
#[test]
fn given_unknown_code_when_displayed_then_renders_numeric_fallback() {
    assert_eq!(RpcStatusCode(99).to_string(), "CODE(99)");
}

/// **VALUE**: Verifies the classification helpers used when logging failed calls.
#[test]
fn given_status_codes_when_classified_then_flags_match() {
    assert!(RpcStatusCode::DEADLINE_EXCEEDED.is_deadline_exceeded());
    assert!(!RpcStatusCode::UNAVAILABLE.is_deadline_exceeded());
    assert!(RpcStatusCode::UNAUTHENTICATED.is_auth_failure());
    assert!(RpcStatusCode::PERMISSION_DENIED.is_auth_failure());
    assert!(!RpcStatusCode::INTERNAL.is_auth_failure());
}
