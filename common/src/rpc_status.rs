//! RPC status codes reported by the node transport.

/// Canonical RPC status code (gRPC numbering).
///
/// Stored directly rather than parsed from error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RpcStatusCode(pub i32);

impl RpcStatusCode {
    pub const OK: Self = Self(0);
    pub const CANCELLED: Self = Self(1);
    pub const UNKNOWN: Self = Self(2);
    pub const INVALID_ARGUMENT: Self = Self(3);
    pub const DEADLINE_EXCEEDED: Self = Self(4);
    pub const NOT_FOUND: Self = Self(5);
    pub const PERMISSION_DENIED: Self = Self(7);
    pub const UNIMPLEMENTED: Self = Self(12);
    pub const INTERNAL: Self = Self(13);
    pub const UNAVAILABLE: Self = Self(14);
    pub const UNAUTHENTICATED: Self = Self(16);

    /// Human-readable name of the code, `"CODE(n)"` for unlisted values.
    pub fn name(&self) -> String {
        let name = match self.0 {
            0 => "OK",
            1 => "CANCELLED",
            2 => "UNKNOWN",
            3 => "INVALID_ARGUMENT",
            4 => "DEADLINE_EXCEEDED",
            5 => "NOT_FOUND",
            6 => "ALREADY_EXISTS",
            7 => "PERMISSION_DENIED",
            8 => "RESOURCE_EXHAUSTED",
            9 => "FAILED_PRECONDITION",
            10 => "ABORTED",
            11 => "OUT_OF_RANGE",
            12 => "UNIMPLEMENTED",
            13 => "INTERNAL",
            14 => "UNAVAILABLE",
            15 => "DATA_LOSS",
            16 => "UNAUTHENTICATED",
            other => return format!("CODE({other})"),
        };
        name.to_string()
    }

    /// The call was abandoned because its deadline elapsed.
    pub fn is_deadline_exceeded(&self) -> bool {
        *self == Self::DEADLINE_EXCEEDED
    }

    /// Authentication was missing or rejected by the node.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.0, 7 | 16)
    }
}

impl From<i32> for RpcStatusCode {
    fn from(code: i32) -> Self {
        RpcStatusCode(code)
    }
}

impl std::fmt::Display for RpcStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
