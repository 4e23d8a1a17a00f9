//! RPC command dispatch between the app and the node backend.
//!
//! The [`RpcCommandDispatcher`] is built once per session from a
//! [`BackendBridge`]. It tracks readiness of the unlock phase and of the main
//! service, and routes three kinds of calls:
//!
//! - unary calls against the unlocker (`send_unlocker_command`)
//! - unary calls against the main service (`send_command`)
//! - server-streaming calls against the main service (`send_stream_command`)
//!
//! # Preconditions
//!
//! Every call is checked locally before anything reaches the transport, in
//! this order: readiness, handle presence, method support. Unary calls carry
//! a deadline five minutes after the call starts; streams carry none.
//!
//! # Authentication
//!
//! When authentication is enabled the credential obtained from the bridge is
//! attached to every call. When it is disabled no metadata is sent at all.

mod bridge;
mod clock;
mod dispatcher;
mod handle;
mod method;
mod readiness;
mod signal;

pub use bridge::{BackendBridge, ReadinessRegistrar, ReadyCallback};
pub use clock::{Clock, SystemClock};
pub use dispatcher::{RPC_DEADLINE, RpcCommandDispatcher};
pub use handle::{CallOptions, PendingCall, RpcHandle, RpcStream};
pub use method::{CallKind, RpcMethod, RpcService, UnknownMethod};
pub use readiness::ReadinessState;
pub use signal::{ReadinessNotifier, ReadinessSignal};
