//! Client handle abstraction over the node transport.

use crate::dispatch::{RpcMethod, RpcService};
use crate::error::{DispatchError, RemoteError};

use common::Credential;

use std::time::SystemTime;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use serde_json::Value;

/// Response items of a server-streaming call.
pub type RpcStream = BoxStream<'static, Result<Value, RemoteError>>;

/// Settles once with a unary call's response or its failure.
pub type PendingCall = BoxFuture<'static, Result<Value, DispatchError>>;

/// Per-call options handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Absolute time after which the transport abandons the call.
    pub deadline: SystemTime,
}

/// A connected client for one backend service.
///
/// `credential` is `None` whenever no metadata should be attached; the
/// transport must not substitute an empty entry.
pub trait RpcHandle: Send + Sync {
    /// Service this handle talks to.
    fn service(&self) -> RpcService;

    /// Whether `method` can be invoked through this handle.
    fn supports(&self, method: RpcMethod) -> bool {
        method.service() == self.service()
    }

    /// Start a unary call.
    fn unary(
        &self,
        method: RpcMethod,
        request: Value,
        credential: Option<&Credential>,
        options: CallOptions,
    ) -> BoxFuture<'static, Result<Value, RemoteError>>;

    /// Open a server-streaming call.
    ///
    /// Errors here mean the stream could not be established at all; failures
    /// after that arrive as stream items.
    fn server_stream(
        &self,
        method: RpcMethod,
        request: Value,
        credential: Option<&Credential>,
    ) -> Result<RpcStream, RemoteError>;
}
