//! Closed table of RPC methods the dispatcher knows how to route.
//!
//! Call sites still address methods by their wire name. The name is resolved
//! here once, so an unknown name is rejected before any readiness or handle
//! state is looked at.

use std::fmt;
use std::str::FromStr;

/// Backend service a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcService {
    /// Wallet unlock phase, available before the main service.
    Unlocker,
    /// Fully started node.
    Lightning,
}

impl fmt::Display for RpcService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcService::Unlocker => write!(f, "unlocker"),
            RpcService::Lightning => write!(f, "lightning"),
        }
    }
}

/// Shape of a call on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Unary,
    ServerStreaming,
}

macro_rules! rpc_methods {
    ($( $variant:ident => ($service:ident, $kind:ident) ),+ $(,)?) => {
        /// Every RPC method reachable through the dispatcher.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RpcMethod {
            $( $variant, )+
        }

        impl RpcMethod {
            pub const ALL: &'static [RpcMethod] = &[ $( RpcMethod::$variant, )+ ];

            /// Wire name, as used by call sites.
            pub const fn name(self) -> &'static str {
                match self {
                    $( RpcMethod::$variant => stringify!($variant), )+
                }
            }

            pub const fn service(self) -> RpcService {
                match self {
                    $( RpcMethod::$variant => RpcService::$service, )+
                }
            }

            pub const fn kind(self) -> CallKind {
                match self {
                    $( RpcMethod::$variant => CallKind::$kind, )+
                }
            }
        }
    };
}

rpc_methods! {
    GenSeed => (Unlocker, Unary),
    InitWallet => (Unlocker, Unary),
    UnlockWallet => (Unlocker, Unary),
    ChangePassword => (Unlocker, Unary),

    GetInfo => (Lightning, Unary),
    WalletBalance => (Lightning, Unary),
    ChannelBalance => (Lightning, Unary),
    NewAddress => (Lightning, Unary),
    SendCoins => (Lightning, Unary),
    GetTransactions => (Lightning, Unary),
    ListPeers => (Lightning, Unary),
    ConnectPeer => (Lightning, Unary),
    ListChannels => (Lightning, Unary),
    PendingChannels => (Lightning, Unary),
    ClosedChannels => (Lightning, Unary),
    OpenChannelSync => (Lightning, Unary),
    AddInvoice => (Lightning, Unary),
    LookupInvoice => (Lightning, Unary),
    ListInvoices => (Lightning, Unary),
    DecodePayReq => (Lightning, Unary),
    SendPaymentSync => (Lightning, Unary),
    ListPayments => (Lightning, Unary),
    QueryRoutes => (Lightning, Unary),
    GetNodeInfo => (Lightning, Unary),
    GetNetworkInfo => (Lightning, Unary),
    DescribeGraph => (Lightning, Unary),
    StopDaemon => (Lightning, Unary),

    OpenChannel => (Lightning, ServerStreaming),
    CloseChannel => (Lightning, ServerStreaming),
    SubscribeTransactions => (Lightning, ServerStreaming),
    SubscribeInvoices => (Lightning, ServerStreaming),
    SubscribeChannelGraph => (Lightning, ServerStreaming),
    SendPayment => (Lightning, ServerStreaming),
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a wire name is not in the method table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for RpcMethod {
    type Err = UnknownMethod;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RpcMethod::ALL
            .iter()
            .copied()
            .find(|method| method.name() == name)
            .ok_or_else(|| UnknownMethod(name.to_string()))
    }
}
