pub mod config;
pub mod dispatch;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;

pub use config::DispatcherConfig;
pub use dispatch::{BackendBridge, RpcCommandDispatcher, RpcHandle};
pub use error::{CoreError, DispatchError};
