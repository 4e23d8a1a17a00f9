pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod logger;
pub mod remote;

pub use bridge::BridgeError;
pub use dispatch::DispatchError;
pub use remote::RemoteError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Dispatch(#[from] dispatch::DispatchError),

    #[error(transparent)]
    Bridge(#[from] bridge::BridgeError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Logger(#[from] logger::LoggerError),
}
