//! One-way readiness flags for the two backend phases.
//!
//! Only the callbacks the dispatcher registers can raise a flag; everything
//! else gets a read-only view. Flags never go back to false.

use crate::dispatch::RpcService;

use std::sync::atomic::{AtomicBool, Ordering};

/// Readiness of the unlock phase and of the main service.
#[derive(Debug, Default)]
pub struct ReadinessState {
    unlocker_ready: AtomicBool,
    server_ready: AtomicBool,
}

impl ReadinessState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Unlock-phase RPCs are accepted by the backend.
    pub fn is_unlocker_ready(&self) -> bool {
        self.unlocker_ready.load(Ordering::Acquire)
    }

    /// The main service has finished starting.
    pub fn is_server_ready(&self) -> bool {
        self.server_ready.load(Ordering::Acquire)
    }

    /// Readiness of the flag that gates calls to `service`.
    pub fn is_ready(&self, service: RpcService) -> bool {
        match service {
            RpcService::Unlocker => self.is_unlocker_ready(),
            RpcService::Lightning => self.is_server_ready(),
        }
    }

    /// Raise the flag for `service`.
    ///
    /// Returns `true` only for the call that flipped it.
    pub(crate) fn mark_ready(&self, service: RpcService) -> bool {
        let flag = match service {
            RpcService::Unlocker => &self.unlocker_ready,
            RpcService::Lightning => &self.server_ready,
        };
        !flag.swap(true, Ordering::AcqRel)
    }
}
