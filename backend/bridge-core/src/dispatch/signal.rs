//! One-shot readiness signal for building [`ReadinessRegistrar`]s.
//!
//! A bridge implementation creates a signal per backend phase, keeps the
//! [`ReadinessNotifier`] next to the process it watches, and hands the
//! registrar to the dispatcher. The callback runs exactly once, whichever
//! side shows up first.

use crate::dispatch::{ReadinessRegistrar, ReadyCallback};
use crate::error::RemoteError;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

const NOTIFIER_DROPPED_MESSAGE: &str = "backend exited before becoming ready";

enum SignalState {
    /// Nothing fired yet; holds the callback once registered.
    Waiting(Option<ReadyCallback>),
    /// Fired before anyone registered.
    Fired(Result<(), RemoteError>),
    /// Callback has run.
    Delivered,
}

struct Shared {
    phase: &'static str,
    state: Mutex<SignalState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, result: Result<(), RemoteError>) {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, SignalState::Delivered) {
            SignalState::Waiting(Some(callback)) => {
                drop(state);
                callback(result);
            }
            SignalState::Waiting(None) => {
                *state = SignalState::Fired(result);
            }
            previous @ (SignalState::Fired(_) | SignalState::Delivered) => {
                *state = previous;
                debug!("Readiness for {} already signalled, ignoring", self.phase);
            }
        }
    }

    fn register(&self, callback: ReadyCallback) {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, SignalState::Delivered) {
            SignalState::Fired(result) => {
                drop(state);
                callback(result);
            }
            SignalState::Waiting(_) => {
                *state = SignalState::Waiting(Some(callback));
            }
            SignalState::Delivered => {
                debug!("Readiness for {} already delivered, dropping callback", self.phase);
            }
        }
    }
}

/// Factory for notifier/registrar pairs.
pub struct ReadinessSignal;

impl ReadinessSignal {
    /// Create a signal for one backend phase.
    ///
    /// `phase` only appears in log output.
    pub fn channel(phase: &'static str) -> (ReadinessNotifier, ReadinessRegistrar) {
        let shared = Arc::new(Shared {
            phase,
            state: Mutex::new(SignalState::Waiting(None)),
        });

        let registrar_shared = Arc::clone(&shared);
        let registrar: ReadinessRegistrar =
            Box::new(move |callback| registrar_shared.register(callback));

        (
            ReadinessNotifier {
                shared: Some(shared),
            },
            registrar,
        )
    }
}

/// Producer side of a [`ReadinessSignal`].
///
/// Dropping it without calling [`ready`](Self::ready) or
/// [`failed`](Self::failed) reports an `UNAVAILABLE` error to the callback.
pub struct ReadinessNotifier {
    shared: Option<Arc<Shared>>,
}

impl ReadinessNotifier {
    pub fn ready(mut self) {
        if let Some(shared) = self.shared.take() {
            shared.deliver(Ok(()));
        }
    }

    pub fn failed(mut self, error: RemoteError) {
        if let Some(shared) = self.shared.take() {
            shared.deliver(Err(error));
        }
    }
}

impl Drop for ReadinessNotifier {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.deliver(Err(RemoteError::unavailable(NOTIFIER_DROPPED_MESSAGE)));
        }
    }
}
