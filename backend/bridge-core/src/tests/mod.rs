// Unit tests for crate-private behaviour.
// Public API tests live in integration_tests/.

mod config;
mod dispatch;
mod logger;
