// Unit tests for logger initialization.
// Kept in a single test: the logger is process-global.

use crate::error::logger::LoggerError;
use crate::logger::{LOG_FILE_NAME, initialize};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies failure reporting, retry after failure, and idempotency.
///
/// **WHY THIS MATTERS**: The embedding app calls `initialize()` from its startup path.
/// An unwritable log directory must come back as an error (not a panic), must not
/// poison later attempts, and a second successful call must be a no-op rather than a
/// "logger already set" failure.
///
/// **BUG THIS CATCHES**: Would catch:
/// - `fern::log_file()` being unwrapped
/// - A failed attempt marking the logger as installed
/// - The AtomicBool guard being removed (fern errors on a second `apply()`)
#[test]
fn given_logger_when_initialized_in_sequence_then_fails_retries_and_is_idempotent() {
    // GIVEN: A directory that cannot hold a log file
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Initializing there
    let failed = initialize(&invalid_dir);

    // THEN: LogFile error
    assert!(
        matches!(failed, Err(LoggerError::LogFile { .. })),
        "Should report LogFile error, got {failed:?}"
    );

    // GIVEN: A writable directory
    let dir = TempDir::new().unwrap();

    // WHEN: Retrying, then calling again
    let first = initialize(dir.path());
    let second = initialize(dir.path());

    // THEN: Both succeed and the log file exists
    assert!(first.is_ok(), "Retry after failure should succeed: {first:?}");
    assert!(second.is_ok(), "Second initialization should be a no-op");
    assert!(dir.path().join(LOG_FILE_NAME).exists());
}
