use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every dispatch and config error carries an ErrorLocation. If it
/// stops capturing the caller, log lines for failed RPCs lose the one clue that says
/// which call site produced them.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated
/// or the file path is dropped.
#[test]
#[track_caller]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN / WHEN: Creating ErrorLocation from the caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: File, line and column are populated
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the bracketed `[file:line:column]` Display format.
///
/// **BUG THIS CATCHES**: Would catch format drift that breaks log grepping.
#[test]
fn given_error_location_when_displayed_then_uses_bracketed_format() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/dispatch/dispatcher.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting it
    let rendered = location.to_string();

    // THEN: Matches the bracketed format exactly
    assert_eq!(rendered, "[src/dispatch/dispatcher.rs:42:7]");
}
