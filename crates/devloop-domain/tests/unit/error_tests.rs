//! Error display and classification tests

use std::path::PathBuf;

use devloop_domain::error::Error;
use devloop_domain::value_objects::HarnessState;

#[test]
fn test_missing_substring_names_file_and_search() {
    let err = Error::missing_substring(
        PathBuf::from("domain/src/customer_service.rs"),
        "return \"howdy\"",
    );
    let rendered = err.to_string();
    assert!(rendered.contains("domain/src/customer_service.rs"));
    assert!(rendered.contains("return \\\"howdy\\\""));
}

#[test]
fn test_launch_error_mentions_program_and_directory() {
    let err = Error::launch("gradlew", "/missing/project", "working directory does not exist");
    let rendered = err.to_string();
    assert!(rendered.contains("gradlew"));
    assert!(rendered.contains("/missing/project"));
}

#[test]
fn test_invalid_transition_is_not_fatal() {
    let err = Error::invalid_transition(HarnessState::NotStarted, "mutate sources");
    assert!(!err.is_fatal_to_harness());
    assert_eq!(err.to_string(), "Cannot mutate sources while harness is not started");
    assert!(Error::missing_substring("f", "s").is_fatal_to_harness());
}

#[test]
fn test_process_termination_includes_pid() {
    let err = Error::process_termination(Some(99), "group still alive");
    assert_eq!(err.to_string(), "Failed to terminate process 99: group still alive");
    let err = Error::process_termination(None, "no child");
    assert_eq!(err.to_string(), "Failed to terminate process: no child");
}
