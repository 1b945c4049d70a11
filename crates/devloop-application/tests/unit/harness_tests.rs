//! Tests for the dev-mode harness state machine

use std::sync::Arc;

use devloop_domain::error::Error;
use devloop_domain::value_objects::{BodyMatcher, HarnessState, ReplacementSet};

use crate::test_utils::fakes::{
    RecordingPatcher, RecordingRunner, ScriptedPoller, fixture, harness,
};

fn collaborators() -> (Arc<RecordingRunner>, Arc<ScriptedPoller>, Arc<RecordingPatcher>) {
    (
        Arc::new(RecordingRunner::default()),
        Arc::new(ScriptedPoller::default()),
        Arc::new(RecordingPatcher::default()),
    )
}

fn howdy_to_modified() -> ReplacementSet {
    ReplacementSet::single("return \"howdy\"", "return \"modified\"")
}

#[test]
fn test_full_cycle_reaches_verified_then_stopped() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    assert_eq!(h.state(), HarnessState::NotStarted);

    h.start().unwrap();
    assert_eq!(h.state(), HarnessState::Starting);

    h.await_ready("/", BodyMatcher::contains_all(["ready", "org.acme"]))
        .unwrap();
    assert_eq!(h.state(), HarnessState::Ready);

    h.assert_response("/hello", BodyMatcher::contains("howdy"))
        .unwrap();
    assert_eq!(h.state(), HarnessState::Ready);

    h.mutate("domain/src/customer_service.rs", &howdy_to_modified())
        .unwrap();
    assert_eq!(h.state(), HarnessState::Mutating);

    h.await_reload("/hello", BodyMatcher::contains("modified"))
        .unwrap();
    assert_eq!(h.state(), HarnessState::Verified);
    assert_eq!(h.verified_cycles(), 1);

    h.stop().unwrap();
    assert_eq!(h.state(), HarnessState::Stopped);
    assert_eq!(runner.stop_calls(), 1);
    assert_eq!(runner.termination_count(), 1);
    assert_eq!(poller.polled_paths(), vec!["/", "/hello", "/hello"]);
    assert_eq!(
        patcher.patched.lock().unwrap().as_slice(),
        &[fixture().root().join("domain/src/customer_service.rs")]
    );
}

#[test]
fn test_start_passes_fixture_command_to_runner() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();

    let launches = runner.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].arguments, vec!["clean", ":web:dev"]);
    assert_eq!(launches[0].working_dir, fixture().root());
}

#[test]
fn test_launch_failure_marks_harness_failed() {
    let runner = Arc::new(RecordingRunner::failing_launch());
    let poller = Arc::new(ScriptedPoller::default());
    let patcher = Arc::new(RecordingPatcher::default());
    let mut h = harness(&runner, &poller, &patcher);

    let err = h.start().unwrap_err();
    assert!(matches!(err, Error::Launch { .. }));
    assert_eq!(h.state(), HarnessState::Failed);

    // nothing was launched, so nothing is stopped
    h.stop().unwrap();
    assert_eq!(runner.stop_calls(), 0);
}

#[test]
fn test_readiness_timeout_carries_output_tail() {
    let (runner, _, patcher) = collaborators();
    let poller = Arc::new(ScriptedPoller::with_script([false]));
    let mut h = harness(&runner, &poller, &patcher);

    h.start().unwrap();
    let err = h
        .await_ready("/", BodyMatcher::contains("ready"))
        .unwrap_err();
    assert_eq!(h.state(), HarnessState::Failed);

    let timeout = err.as_poll_timeout().expect("poll timeout");
    assert_eq!(timeout.attempts, 3);
    assert!(
        timeout
            .output_tail
            .iter()
            .any(|line| line.contains("Listening on"))
    );
}

#[test]
fn test_missing_substring_stops_process_once() {
    let (runner, poller, _) = collaborators();
    let patcher = Arc::new(RecordingPatcher::missing_substring());
    let mut h = harness(&runner, &poller, &patcher);

    h.start().unwrap();
    h.await_ready("/", BodyMatcher::contains("ready")).unwrap();
    let err = h
        .mutate("domain/src/customer_service.rs", &howdy_to_modified())
        .unwrap_err();
    assert!(matches!(err, Error::MissingSubstring { .. }));
    assert_eq!(h.state(), HarnessState::Failed);

    h.stop().unwrap();
    h.stop().unwrap();
    assert_eq!(h.state(), HarnessState::Stopped);
    assert_eq!(runner.stop_calls(), 1);
}

#[test]
fn test_mutate_rejects_paths_outside_fixture() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();
    h.await_ready("/", BodyMatcher::contains("ready")).unwrap();

    let err = h.mutate("../escape.rs", &howdy_to_modified()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(patcher.patched.lock().unwrap().is_empty());
}

#[test]
fn test_invalid_transition_leaves_state_unchanged() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);

    let err = h
        .mutate("domain/src/customer_service.rs", &howdy_to_modified())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(h.state(), HarnessState::NotStarted);

    h.start().unwrap();
    let err = h
        .await_reload("/hello", BodyMatcher::contains("modified"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(h.state(), HarnessState::Starting);

    let err = h.start().unwrap_err();
    assert!(err.to_string().contains("starting"));
}

#[test]
fn test_operations_after_stop_are_rejected() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();
    h.stop().unwrap();

    assert!(matches!(h.start(), Err(Error::InvalidTransition { .. })));
    assert!(matches!(
        h.assert_response("/hello", BodyMatcher::contains("howdy")),
        Err(Error::InvalidTransition { .. })
    ));
    assert_eq!(h.state(), HarnessState::Stopped);
}

#[test]
fn test_repeated_cycles_count_verifications() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();
    h.await_ready("/", BodyMatcher::contains("ready")).unwrap();

    for word in ["first", "second", "third"] {
        h.mutate(
            "domain/src/customer_service.rs",
            &ReplacementSet::single("howdy", word),
        )
        .unwrap();
        h.await_reload("/hello", BodyMatcher::contains(word)).unwrap();
    }
    assert_eq!(h.verified_cycles(), 3);
    assert_eq!(h.state(), HarnessState::Verified);
}

#[test]
fn test_termination_failure_surfaces_when_nothing_failed_before() {
    let runner = Arc::new(RecordingRunner::failing_terminate());
    let poller = Arc::new(ScriptedPoller::default());
    let patcher = Arc::new(RecordingPatcher::default());
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();

    let err = h.stop().unwrap_err();
    assert!(matches!(err, Error::ProcessTermination { .. }));
    assert_eq!(h.state(), HarnessState::Stopped);
}

#[test]
fn test_termination_failure_swallowed_after_earlier_failure() {
    let runner = Arc::new(RecordingRunner::failing_terminate());
    let poller = Arc::new(ScriptedPoller::with_script([false]));
    let patcher = Arc::new(RecordingPatcher::default());
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();
    assert!(h.await_ready("/", BodyMatcher::contains("ready")).is_err());

    h.stop().unwrap();
    assert_eq!(h.state(), HarnessState::Stopped);
}

#[test]
fn test_run_reports_body_error_and_still_stops() {
    let runner = Arc::new(RecordingRunner::failing_terminate());
    let poller = Arc::new(ScriptedPoller::default());
    let patcher = Arc::new(RecordingPatcher::missing_substring());
    let h = harness(&runner, &poller, &patcher);

    let err = h
        .run(|h| {
            h.start()?;
            h.await_ready("/", BodyMatcher::contains("ready"))?;
            h.mutate("domain/src/customer_service.rs", &howdy_to_modified())
        })
        .unwrap_err();
    assert!(matches!(err, Error::MissingSubstring { .. }));
    assert_eq!(runner.stop_calls(), 1);
}

#[test]
fn test_run_returns_body_value() {
    let (runner, poller, patcher) = collaborators();
    let h = harness(&runner, &poller, &patcher);
    let cycles = h
        .run(|h| {
            h.start()?;
            h.await_ready("/", BodyMatcher::contains("ready"))?;
            h.mutate("domain/src/customer_service.rs", &howdy_to_modified())?;
            h.await_reload("/hello", BodyMatcher::contains("modified"))?;
            Ok(h.verified_cycles())
        })
        .unwrap();
    assert_eq!(cycles, 1);
    assert_eq!(runner.termination_count(), 1);
}

#[test]
fn test_drop_stops_running_process() {
    let (runner, poller, patcher) = collaborators();
    {
        let mut h = harness(&runner, &poller, &patcher);
        h.start().unwrap();
    }
    assert_eq!(runner.stop_calls(), 1);
    assert_eq!(runner.termination_count(), 1);
}

#[test]
fn test_run_and_stop_leaves_harness_inspectable() {
    let (runner, poller, patcher) = collaborators();
    let mut h = harness(&runner, &poller, &patcher);
    h.run_and_stop(|h| {
        h.start()?;
        h.await_ready("/", BodyMatcher::contains("ready"))?;
        h.mutate("domain/src/customer_service.rs", &howdy_to_modified())?;
        h.await_reload("/hello", BodyMatcher::contains("modified"))
    })
    .unwrap();
    assert_eq!(h.state(), HarnessState::Stopped);
    assert_eq!(h.verified_cycles(), 1);
    assert_eq!(runner.stop_calls(), 1);
}

#[test]
fn test_exited_process_fails_readiness_without_polling() {
    let runner = Arc::new(RecordingRunner::exiting_early());
    let poller = Arc::new(ScriptedPoller::default());
    let patcher = Arc::new(RecordingPatcher::default());
    let mut h = harness(&runner, &poller, &patcher);
    h.start().unwrap();

    let err = h
        .await_ready("/", BodyMatcher::contains("ready"))
        .unwrap_err();
    match err {
        Error::Launch { message, .. } => {
            assert!(message.contains("process exited"), "message: {message}");
            assert!(message.contains("Listening on http://127.0.0.1:18080"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.state(), HarnessState::Failed);
    assert!(poller.polled_paths().is_empty());

    // the group is still signalled and reaped
    h.stop().unwrap();
    assert_eq!(runner.termination_count(), 1);
}
