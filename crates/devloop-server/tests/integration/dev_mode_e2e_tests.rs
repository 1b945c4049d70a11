//! End-to-end dev-mode loops against a real `devloop-fixture` process

use std::net::TcpStream;
use std::time::Duration;

use devloop_application::{DevModeHarness, Scenario};
use devloop_domain::error::Error;
use devloop_domain::value_objects::{BodyMatcher, HarnessState, ReplacementSet};
use devloop_infrastructure::config::{HarnessConfig, PollingConfig};
use devloop_infrastructure::{HarnessComponents, MaterializedFixture, ScenarioLauncher};

use crate::test_utils::{READY_NEEDLES, fixture_binary, fixture_template, free_port, materialized};

const SOURCE: &str = "domain/src/customer_service.rs";

fn config() -> HarnessConfig {
    HarnessConfig {
        polling: PollingConfig {
            readiness_timeout_secs: 60,
            reload_timeout_secs: 30,
            interval_ms: 100,
        },
        ..HarnessConfig::default()
    }
}

fn harness(port: u16, copy: &MaterializedFixture) -> DevModeHarness {
    let config = config();
    let settings = config
        .harness_settings()
        .with_base_url(format!("http://127.0.0.1:{port}"));
    HarnessComponents::from_config(&config)
        .expect("components")
        .harness(copy.fixture().clone(), settings)
}

fn is_listening(port: u16) -> bool {
    TcpStream::connect_timeout(
        &format!("127.0.0.1:{port}").parse().expect("socket address"),
        Duration::from_millis(200),
    )
    .is_ok()
}

#[test]
fn test_patched_greeting_is_served_after_reload() {
    let port = free_port();
    let copy = materialized(port);
    let mut harness = harness(port, &copy);

    harness.start().expect("start");
    harness
        .await_ready("/", BodyMatcher::contains_all(READY_NEEDLES))
        .expect("ready");
    harness
        .assert_response("/hello", BodyMatcher::equals("howdy"))
        .expect("initial greeting");

    harness
        .mutate(
            SOURCE,
            &ReplacementSet::single("return \"howdy\"", "return \"modified\""),
        )
        .expect("patch");
    let response = harness
        .await_reload("/hello", BodyMatcher::equals("modified"))
        .expect("reload");
    assert_eq!(response.status, 200);
    assert_eq!(harness.state(), HarnessState::Verified);

    harness.stop().expect("stop");
    assert_eq!(harness.state(), HarnessState::Stopped);
    assert!(!is_listening(port));
}

#[test]
fn test_second_cycle_after_verified_reload() {
    let port = free_port();
    let copy = materialized(port);
    let result = harness(port, &copy).run(|h| {
        h.start()?;
        h.await_ready("/", BodyMatcher::contains("ready"))?;
        for (from, to) in [("howdy", "hello"), ("hello", "bonjour")] {
            h.mutate(
                SOURCE,
                &ReplacementSet::single(format!("\"{from}\""), format!("\"{to}\"")),
            )?;
            h.await_reload("/hello", BodyMatcher::equals(to))?;
        }
        Ok(h.verified_cycles())
    });
    assert_eq!(result.expect("two cycles"), 2);
    assert!(!is_listening(port));
}

#[test]
fn test_missing_substring_still_stops_the_server() {
    let port = free_port();
    let copy = materialized(port);
    let original = std::fs::read(copy.root().join(SOURCE)).unwrap();

    let result = harness(port, &copy).run(|h| {
        h.start()?;
        h.await_ready("/", BodyMatcher::contains_all(READY_NEEDLES))?;
        h.mutate(SOURCE, &ReplacementSet::single("return \"hola\"", "return \"modified\""))?;
        h.await_reload("/hello", BodyMatcher::equals("modified"))
    });

    match result {
        Err(Error::MissingSubstring { search, .. }) => assert_eq!(search, "return \"hola\""),
        other => panic!("expected MissingSubstring, got {other:?}"),
    }
    assert_eq!(std::fs::read(copy.root().join(SOURCE)).unwrap(), original);
    assert!(!is_listening(port));
}

#[test]
fn test_scenario_file_runs_through_launcher() {
    let port = free_port();
    let dir = tempfile::tempdir().unwrap();
    let scenario_file = dir.path().join("howdy.toml");
    std::fs::write(
        &scenario_file,
        format!(
            r#"
name = "howdy-to-modified"

[fixture]
name = "multi-module-project"
template = '{template}'
program = '{program}'
args = ["clean", ":web:dev"]
base_url = "http://127.0.0.1:{port}"

[fixture.env]
DEVLOOP_FIXTURE_PORT = "{port}"

[[steps]]
action = "await_ready"
contains = ["ready", "quarkusmm", "org.acme", "1.0.0-SNAPSHOT"]

[[steps]]
action = "expect"
path = "/hello"
contains = ["howdy"]

[[steps]]
action = "patch"
file = "domain/src/customer_service.rs"
replacements = [{{ search = 'return "howdy"', replace = 'return "modified"' }}]

[[steps]]
action = "await_reload"
path = "/hello"
contains = ["modified"]
"#,
            template = fixture_template().display(),
            program = fixture_binary(),
        ),
    )
    .unwrap();

    let scenario = Scenario::load(&scenario_file).expect("scenario");
    let report = ScenarioLauncher::new(config())
        .expect("launcher")
        .launch(&scenario)
        .expect("scenario passes");

    assert_eq!(report.steps_completed, 4);
    assert_eq!(report.verified_cycles, 1);
    assert_eq!(report.final_state, HarnessState::Stopped);
    assert!(!is_listening(port));
    // the template itself is never touched
    let template_source =
        std::fs::read_to_string(fixture_template().join("domain/src/customer_service.rs")).unwrap();
    assert!(template_source.contains("return \"howdy\""));
}
