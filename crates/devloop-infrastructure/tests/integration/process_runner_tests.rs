//! Process runner tests against real `sh` processes

use std::collections::BTreeMap;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use devloop_domain::error::Error;
use devloop_domain::ports::{ProcessHandle, ProcessRunner};
use devloop_domain::value_objects::LaunchSpec;
use devloop_infrastructure::adapters::CommandProcessRunner;
use devloop_infrastructure::config::ProcessConfig;
use tempfile::TempDir;

fn shell(dir: &Path, script: &str) -> LaunchSpec {
    LaunchSpec {
        program: "sh".to_string(),
        arguments: vec!["-c".to_string(), script.to_string()],
        working_dir: dir.to_path_buf(),
        environment: BTreeMap::from([("DEVLOOP_GREETING".to_string(), "howdy".to_string())]),
    }
}

fn runner(grace_ms: u64) -> CommandProcessRunner {
    CommandProcessRunner::new(&ProcessConfig {
        output_buffer_lines: 50,
        stop_grace_ms: grace_ms,
    })
}

/// Wait until some output line satisfies `predicate`
fn wait_for_line(handle: &ProcessHandle, predicate: impl Fn(&str) -> bool) -> Option<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(line) = handle.output_tail(50).into_iter().find(|l| predicate(l)) {
            return Some(line);
        }
        thread::sleep(Duration::from_millis(20));
    }
    None
}

#[cfg(target_os = "linux")]
fn is_alive(pid: u32) -> bool {
    // zombies count as gone
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next().map(|s| s != "Z"))
        })
        .unwrap_or(false)
}

#[test]
fn test_missing_working_dir_is_launch_error() {
    let spec = shell(Path::new("/definitely/not/a/project"), "true");
    let err = runner(1_000).start(&spec).unwrap_err();
    match err {
        Error::Launch { message, .. } => assert!(message.contains("does not exist")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_program_is_launch_error() {
    let dir = TempDir::new().unwrap();
    let spec = LaunchSpec {
        program: "devloop-no-such-program".to_string(),
        arguments: Vec::new(),
        working_dir: dir.path().to_path_buf(),
        environment: BTreeMap::new(),
    };
    assert!(matches!(
        runner(1_000).start(&spec),
        Err(Error::Launch { .. })
    ));
}

#[test]
fn test_output_environment_and_directory_are_wired() {
    let dir = TempDir::new().unwrap();
    let spec = shell(dir.path(), "echo \"$DEVLOOP_GREETING from $(pwd)\"; echo oops >&2; exec sleep 30");
    let runner = runner(1_000);
    let mut handle = runner.start(&spec).unwrap();

    let line = wait_for_line(&handle, |l| l.starts_with("howdy from")).expect("stdout captured");
    let dir_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(line.ends_with(&dir_name), "unexpected line: {line}");
    assert!(wait_for_line(&handle, |l| l == "oops").is_some(), "stderr captured");

    runner.stop(&mut handle).unwrap();
    assert!(handle.is_stopped());
    // second stop is a no-op
    runner.stop(&mut handle).unwrap();
}

#[test]
fn test_exited_process_is_detected() {
    let dir = TempDir::new().unwrap();
    let mut handle = runner(1_000).start(&shell(dir.path(), "exit 3")).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.has_exited() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(handle.has_exited());
    handle.stop().unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn test_stop_terminates_whole_process_group() {
    let dir = TempDir::new().unwrap();
    let spec = shell(dir.path(), "sleep 30 & echo \"grandchild $!\"; wait");
    let runner = runner(2_000);
    let mut handle = runner.start(&spec).unwrap();

    let line = wait_for_line(&handle, |l| l.starts_with("grandchild ")).expect("grandchild pid");
    let grandchild: u32 = line.trim_start_matches("grandchild ").parse().unwrap();
    assert!(is_alive(grandchild));

    runner.stop(&mut handle).unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    while is_alive(grandchild) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(!is_alive(grandchild), "grandchild {grandchild} survived stop");
}

#[test]
fn test_sigterm_ignoring_process_is_killed_after_grace() {
    let dir = TempDir::new().unwrap();
    let spec = shell(dir.path(), "trap '' TERM; echo armed; while true; do sleep 1; done");
    let runner = runner(300);
    let mut handle = runner.start(&spec).unwrap();
    wait_for_line(&handle, |l| l == "armed").expect("trap installed");

    let started = Instant::now();
    runner.stop(&mut handle).unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "killed too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "stop hung: {elapsed:?}");
}

#[test]
fn test_dropping_handle_stops_process() {
    let dir = TempDir::new().unwrap();
    let handle = runner(1_000)
        .start(&shell(dir.path(), "echo \"pid $$\"; exec sleep 30"))
        .unwrap();
    let line = wait_for_line(&handle, |l| l.starts_with("pid ")).expect("pid line");
    let pid: u32 = line.trim_start_matches("pid ").parse().unwrap();
    assert_eq!(handle.pid(), Some(pid));
    drop(handle);

    #[cfg(target_os = "linux")]
    assert!(!is_alive(pid));
}

/// Reap `pid` behind the runner's back so its own reaping fails
fn reap_out_of_band(pid: u32) {
    use nix::sys::wait::waitpid;
    use nix::unistd::Pid;

    waitpid(Pid::from_raw(i32::try_from(pid).unwrap()), None).unwrap();
}

#[test]
fn test_stop_reports_termination_failure() {
    let dir = TempDir::new().unwrap();
    let runner = runner(300);
    let mut handle = runner.start(&shell(dir.path(), "exit 0")).unwrap();
    let pid = handle.pid().unwrap();
    reap_out_of_band(pid);

    match runner.stop(&mut handle).unwrap_err() {
        Error::ProcessTermination { pid: reported, .. } => assert_eq!(reported, Some(pid)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(handle.is_stopped());
}

#[test]
fn test_dropping_process_with_failed_termination_returns() {
    let dir = TempDir::new().unwrap();
    let handle = runner(300).start(&shell(dir.path(), "exit 0")).unwrap();
    reap_out_of_band(handle.pid().unwrap());

    let started = Instant::now();
    drop(handle);
    assert!(started.elapsed() < Duration::from_secs(2));
}
