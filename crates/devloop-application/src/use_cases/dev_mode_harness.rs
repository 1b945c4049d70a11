//! Dev-Mode Harness Use Case
//!
//! Drives one dev-mode loop: start the build/serve process, wait until it is
//! ready, patch sources, wait until the patched behaviour is served, stop.
//! The harness owns the process handle exclusively and releases it on every
//! exit path (`stop`, `run`, and `Drop` during unwinding).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use devloop_domain::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_READINESS_TIMEOUT, DEFAULT_RELOAD_TIMEOUT,
    FAILURE_OUTPUT_TAIL_LINES,
};
use devloop_domain::error::{Error, Result};
use devloop_domain::ports::{HttpPoller, ProcessHandle, ProcessRunner, SourcePatcher};
use devloop_domain::value_objects::{
    BodyMatcher, HarnessState, PollRequest, PollResult, PolledResponse, ProjectFixture,
    ReplacementSet,
};
use tracing::{debug, error, info, warn};

/// Timing and endpoint settings of a harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Base URL the served project answers on
    pub base_url: String,
    /// Budget for the first readiness poll
    pub readiness_timeout: Duration,
    /// Budget for observing a reload (and for plain assertions)
    pub reload_timeout: Duration,
    /// Sleep between poll attempts
    pub poll_interval: Duration,
    /// Output lines attached to poll timeouts
    pub output_tail_lines: usize,
}

impl HarnessSettings {
    /// Defaults against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            reload_timeout: DEFAULT_RELOAD_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            output_tail_lines: FAILURE_OUTPUT_TAIL_LINES,
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override both timeouts
    pub fn with_timeouts(mut self, readiness: Duration, reload: Duration) -> Self {
        self.readiness_timeout = readiness;
        self.reload_timeout = reload;
        self
    }

    /// Override the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Reusable start/patch/poll/verify loop over one project fixture
pub struct DevModeHarness {
    fixture: ProjectFixture,
    settings: HarnessSettings,
    runner: Arc<dyn ProcessRunner>,
    poller: Arc<dyn HttpPoller>,
    patcher: Arc<dyn SourcePatcher>,
    handle: Option<ProcessHandle>,
    state: HarnessState,
    verified_cycles: u32,
}

impl DevModeHarness {
    /// Create a harness with explicitly injected collaborators
    pub fn new(
        fixture: ProjectFixture,
        settings: HarnessSettings,
        runner: Arc<dyn ProcessRunner>,
        poller: Arc<dyn HttpPoller>,
        patcher: Arc<dyn SourcePatcher>,
    ) -> Self {
        Self {
            fixture,
            settings,
            runner,
            poller,
            patcher,
            handle: None,
            state: HarnessState::NotStarted,
            verified_cycles: 0,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Fixture being served
    pub fn fixture(&self) -> &ProjectFixture {
        &self.fixture
    }

    /// Effective settings
    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Number of mutate/reload cycles that reached `Verified`
    pub fn verified_cycles(&self) -> u32 {
        self.verified_cycles
    }

    /// Tail of the process output, empty before start
    pub fn output_tail(&self) -> Vec<String> {
        self.handle
            .as_ref()
            .map(|h| h.output_tail(self.settings.output_tail_lines))
            .unwrap_or_default()
    }

    /// `NotStarted -> Starting`: launch the build/serve process
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(&[HarnessState::NotStarted], "start the process")?;
        self.transition(HarnessState::Starting);

        let launch = self.fixture.launch_spec();
        info!(
            fixture = %self.fixture.name(),
            command = %launch.command_line(),
            working_dir = %launch.working_dir.display(),
            "Starting dev-mode process"
        );
        match self.runner.start(&launch) {
            Ok(handle) => {
                debug!(pid = ?handle.pid(), "Dev-mode process spawned");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// `Starting -> Ready`: poll `path` until the readiness matcher holds
    pub fn await_ready(&mut self, path: &str, matcher: BodyMatcher) -> Result<PolledResponse> {
        self.expect_state(&[HarnessState::Starting], "await readiness")?;
        let response = self.poll(path, matcher, self.settings.readiness_timeout)?;
        info!(
            fixture = %self.fixture.name(),
            attempts = response.attempts,
            elapsed_ms = u64::try_from(response.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Dev-mode process is ready"
        );
        self.transition(HarnessState::Ready);
        Ok(response)
    }

    /// Poll `path` while serving, without changing state
    pub fn assert_response(&mut self, path: &str, matcher: BodyMatcher) -> Result<PolledResponse> {
        self.expect_serving("assert a response")?;
        self.poll(path, matcher, self.settings.reload_timeout)
    }

    /// `Ready | Verified -> Mutating`: patch a project-relative source file
    pub fn mutate(&mut self, file: impl AsRef<Path>, replacements: &ReplacementSet) -> Result<()> {
        self.expect_serving("mutate sources")?;
        self.transition(HarnessState::Mutating);

        let path = match self.fixture.resolve(file.as_ref()) {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e)),
        };
        info!(
            file = %path.display(),
            replacements = replacements.len(),
            "Patching fixture source"
        );
        if let Err(e) = self.patcher.apply_replacements(&path, replacements) {
            return Err(self.fail(e));
        }
        Ok(())
    }

    /// `Mutating -> AwaitingReload -> Verified`: poll until the new content is served
    pub fn await_reload(&mut self, path: &str, matcher: BodyMatcher) -> Result<PolledResponse> {
        self.expect_state(&[HarnessState::Mutating], "await a reload")?;
        self.transition(HarnessState::AwaitingReload);
        let response = self.poll(path, matcher, self.settings.reload_timeout)?;
        self.verified_cycles += 1;
        info!(
            fixture = %self.fixture.name(),
            cycle = self.verified_cycles,
            attempts = response.attempts,
            elapsed_ms = u64::try_from(response.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Reload verified"
        );
        self.transition(HarnessState::Verified);
        Ok(response)
    }

    /// Any state `-> Stopped`
    ///
    /// The runner's stop is invoked once for a launched process. A
    /// termination failure is returned only when nothing failed before;
    /// after an earlier failure it is logged and swallowed so the original
    /// error stays visible.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == HarnessState::Stopped {
            return Ok(());
        }
        let failed_before = self.state == HarnessState::Failed;

        let result = match self.handle.as_mut() {
            Some(handle) => self.runner.stop(handle),
            None => Ok(()),
        };
        self.handle = None;
        self.transition(HarnessState::Stopped);

        match result {
            Ok(()) => Ok(()),
            Err(e) if failed_before => {
                error!(
                    fixture = %self.fixture.name(),
                    error = %e,
                    "Process cleanup failed after an earlier failure"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run `body` against the harness and stop it on every exit path
    ///
    /// The body's error wins over a cleanup error.
    pub fn run<T, F>(mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.run_and_stop(body)
    }

    /// Like [`Self::run`], leaving the stopped harness inspectable
    pub fn run_and_stop<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let outcome = body(self);
        let stopped = self.stop();
        match (outcome, stopped) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(primary), Ok(())) => Err(primary),
            (Err(primary), Err(cleanup)) => {
                warn!(error = %cleanup, "Ignoring cleanup failure, reporting primary error");
                Err(primary)
            }
        }
    }

    fn poll(
        &mut self,
        path: &str,
        matcher: BodyMatcher,
        timeout: Duration,
    ) -> Result<PolledResponse> {
        self.ensure_running()?;
        let request = PollRequest {
            base_url: self.settings.base_url.clone(),
            path: path.to_string(),
            matcher,
            timeout,
            interval: self.settings.poll_interval,
        };
        debug!(
            url = %request.url(),
            expectation = %request.matcher.description(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Polling endpoint"
        );
        match self.poller.poll(&request) {
            PollResult::Matched(response) => Ok(response),
            PollResult::TimedOut(timeout) => {
                self.ensure_running()?;
                let timeout = timeout.with_output_tail(self.output_tail());
                Err(self.fail(Error::poll_timeout(timeout)))
            }
        }
    }

    /// Fail with the output tail when the process exited on its own
    fn ensure_running(&mut self) -> Result<()> {
        let exited = self.handle.as_mut().is_some_and(ProcessHandle::has_exited);
        if !exited {
            return Ok(());
        }
        let mut message = "process exited while it was expected to serve".to_string();
        for line in self.output_tail() {
            message.push('\n');
            message.push_str(&line);
        }
        let launch = self.fixture.launch_spec();
        Err(self.fail(Error::launch(launch.program, launch.working_dir, message)))
    }

    fn expect_state(&self, allowed: &[HarnessState], operation: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::invalid_transition(self.state, operation))
        }
    }

    fn expect_serving(&self, operation: &'static str) -> Result<()> {
        if self.state.is_serving() {
            Ok(())
        } else {
            Err(Error::invalid_transition(self.state, operation))
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        if error.is_fatal_to_harness() && !self.state.is_terminal() {
            warn!(
                fixture = %self.fixture.name(),
                state = %self.state,
                error = %error,
                "Dev-mode harness failed"
            );
            self.transition(HarnessState::Failed);
        }
        error
    }

    fn transition(&mut self, next: HarnessState) {
        if self.state != next {
            debug!(
                fixture = %self.fixture.name(),
                from = %self.state,
                to = %next,
                "Harness state transition"
            );
            self.state = next;
        }
    }
}

impl Drop for DevModeHarness {
    fn drop(&mut self) {
        if self.state != HarnessState::Stopped {
            if let Err(e) = self.stop() {
                error!(fixture = %self.fixture.name(), error = %e, "Failed to stop process on drop");
            }
        }
    }
}

impl std::fmt::Debug for DevModeHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevModeHarness")
            .field("fixture", &self.fixture.name())
            .field("state", &self.state)
            .field("verified_cycles", &self.verified_cycles)
            .finish_non_exhaustive()
    }
}
