//! Managed child process

use std::process::{Child, ExitStatus};
use std::thread;
use std::time::Duration;

use devloop_domain::error::{Error, Result};
use devloop_domain::ports::ManagedProcess;
use tracing::{debug, warn};

use super::output::OutputBuffer;
use crate::constants::PROCESS_EXIT_POLL_INTERVAL;
use crate::utils::TimedOperation;

/// Child process spawned by [`super::CommandProcessRunner`]
pub(super) struct ChildProcess {
    child: Child,
    output: OutputBuffer,
    stop_grace: Duration,
    exit_status: Option<ExitStatus>,
    terminated: bool,
}

impl ChildProcess {
    pub(super) fn new(child: Child, output: OutputBuffer, stop_grace: Duration) -> Self {
        Self {
            child,
            output,
            stop_grace,
            exit_status: None,
            terminated: false,
        }
    }

    fn raw_pid(&self) -> u32 {
        self.child.id()
    }

    /// Reap the child if it exited
    fn try_reap(&mut self) -> Result<bool> {
        if self.exit_status.is_some() {
            return Ok(true);
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = self.raw_pid(), %status, "Process exited");
                self.exit_status = Some(status);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(Error::process_termination_with_source(
                Some(self.raw_pid()),
                "failed to query exit status",
                e,
            )),
        }
    }

    /// Block until the child is reaped
    fn reap(&mut self) -> Result<()> {
        if self.exit_status.is_some() {
            return Ok(());
        }
        let pid = self.raw_pid();
        let status = self.child.wait().map_err(|e| {
            Error::process_termination_with_source(Some(pid), "failed to reap process", e)
        })?;
        self.exit_status = Some(status);
        Ok(())
    }

    #[cfg(unix)]
    fn terminate_tree(&mut self) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let pid = self.raw_pid();
        let raw = i32::try_from(pid).map_err(|_| {
            Error::process_termination(Some(pid), "process id does not fit a process group id")
        })?;
        let group = Pid::from_raw(raw);

        let signal_group = |signal: Signal| match killpg(group, signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(Error::process_termination_with_source(
                Some(pid),
                format!("failed to send {signal} to process group"),
                errno,
            )),
        };
        let group_alive = || killpg(group, None::<Signal>).is_ok();

        signal_group(Signal::SIGTERM)?;

        let timer = TimedOperation::start();
        while !timer.is_expired(self.stop_grace) {
            if self.try_reap()? && !group_alive() {
                debug!(pid, elapsed_ms = timer.elapsed_ms(), "Process group terminated");
                return Ok(());
            }
            thread::sleep(PROCESS_EXIT_POLL_INTERVAL);
        }

        warn!(
            pid,
            grace_ms = u64::try_from(self.stop_grace.as_millis()).unwrap_or(u64::MAX),
            "Process group ignored SIGTERM, sending SIGKILL"
        );
        signal_group(Signal::SIGKILL)?;
        self.reap()
    }

    #[cfg(not(unix))]
    fn terminate_tree(&mut self) -> Result<()> {
        if !self.try_reap()? {
            let pid = self.raw_pid();
            self.child.kill().map_err(|e| {
                Error::process_termination_with_source(Some(pid), "failed to kill process", e)
            })?;
        }
        self.reap()
    }
}

impl ManagedProcess for ChildProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn output_tail(&self, lines: usize) -> Vec<String> {
        self.output.tail(lines)
    }

    fn has_exited(&mut self) -> bool {
        self.try_reap().unwrap_or(false)
    }

    fn terminate(&mut self) -> Result<()> {
        self.terminated = true;
        self.terminate_tree()
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        let pid = self.raw_pid();
        debug!(pid, "Terminating dropped process");
        if let Err(e) = self.terminate_tree() {
            warn!(pid, error = %e, "Failed to terminate dropped process");
        }
    }
}
