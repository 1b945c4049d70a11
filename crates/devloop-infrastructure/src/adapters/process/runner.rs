//! Command-based process runner

use std::process::{Command, Stdio};
use std::time::Duration;

use devloop_domain::error::{Error, Result};
use devloop_domain::ports::{ManagedProcess, ProcessHandle, ProcessRunner};
use devloop_domain::value_objects::LaunchSpec;
use tracing::{debug, info, warn};

use super::child::ChildProcess;
use super::output::OutputBuffer;
use crate::config::ProcessConfig;

/// [`ProcessRunner`] spawning real OS processes
#[derive(Debug, Clone)]
pub struct CommandProcessRunner {
    output_buffer_lines: usize,
    stop_grace: Duration,
}

impl CommandProcessRunner {
    /// Runner using the given process settings
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            output_buffer_lines: config.output_buffer_lines,
            stop_grace: config.stop_grace(),
        }
    }

    fn command(launch: &LaunchSpec) -> Command {
        let mut command = Command::new(&launch.program);
        command
            .args(&launch.arguments)
            .current_dir(&launch.working_dir)
            .envs(&launch.environment)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        command
    }
}

impl Default for CommandProcessRunner {
    fn default() -> Self {
        Self::new(&ProcessConfig::default())
    }
}

impl ProcessRunner for CommandProcessRunner {
    fn start(&self, launch: &LaunchSpec) -> Result<ProcessHandle> {
        if !launch.working_dir.is_dir() {
            return Err(Error::launch(
                launch.program.clone(),
                launch.working_dir.clone(),
                "working directory does not exist",
            ));
        }

        let mut child = Self::command(launch).spawn().map_err(|e| {
            Error::launch_with_source(
                launch.program.clone(),
                launch.working_dir.clone(),
                format!("failed to spawn: {e}"),
                e,
            )
        })?;
        let pid = child.id();

        let output = OutputBuffer::new(self.output_buffer_lines);
        let streams = [
            child.stdout.take().map(|s| output.capture("stdout", s)),
            child.stderr.take().map(|s| output.capture("stderr", s)),
        ];
        let mut process = ChildProcess::new(child, output, self.stop_grace);
        for capture in streams.into_iter().flatten() {
            if let Err(e) = capture {
                if let Err(stop_err) = process.terminate() {
                    warn!(pid, error = %stop_err, "Failed to stop process after capture error");
                }
                return Err(Error::launch_with_source(
                    launch.program.clone(),
                    launch.working_dir.clone(),
                    "failed to start output capture",
                    e,
                ));
            }
        }

        info!(
            pid,
            command = %launch.command_line(),
            working_dir = %launch.working_dir.display(),
            "Process started"
        );
        Ok(ProcessHandle::new(Box::new(process), launch.command_line()))
    }

    fn stop(&self, handle: &mut ProcessHandle) -> Result<()> {
        if handle.is_stopped() {
            return Ok(());
        }
        debug!(pid = ?handle.pid(), command = %handle.command_line(), "Stopping process");
        handle.stop()
    }
}
