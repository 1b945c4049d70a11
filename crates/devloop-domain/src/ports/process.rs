//! Process runner port

use crate::error::Result;
use crate::value_objects::LaunchSpec;

/// A running OS process as seen by the harness
///
/// Implementations own the child and its output capture. `terminate` must
/// bring down the whole process tree, not just the immediate child, and a
/// process dropped without `terminate` must clean up and log any failure.
pub trait ManagedProcess: Send {
    /// OS process id, when there is one
    fn pid(&self) -> Option<u32>;

    /// Last `lines` lines of combined stdout/stderr
    fn output_tail(&self, lines: usize) -> Vec<String>;

    /// Whether the process already exited on its own
    fn has_exited(&mut self) -> bool;

    /// Terminate the process tree and reap it
    fn terminate(&mut self) -> Result<()>;
}

/// Exclusive owner of an external process
///
/// Stopping is idempotent. A handle dropped while still running drops its
/// process, and [`ManagedProcess`] implementations terminate on drop.
pub struct ProcessHandle {
    process: Box<dyn ManagedProcess>,
    command_line: String,
    stopped: bool,
}

impl ProcessHandle {
    /// Wrap a started process
    pub fn new(process: Box<dyn ManagedProcess>, command_line: impl Into<String>) -> Self {
        Self {
            process,
            command_line: command_line.into(),
            stopped: false,
        }
    }

    /// OS process id
    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// Command line the process was started with
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Last `lines` output lines
    pub fn output_tail(&self, lines: usize) -> Vec<String> {
        self.process.output_tail(lines)
    }

    /// Whether `stop` already ran
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether the process exited without being stopped
    pub fn has_exited(&mut self) -> bool {
        !self.stopped && self.process.has_exited()
    }

    /// Terminate the process; later calls are no-ops
    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.process.terminate()
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid())
            .field("command_line", &self.command_line)
            .field("stopped", &self.stopped)
            .finish()
    }
}

/// Launches and terminates the external build/serve process
///
/// # Example
///
/// ```ignore
/// let mut handle = runner.start(&fixture.launch_spec())?;
/// // ... poll, patch, poll ...
/// runner.stop(&mut handle)?;
/// ```
pub trait ProcessRunner: Send + Sync {
    /// Spawn the process described by `launch`
    ///
    /// Fails with [`crate::error::Error::Launch`] when the working directory
    /// does not exist or the program cannot be spawned.
    fn start(&self, launch: &LaunchSpec) -> Result<ProcessHandle>;

    /// Terminate the process tree behind `handle` (idempotent)
    fn stop(&self, handle: &mut ProcessHandle) -> Result<()> {
        handle.stop()
    }
}
