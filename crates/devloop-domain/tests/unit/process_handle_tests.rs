//! Tests for the process handle ownership rules

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use devloop_domain::error::{Error, Result};
use devloop_domain::ports::{ManagedProcess, ProcessHandle};

/// Process double counting terminate calls
struct CountingProcess {
    terminations: Arc<AtomicUsize>,
    fail: bool,
}

impl ManagedProcess for CountingProcess {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    fn output_tail(&self, lines: usize) -> Vec<String> {
        (0..lines.min(2)).map(|i| format!("line {i}")).collect()
    }

    fn has_exited(&mut self) -> bool {
        false
    }

    fn terminate(&mut self) -> Result<()> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::process_termination(Some(4242), "still alive"))
        } else {
            Ok(())
        }
    }
}

fn handle(fail: bool) -> (ProcessHandle, Arc<AtomicUsize>) {
    let terminations = Arc::new(AtomicUsize::new(0));
    let process = CountingProcess {
        terminations: Arc::clone(&terminations),
        fail,
    };
    (ProcessHandle::new(Box::new(process), "fixture clean :web:dev"), terminations)
}

#[test]
fn test_stop_is_idempotent() {
    let (mut handle, terminations) = handle(false);
    handle.stop().expect("first stop");
    handle.stop().expect("second stop");
    assert!(handle.is_stopped());
    assert_eq!(terminations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_leaves_cleanup_to_the_process() {
    let (handle, terminations) = handle(false);
    drop(handle);
    assert_eq!(terminations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_stop_is_not_retried() {
    let (mut handle, terminations) = handle(true);
    let err = handle.stop().unwrap_err();
    assert!(matches!(err, Error::ProcessTermination { pid: Some(4242), .. }));
    handle.stop().expect("second stop is a no-op");
    drop(handle);
    assert_eq!(terminations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handle_exposes_process_details() {
    let (handle, _) = handle(false);
    assert_eq!(handle.pid(), Some(4242));
    assert_eq!(handle.command_line(), "fixture clean :web:dev");
    assert_eq!(handle.output_tail(5).len(), 2);
}
