//! Bounded capture of process output

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Ring buffer keeping the most recent output lines of a process
///
/// Clones share the same buffer; reader threads push, the harness reads.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl OutputBuffer {
    /// Buffer holding at most `capacity` lines (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append a line, evicting the oldest one when full
    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Last `count` lines, oldest first
    pub fn tail(&self, count: usize) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = lines.len().saturating_sub(count);
        lines.iter().skip(skip).cloned().collect()
    }

    /// Number of retained lines
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was captured yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn a thread copying `stream` line by line into the buffer
    ///
    /// Non UTF-8 output is decoded lossily. The thread ends at EOF, which
    /// happens once every process holding the pipe has exited.
    pub fn capture<R>(&self, name: &str, stream: R) -> std::io::Result<JoinHandle<()>>
    where
        R: Read + Send + 'static,
    {
        let buffer = self.clone();
        thread::Builder::new()
            .name(format!("devloop-{name}"))
            .spawn(move || {
                let mut reader = BufReader::new(stream);
                let mut raw = Vec::new();
                loop {
                    raw.clear();
                    match reader.read_until(b'\n', &mut raw) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            let line = String::from_utf8_lossy(&raw);
                            buffer.push(line.trim_end_matches(['\r', '\n']));
                        }
                    }
                }
            })
    }
}
