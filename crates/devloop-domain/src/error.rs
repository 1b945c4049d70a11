//! Error handling types
//!
//! One error enum covers the whole harness. The four harness failure kinds
//! (`Launch`, `PollTimeout`, `MissingSubstring`, `ProcessTermination`) carry
//! enough payload to diagnose a failed test without re-running it.

use std::path::PathBuf;

use thiserror::Error;

use crate::value_objects::{HarnessState, PollTimeout};

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for devloop
#[derive(Error, Debug)]
pub enum Error {
    /// The external build/serve process could not be started
    #[error("Failed to launch `{program}` in {}: {message}", working_dir.display())]
    Launch {
        /// Program that was being launched
        program: String,
        /// Working directory the process was launched in
        working_dir: PathBuf,
        /// Description of the launch failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Readiness or reload was never observed within the polling budget
    #[error("{0}")]
    PollTimeout(Box<PollTimeout>),

    /// A patch target text was absent from the file
    #[error("Search text {search:?} not found in {}", file.display())]
    MissingSubstring {
        /// File that was being patched
        file: PathBuf,
        /// The absent search text
        search: String,
    },

    /// Cleanup of the external process failed
    #[error("Failed to terminate process{}: {message}", pid.map(|p| format!(" {p}")).unwrap_or_default())]
    ProcessTermination {
        /// Process id, when known
        pid: Option<u32>,
        /// Description of the termination failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A harness operation was called in a state that does not allow it
    #[error("Cannot {operation} while harness is {state}")]
    InvalidTransition {
        /// State the harness was in
        state: HarnessState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure-level error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scenario definition or execution error
    #[error("Scenario error: {message}")]
    Scenario {
        /// Description of the scenario error
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Harness failure creation methods
impl Error {
    /// Create a launch error
    pub fn launch<P: Into<String>, S: Into<String>>(
        program: P,
        working_dir: impl Into<PathBuf>,
        message: S,
    ) -> Self {
        Self::Launch {
            program: program.into(),
            working_dir: working_dir.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a launch error with source
    pub fn launch_with_source<
        P: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        program: P,
        working_dir: impl Into<PathBuf>,
        message: S,
        source: E,
    ) -> Self {
        Self::Launch {
            program: program.into(),
            working_dir: working_dir.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a poll timeout error
    pub fn poll_timeout(timeout: PollTimeout) -> Self {
        Self::PollTimeout(Box::new(timeout))
    }

    /// Create a missing substring error
    pub fn missing_substring<S: Into<String>>(file: impl Into<PathBuf>, search: S) -> Self {
        Self::MissingSubstring {
            file: file.into(),
            search: search.into(),
        }
    }

    /// Create a process termination error
    pub fn process_termination<S: Into<String>>(pid: Option<u32>, message: S) -> Self {
        Self::ProcessTermination {
            pid,
            message: message.into(),
            source: None,
        }
    }

    /// Create a process termination error with source
    pub fn process_termination_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        pid: Option<u32>,
        message: S,
        source: E,
    ) -> Self {
        Self::ProcessTermination {
            pid,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(state: HarnessState, operation: &'static str) -> Self {
        Self::InvalidTransition { state, operation }
    }
}

// Basic error creation methods
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create a scenario error
    pub fn scenario<S: Into<String>>(message: S) -> Self {
        Self::Scenario {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// Whether this error should move a running harness into `Failed`
    ///
    /// Wrong-state calls are rejected without touching the harness; every
    /// other error raised while driving the loop is fatal to it.
    pub fn is_fatal_to_harness(&self) -> bool {
        !matches!(self, Self::InvalidTransition { .. })
    }

    /// Poll timeout payload, if this is a poll timeout
    pub fn as_poll_timeout(&self) -> Option<&PollTimeout> {
        match self {
            Self::PollTimeout(timeout) => Some(timeout),
            _ => None,
        }
    }
}
