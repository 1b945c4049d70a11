//! Stubbable greeting client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use devloop_domain::error::{Error, Result};

use super::client::GreetingClient;

#[derive(Debug, Clone)]
enum Stub {
    Default,
    Returns(String),
    Fails(String),
}

/// Greeting client whose answer tests can stub
///
/// Clones share stubs and the invocation counter, so a test can keep one
/// clone while the server holds another.
#[derive(Debug, Clone)]
pub struct MockGreetingClient {
    default_greeting: Arc<str>,
    stub: Arc<Mutex<Stub>>,
    invocations: Arc<AtomicUsize>,
}

impl MockGreetingClient {
    /// Mock answering `default_greeting` until stubbed
    pub fn new(default_greeting: impl Into<String>) -> Self {
        Self {
            default_greeting: Arc::from(default_greeting.into()),
            stub: Arc::new(Mutex::new(Stub::Default)),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer `value` from now on
    pub fn when_hello(&self, value: impl Into<String>) {
        self.set(Stub::Returns(value.into()));
    }

    /// Fail with `message` from now on
    pub fn when_hello_fails(&self, message: impl Into<String>) {
        self.set(Stub::Fails(message.into()));
    }

    /// Drop stubs and the invocation count
    pub fn reset(&self) {
        self.set(Stub::Default);
        self.invocations.store(0, Ordering::SeqCst);
    }

    /// Calls made since construction or the last reset
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn set(&self, stub: Stub) {
        *self
            .stub
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = stub;
    }
}

#[async_trait]
impl GreetingClient for MockGreetingClient {
    async fn hello(&self) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let stub = self
            .stub
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match stub {
            Stub::Default => Ok(self.default_greeting.to_string()),
            Stub::Returns(value) => Ok(value),
            Stub::Fails(message) => Err(Error::network(message)),
        }
    }
}
