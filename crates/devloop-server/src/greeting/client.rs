//! Greeting client port

use std::sync::Arc;

use async_trait::async_trait;
use devloop_domain::error::Result;

/// Something that produces a greeting
#[async_trait]
pub trait GreetingClient: Send + Sync {
    /// Fetch a greeting
    async fn hello(&self) -> Result<String>;
}

/// Shared trait object used by the routes
pub type SharedGreetingClient = Arc<dyn GreetingClient>;
