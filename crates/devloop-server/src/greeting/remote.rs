//! Remote greeting client

use std::time::Duration;

use async_trait::async_trait;
use devloop_domain::error::{Error, Result};
use devloop_domain::value_objects::join_url;
use devloop_infrastructure::error_ext::ErrorContext;
use tracing::debug;

use super::client::GreetingClient;
use crate::constants::GREETING_PATH;

/// Calls `GET <base>/hello` and returns the body
#[derive(Debug, Clone)]
pub struct RemoteGreetingClient {
    client: reqwest::Client,
    url: String,
}

impl RemoteGreetingClient {
    /// Client for the greeting service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .network_context("Failed to build greeting HTTP client")?;
        Ok(Self {
            client,
            url: join_url(base_url, GREETING_PATH),
        })
    }

    /// Greeting endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GreetingClient for RemoteGreetingClient {
    async fn hello(&self) -> Result<String> {
        debug!(url = %self.url, "Calling greeting service");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .network_context(format!("Greeting request to {} failed", self.url))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "Greeting service at {} answered {status}",
                self.url
            )));
        }
        response
            .text()
            .await
            .network_context("Failed to read greeting body")
    }
}
