//! Harness components

use std::sync::Arc;

use devloop_application::{DevModeHarness, HarnessSettings};
use devloop_domain::error::Result;
use devloop_domain::ports::{HttpPoller, ProcessRunner, SourcePatcher};
use devloop_domain::value_objects::ProjectFixture;

use crate::adapters::{AtomicSourcePatcher, CommandProcessRunner, ReqwestHttpPoller};
use crate::config::HarnessConfig;

/// The three port implementations a harness needs
#[derive(Clone)]
pub struct HarnessComponents {
    runner: Arc<dyn ProcessRunner>,
    poller: Arc<dyn HttpPoller>,
    patcher: Arc<dyn SourcePatcher>,
}

impl HarnessComponents {
    /// Production adapters configured from `config`
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Ok(Self {
            runner: Arc::new(CommandProcessRunner::new(&config.process)),
            poller: Arc::new(ReqwestHttpPoller::new(&config.http)?),
            patcher: Arc::new(AtomicSourcePatcher::new()),
        })
    }

    /// Components from explicit implementations
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        poller: Arc<dyn HttpPoller>,
        patcher: Arc<dyn SourcePatcher>,
    ) -> Self {
        Self {
            runner,
            poller,
            patcher,
        }
    }

    /// Replace the process runner
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the HTTP poller
    pub fn with_poller(mut self, poller: Arc<dyn HttpPoller>) -> Self {
        self.poller = poller;
        self
    }

    /// Replace the source patcher
    pub fn with_patcher(mut self, patcher: Arc<dyn SourcePatcher>) -> Self {
        self.patcher = patcher;
        self
    }

    /// Process runner
    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    /// HTTP poller
    pub fn poller(&self) -> Arc<dyn HttpPoller> {
        Arc::clone(&self.poller)
    }

    /// Source patcher
    pub fn patcher(&self) -> Arc<dyn SourcePatcher> {
        Arc::clone(&self.patcher)
    }

    /// New harness over `fixture` sharing these components
    pub fn harness(&self, fixture: ProjectFixture, settings: HarnessSettings) -> DevModeHarness {
        DevModeHarness::new(
            fixture,
            settings,
            self.runner(),
            self.poller(),
            self.patcher(),
        )
    }
}

impl std::fmt::Debug for HarnessComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessComponents").finish_non_exhaustive()
    }
}
