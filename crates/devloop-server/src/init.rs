//! Server initialization

use std::sync::Arc;

use anyhow::Context;
use devloop_infrastructure::config::{ConfigLoader, HarnessConfig};
use devloop_infrastructure::logging::init_logging;
use tracing::info;

use crate::cli::Cli;
use crate::constants::BIND_ADDRESS;
use crate::greeting::{
    CircuitBreakerMaintenance, FaultTolerantGreetingClient, RemoteGreetingClient,
};
use crate::project::{DevModeProject, clean};
use crate::transport::{GreetingState, fixture_rocket, rocket_config};

/// Run the tasks given on the command line
///
/// `clean` tasks run first; the dev task then serves until the process is
/// signalled.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    let plan = cli.plan()?;
    let root = cli.project_root()?;
    info!(project = %root.display(), port = cli.port, module = %plan.module, "Starting fixture dev server");

    if plan.clean {
        clean(&root)?;
    }

    let project = Arc::new(DevModeProject::open(&root, &plan.module)?);
    let greeting = default_greeting(&config, cli.port)?;

    fixture_rocket(project, greeting)
        .configure(rocket_config(cli.port))
        .launch()
        .await
        .context("Fixture server failed")?;
    info!("Fixture dev server stopped");
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    Ok(loader.load()?)
}

/// Guarded remote client calling this server's own greeting route
fn default_greeting(config: &HarnessConfig, port: u16) -> anyhow::Result<GreetingState> {
    let base_url = format!("http://{BIND_ADDRESS}:{port}");
    let remote = RemoteGreetingClient::new(&base_url, config.http.request_timeout())?;
    let maintenance = CircuitBreakerMaintenance::new(config.resilience.clone());
    let client = FaultTolerantGreetingClient::new(Arc::new(remote), maintenance).into_shared();
    Ok(GreetingState::new(client))
}
