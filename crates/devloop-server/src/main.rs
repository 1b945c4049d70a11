//! devloop fixture dev server - entry point

use clap::Parser;
use devloop_server::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
