//! devloop - entry point

use std::process::ExitCode;

use clap::Parser;
use devloop::{Cli, run};

fn main() -> anyhow::Result<ExitCode> {
    run(Cli::parse())
}
