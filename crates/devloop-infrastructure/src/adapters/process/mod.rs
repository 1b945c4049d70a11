//! Process runner adapter
//!
//! Spawns the build/serve command with piped output. On Unix the child
//! leads its own process group so stopping it also stops whatever it
//! spawned (compilers, forked servers).

mod child;
mod output;
mod runner;

pub use output::OutputBuffer;
pub use runner::CommandProcessRunner;
