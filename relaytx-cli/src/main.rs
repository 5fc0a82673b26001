//! `relaytx` command line

mod commands;
mod config;

use clap::Parser;
use commands::EntryPoint;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let entry = EntryPoint::parse();
    init_tracing(entry.verbose);
    entry.run().await
}
