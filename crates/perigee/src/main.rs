use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use perigee::cli::Cli;
use perigee::config::load_config;
use perigee::{app, logging};

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = load_config(&cwd);
    cli.apply(&mut config);

    // Dropping the guard flushes buffered log lines.
    let _log_guard = logging::init(&config.log);
    info!(version = env!("CARGO_PKG_VERSION"), "perigee starting");

    let result = app::run(config, cli.file);
    info!("perigee exiting");
    result
}
