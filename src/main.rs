use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use doc4md::config::Config;

mod cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = Config::load(&std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Log to stderr to keep stdout clean for piped Markdown output.
    // An explicit RUST_LOG wins; --verbose only raises the default level.
    let verbose = args.verbose || config.verbose_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli::default_log_level(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run_with(args, config)
}
