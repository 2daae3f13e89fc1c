//! Entry point for the rewindtty CLI.
//!
//! Initializes tracing to stderr (so it never collides with recorded or
//! replayed bytes on stdout), parses arguments, and dispatches to the
//! recorder, replayer, analyzer, or uploader.

use anyhow::Result;
use clap::Parser;
use rewindtty::cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Record { interactive, upload, path } => {
            rewindtty::recorder::record(interactive, upload, path).await
        }
        Command::Replay { path, speed } => rewindtty::replayer::replay(path, speed).await,
        Command::Analyze { path } => rewindtty::analyzer::analyze(path),
        Command::Upload { path } => rewindtty::upload::upload_path(path).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "rewindtty failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
