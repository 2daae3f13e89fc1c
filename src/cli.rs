//! Command-line surface: `rewindtty <subcommand> [flags] [session_file]`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "rewindtty", version, about = "Record, replay, and analyze terminal sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a terminal session to a JSON document.
    Record {
        /// Record a full interactive shell instead of single commands.
        #[arg(long)]
        interactive: bool,
        /// Upload the finished recording when done.
        #[arg(long)]
        upload: bool,
        /// Where to write the session document (defaults to data/session.json).
        path: Option<PathBuf>,
    },
    /// Replay a recorded session at (optionally adjusted) real-time pace.
    Replay {
        /// Session document to replay (defaults to data/session.json).
        path: Option<PathBuf>,
        /// Playback speed multiplier; 2.0 plays twice as fast.
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Print a summary of command durations, frequency, and errors.
    Analyze {
        /// Session document to analyze (defaults to data/session.json).
        path: Option<PathBuf>,
    },
    /// Validate and upload a session document.
    Upload {
        /// Session document to upload (defaults to data/session.json).
        path: Option<PathBuf>,
    },
}
