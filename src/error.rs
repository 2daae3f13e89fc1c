//! Crate-wide error type.
//!
//! Library code returns [`Result`] so callers can match on failure kind; the
//! CLI boundary in `main.rs` collapses everything into `anyhow::Result` the
//! way the rest of the binary's error reporting expects.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewindError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PTY error: {0}")]
    Pty(String),

    #[error("failed to parse session document: {0}")]
    Parse(String),

    #[error("terminal/signal error: {0}")]
    Nix(#[from] nix::Error),
}

pub type Result<T> = std::result::Result<T, RewindError>;
