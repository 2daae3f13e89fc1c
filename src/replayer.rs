//! Plays back a recorded session document at (adjustable) real-time pace.
//!
//! Bytes are written to stdout exactly as captured -- no ANSI parsing, no
//! terminal emulation -- so whatever produced the original output (a shell,
//! `vim`, a progress bar) renders the same way it would live, as long as the
//! replaying terminal is compatible.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::time::Duration;

use crate::config;
use crate::document::SessionDocument;
use crate::error::RewindError;
use crate::escape;

const MIN_DELAY: f64 = 0.0;
const MAX_DELAY: f64 = 10.0;
const INTER_SESSION_DELAY: f64 = 0.5;

pub async fn replay(path: Option<PathBuf>, speed: f64) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(config::DEFAULT_SESSION_FILE));
    let raw = std::fs::read_to_string(&path).map_err(RewindError::Io)?;
    let doc: SessionDocument = serde_json::from_str(&raw).map_err(|e| RewindError::Parse(e.to_string()))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut stdout = tokio::io::stdout();
    let sessions = doc.sessions();

    for (i, session) in sessions.iter().enumerate() {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }

        println!("\x1b[34mrewindtty> {} ({:.1}s)\x1b[0m", session.command, session.duration);

        let mut last_time = 0.0_f64;
        for chunk in &session.chunks {
            if interrupted.load(Ordering::SeqCst) {
                break;
            }

            let delay = (chunk.time - last_time) / speed;
            if delay > MIN_DELAY && delay < MAX_DELAY {
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            }

            let bytes = escape::decode(&chunk.data);
            stdout.write_all(&bytes).await?;
            stdout.flush().await?;
            last_time = chunk.time;
        }

        if i + 1 < sessions.len() && !interrupted.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs_f64(INTER_SESSION_DELAY / speed)).await;
        }
    }

    if interrupted.load(Ordering::SeqCst) {
        println!("\x1b[33minterrupted\x1b[0m");
    }

    Ok(())
}
