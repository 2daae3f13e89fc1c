//! Top-level recording orchestration: command mode's `rewindtty> ` REPL and
//! the interactive-mode entry point, both wired up with signal handling and
//! continuous persistence.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{config, pty, signals};

/// Runs a full recording session (command or interactive mode), writes the
/// resulting document to `path` (or the default session file), and
/// optionally uploads it afterward.
pub async fn record(interactive: bool, upload: bool, path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(config::DEFAULT_SESSION_FILE));
    ensure_parent_dir(&path)?;

    let shared = signals::Shared::new(interactive, path.clone());
    let _signal_task = signals::install(shared.clone());

    if interactive {
        let shell = config::interactive_shell();
        tracing::info!(shell = %shell, path = %path.display(), "starting interactive recording");
        pty::run_interactive(&shared, &shell).await?;
    } else {
        run_command_mode(&shared).await?;
    }

    signals::persist(&shared).await?;
    let count = shared.store.lock().await.len();
    tracing::info!(path = %path.display(), sessions = count, "recording complete");

    if upload {
        let json = {
            let store = shared.store.lock().await;
            serde_json::to_string(&store.to_document())?
        };
        crate::upload::upload_json(&json).await?;
    }

    Ok(())
}

async fn run_command_mode(shared: &std::sync::Arc<signals::Shared>) -> anyhow::Result<()> {
    let shell = config::command_shell();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("rewindtty> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();
        if command == "exit" {
            break;
        }
        if command.is_empty() {
            continue;
        }

        pty::run_command(shared, &shell, command).await?;
    }

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
