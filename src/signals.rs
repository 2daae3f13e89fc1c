//! Process-wide state shared between the recording loop and the signal
//! handlers, and the `SignalBroker` itself.
//!
//! A recorder needs two things visible from an async signal-handling task
//! that isn't otherwise touching the recording loop: the session store (to
//! flush it on an unexpected exit) and, while a command is running, that
//! command's process group (to forward Ctrl-C to it instead of killing
//! ourselves). Both live behind `tokio::sync::Mutex` in [`Shared`], built
//! once per recording run and handed to both the PTY driver and
//! [`install`].

use std::path::PathBuf;
use std::sync::Arc;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::Mutex;

use crate::document::{CommandSession, SessionStore};
use crate::error::{RewindError, Result};

pub struct Shared {
    pub store: Mutex<SessionStore>,
    pub path: PathBuf,
    pub child_pid: Mutex<Option<Pid>>,
}

impl Shared {
    pub fn new(interactive_mode: bool, path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(SessionStore::new(interactive_mode)),
            path,
            child_pid: Mutex::new(None),
        })
    }
}

/// Records the PID of the child currently running under the PTY, so a
/// SIGINT handler knows whether to forward the signal or flush and exit.
pub async fn set_child_pid(shared: &Shared, pid: Option<Pid>) {
    *shared.child_pid.lock().await = pid;
}

/// Appends a finished command session to the store and immediately
/// persists the whole document, so a crash loses at most the in-flight
/// command rather than the whole recording.
pub async fn push_and_persist(shared: &Shared, session: CommandSession) -> Result<()> {
    shared.store.lock().await.push(session);
    persist(shared).await
}

pub async fn persist(shared: &Shared) -> Result<()> {
    let json = {
        let store = shared.store.lock().await;
        serde_json::to_string_pretty(&store.to_document()).map_err(|e| RewindError::Parse(e.to_string()))?
    };
    if let Some(parent) = shared.path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&shared.path, json).await?;
    Ok(())
}

/// Installs SIGINT/SIGTERM/SIGHUP handling for the lifetime of a recording
/// run. SIGINT is forwarded to the running child's process group if one
/// exists; every other case (SIGTERM, SIGHUP, or SIGINT with no child
/// running) triggers an emergency flush of whatever has been captured so
/// far and terminates the process.
pub fn install(shared: Arc<Shared>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = match unix_signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };
        let mut sigterm = match unix_signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sighup = match unix_signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGHUP handler");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    if !forward_to_child(&shared).await {
                        emergency_flush(&shared).await;
                    }
                }
                _ = sigterm.recv() => {
                    emergency_flush(&shared).await;
                }
                _ = sighup.recv() => {
                    emergency_flush(&shared).await;
                }
            }
        }
    })
}

async fn forward_to_child(shared: &Shared) -> bool {
    let pid = *shared.child_pid.lock().await;
    match pid {
        Some(pid) => {
            // Negative PID targets the whole process group, reaching the
            // foreground job the same way a terminal's own SIGINT would.
            let _ = signal::kill(Pid::from_raw(-pid.as_raw()), Signal::SIGINT);
            true
        }
        None => false,
    }
}

async fn emergency_flush(shared: &Shared) {
    let doc = shared.store.lock().await.to_document();
    let path = if shared.path.as_os_str().is_empty() {
        PathBuf::from("emergency_session.json")
    } else {
        shared.path.clone()
    };

    match serde_json::to_string_pretty(&doc) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                tracing::error!(error = %e, path = %path.display(), "emergency flush failed to write");
            } else {
                tracing::error!(path = %path.display(), "emergency flush complete, exiting");
            }
        }
        Err(e) => tracing::error!(error = %e, "emergency flush failed to serialize"),
    }

    std::process::exit(1);
}
