//! Environment-derived configuration, mirroring the compiled-in defaults
//! (with env overrides) the original C implementation wired up through
//! `consts.h`.

use std::env;

pub const DEFAULT_SESSION_FILE: &str = "data/session.json";
const DEFAULT_UPLOAD_URL: &str = "https://upload.rewindtty.dev/upload";
const DEFAULT_PLAYER_URL: &str = "https://play.rewindtty.dev/play";

/// Shell used for an interactive recording (login shell, `-i`).
#[must_use]
pub fn interactive_shell() -> String {
    env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
}

/// Shell used to run a single command in command mode (`-c`).
#[must_use]
pub fn command_shell() -> String {
    env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

#[must_use]
pub fn upload_url() -> String {
    env::var("REWINDTTY_UPLOAD_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string())
}

#[must_use]
pub fn player_url() -> String {
    env::var("REWINDTTY_PLAYER_URL").unwrap_or_else(|_| DEFAULT_PLAYER_URL.to_string())
}
