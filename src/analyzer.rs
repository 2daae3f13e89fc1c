//! Aggregate statistics over a recorded session document and a
//! human-readable summary renderer.
//!
//! The reference implementation this was ported from computes a
//! lowercased copy of each chunk's text for its error scan but then greps
//! the *original* (still mixed-case) copy, making the match effectively
//! case-sensitive despite appearances. That's treated as a bug here: the
//! scan below lowercases once and matches against that.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::document::{CommandSessionRecord, SessionDocument};
use crate::error::RewindError;

const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "failed",
    "permission denied",
    "no such file",
    "command not found",
    "segmentation fault",
    "core dumped",
    "syntax error",
    "not permitted",
    "timed out",
    "killed",
];

const TOP_COMMANDS_LIMIT: usize = 10;
const SLOWEST_COMMANDS_LIMIT: usize = 5;
const ERROR_COMMANDS_LIMIT: usize = 10;

pub fn analyze(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_SESSION_FILE));
    let raw = std::fs::read_to_string(&path).map_err(RewindError::Io)?;
    let doc: SessionDocument = serde_json::from_str(&raw).map_err(|e| RewindError::Parse(e.to_string()))?;

    let summary = Summary::compute(doc.sessions());
    print!("{summary}");
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub total_commands: usize,
    pub total_duration: f64,
    pub avg_time_per_command: f64,
    pub commands_with_stderr: usize,
    pub stderr_percentage: f64,
    pub top_commands: Vec<(String, usize)>,
    pub slowest_commands: Vec<(String, f64)>,
    pub error_commands: Vec<(String, String)>,
}

impl Summary {
    #[must_use]
    pub fn compute(sessions: &[CommandSessionRecord]) -> Self {
        let total_commands = sessions.len();
        if total_commands == 0 {
            return Self::default();
        }

        let first_start = sessions.iter().map(|s| s.start_time).fold(f64::INFINITY, f64::min);
        let last_end = sessions.iter().map(|s| s.end_time).fold(f64::NEG_INFINITY, f64::max);
        let total_duration = last_end - first_start;

        let sum_duration: f64 = sessions.iter().map(|s| s.duration).sum();
        let avg_time_per_command = sum_duration / total_commands as f64;

        let mut commands_with_stderr = 0;
        let mut error_commands = Vec::new();
        for session in sessions {
            if let Some(snippet) = find_error_snippet(session) {
                commands_with_stderr += 1;
                if error_commands.len() < ERROR_COMMANDS_LIMIT {
                    error_commands.push((session.command.clone(), snippet));
                }
            }
        }
        let stderr_percentage = commands_with_stderr as f64 / total_commands as f64 * 100.0;

        Self {
            total_commands,
            total_duration,
            avg_time_per_command,
            commands_with_stderr,
            stderr_percentage,
            top_commands: top_by_frequency(sessions, TOP_COMMANDS_LIMIT),
            slowest_commands: slowest(sessions, SLOWEST_COMMANDS_LIMIT),
            error_commands,
        }
    }
}

fn find_error_snippet(session: &CommandSessionRecord) -> Option<String> {
    session.chunks.iter().find_map(|chunk| {
        let lower = chunk.data.to_lowercase();
        ERROR_KEYWORDS
            .iter()
            .any(|kw| lower.contains(kw))
            .then(|| chunk.data.clone())
    })
}

fn top_by_frequency(sessions: &[CommandSessionRecord], limit: usize) -> Vec<(String, usize)> {
    let mut order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for session in sessions {
        if !counts.contains_key(session.command.as_str()) {
            order.push(session.command.as_str());
        }
        *counts.entry(session.command.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|cmd| (cmd.to_string(), counts[cmd]))
        .collect();
    // Stable sort preserves first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

fn slowest(sessions: &[CommandSessionRecord], limit: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = sessions.iter().map(|s| (s.command.clone(), s.duration)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Session Summary")?;
        writeln!(f, "---------------")?;
        writeln!(f, "Total commands:           {}", self.total_commands)?;
        writeln!(f, "Session duration:         {:.1}s", self.total_duration)?;
        writeln!(f, "Average time per command: {:.1}s", self.avg_time_per_command)?;
        writeln!(
            f,
            "Commands with stderr:     {} ({:.1}%)",
            self.commands_with_stderr, self.stderr_percentage
        )?;

        if !self.top_commands.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top Commands")?;
            for (i, (cmd, count)) in self.top_commands.iter().enumerate() {
                writeln!(f, "{}. {cmd} ({count}x)", i + 1)?;
            }
        }

        if !self.slowest_commands.is_empty() {
            writeln!(f)?;
            writeln!(f, "Slowest Commands")?;
            for (cmd, dur) in &self.slowest_commands {
                writeln!(f, "{cmd} ({dur:.1}s)")?;
            }
        }

        if !self.error_commands.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors")?;
            for (cmd, snippet) in &self.error_commands {
                let snippet = snippet.trim();
                writeln!(f, "{cmd} -> {snippet}")?;
            }
            writeln!(f)?;
            writeln!(f, "Suggestions")?;
            writeln!(f, "- try `grep -i` on the session's stderr to narrow down root causes")?;
        }

        Ok(())
    }
}
