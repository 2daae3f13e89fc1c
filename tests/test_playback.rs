//! End-to-end tests for replay and analysis against a recorded document on
//! disk -- the shape a user actually interacts with from the CLI.

use std::io::Write;
use std::path::PathBuf;

use rewindtty::document::{ChunkRecord, CommandSessionRecord, Metadata, SessionDocument};

fn write_document(path: &PathBuf, sessions: Vec<CommandSessionRecord>) {
    let doc = SessionDocument::Versioned {
        metadata: Metadata {
            version: "0.1.0".to_string(),
            interactive_mode: false,
            timestamp: 0.0,
        },
        sessions,
    };
    let json = serde_json::to_string_pretty(&doc).unwrap();
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(json.as_bytes()).unwrap();
}

fn session(command: &str, chunks: Vec<(f64, &str)>) -> CommandSessionRecord {
    let end = chunks.last().map(|(t, _)| *t).unwrap_or(0.0);
    CommandSessionRecord {
        command: command.to_string(),
        start_time: 0.0,
        end_time: end,
        duration: end,
        chunks: chunks
            .into_iter()
            .map(|(time, data)| ChunkRecord {
                time,
                size: data.len() as f64,
                data: data.to_string(),
            })
            .collect(),
    }
}

fn tempfile(name: &str) -> PathBuf {
    static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("rewindtty-test-playback-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{n}-{name}"))
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_replay_runs_to_completion_at_high_speed() {
    let path = tempfile("replay.json");
    write_document(
        &path,
        vec![
            session("echo a", vec![(0.0, "a\n")]),
            session("echo b", vec![(0.0, "b\n")]),
        ],
    );

    // A very high speed multiplier keeps the bounded per-chunk delays well
    // under a test timeout without disabling pacing entirely.
    let result = rewindtty::replayer::replay(Some(path), 1000.0).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_replay_rejects_missing_file() {
    let path = tempfile("does-not-exist.json");
    let result = rewindtty::replayer::replay(Some(path), 1.0).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_replay_accepts_legacy_bare_array_document() {
    let path = tempfile("legacy.json");
    let sessions = vec![session("pwd", vec![(0.0, "/tmp\n")])];
    let json = serde_json::to_string(&sessions).unwrap();
    std::fs::write(&path, json).unwrap();

    let result = rewindtty::replayer::replay(Some(path), 1000.0).await;
    assert!(result.is_ok());
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[test]
fn test_analyze_runs_against_a_written_document() {
    let path = tempfile("analyze.json");
    write_document(
        &path,
        vec![
            session("ls", vec![(0.0, "a.txt\n")]),
            session("cat missing", vec![(0.0, "cat: missing: No such file or directory\n")]),
        ],
    );

    let result = rewindtty::analyzer::analyze(Some(path));
    assert!(result.is_ok());
}

#[test]
fn test_analyze_rejects_malformed_json() {
    let path = tempfile("malformed.json");
    std::fs::write(&path, "not json").unwrap();

    let result = rewindtty::analyzer::analyze(Some(path));
    assert!(result.is_err());
}
