//! Tests for shared recorder state and its continuous-persistence behavior.

use std::path::PathBuf;

use rewindtty::document::CommandSession;
use rewindtty::signals::{self, Shared};

fn tempfile(name: &str) -> PathBuf {
    static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("rewindtty-test-signals-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{n}-{name}"))
}

#[tokio::test]
async fn test_push_and_persist_writes_document_to_disk() {
    let path = tempfile("session.json");
    let shared = Shared::new(false, path.clone());

    let mut session = CommandSession::new("echo hi", 0.0);
    session.push_chunk(0.01, b"hi\n");
    session.finish(0.02);

    signals::push_and_persist(&shared, session).await.unwrap();

    let on_disk = std::fs::read_to_string(&path).unwrap();
    let doc: rewindtty::document::SessionDocument = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(doc.sessions().len(), 1);
    assert_eq!(doc.sessions()[0].command, "echo hi");
}

#[tokio::test]
async fn test_persist_creates_missing_parent_directories() {
    let path = std::env::temp_dir()
        .join(format!("rewindtty-test-signals-nested-{}", std::process::id()))
        .join("a")
        .join("b")
        .join("session.json");
    let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap().parent().unwrap());
    let shared = Shared::new(false, path.clone());

    signals::persist(&shared).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_set_child_pid_round_trips() {
    let path = tempfile("pid.json");
    let shared = Shared::new(false, path);

    assert!(shared.child_pid.lock().await.is_none());
    signals::set_child_pid(&shared, Some(nix::unistd::Pid::from_raw(1234))).await;
    assert_eq!(shared.child_pid.lock().await.unwrap().as_raw(), 1234);

    signals::set_child_pid(&shared, None).await;
    assert!(shared.child_pid.lock().await.is_none());
}
