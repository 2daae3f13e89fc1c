//! The session document: what gets written to disk and read back by the
//! replayer, analyzer, and uploader.
//!
//! Two layers exist on purpose. [`CommandSession`] is the live,
//! in-memory/mutable form a recorder builds up chunk by chunk, with absolute
//! timestamps. [`CommandSessionRecord`] is its serialized shape, with
//! chunk times made relative to the session's own start -- matching what a
//! player only ever needs to know ("how long after the command started did
//! this text appear").

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, ChunkBuffer};

/// A serialized chunk: time relative to the owning session's start, in
/// seconds, plus the byte count and the bytes themselves (lossily decoded
/// as UTF-8, since terminal output is overwhelmingly text plus ANSI escapes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub time: f64,
    pub size: f64,
    pub data: String,
}

/// One recorded command: its text, timing, and the chunks of output it
/// produced, already finalized and ready to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSessionRecord {
    pub command: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub interactive_mode: bool,
    pub timestamp: f64,
}

/// The document as it appears on disk. Accepts either the current
/// `{metadata, sessions}` shape or a legacy bare array of sessions produced
/// by older recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionDocument {
    Versioned {
        metadata: Metadata,
        sessions: Vec<CommandSessionRecord>,
    },
    Legacy(Vec<CommandSessionRecord>),
}

impl SessionDocument {
    pub fn sessions(&self) -> &[CommandSessionRecord] {
        match self {
            SessionDocument::Versioned { sessions, .. } => sessions,
            SessionDocument::Legacy(sessions) => sessions,
        }
    }

    pub fn into_sessions(self) -> Vec<CommandSessionRecord> {
        match self {
            SessionDocument::Versioned { sessions, .. } => sessions,
            SessionDocument::Legacy(sessions) => sessions,
        }
    }
}

/// A command session while it is still being recorded: chunks accumulate
/// with absolute timestamps until [`CommandSession::finish`] closes it out.
#[derive(Debug)]
pub struct CommandSession {
    pub command: String,
    pub start_time: f64,
    pub end_time: f64,
    chunks: ChunkBuffer,
}

impl CommandSession {
    pub fn new(command: impl Into<String>, start_time: f64) -> Self {
        Self {
            command: command.into(),
            start_time,
            end_time: start_time,
            chunks: ChunkBuffer::new(),
        }
    }

    pub fn push_chunk(&mut self, ts: f64, data: &[u8]) {
        self.chunks.push(ts, data);
    }

    pub fn finish(&mut self, end_time: f64) {
        self.end_time = end_time;
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.chunks.as_slice()
    }

    pub fn to_record(&self) -> CommandSessionRecord {
        let chunks = self
            .chunks
            .as_slice()
            .iter()
            .map(|c| ChunkRecord {
                time: c.ts - self.start_time,
                size: c.len() as f64,
                data: String::from_utf8_lossy(&c.data).into_owned(),
            })
            .collect();

        CommandSessionRecord {
            command: self.command.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration(),
            chunks,
        }
    }
}

/// All sessions recorded in one run, plus the metadata describing the run
/// itself.
#[derive(Debug)]
pub struct SessionStore {
    interactive_mode: bool,
    start_timestamp: f64,
    sessions: Vec<CommandSession>,
}

impl SessionStore {
    pub fn new(interactive_mode: bool) -> Self {
        Self {
            interactive_mode,
            start_timestamp: crate::clock::now(),
            sessions: Vec::new(),
        }
    }

    pub fn push(&mut self, session: CommandSession) {
        self.sessions.push(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn to_document(&self) -> SessionDocument {
        SessionDocument::Versioned {
            metadata: Metadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                interactive_mode: self.interactive_mode,
                timestamp: self.start_timestamp,
            },
            sessions: self.sessions.iter().map(CommandSession::to_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_monotonicity_survives_a_record_round_trip() {
        let mut session = CommandSession::new("echo hi", 10.0);
        session.push_chunk(10.1, b"h");
        session.push_chunk(10.2, b"i\n");
        session.finish(10.3);

        let record = session.to_record();
        assert_eq!(record.chunks[0].time, 0.1_f64);
        assert_eq!(record.chunks[1].time, 0.2_f64);
        for w in record.chunks.windows(2) {
            assert!(w[0].time <= w[1].time);
        }
    }

    #[test]
    fn versioned_document_round_trips_through_json() {
        let mut store = SessionStore::new(false);
        let mut session = CommandSession::new("ls", 0.0);
        session.push_chunk(0.05, b"a.txt\n");
        session.finish(0.2);
        store.push(session);

        let doc = store.to_document();
        let json = serde_json::to_string(&doc).unwrap();
        let back: SessionDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(back.sessions().len(), 1);
        assert_eq!(back.sessions()[0].command, "ls");
        assert_eq!(back.sessions()[0].chunks[0].data, "a.txt\n");
    }

    #[test]
    fn legacy_bare_array_document_is_accepted() {
        let json = r#"[
            {"command": "pwd", "start_time": 0.0, "end_time": 0.1, "duration": 0.1, "chunks": []}
        ]"#;
        let doc: SessionDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.sessions().len(), 1);
        assert_eq!(doc.sessions()[0].command, "pwd");
    }
}
