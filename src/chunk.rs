//! Raw captured output and the buffer that accumulates it during recording.

/// A single burst of bytes read from a PTY master at a known time.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Absolute timestamp ([`crate::clock::now`]) the bytes were read at.
    pub ts: f64,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(ts: f64, data: Vec<u8>) -> Self {
        Self { ts, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Growable buffer of chunks for one in-progress command session.
///
/// Starts with room for 100 chunks; beyond that, `Vec`'s own doubling growth
/// takes over, which is cheap enough that we never need a custom strategy.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
}

impl ChunkBuffer {
    const INITIAL_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self {
            chunks: Vec::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    pub fn push(&mut self, ts: f64, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.chunks.push(Chunk::new(ts, data.to_vec()));
    }

    pub fn as_slice(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
