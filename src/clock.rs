//! Monotonic-ish wall-clock timestamps in fractional seconds.
//!
//! Chunk and session timestamps need to be comparable across a single
//! recording run and meaningful as absolute wall-clock time (so a document's
//! `metadata.timestamp` means something on its own). We pin a
//! [`std::time::Instant`] (monotonic) against the wall-clock time read at the
//! same moment, then report elapsed time added to that anchor -- this gives
//! sub-millisecond resolution without the clock ever running backwards
//! within a process.

use std::sync::LazyLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

struct Anchor {
    instant: Instant,
    wall_seconds: f64,
}

static ANCHOR: LazyLock<Anchor> = LazyLock::new(|| Anchor {
    instant: Instant::now(),
    wall_seconds: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64(),
});

/// Current time in fractional seconds since the Unix epoch, monotonic for
/// the lifetime of this process.
#[must_use]
pub fn now() -> f64 {
    ANCHOR.wall_seconds + ANCHOR.instant.elapsed().as_secs_f64()
}
