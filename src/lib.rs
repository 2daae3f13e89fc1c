//! rewindtty records interactive terminal sessions to a JSON document and
//! replays or analyzes them later.

pub mod analyzer;
pub mod chunk;
pub mod cli;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod escape;
pub mod pty;
pub mod recorder;
pub mod replayer;
pub mod segmenter;
pub mod signals;
pub mod upload;

pub use error::{RewindError, Result};
