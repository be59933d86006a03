use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the scan target itself. Everything per-file is
/// recovered inside the scanner and never surfaces as one of these.
#[derive(Debug, Error)]
pub enum NoEmojiError {
    #[error("directory does not exist: {}", .0.display())]
    TargetMissing(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Per-file failures raised while reading or rewriting a single file.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("not valid UTF-8 text")]
    InvalidUtf8,
    #[error("unsupported text encoding ({0})")]
    UnsupportedEncoding(&'static str),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

impl ProcessError {
    /// Read-side failures mean the file is skipped; write-side failures are
    /// reported as failed rewrites.
    pub fn is_unreadable(&self) -> bool {
        !matches!(self, ProcessError::Write(_))
    }
}
