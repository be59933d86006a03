//! Per-file read, match and rewrite.
//!
//! Small files are read whole and decoded strictly; files above the
//! configured threshold are streamed line by line so memory stays bounded.
//! In both cases a rewrite goes through [`PendingReplace`], so a failure at
//! any point leaves the original bytes untouched.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::classify::{is_large, ProcessingStrategy};
use crate::error::ProcessError;
use crate::matcher::EmojiMatcher;
use crate::utils::{atomic_replace, decode_utf8_strict, PendingReplace};

/// Preview never touches the filesystem beyond reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Preview,
    Execute,
}

/// A file that contained at least one emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    pub emoji_count: usize,
    pub emojis_found: Vec<String>,
}

impl FileResult {
    /// `None` when nothing was found, so a result always has `emoji_count >= 1`.
    pub fn from_matches(path: &Path, emojis_found: Vec<String>) -> Option<Self> {
        if emojis_found.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            emoji_count: emojis_found.len(),
            emojis_found,
        })
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    /// Emoji found; in Execute mode they have also been removed on disk.
    Matched(FileResult),
    Clean,
    Unreadable(ProcessError),
    WriteFailed { path: PathBuf, error: ProcessError },
}

pub struct FileProcessor<'a> {
    matcher: &'a dyn EmojiMatcher,
    large_file_threshold: u64,
}

impl<'a> FileProcessor<'a> {
    pub fn new(matcher: &'a dyn EmojiMatcher, large_file_threshold: u64) -> Self {
        Self {
            matcher,
            large_file_threshold,
        }
    }

    pub fn strategy_for(&self, path: &Path) -> ProcessingStrategy {
        if is_large(path, self.large_file_threshold) {
            ProcessingStrategy::Streaming
        } else {
            ProcessingStrategy::WholeFile
        }
    }

    pub fn process(&self, path: &Path, mode: Mode) -> FileOutcome {
        let strategy = self.strategy_for(path);
        debug!(path = %path.display(), ?strategy, ?mode, "processing file");

        let res = match strategy {
            ProcessingStrategy::WholeFile => self.process_whole(path, mode),
            ProcessingStrategy::Streaming => self.process_streaming(path, mode),
        };

        match res {
            Ok(Some(result)) => FileOutcome::Matched(result),
            Ok(None) => FileOutcome::Clean,
            Err(error) if error.is_unreadable() => FileOutcome::Unreadable(error),
            Err(error) => FileOutcome::WriteFailed {
                path: path.to_path_buf(),
                error,
            },
        }
    }

    fn process_whole(&self, path: &Path, mode: Mode) -> Result<Option<FileResult>, ProcessError> {
        let bytes = fs::read(path).map_err(ProcessError::Read)?;
        let text = decode_utf8_strict(&bytes)?;

        let found: Vec<String> = self
            .matcher
            .find_all(text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let Some(result) = FileResult::from_matches(path, found) else {
            return Ok(None);
        };

        if mode == Mode::Execute {
            let cleaned = self.matcher.strip(text);
            atomic_replace(path, |w| w.write_all(cleaned.as_bytes()))
                .map_err(ProcessError::Write)?;
        }
        Ok(Some(result))
    }

    fn process_streaming(
        &self,
        path: &Path,
        mode: Mode,
    ) -> Result<Option<FileResult>, ProcessError> {
        let file = File::open(path).map_err(ProcessError::Read)?;
        let mut reader = BufReader::new(file);

        let mut pending = match mode {
            Mode::Execute => Some(PendingReplace::new(path).map_err(ProcessError::Write)?),
            Mode::Preview => None,
        };

        let mut found = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(ProcessError::Read)?;
            if n == 0 {
                break;
            }
            let text = decode_utf8_strict(&line)?;
            found.extend(self.matcher.find_all(text).into_iter().map(str::to_owned));
            if let Some(out) = pending.as_mut() {
                out.write_all(self.matcher.strip(text).as_bytes())
                    .map_err(ProcessError::Write)?;
            }
        }

        let Some(result) = FileResult::from_matches(path, found) else {
            // Nothing to remove: the uncommitted temp file is discarded on drop.
            return Ok(None);
        };
        if let Some(out) = pending {
            out.commit().map_err(ProcessError::Write)?;
        }
        Ok(Some(result))
    }
}
