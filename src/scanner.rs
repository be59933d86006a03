use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use glob::Pattern;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classify::extension_of;
use crate::cli::Options;
use crate::error::NoEmojiError;
use crate::matcher::EmojiMatcher;
use crate::processor::{FileOutcome, FileProcessor, FileResult, Mode};
use crate::progress::ProgressSink;

/// Version-control internals are never entered.
const VCS_DIRS: [&str; 3] = [".git", ".hg", ".svn"];

/// A file that was listed but could not be read as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A rewrite that did not happen; the original file is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one preview pass. `files` is in discovery order.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<FileResult>,
    pub skipped_extensions: BTreeSet<String>,
    pub unreadable: Vec<SkippedFile>,
    pub files_scanned: usize,
    pub interrupted: bool,
}

impl ScanResult {
    pub fn total_emojis(&self) -> usize {
        self.files.iter().map(|f| f.emoji_count).sum()
    }
}

/// Outcome of the execute pass over a preview's files.
#[derive(Debug, Default)]
pub struct ExecuteReport {
    pub cleaned: Vec<FileResult>,
    pub failures: Vec<WriteFailure>,
    pub unreadable: Vec<SkippedFile>,
    pub interrupted: bool,
}

impl ExecuteReport {
    pub fn total_removed(&self) -> usize {
        self.cleaned.iter().map(|f| f.emoji_count).sum()
    }
}

/// Validate the scan root and resolve it to an absolute path.
pub fn check_target(path: &Path) -> Result<PathBuf, NoEmojiError> {
    if !path.exists() {
        return Err(NoEmojiError::TargetMissing(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(NoEmojiError::NotADirectory(path.to_path_buf()));
    }
    Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
}

fn is_ignored(rel: &Path, patterns: &[Pattern]) -> bool {
    let name = rel.file_name().and_then(|s| s.to_str()).unwrap_or("");
    if VCS_DIRS.contains(&name) {
        return true;
    }
    let s_rel = rel.to_string_lossy().replace('\\', "/");
    patterns
        .iter()
        .any(|pat| pat.matches(&s_rel) || pat.matches(name))
}

/// Regular files under `root`, sorted by name within each directory.
/// Symlinks are not followed and symlinked files are not listed.
pub fn collect_files(root: &Path, patterns: &[Pattern]) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    let mut files = Vec::new();
    for entry in walker.filter_entry(|e| match e.path().strip_prefix(root) {
        Ok(rel) if rel != Path::new("") => !is_ignored(rel, patterns),
        _ => true,
    }) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => debug!(error = %err, "skipping unreadable directory entry"),
        }
    }
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drives the file processor over a directory tree.
pub struct Scanner<'a> {
    opts: &'a Options,
    processor: FileProcessor<'a>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Scanner<'a> {
    pub fn new(opts: &'a Options, matcher: &'a dyn EmojiMatcher) -> Self {
        Self {
            opts,
            processor: FileProcessor::new(matcher, opts.large_file_threshold),
            cancel: None,
        }
    }

    /// Checked between files; once set, the current pass stops early.
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Preview pass: find emoji without modifying anything.
    pub fn scan(&self, root: &Path, progress: &mut dyn ProgressSink) -> ScanResult {
        let mut result = ScanResult::default();

        let mut to_process = Vec::new();
        for path in collect_files(root, &self.opts.ignore_patterns) {
            let ext = extension_of(&path);
            if !self.opts.filter.passes(&ext) {
                if !ext.is_empty() {
                    result.skipped_extensions.insert(ext);
                }
                continue;
            }
            to_process.push(path);
        }

        let total = to_process.len();
        info!(root = %root.display(), total, "scanning");

        for (idx, path) in to_process.into_iter().enumerate() {
            if self.is_cancelled() {
                result.interrupted = true;
                break;
            }
            progress.on_file(idx + 1, total, &display_name(&path));

            match self.processor.process(&path, Mode::Preview) {
                FileOutcome::Matched(found) => result.files.push(found),
                FileOutcome::Clean => {}
                FileOutcome::Unreadable(err) => {
                    debug!(path = %path.display(), error = %err, "skipped");
                    let ext = extension_of(&path);
                    if !ext.is_empty() {
                        result.skipped_extensions.insert(ext);
                    }
                    result.unreadable.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
                FileOutcome::WriteFailed { path, error } => {
                    warn!(path = %path.display(), error = %error, "unexpected write during preview");
                    result.unreadable.push(SkippedFile {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
            result.files_scanned += 1;
        }
        progress.finish();

        info!(
            scanned = result.files_scanned,
            matched = result.files.len(),
            "scan finished"
        );
        result
    }

    /// Execute pass: strip emoji from the files a preview reported.
    pub fn execute(&self, scan: &ScanResult, progress: &mut dyn ProgressSink) -> ExecuteReport {
        let mut report = ExecuteReport::default();
        let total = scan.files.len();

        for (idx, found) in scan.files.iter().enumerate() {
            if self.is_cancelled() {
                report.interrupted = true;
                break;
            }
            progress.on_file(idx + 1, total, &display_name(&found.path));

            match self.processor.process(&found.path, Mode::Execute) {
                FileOutcome::Matched(cleaned) => report.cleaned.push(cleaned),
                FileOutcome::Clean => {
                    debug!(path = %found.path.display(), "no emoji left since preview");
                }
                FileOutcome::Unreadable(err) => {
                    warn!(path = %found.path.display(), error = %err, "could not re-read file");
                    report.unreadable.push(SkippedFile {
                        path: found.path.clone(),
                        reason: err.to_string(),
                    });
                }
                FileOutcome::WriteFailed { path, error } => {
                    warn!(path = %path.display(), error = %error, "rewrite failed, original kept");
                    report.failures.push(WriteFailure {
                        path,
                        message: error.to_string(),
                    });
                }
            }
        }
        progress.finish();
        report
    }
}
