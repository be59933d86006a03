use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Files strictly larger than this are streamed line by line.
pub const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStrategy {
    WholeFile,
    Streaming,
}

impl ProcessingStrategy {
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size > threshold {
            ProcessingStrategy::Streaming
        } else {
            ProcessingStrategy::WholeFile
        }
    }
}

pub fn select_strategy(file_size_bytes: u64) -> ProcessingStrategy {
    ProcessingStrategy::for_size(file_size_bytes, LARGE_FILE_THRESHOLD)
}

/// Stat failures (permissions, deleted mid-scan) count as small.
pub fn is_large(path: &Path, threshold: u64) -> bool {
    fs::metadata(path)
        .map(|md| md.len() > threshold)
        .unwrap_or(false)
}

/// `md`, `.MD` and ` .md ` all become `.md`.
pub fn normalize_extension(token: &str) -> String {
    let token = token.trim().to_lowercase();
    if token.starts_with('.') {
        token
    } else {
        format!(".{token}")
    }
}

/// Lower-cased, dot-prefixed extension, or `""` when there is none.
/// Dotfiles such as `.gitignore` and names ending in a dot have no extension.
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(e) if !e.is_empty() => format!(".{}", e.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Include/exclude extension lists. Both may be set at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    pub include: Option<HashSet<String>>,
    pub exclude: Option<HashSet<String>>,
}

impl ExtensionFilter {
    /// Build from raw CLI tokens. Empty lists behave like absent ones.
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        let normalize = |tokens: &[String]| -> Option<HashSet<String>> {
            if tokens.is_empty() {
                None
            } else {
                Some(tokens.iter().map(|t| normalize_extension(t)).collect())
            }
        };
        Self {
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    pub fn passes(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        let included = self.include.as_ref().map_or(true, |set| set.contains(&ext));
        let excluded = self.exclude.as_ref().is_some_and(|set| set.contains(&ext));
        included && !excluded
    }

    pub fn is_active(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }
}
