//
// lib.rs
// noemoji
//
// Library entry that re-exports the matcher, classifier, file processor and scanner so the binary and tests share one pipeline.
pub mod classify;
pub mod cli;
pub mod error;
pub mod matcher;
pub mod processor;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod session;
pub mod utils;

pub use classify::{select_strategy, ExtensionFilter, ProcessingStrategy, LARGE_FILE_THRESHOLD};
pub use cli::{build_options, Args, Options};
pub use error::{NoEmojiError, ProcessError};
pub use matcher::{select_matcher, EmojiMatcher, MatcherKind};
pub use processor::{FileOutcome, FileProcessor, FileResult, Mode};
pub use report::{render_execute_report, render_scan_report, ReportMode};
pub use scanner::{check_target, ExecuteReport, ScanResult, Scanner};
pub use session::{RunOutcome, RunState, Session};
