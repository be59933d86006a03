use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glob::Pattern;

use crate::classify::{ExtensionFilter, LARGE_FILE_THRESHOLD};
use crate::matcher::MatcherKind;
use crate::utils::parse_size;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Scan a directory for emoji in text files and remove them",
    long_about = None,
    after_help = "Examples:\n  noemoji ./docs                 scan and clean docs\n  noemoji ./src --dry-run        preview only\n  noemoji . --ext .md .txt       only .md and .txt files\n  noemoji . -x .md .json         skip .md and .json files"
)]
pub struct Args {
    /// Target directory
    pub target: PathBuf,

    /// Preview only: report what would be removed without modifying files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Only process files with these extensions (e.g. --ext .md .txt)
    #[arg(short = 'e', long = "ext", num_args = 1.., value_name = "EXT")]
    pub ext: Vec<String>,

    /// Skip files with these extensions (e.g. --exclude .md .json)
    #[arg(short = 'x', long, num_args = 1.., value_name = "EXT")]
    pub exclude: Vec<String>,

    /// Remove without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Emoji detection engine
    #[arg(long, value_enum, default_value_t = MatcherKind::Table)]
    pub engine: MatcherKind,

    /// Files larger than this are streamed line by line (e.g. 10MiB, 500KB)
    #[arg(long, default_value = "10MiB", value_name = "SIZE")]
    pub large_file_threshold: String,

    /// Glob patterns to ignore (can be repeated or comma separated)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub ignore: Vec<String>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Log per-file decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Options {
    pub filter: ExtensionFilter,
    pub ignore_patterns: Vec<Pattern>,
    pub large_file_threshold: u64,
    pub engine: MatcherKind,
    pub dry_run: bool,
    pub assume_yes: bool,
    pub show_progress: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            filter: ExtensionFilter::default(),
            ignore_patterns: Vec::new(),
            large_file_threshold: LARGE_FILE_THRESHOLD,
            engine: MatcherKind::Table,
            dry_run: false,
            assume_yes: false,
            show_progress: false,
        }
    }
}

pub fn build_options(args: &Args) -> Result<Options> {
    let patterns = args
        .ignore
        .iter()
        .map(|s| Pattern::new(s).with_context(|| format!("Invalid glob pattern: {s}")))
        .collect::<Result<Vec<_>>>()?;

    let large_file_threshold = parse_size(&args.large_file_threshold)
        .with_context(|| format!("Invalid --large-file-threshold: {}", args.large_file_threshold))?;

    Ok(Options {
        filter: ExtensionFilter::new(&args.ext, &args.exclude),
        ignore_patterns: patterns,
        large_file_threshold,
        engine: args.engine,
        dry_run: args.dry_run,
        assume_yes: args.yes,
        show_progress: !args.no_progress,
    })
}
