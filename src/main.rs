use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::warn;

use noemoji::progress::{BarProgress, NoProgress, ProgressSink};
use noemoji::session::is_affirmative;
use noemoji::utils::IN_FLIGHT;
use noemoji::{
    build_options, check_target, render_execute_report, render_scan_report, select_matcher, Args,
    ReportMode, RunOutcome, RunState, ScanResult, Scanner, Session,
};

/// Set by the first Ctrl-C; the scanner stops before the next file.
static CANCELLED: AtomicBool = AtomicBool::new(false);
/// True while waiting on the confirmation prompt.
static PROMPTING: AtomicBool = AtomicBool::new(false);

const EXIT_INTERRUPTED: u8 = 130;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let opts = build_options(&args)?;
    let root = check_target(&args.target)?;
    let matcher = select_matcher(opts.engine);

    if let Err(err) = ctrlc::set_handler(on_interrupt) {
        warn!(error = %err, "could not install interrupt handler");
    }

    println!("{} {}", "Scanning:".bold(), root.display());
    if opts.dry_run {
        println!("Mode: preview (files are not modified)");
    }
    if opts.filter.is_active() {
        if let Some(include) = &opts.filter.include {
            println!("Include: {}", join_sorted(include));
        }
        if let Some(exclude) = &opts.filter.exclude {
            println!("Exclude: {}", join_sorted(exclude));
        }
    } else {
        println!("File types: all");
    }
    println!("Engine: {}", matcher.name());

    let scanner = Scanner::new(&opts, matcher).with_cancel_flag(&CANCELLED);
    let session = Session::new(scanner, opts.dry_run, opts.assume_yes);

    let mut scan_progress = progress_sink(opts.show_progress, "Scanning");
    let mut clean_progress = progress_sink(opts.show_progress, "Cleaning");

    let mut state = session.start(&root, scan_progress.as_mut());
    loop {
        match &state {
            RunState::Scanned(scan) => {
                print!("\n{}", render_scan_report(scan, ReportMode::Preview));
            }
            RunState::AwaitingConfirmation(_) => {}
            RunState::Executing(_) => println!("\n{}", "Removing emoji...".bold()),
            RunState::Done(outcome) => {
                if let RunOutcome::Executed { scan, report } = outcome {
                    print!("\n{}", render_execute_report(scan, report));
                }
                if outcome.interrupted() {
                    eprintln!("{}", "Interrupted".yellow());
                    return Ok(ExitCode::from(EXIT_INTERRUPTED));
                }
                return Ok(ExitCode::SUCCESS);
            }
            RunState::Cancelled => {
                println!("Cancelled");
                return Ok(ExitCode::SUCCESS);
            }
        }
        state = session.step(state, &mut prompt_confirmation, clean_progress.as_mut());
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // RUST_LOG wins over --verbose, e.g. RUST_LOG=noemoji=trace
    let default = if verbose { "noemoji=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn on_interrupt() {
    if PROMPTING.load(Ordering::SeqCst) {
        println!("\nCancelled");
        std::process::exit(0);
    }
    // A second Ctrl-C does not wait for the current file; exit skips
    // destructors, so its temp file is removed here.
    if CANCELLED.swap(true, Ordering::SeqCst) {
        IN_FLIGHT.discard_all();
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    }
}

fn prompt_confirmation(_scan: &ScanResult) -> bool {
    PROMPTING.store(true, Ordering::SeqCst);
    print!("\nRemove the emoji listed above? (yes/no): ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    let read = io::stdin().lock().read_line(&mut answer);
    PROMPTING.store(false, Ordering::SeqCst);

    match read {
        Ok(0) | Err(_) => {
            println!();
            false
        }
        Ok(_) => is_affirmative(&answer),
    }
}

fn progress_sink(enabled: bool, label: &'static str) -> Box<dyn ProgressSink> {
    if enabled {
        Box::new(BarProgress::new(label))
    } else {
        Box::new(NoProgress)
    }
}

fn join_sorted(exts: &HashSet<String>) -> String {
    let mut exts: Vec<&str> = exts.iter().map(String::as_str).collect();
    exts.sort_unstable();
    exts.join(", ")
}
