//! Preview, confirm, execute.
//!
//! The caller owns the loop: it inspects each [`RunState`] (to print the
//! preview or a prompt) and hands it back to [`Session::step`]. Files are only
//! modified in the `Executing` step, which is unreachable in dry-run mode and
//! without confirmation unless `assume_yes` is set.

use std::path::Path;

use crate::scanner::{ExecuteReport, ScanResult, Scanner};
use crate::progress::ProgressSink;

/// Asked once, after a preview that found something.
pub trait Confirm {
    fn confirm(&mut self, scan: &ScanResult) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ScanResult) -> bool,
{
    fn confirm(&mut self, scan: &ScanResult) -> bool {
        self(scan)
    }
}

/// Only `yes` or `y`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

#[derive(Debug)]
pub enum RunOutcome {
    Previewed(ScanResult),
    Executed {
        scan: ScanResult,
        report: ExecuteReport,
    },
}

impl RunOutcome {
    pub fn interrupted(&self) -> bool {
        match self {
            RunOutcome::Previewed(scan) => scan.interrupted,
            RunOutcome::Executed { report, .. } => report.interrupted,
        }
    }
}

#[derive(Debug)]
pub enum RunState {
    Scanned(ScanResult),
    AwaitingConfirmation(ScanResult),
    Executing(ScanResult),
    Done(RunOutcome),
    Cancelled,
}

impl RunState {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Done(_) | RunState::Cancelled)
    }
}

pub struct Session<'a> {
    scanner: Scanner<'a>,
    dry_run: bool,
    assume_yes: bool,
}

impl<'a> Session<'a> {
    pub fn new(scanner: Scanner<'a>, dry_run: bool, assume_yes: bool) -> Self {
        Self {
            scanner,
            dry_run,
            assume_yes,
        }
    }

    /// Run the preview pass.
    pub fn start(&self, root: &Path, progress: &mut dyn ProgressSink) -> RunState {
        RunState::Scanned(self.scanner.scan(root, progress))
    }

    pub fn step(
        &self,
        state: RunState,
        confirm: &mut dyn Confirm,
        progress: &mut dyn ProgressSink,
    ) -> RunState {
        match state {
            RunState::Scanned(scan) => {
                if scan.interrupted || self.dry_run || scan.files.is_empty() {
                    RunState::Done(RunOutcome::Previewed(scan))
                } else if self.assume_yes {
                    RunState::Executing(scan)
                } else {
                    RunState::AwaitingConfirmation(scan)
                }
            }
            RunState::AwaitingConfirmation(scan) => {
                if confirm.confirm(&scan) {
                    RunState::Executing(scan)
                } else {
                    RunState::Cancelled
                }
            }
            RunState::Executing(scan) => {
                let report = self.scanner.execute(&scan, progress);
                RunState::Done(RunOutcome::Executed { scan, report })
            }
            finished @ (RunState::Done(_) | RunState::Cancelled) => finished,
        }
    }

    /// Step until finished, without observing intermediate states.
    pub fn run_to_end(
        &self,
        root: &Path,
        confirm: &mut dyn Confirm,
        progress: &mut dyn ProgressSink,
    ) -> RunState {
        let mut state = self.start(root, progress);
        while !state.is_finished() {
            state = self.step(state, confirm, progress);
        }
        state
    }
}
