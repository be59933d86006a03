use std::fmt::Write;

use crate::processor::FileResult;
use crate::scanner::{ExecuteReport, ScanResult, SkippedFile};

/// At most this many found emoji are echoed per file.
const PREVIEW_LIMIT: usize = 10;
const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Preview,
    Executed,
}

fn emoji_preview(result: &FileResult) -> String {
    let mut shown: String = result
        .emojis_found
        .iter()
        .take(PREVIEW_LIMIT)
        .map(String::as_str)
        .collect();
    if result.emojis_found.len() > PREVIEW_LIMIT {
        shown.push_str("...");
    }
    shown
}

fn push_file_list(out: &mut String, files: &[FileResult]) {
    for result in files {
        let _ = writeln!(out, "  {}", result.path.display());
        let _ = writeln!(
            out,
            "    count: {}  found: {}",
            result.emoji_count,
            emoji_preview(result)
        );
    }
}

fn push_skipped(out: &mut String, unreadable: &[SkippedFile]) {
    if unreadable.is_empty() {
        return;
    }
    let _ = writeln!(out, "Skipped {} unreadable file(s):", unreadable.len());
    for skipped in unreadable {
        let _ = writeln!(out, "  {}: {}", skipped.path.display(), skipped.reason);
    }
}

/// Text report for a preview pass.
pub fn render_scan_report(scan: &ScanResult, mode: ReportMode) -> String {
    let mut out = String::new();

    if scan.files.is_empty() {
        let _ = writeln!(out, "No files containing emoji found");
    } else {
        let label = match mode {
            ReportMode::Preview => "[preview]",
            ReportMode::Executed => "[cleaned]",
        };
        let rule = "=".repeat(RULE_WIDTH);
        let _ = writeln!(out, "{label} report");
        let _ = writeln!(out, "{rule}");
        push_file_list(&mut out, &scan.files);
        let _ = writeln!(out, "{rule}");
        let verb = match mode {
            ReportMode::Preview => "found",
            ReportMode::Executed => "removed",
        };
        let _ = writeln!(
            out,
            "{} file(s) with emoji, {verb} {} emoji",
            scan.files.len(),
            scan.total_emojis()
        );
    }

    if !scan.skipped_extensions.is_empty() {
        let exts: Vec<&str> = scan.skipped_extensions.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Skipped file types: {}", exts.join(", "));
    }
    push_skipped(&mut out, &scan.unreadable);
    if scan.interrupted {
        let _ = writeln!(
            out,
            "Interrupted after {} file(s); results are partial",
            scan.files_scanned
        );
    }
    out
}

/// Summary for the execute pass over `scan`, including every failed rewrite.
pub fn render_execute_report(scan: &ScanResult, report: &ExecuteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Done! Cleaned {} file(s), removed {} emoji",
        report.cleaned.len(),
        report.total_removed()
    );
    let previewed = scan.total_emojis();
    if report.total_removed() < previewed {
        let _ = writeln!(
            out,
            "{} of {} previewed emoji were left in place",
            previewed - report.total_removed(),
            previewed
        );
    }
    if !report.failures.is_empty() {
        let _ = writeln!(
            out,
            "Failed to rewrite {} file(s) (originals left unchanged):",
            report.failures.len()
        );
        for failure in &report.failures {
            let _ = writeln!(out, "  {}: {}", failure.path.display(), failure.message);
        }
    }
    push_skipped(&mut out, &report.unreadable);
    if report.interrupted {
        let _ = writeln!(out, "Interrupted; remaining files were not modified");
    }
    out
}
