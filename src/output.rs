//! CLI output formatting for every command.
//!
//! Summaries go to stdout; the per-file detail of what was copied, moved or
//! deleted is logged through `tracing` as it happens. Paths are shown relative
//! to the blog root when they live under it.
//!
//! # Output Format
//!
//! ## Add / Update
//!
//! ```text
//! Staged drafts/my-post.md → src/content/posts/2024/05/my-post.md
//!     Abbrlink: 1a2b3c4d
//!     Front matter: created
//!     Markup: 2 spans normalized
//!     Images: 3 relocated
//!     Missing: drafts/gone.png
//! ```
//!
//! ## Check
//!
//! ```text
//! src/content/posts/2024/01/p.md
//!     Image links: 1 mismatched (fixed)
//!     Updated date: stale (kept)
//! Skipped src/content/posts/a.md: no abbrlink in front matter
//!
//! Checked 12 posts: 1 link fix, 0 date refreshes, 1 skipped
//! ```
//!
//! ## Cleanup
//!
//! ```text
//! Unreferenced images
//!     src/assets/images/posts/gone/gone-1.png
//!
//! 14 images, 13 referenced by 12 posts, 1 unreferenced
//! Deleted 1 image, removed 1 empty directory
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::check::CheckReport;
use crate::cleanup::{CleanupPlan, CleanupReport};
use crate::stage::{HeaderAction, StageReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `1 image`, `2 images`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// add / update
// ============================================================================

pub fn format_stage_report(report: &StageReport, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Staged {} → {}",
        display_path(&report.source, root),
        display_path(&report.destination, root)
    )];
    lines.push(format!("{}Abbrlink: {}", indent(1), report.abbrlink));
    let header = match &report.header {
        HeaderAction::Created => "created".to_string(),
        HeaderAction::Patched { old } => format!("abbrlink {old} → {}", report.abbrlink),
        HeaderAction::Kept => "kept".to_string(),
    };
    lines.push(format!("{}Front matter: {}", indent(1), header));

    if !report.markup_edits.is_empty() {
        lines.push(format!(
            "{}Markup: {} normalized",
            indent(1),
            count(report.markup_edits.len(), "span", "spans")
        ));
    }
    if report.image_count > 0 {
        lines.push(format!(
            "{}Images: {} relocated",
            indent(1),
            report.image_count
        ));
    }
    if report.failed_copies > 0 {
        lines.push(format!(
            "{}Failed copies: {}",
            indent(1),
            report.failed_copies
        ));
    }
    for missing in &report.missing_images {
        lines.push(format!("{}Missing: {}", indent(1), display_path(missing, root)));
    }
    if let Some(migration) = &report.migration {
        lines.push(format!(
            "{}Image links: {} moved from {}",
            indent(1),
            migration.links,
            migration.from
        ));
        if migration.moves.source_missing {
            lines.push(format!("{}No image directory for {}", indent(2), migration.from));
        } else {
            lines.push(format!(
                "{}{} moved, {} failed",
                indent(2),
                count(migration.moves.moved.len(), "file", "files"),
                migration.moves.failed.len()
            ));
        }
    }
    lines
}

pub fn print_stage_report(report: &StageReport, root: &Path) {
    print_lines(format_stage_report(report, root));
}

// ============================================================================
// check
// ============================================================================

fn outcome(fixed: bool) -> &'static str {
    if fixed { "fixed" } else { "kept" }
}

pub fn format_check_report(report: &CheckReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for doc in report
        .documents
        .iter()
        .filter(|d| d.mismatches > 0 || d.date_stale)
    {
        lines.push(display_path(&doc.path, root));
        if doc.mismatches > 0 {
            lines.push(format!(
                "{}Image links: {} mismatched ({})",
                indent(1),
                doc.mismatches,
                outcome(doc.links_fixed)
            ));
        }
        if doc.date_stale {
            lines.push(format!(
                "{}Updated date: stale ({})",
                indent(1),
                outcome(doc.date_fixed)
            ));
        }
    }
    for (path, reason) in &report.skipped {
        lines.push(format!("Skipped {}: {}", display_path(path, root), reason));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}: {}, {}, {} skipped",
        count(report.documents.len() + report.skipped.len(), "post", "posts"),
        count(report.links_fixed(), "link fix", "link fixes"),
        count(report.dates_fixed(), "date refresh", "date refreshes"),
        report.skipped.len()
    ));
    lines
}

pub fn print_check_report(report: &CheckReport, root: &Path) {
    print_lines(format_check_report(report, root));
}

// ============================================================================
// cleanup
// ============================================================================

/// One-line totals of a cleanup plan.
pub fn format_cleanup_summary(plan: &CleanupPlan) -> String {
    format!(
        "{}, {} referenced by {}, {} unreferenced",
        count(plan.images.len(), "image", "images"),
        plan.referenced.len(),
        count(plan.documents, "post", "posts"),
        plan.unreferenced.len()
    )
}

/// `--force` skips the listing and shows only the totals.
pub fn print_cleanup_summary(plan: &CleanupPlan) {
    println!("{}", format_cleanup_summary(plan));
}

/// The orphan list shown before asking for confirmation.
pub fn format_cleanup_plan(plan: &CleanupPlan, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if !plan.unreferenced.is_empty() {
        lines.push("Unreferenced images".to_string());
        for path in &plan.unreferenced {
            lines.push(format!("{}{}", indent(1), display_path(path, root)));
        }
        lines.push(String::new());
    }
    lines.push(format_cleanup_summary(plan));
    lines
}

pub fn print_cleanup_plan(plan: &CleanupPlan, root: &Path) {
    print_lines(format_cleanup_plan(plan, root));
}

pub fn format_cleanup_report(report: &CleanupReport, root: &Path) -> Vec<String> {
    if report.declined {
        return vec!["Cleanup cancelled".to_string()];
    }
    let mut lines = vec![format!(
        "Deleted {}, removed {}",
        count(report.deleted.len(), "image", "images"),
        count(report.pruned_dirs.len(), "empty directory", "empty directories")
    )];
    for (path, reason) in &report.failed {
        lines.push(format!(
            "{}Failed: {} ({})",
            indent(1),
            display_path(path, root),
            reason
        ));
    }
    lines
}

pub fn print_cleanup_report(report: &CleanupReport, root: &Path) {
    print_lines(format_cleanup_report(report, root));
}

// ============================================================================
// Tests
// ============================================================================
