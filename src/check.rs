//! Link consistency checking.
//!
//! Walks the staged posts and looks for two kinds of drift:
//!
//! - **Image link mismatches**: a reference under
//!   `<prefix>/<other>/<file>` in a post whose header says
//!   `abbrlink: <mine>`. This happens when a post's abbrlink was edited by
//!   hand without moving its images.
//! - **Stale `updated` dates**: the header's `updated:` differs from the
//!   file's modification date, or is missing while `published:` is present.
//!
//! Each finding is confirmed through [`Confirm`] (skipped with `--force`).
//! A confirmed link fix rewrites the reference to `<prefix>/<mine>/<file>`
//! and moves that single file; a confirmed date fix sets `updated:`. The
//! document is written back only if its text changed.
//!
//! Documents without an abbrlink and documents that cannot be read are
//! logged and skipped; the batch continues.

use crate::abbrlink::Abbrlink;
use crate::frontmatter;
use crate::fs::{self, FileSystem};
use crate::layout::SiteLayout;
use crate::migrate;
use crate::prompt::Confirm;
use crate::refs;
use crate::rewrite::{self, Rewrite, Splice};
use chrono::NaiveDate;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
}

/// An image reference filed under another post's abbrlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub span: Range<usize>,
    pub found: String,
    pub filename: String,
    /// The reference rewritten to the document's own abbrlink.
    pub fixed: String,
}

/// Find references whose abbrlink segment differs from `abbrlink`.
pub fn find_mismatches(content: &str, abbrlink: &Abbrlink, layout: &SiteLayout) -> Vec<Mismatch> {
    refs::scan(content)
        .into_iter()
        .filter_map(|image| {
            let posted = refs::posted_path(image.path, layout.public_prefix())?;
            if posted.abbrlink == abbrlink.as_str() {
                return None;
            }
            Some(Mismatch {
                span: image.span.clone(),
                found: posted.abbrlink.to_string(),
                filename: posted.filename.to_string(),
                fixed: image.with_path(&layout.public_url(abbrlink.as_str(), posted.filename)),
            })
        })
        .collect()
}

/// Rewrite every mismatched reference to the document's abbrlink.
pub fn fix_mismatches(content: &str, mismatches: &[Mismatch]) -> Rewrite {
    let splices: Vec<Splice> = mismatches
        .iter()
        .map(|m| Splice {
            span: m.span.clone(),
            replacement: m.fixed.clone(),
        })
        .collect();
    rewrite::splice(content, &splices)
}

/// Whether a header's `updated:` matches the file's modification date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    Current,
    /// `updated:` differs from the filesystem date.
    Stale { recorded: NaiveDate, actual: NaiveDate },
    /// `updated:` is absent but the header has `published:`.
    Missing { actual: NaiveDate },
    /// No dated header at all; nothing to refresh.
    NotApplicable,
}

impl DateStatus {
    pub fn needs_update(&self) -> bool {
        matches!(self, Self::Stale { .. } | Self::Missing { .. })
    }
}

/// Compare the header's `updated:` against `modified`.
///
/// An `updated:` value that isn't a date counts as absent.
pub fn date_status(content: &str, modified: NaiveDate) -> DateStatus {
    match frontmatter::field(content, "updated").and_then(frontmatter::parse_date) {
        Some(recorded) if recorded == modified => DateStatus::Current,
        Some(recorded) => DateStatus::Stale {
            recorded,
            actual: modified,
        },
        None if frontmatter::field(content, "published")
            .and_then(frontmatter::parse_date)
            .is_some() =>
        {
            DateStatus::Missing { actual: modified }
        }
        None => DateStatus::NotApplicable,
    }
}

/// What happened to one checked document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCheck {
    pub path: PathBuf,
    pub mismatches: usize,
    pub links_fixed: bool,
    pub date_stale: bool,
    pub date_fixed: bool,
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub written: bool,
}

/// Outcome of a whole check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub documents: Vec<DocumentCheck>,
    /// Documents skipped for missing abbrlink or I/O errors, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl CheckReport {
    pub fn links_fixed(&self) -> usize {
        self.documents.iter().filter(|d| d.links_fixed).count()
    }

    pub fn dates_fixed(&self) -> usize {
        self.documents.iter().filter(|d| d.date_fixed).count()
    }

    pub fn flagged(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.mismatches > 0 || d.date_stale)
            .count()
    }
}

/// Check one document or, with `target` unset, every post in the corpus.
pub fn check(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    target: Option<&Path>,
    confirm: &mut dyn Confirm,
) -> Result<CheckReport, CheckError> {
    let documents = match target {
        Some(path) => {
            if !fs.exists(path) {
                return Err(CheckError::SourceNotFound(path.to_path_buf()));
            }
            vec![path.to_path_buf()]
        }
        None if !fs.is_dir(layout.posts_dir()) => {
            tracing::warn!("Posts directory {} does not exist", layout.posts_dir().display());
            Vec::new()
        }
        None => fs::markdown_files(fs, layout.posts_dir())?,
    };

    let mut report = CheckReport::default();
    for path in documents {
        match check_document(fs, layout, &path, confirm) {
            Ok(doc) => report.documents.push(doc),
            Err(reason) => {
                tracing::warn!("Skipping {}: {}", path.display(), reason);
                report.skipped.push((path, reason));
            }
        }
    }
    Ok(report)
}

fn check_document(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    path: &Path,
    confirm: &mut dyn Confirm,
) -> Result<DocumentCheck, String> {
    let content = fs.read_to_string(path).map_err(|e| e.to_string())?;
    let abbrlink = frontmatter::header_abbrlink(&content)
        .ok_or_else(|| "no abbrlink in front matter".to_string())
        .and_then(|a| Abbrlink::new(a).map_err(|e| e.to_string()))?;
    let name = path.display().to_string();
    tracing::debug!("Checking {} (abbrlink {})", name, abbrlink);

    let mismatches = find_mismatches(&content, &abbrlink, layout);
    let status = match fs.modified(path) {
        Ok(modified) => date_status(&content, modified),
        Err(e) => {
            tracing::warn!("Cannot read modification date of {}: {}", name, e);
            DateStatus::NotApplicable
        }
    };

    let mut doc = DocumentCheck {
        path: path.to_path_buf(),
        mismatches: mismatches.len(),
        date_stale: status.needs_update(),
        ..DocumentCheck::default()
    };
    let mut updated = content.clone();

    if !mismatches.is_empty() {
        tracing::info!("{} has {} image link(s) under another abbrlink", name, mismatches.len());
        let question = format!(
            "{name}: fix {} image link(s) to use abbrlink {abbrlink}?",
            mismatches.len()
        );
        if confirm.confirm(&question) {
            updated = fix_mismatches(&updated, &mismatches).text;
            for m in &mismatches {
                let moved = migrate::move_image_file(fs, layout, &m.found, &abbrlink, &m.filename);
                doc.moved.extend(moved.moved);
            }
            doc.links_fixed = true;
        }
    }

    if let DateStatus::Stale { actual, .. } | DateStatus::Missing { actual } = status {
        tracing::info!("{} needs its updated date refreshed", name);
        let question = format!(
            "{name}: set updated to {}?",
            frontmatter::format_date(actual)
        );
        if confirm.confirm(&question) {
            let patched = frontmatter::set_updated(&updated, actual);
            doc.date_fixed = patched.is_changed();
            updated = patched.text;
        }
    }

    if updated != content {
        fs.write(path, &updated).map_err(|e| e.to_string())?;
        tracing::info!("Updated {}", name);
        doc.written = true;
    }
    Ok(doc)
}
