//! Local image relocation.
//!
//! When a draft is staged, every image it references from the local disk is
//! copied into the post's own image directory and the reference is rewritten
//! to the public URL:
//!
//! ```text
//! ![diagram](./img/diagram.png)
//!   → copy  ./img/diagram.png  →  <images>/posts/1a2b3c4d/1a2b3c4d-<digest8("diagram")>.png
//!   → text  ![diagram](/src/assets/images/posts/1a2b3c4d/1a2b3c4d-….png)
//! ```
//!
//! The work is split in two phases:
//!
//! 1. [`plan`] scans the body and decides, for each reference, whether it is
//!    relocated (a [`CopyOp`] plus a [`Splice`]) or skipped. It only asks an
//!    existence predicate, so it is testable without a filesystem.
//! 2. [`relocate`] performs the copies, then applies every splice in one pass.
//!
//! References to missing files are left byte-for-byte unchanged and reported
//! as warnings. A copy that fails is logged and skipped, and every reference
//! to that source stays unchanged too, so the post never links to a file that
//! wasn't written.

use crate::abbrlink::Abbrlink;
use crate::fs::FileSystem;
use crate::layout::{SiteLayout, normalize_path};
use crate::refs;
use crate::rewrite::{self, Edit, Splice};
use std::path::{Path, PathBuf};

/// A scheduled file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOp {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything relocation will do to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationPlan {
    /// Unique copies, in reference order.
    pub copies: Vec<CopyOp>,
    /// One splice per relocated reference.
    pub splices: Vec<Splice>,
    /// Source file of each splice, in the same order.
    pub sources: Vec<PathBuf>,
    /// Referenced local files that don't exist.
    pub missing: Vec<PathBuf>,
}

impl RelocationPlan {
    /// Number of references that will be rewritten.
    pub fn image_count(&self) -> usize {
        self.splices.len()
    }
}

/// Outcome of [`relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub body: String,
    pub edits: Vec<Edit>,
    pub image_count: usize,
    pub copied: Vec<CopyOp>,
    pub failed: Vec<(CopyOp, String)>,
    pub missing: Vec<PathBuf>,
}

/// Resolve a reference path against the draft's directory.
pub fn resolve_source(source_dir: &Path, reference: &str) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&source_dir.join(path))
    }
}

/// Decide what happens to each image reference in `body`.
pub fn plan(
    body: &str,
    source_dir: &Path,
    abbrlink: &Abbrlink,
    layout: &SiteLayout,
    exists: impl Fn(&Path) -> bool,
) -> RelocationPlan {
    let mut plan = RelocationPlan::default();
    for image in refs::scan(body) {
        if !refs::is_local(image.path) {
            continue;
        }
        let source = resolve_source(source_dir, image.path);
        if !exists(&source) {
            tracing::warn!("Image {} does not exist, reference left as is", source.display());
            plan.missing.push(source);
            continue;
        }

        let filename = layout.relocated_filename(abbrlink, &source);
        let target = layout.image_path(abbrlink.as_str(), &filename);
        if !plan.copies.iter().any(|c| c.from == source) {
            plan.copies.push(CopyOp {
                from: source.clone(),
                to: target,
            });
        }
        plan.sources.push(source);
        plan.splices.push(Splice {
            span: image.span.clone(),
            replacement: image.with_path(&layout.public_url(abbrlink.as_str(), &filename)),
        });
    }
    plan
}

/// Relocate every local image of `body` into `abbrlink`'s image directory.
pub fn relocate(
    fs: &dyn FileSystem,
    body: &str,
    source_dir: &Path,
    abbrlink: &Abbrlink,
    layout: &SiteLayout,
) -> Relocation {
    let plan = plan(body, source_dir, abbrlink, layout, |p| fs.exists(p));

    let mut copied = Vec::new();
    let mut failed = Vec::new();
    for op in plan.copies {
        match copy_file(fs, &op) {
            Ok(()) => {
                tracing::info!("Copied {} -> {}", op.from.display(), op.to.display());
                copied.push(op);
            }
            Err(e) => {
                tracing::warn!("Failed to copy {}: {}", op.from.display(), e);
                failed.push((op, e.to_string()));
            }
        }
    }

    let splices: Vec<Splice> = plan
        .splices
        .into_iter()
        .zip(plan.sources)
        .filter(|(_, source)| copied.iter().any(|c: &CopyOp| &c.from == source))
        .map(|(splice, _)| splice)
        .collect();
    let image_count = splices.len();
    let rewritten = rewrite::splice(body, &splices);
    Relocation {
        body: rewritten.text,
        edits: rewritten.edits,
        image_count,
        copied,
        failed,
        missing: plan.missing,
    }
}

fn copy_file(fs: &dyn FileSystem, op: &CopyOp) -> std::io::Result<()> {
    if let Some(parent) = op.to.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.copy(&op.from, &op.to)
}
