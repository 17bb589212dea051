//! Orphan image collection.
//!
//! An image under `<images>/posts/` is an orphan when no staged post
//! references it. Collection is split the same way as relocation:
//!
//! ```text
//! plan()   corpus refs ──► referenced set ─┐
//!          images/posts/** ──► image set ──┴─► unreferenced (set difference)
//! apply()  confirm ──► delete each ──► prune empty directories
//! ```
//!
//! A local reference protects a file when its path contains the public
//! post-image segment anywhere (`/src/assets/images/posts/...` as well as
//! `./src/assets/images/posts/...`). It is resolved by dropping the leading
//! `/`, joining the blog root and normalizing. A reference that lacks the
//! segment entirely (a path relative to the post, a CDN URL) does not keep an
//! image alive.

use crate::frontmatter;
use crate::fs::{self, FileSystem};
use crate::layout::SiteLayout;
use crate::prompt::Confirm;
use crate::refs;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    /// Posts that were read.
    pub documents: usize,
    /// Disk paths of every referenced post image.
    pub referenced: BTreeSet<PathBuf>,
    /// Every file under the post images root.
    pub images: BTreeSet<PathBuf>,
    /// `images - referenced`, sorted.
    pub unreferenced: Vec<PathBuf>,
}

/// Files in `images` that aren't in `referenced`.
pub fn find_unreferenced(
    images: &BTreeSet<PathBuf>,
    referenced: &BTreeSet<PathBuf>,
) -> Vec<PathBuf> {
    images.difference(referenced).cloned().collect()
}

/// Disk paths of the post images referenced by one document.
pub fn referenced_images(content: &str, layout: &SiteLayout) -> Vec<PathBuf> {
    let segment = format!("{}/", layout.public_prefix());
    let body = frontmatter::body(content);
    refs::scan(body)
        .into_iter()
        .filter(|image| refs::is_local(image.path) && image.path.contains(&segment))
        .map(|image| layout.resolve_public(image.path))
        .collect()
}

/// Collect references and images and compute the orphans.
///
/// A missing images root yields an empty plan; a missing posts directory
/// leaves every image unreferenced.
pub fn plan(fs: &dyn FileSystem, layout: &SiteLayout) -> Result<CleanupPlan, CleanupError> {
    let mut plan = CleanupPlan::default();
    if !fs.is_dir(layout.post_images_dir()) {
        tracing::info!(
            "No image directory at {}, nothing to clean",
            layout.post_images_dir().display()
        );
        return Ok(plan);
    }

    if fs.is_dir(layout.posts_dir()) {
        for path in fs::markdown_files(fs, layout.posts_dir())? {
            match fs.read_to_string(&path) {
                Ok(content) => {
                    plan.documents += 1;
                    plan.referenced.extend(referenced_images(&content, layout));
                }
                Err(e) => tracing::warn!("Cannot read {}: {}", path.display(), e),
            }
        }
    }
    tracing::debug!(
        "{} post(s) reference {} image(s)",
        plan.documents,
        plan.referenced.len()
    );

    plan.images = fs.walk_files(layout.post_images_dir())?.into_iter().collect();
    plan.unreferenced = find_unreferenced(&plan.images, &plan.referenced);
    Ok(plan)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// The deletion was declined at the prompt.
    pub declined: bool,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub pruned_dirs: Vec<PathBuf>,
}

/// Delete the plan's orphans, then prune directories left empty.
///
/// Asks once for the whole batch; the caller shows the list beforehand.
pub fn apply(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    plan: &CleanupPlan,
    confirm: &mut dyn Confirm,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    if plan.unreferenced.is_empty() {
        return report;
    }
    let question = format!("Delete {} unreferenced image(s)?", plan.unreferenced.len());
    if !confirm.confirm(&question) {
        tracing::info!("Cleanup cancelled");
        report.declined = true;
        return report;
    }

    for path in &plan.unreferenced {
        match fs.remove_file(path) {
            Ok(()) => {
                tracing::info!("Deleted {}", path.display());
                report.deleted.push(path.clone());
            }
            Err(e) => {
                tracing::warn!("Failed to delete {}: {}", path.display(), e);
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }
    report.pruned_dirs = fs::prune_empty_dirs(fs, layout.post_images_dir());
    report
}
