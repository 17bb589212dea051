//! Abbrlink migration.
//!
//! Changing a post's abbrlink means three things move together:
//!
//! - the `abbrlink:` header line (see [`frontmatter::set_abbrlink`](crate::frontmatter::set_abbrlink)),
//! - every image reference under `<prefix>/<old>/` in the body ([`rewrite_links`]),
//! - the image directory itself ([`move_image_dir`]).
//!
//! Files inside the directory whose names start with the old abbrlink are
//! renamed to start with the new one, so a relocated image keeps the
//! `<abbrlink>-<digest>` naming of its current post. [`rewrite_links`]
//! deliberately renames the filename part of each reference the same way
//! instead of keeping it verbatim; a reference that kept the old name would
//! point at a file that no longer exists. Names without the old prefix are
//! kept as they are. Migrating A→B and then B→A restores the original text
//! and file locations.
//!
//! All moves are copy-then-delete. A failing file is logged and skipped; the
//! old directory is only removed once it is empty.

use crate::abbrlink::Abbrlink;
use crate::fs::FileSystem;
use crate::layout::SiteLayout;
use crate::refs;
use crate::rewrite::{self, Rewrite, Splice};
use std::path::{Path, PathBuf};

/// Filename after moving from `old` to `new`: an `old` prefix becomes `new`.
pub fn renamed_filename(filename: &str, old: &str, new: &str) -> String {
    match filename.strip_prefix(old) {
        Some(rest) => format!("{new}{rest}"),
        None => filename.to_string(),
    }
}

/// Rewrite every image reference under `old`'s directory to `new`'s.
pub fn rewrite_links(body: &str, old: &str, new: &Abbrlink, layout: &SiteLayout) -> Rewrite {
    if old == new.as_str() {
        return Rewrite::unchanged(body);
    }
    let splices: Vec<Splice> = refs::scan(body)
        .into_iter()
        .filter_map(|image| {
            let posted = refs::posted_path(image.path, layout.public_prefix())?;
            if posted.abbrlink != old {
                return None;
            }
            let filename = renamed_filename(posted.filename, old, new.as_str());
            Some(Splice {
                span: image.span.clone(),
                replacement: image.with_path(&layout.public_url(new.as_str(), &filename)),
            })
        })
        .collect();
    rewrite::splice(body, &splices)
}

/// Outcome of moving image files between abbrlink directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<(PathBuf, String)>,
    /// The old directory was absent; nothing was done.
    pub source_missing: bool,
    /// The old directory was removed after the move.
    pub removed_dir: bool,
}

fn move_file(fs: &dyn FileSystem, from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.copy(from, to)?;
    fs.remove_file(from)
}

/// Move the whole image directory of `old` into `new`'s, renaming
/// `old`-prefixed files.
pub fn move_image_dir(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    old: &str,
    new: &Abbrlink,
) -> MoveReport {
    let mut report = MoveReport::default();
    let old_dir = layout.image_dir(old);
    let new_dir = layout.image_dir(new.as_str());
    if old == new.as_str() {
        return report;
    }
    if !fs.is_dir(&old_dir) {
        tracing::info!("No image directory at {}, nothing to move", old_dir.display());
        report.source_missing = true;
        return report;
    }

    let entries = match fs.read_dir(&old_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", old_dir.display(), e);
            report.failed.push((old_dir, e.to_string()));
            return report;
        }
    };
    for from in entries.into_iter().filter(|p| !fs.is_dir(p)) {
        let Some(name) = from.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let to = new_dir.join(renamed_filename(&name, old, new.as_str()));
        match move_file(fs, &from, &to) {
            Ok(()) => {
                tracing::info!("Moved {} -> {}", from.display(), to.display());
                report.moved.push((from, to));
            }
            Err(e) => {
                tracing::warn!("Failed to move {}: {}", from.display(), e);
                report.failed.push((from, e.to_string()));
            }
        }
    }

    match fs.read_dir(&old_dir) {
        Ok(rest) if rest.is_empty() => match fs.remove_dir(&old_dir) {
            Ok(()) => {
                tracing::info!("Removed empty directory {}", old_dir.display());
                report.removed_dir = true;
            }
            Err(e) => tracing::warn!("Cannot remove {}: {}", old_dir.display(), e),
        },
        Ok(_) => {}
        Err(e) => tracing::warn!("Cannot list {}: {}", old_dir.display(), e),
    }
    report
}

/// Move a single image from `old`'s directory into `new`'s, keeping its name.
pub fn move_image_file(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    old: &str,
    new: &Abbrlink,
    filename: &str,
) -> MoveReport {
    let mut report = MoveReport::default();
    let from = layout.image_path(old, filename);
    let to = layout.image_path(new.as_str(), filename);
    if from == to {
        return report;
    }
    if !fs.exists(&from) {
        tracing::warn!("Image {} does not exist", from.display());
        report.source_missing = true;
        return report;
    }
    match move_file(fs, &from, &to) {
        Ok(()) => {
            tracing::info!("Moved {} -> {}", from.display(), to.display());
            report.moved.push((from, to));
        }
        Err(e) => {
            tracing::warn!("Failed to move {}: {}", from.display(), e);
            report.failed.push((from, e.to_string()));
        }
    }
    report
}

/// Migrate a document body and its image directory from `old` to `new`.
pub fn migrate(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    body: &str,
    old: &str,
    new: &Abbrlink,
) -> (Rewrite, MoveReport) {
    let rewrite = rewrite_links(body, old, new, layout);
    if rewrite.is_changed() {
        tracing::info!("Updated {} image link(s): {} -> {}", rewrite.edits.len(), old, new);
    } else {
        tracing::info!("No image links under {} to update", old);
    }
    let report = move_image_dir(fs, layout, old, new);
    (rewrite, report)
}
