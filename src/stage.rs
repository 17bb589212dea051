//! Staging pipeline: the `add` and `update` entry points.
//!
//! ```text
//! add (draft without header)
//!   read ──► abbrlink (override | inline line | digest of raw text)
//!        ──► markup::normalize ──► relocate::relocate
//!        ──► FrontMatter::render + body ──► <posts>/<subdir>/<file>.md
//!
//! add / update (document with header)
//!   read ──► abbrlink (override | header) ──► set_abbrlink
//!        ──► migrate (old → new) when links are being updated ──► write
//! ```
//!
//! A document that already has a header is never re-normalized or
//! re-relocated; only its `abbrlink:` line and the image links under the old
//! abbrlink change. `update` always migrates links and writes in place
//! unless given a destination directory.

use crate::abbrlink::Abbrlink;
use crate::config::FrontMatterDefaults;
use crate::frontmatter::{self, FrontMatter};
use crate::fs::FileSystem;
use crate::layout::SiteLayout;
use crate::markup;
use crate::migrate::{self, MoveReport};
use crate::relocate;
use crate::rewrite::Edit;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("{0} has no front matter to update")]
    MissingHeader(PathBuf),
    #[error("{0} has no abbrlink in its front matter")]
    MissingAbbrlink(PathBuf),
}

/// Options of `add`. Unset fields fall back to the source file and the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub source: PathBuf,
    /// Destination under the posts directory; `YYYY/MM` of the source's
    /// creation date when unset.
    pub subdir: Option<PathBuf>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub published: Option<NaiveDate>,
    pub toc: Option<bool>,
    pub lang: Option<String>,
    pub abbrlink: Option<Abbrlink>,
    pub old_abbrlink: Option<String>,
    pub update_image_links: bool,
    pub skip_formatting: bool,
}

/// Options of `update`.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub source: PathBuf,
    pub abbrlink: Option<Abbrlink>,
    pub old_abbrlink: Option<String>,
    /// Write to `<posts>/<subdir>/` instead of in place.
    pub subdir: Option<PathBuf>,
}

/// What happened to the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    Created,
    Patched { old: String },
    Kept,
}

/// Image links rewritten from one abbrlink to another, and the files moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub from: String,
    pub links: usize,
    pub moves: MoveReport,
}

/// Outcome of staging one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub abbrlink: Abbrlink,
    pub header: HeaderAction,
    pub markup_edits: Vec<Edit>,
    pub image_count: usize,
    pub missing_images: Vec<PathBuf>,
    pub failed_copies: usize,
    pub migration: Option<Migration>,
}

/// `YYYY/MM` directory for a date.
pub fn date_subdir(date: NaiveDate) -> PathBuf {
    PathBuf::from(date.format("%Y/%m").to_string())
}

/// Stage a draft into the posts directory.
pub fn add(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    defaults: &FrontMatterDefaults,
    opts: &AddOptions,
) -> Result<StageReport, StageError> {
    let content = read_source(fs, &opts.source)?;
    let subdir = match &opts.subdir {
        Some(dir) => dir.clone(),
        None => date_subdir(created_or_today(fs, &opts.source)),
    };
    let destination = destination_in(layout, &subdir, &opts.source);

    let (text, report) = if frontmatter::has_header(&content) {
        tracing::debug!("{} already has front matter", opts.source.display());
        let patch = HeaderPatch {
            abbrlink: opts.abbrlink.as_ref(),
            old_abbrlink: opts.old_abbrlink.as_deref(),
            update_links: opts.update_image_links,
        };
        patch.apply(fs, layout, &opts.source, &content, destination)?
    } else {
        create_header(fs, layout, defaults, opts, &content, destination)
    };

    write_document(fs, &report.destination, &text)?;
    tracing::info!("Staged {} -> {}", opts.source.display(), report.destination.display());
    Ok(report)
}

/// Change a staged document's abbrlink and move its images along.
pub fn update(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    opts: &UpdateOptions,
) -> Result<StageReport, StageError> {
    let content = read_source(fs, &opts.source)?;
    if !frontmatter::has_header(&content) {
        return Err(StageError::MissingHeader(opts.source.clone()));
    }
    let destination = match &opts.subdir {
        Some(dir) => destination_in(layout, dir, &opts.source),
        None => opts.source.clone(),
    };

    let patch = HeaderPatch {
        abbrlink: opts.abbrlink.as_ref(),
        old_abbrlink: opts.old_abbrlink.as_deref(),
        update_links: true,
    };
    let (text, report) = patch.apply(fs, layout, &opts.source, &content, destination)?;

    if text != content || report.destination != opts.source {
        write_document(fs, &report.destination, &text)?;
        tracing::info!("Wrote {}", report.destination.display());
    } else {
        tracing::info!("{} is already up to date", opts.source.display());
    }
    Ok(report)
}

fn read_source(fs: &dyn FileSystem, source: &Path) -> Result<String, StageError> {
    if !fs.exists(source) || fs.is_dir(source) {
        return Err(StageError::SourceNotFound(source.to_path_buf()));
    }
    Ok(fs.read_to_string(source)?)
}

fn destination_in(layout: &SiteLayout, subdir: &Path, source: &Path) -> PathBuf {
    let dir = layout.posts_dir().join(subdir);
    match source.file_name() {
        Some(name) => dir.join(name),
        None => dir,
    }
}

fn write_document(fs: &dyn FileSystem, path: &Path, text: &str) -> Result<(), StageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs.create_dir_all(parent)?;
    }
    fs.write(path, text)?;
    Ok(())
}

fn created_or_today(fs: &dyn FileSystem, path: &Path) -> NaiveDate {
    fs.created(path).unwrap_or_else(|e| {
        tracing::debug!("No creation date for {} ({}), using today", path.display(), e);
        Local::now().date_naive()
    })
}

fn create_header(
    fs: &dyn FileSystem,
    layout: &SiteLayout,
    defaults: &FrontMatterDefaults,
    opts: &AddOptions,
    content: &str,
    destination: PathBuf,
) -> (String, StageReport) {
    let abbrlink = opts
        .abbrlink
        .clone()
        .or_else(|| frontmatter::inline_abbrlink(content))
        .unwrap_or_else(|| Abbrlink::generate(content));

    let normalized = markup::normalize(content, opts.skip_formatting);
    if !normalized.edits.is_empty() {
        tracing::info!("Normalized {} markup span(s)", normalized.edits.len());
    }

    let source_dir = opts.source.parent().unwrap_or(Path::new(""));
    let relocated = relocate::relocate(fs, &normalized.text, source_dir, &abbrlink, layout);
    if relocated.image_count > 0 {
        tracing::info!("Processed {} local image(s)", relocated.image_count);
    }

    let title = opts
        .title
        .clone()
        .or_else(|| frontmatter::first_heading(&relocated.body))
        .unwrap_or_else(|| file_stem(&opts.source));
    let published = opts
        .published
        .unwrap_or_else(|| created_or_today(fs, &opts.source));
    let updated = fs.modified(&opts.source).unwrap_or_else(|e| {
        tracing::debug!("No modification date for {} ({}), using today", opts.source.display(), e);
        Local::now().date_naive()
    });
    let tags: Vec<String> = opts
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    let header = FrontMatter {
        title,
        published,
        updated,
        tags: if tags.is_empty() { defaults.tags.clone() } else { tags },
        toc: opts.toc.unwrap_or(defaults.toc),
        lang: opts.lang.clone().unwrap_or_else(|| defaults.lang.clone()),
        abbrlink: abbrlink.clone(),
    };
    let text = format!("{}{}", header.render(), relocated.body);

    let report = StageReport {
        source: opts.source.clone(),
        destination,
        abbrlink,
        header: HeaderAction::Created,
        markup_edits: normalized.edits,
        image_count: relocated.image_count,
        missing_images: relocated.missing,
        failed_copies: relocated.failed.len(),
        migration: None,
    };
    (text, report)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Header-present path shared by `add` and `update`.
struct HeaderPatch<'a> {
    abbrlink: Option<&'a Abbrlink>,
    old_abbrlink: Option<&'a str>,
    update_links: bool,
}

impl HeaderPatch<'_> {
    fn apply(
        &self,
        fs: &dyn FileSystem,
        layout: &SiteLayout,
        source: &Path,
        content: &str,
        destination: PathBuf,
    ) -> Result<(String, StageReport), StageError> {
        let existing = frontmatter::header_abbrlink(content)
            .ok_or_else(|| StageError::MissingAbbrlink(source.to_path_buf()))?
            .to_string();
        let abbrlink = match self.abbrlink {
            Some(a) => a.clone(),
            None => Abbrlink::new(&existing)
                .map_err(|_| StageError::MissingAbbrlink(source.to_path_buf()))?,
        };

        let mut text = content.to_string();
        let mut header = HeaderAction::Kept;
        if existing != abbrlink.as_str() {
            text = frontmatter::set_abbrlink(&text, &existing, &abbrlink).text;
            tracing::info!("Updated front matter abbrlink: {} -> {}", existing, abbrlink);
            header = HeaderAction::Patched {
                old: existing.clone(),
            };
        }

        let mut migration = None;
        if self.update_links {
            let old = self.old_abbrlink.unwrap_or(&existing);
            if old != abbrlink.as_str() {
                let (rewrite, moves) = migrate::migrate(fs, layout, &text, old, &abbrlink);
                migration = Some(Migration {
                    from: old.to_string(),
                    links: rewrite.edits.len(),
                    moves,
                });
                text = rewrite.text;
            }
        }

        let report = StageReport {
            source: source.to_path_buf(),
            destination,
            abbrlink,
            header,
            markup_edits: Vec::new(),
            image_count: 0,
            missing_images: Vec::new(),
            failed_copies: 0,
            migration,
        };
        Ok((text, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abbrlink::digest8;
    use crate::fs::tests::{MemoryFs, date};
    use crate::test_helpers::{assert_header_field, blog_layout, post};

    fn ab(s: &str) -> Abbrlink {
        Abbrlink::new(s).unwrap()
    }

    fn add_opts(source: &str) -> AddOptions {
        AddOptions {
            source: PathBuf::from(source),
            ..AddOptions::default()
        }
    }

    // =========================================================================
    // add: drafts without a header
    // =========================================================================

    #[test]
    fn add_creates_header_from_draft() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let raw = "# My Title\n\nHello.\n";
        fs.add_file_dated("/drafts/my-post.md", raw, date("2024-05-02"), date("2024-05-03"));

        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/drafts/my-post.md"))
            .unwrap();

        let expected_dest = layout.posts_dir().join("2024/05/my-post.md");
        assert_eq!(report.destination, expected_dest);
        assert_eq!(report.header, HeaderAction::Created);
        assert_eq!(report.abbrlink, Abbrlink::generate(raw));

        let written = fs.contents(&expected_dest).unwrap();
        let id = report.abbrlink.as_str();
        assert_eq!(
            written,
            format!(
                "---\ntitle: My Title\npublished: 2024-05-02\nupdated: 2024-05-03\n\
                 tags:\n  - 未分类\ntoc: true\nlang: zh\nabbrlink: {id}\n---\n\n{raw}"
            )
        );
    }

    #[test]
    fn add_normalizes_markup_and_relocates_images() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/drafts/post.md", "==hi== ![alt](./img.png)\n");
        fs.add_file("/drafts/img.png", b"PNG");

        let opts = AddOptions {
            subdir: Some(PathBuf::from("notes")),
            ..add_opts("/drafts/post.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();

        let id = report.abbrlink.as_str().to_string();
        let image = format!("{id}-{}.png", digest8(b"img"));
        let written = fs.contents(layout.posts_dir().join("notes/post.md")).unwrap();
        assert!(written.ends_with(&format!(
            "<mark>hi</mark> ![alt](/src/assets/images/posts/{id}/{image})\n"
        )));
        assert_eq!(report.markup_edits.len(), 1);
        assert_eq!(report.image_count, 1);
        assert!(fs.has_file(layout.image_path(&id, &image)));
    }

    #[test]
    fn add_skip_formatting_keeps_delimiters() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "==hi==\n");
        let opts = AddOptions {
            skip_formatting: true,
            ..add_opts("/d/p.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();
        let written = fs.contents(&report.destination).unwrap();
        assert!(written.ends_with("\n==hi==\n"));
        assert!(report.markup_edits.is_empty());
    }

    #[test]
    fn add_applies_overrides() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "# Heading\n");
        let opts = AddOptions {
            subdir: Some(PathBuf::from("x")),
            tags: vec!["rust".into(), " ".into(), "cli".into()],
            title: Some("Custom: Title".into()),
            published: Some(date("2023-12-31")),
            toc: Some(false),
            lang: Some("en".into()),
            abbrlink: Some(ab("custom01")),
            ..add_opts("/d/p.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();
        let written = fs.contents(&report.destination).unwrap();

        assert_header_field(&written, "title", "Custom: Title");
        assert_header_field(&written, "published", "2023-12-31");
        assert_header_field(&written, "toc", "false");
        assert_header_field(&written, "lang", "en");
        assert_header_field(&written, "abbrlink", "custom01");
        assert!(written.contains("tags:\n  - rust\n  - cli\n"));
    }

    #[test]
    fn add_uses_configured_defaults() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "text\n");
        let defaults = FrontMatterDefaults {
            tags: vec!["misc".into()],
            lang: "en".into(),
            toc: false,
        };
        let report = add(&fs, &layout, &defaults, &add_opts("/d/p.md")).unwrap();
        let written = fs.contents(&report.destination).unwrap();
        assert!(written.contains("tags:\n  - misc\n"));
        assert_header_field(&written, "lang", "en");
        assert_header_field(&written, "toc", "false");
    }

    #[test]
    fn add_title_falls_back_to_file_stem() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/no-heading.md", "## only h2\n");
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/d/no-heading.md"))
            .unwrap();
        assert_header_field(&fs.contents(&report.destination).unwrap(), "title", "no-heading");
    }

    #[test]
    fn add_reuses_inline_abbrlink_line() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "abbrlink: keep1234\n\n# T\n");
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/d/p.md")).unwrap();
        assert_eq!(report.abbrlink, ab("keep1234"));
    }

    #[test]
    fn add_missing_source_is_fatal() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let err = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/nope.md")).unwrap_err();
        assert!(matches!(err, StageError::SourceNotFound(_)));
        assert!(fs.file_paths().is_empty());
    }

    #[test]
    fn add_reports_missing_images() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "![x](./gone.png)\n");
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/d/p.md")).unwrap();
        assert_eq!(report.missing_images, vec![PathBuf::from("/d/gone.png")]);
        assert!(fs.contents(&report.destination).unwrap().ends_with("![x](./gone.png)\n"));
    }

    // =========================================================================
    // add: documents with a header
    // =========================================================================

    #[test]
    fn add_copies_headed_document_without_reprocessing() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let content = post("abc12345", "==kept== ![x](./img.png)\n");
        fs.add_file("/d/p.md", &content);
        fs.add_file("/d/img.png", b"PNG");

        let opts = AddOptions {
            subdir: Some(PathBuf::from("2024/01")),
            ..add_opts("/d/p.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();

        assert_eq!(report.header, HeaderAction::Kept);
        assert_eq!(fs.contents(&report.destination).unwrap(), content);
        assert!(!fs.has_dir(layout.image_dir("abc12345")));
    }

    #[test]
    fn add_with_new_abbrlink_patches_header() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", post("abc12345", "![x](/src/assets/images/posts/abc12345/x.png)\n"));

        let opts = AddOptions {
            abbrlink: Some(ab("new00001")),
            ..add_opts("/d/p.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();

        assert_eq!(
            report.header,
            HeaderAction::Patched {
                old: "abc12345".into()
            }
        );
        let written = fs.contents(&report.destination).unwrap();
        assert_header_field(&written, "abbrlink", "new00001");
        assert!(written.contains("/posts/abc12345/x.png"), "links untouched without migration");
        assert!(report.migration.is_none());
    }

    #[test]
    fn add_with_old_and_new_abbrlink_migrates_images() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file(
            "/d/p.md",
            post("abc12345", "![x](/src/assets/images/posts/abc12345/abc12345-x.png)\n"),
        );
        fs.add_file(layout.image_path("abc12345", "abc12345-x.png"), b"X");

        let opts = AddOptions {
            abbrlink: Some(ab("new00001")),
            old_abbrlink: Some("abc12345".into()),
            update_image_links: true,
            ..add_opts("/d/p.md")
        };
        let report = add(&fs, &layout, &FrontMatterDefaults::default(), &opts).unwrap();

        let migration = report.migration.unwrap();
        assert_eq!(migration.from, "abc12345");
        assert_eq!(migration.links, 1);
        let written = fs.contents(&report.destination).unwrap();
        assert!(written.contains("/src/assets/images/posts/new00001/new00001-x.png"));
        assert!(fs.has_file(layout.image_path("new00001", "new00001-x.png")));
    }

    #[test]
    fn add_headed_document_without_abbrlink_fails() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "---\ntitle: x\n---\n\nbody\n");
        let err = add(&fs, &layout, &FrontMatterDefaults::default(), &add_opts("/d/p.md")).unwrap_err();
        assert!(matches!(err, StageError::MissingAbbrlink(_)));
    }

    // =========================================================================
    // update
    // =========================================================================

    #[test]
    fn update_rewrites_in_place_and_moves_directory() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let doc = layout.posts_dir().join("2024/01/p.md");
        fs.add_file(
            &doc,
            post(
                "aaaa1111",
                "![a](/src/assets/images/posts/aaaa1111/aaaa1111-a.png)\n\
                 <img src=\"/src/assets/images/posts/aaaa1111/cover.png\">\n",
            ),
        );
        fs.add_file(layout.image_path("aaaa1111", "aaaa1111-a.png"), b"A");
        fs.add_file(layout.image_path("aaaa1111", "cover.png"), b"C");

        let opts = UpdateOptions {
            source: doc.clone(),
            abbrlink: Some(ab("bbbb2222")),
            ..UpdateOptions::default()
        };
        let report = update(&fs, &layout, &opts).unwrap();

        assert_eq!(report.destination, doc);
        let written = fs.contents(&doc).unwrap();
        assert_header_field(&written, "abbrlink", "bbbb2222");
        assert!(written.contains("/posts/bbbb2222/bbbb2222-a.png"));
        assert!(written.contains("/posts/bbbb2222/cover.png"));
        assert!(!written.contains("aaaa1111"));
        assert!(fs.has_file(layout.image_path("bbbb2222", "bbbb2222-a.png")));
        assert!(fs.has_file(layout.image_path("bbbb2222", "cover.png")));
        assert!(!fs.has_dir(layout.image_dir("aaaa1111")));
    }

    #[test]
    fn update_with_explicit_old_abbrlink() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        // Header already edited by hand; links still point at the old id.
        let doc = layout.posts_dir().join("p.md");
        fs.add_file(&doc, post("bbbb2222", "![a](/src/assets/images/posts/aaaa1111/a.png)\n"));
        fs.add_file(layout.image_path("aaaa1111", "a.png"), b"A");

        let opts = UpdateOptions {
            source: doc.clone(),
            old_abbrlink: Some("aaaa1111".into()),
            ..UpdateOptions::default()
        };
        let report = update(&fs, &layout, &opts).unwrap();

        assert_eq!(report.header, HeaderAction::Kept);
        assert_eq!(report.migration.as_ref().map(|m| m.links), Some(1));
        assert!(fs.contents(&doc).unwrap().contains("/posts/bbbb2222/a.png"));
        assert!(fs.has_file(layout.image_path("bbbb2222", "a.png")));
    }

    #[test]
    fn update_to_destination_dir_leaves_source() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let content = post("aaaa1111", "text\n");
        fs.add_file("/d/p.md", &content);

        let opts = UpdateOptions {
            source: PathBuf::from("/d/p.md"),
            abbrlink: Some(ab("bbbb2222")),
            subdir: Some(PathBuf::from("2024/02")),
            ..UpdateOptions::default()
        };
        let report = update(&fs, &layout, &opts).unwrap();

        assert_eq!(report.destination, layout.posts_dir().join("2024/02/p.md"));
        assert_eq!(fs.contents("/d/p.md").unwrap(), content);
        assert_header_field(&fs.contents(&report.destination).unwrap(), "abbrlink", "bbbb2222");
    }

    #[test]
    fn update_without_header_fails() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        fs.add_file("/d/p.md", "# draft\n");
        let opts = UpdateOptions {
            source: PathBuf::from("/d/p.md"),
            abbrlink: Some(ab("x")),
            ..UpdateOptions::default()
        };
        assert!(matches!(
            update(&fs, &layout, &opts).unwrap_err(),
            StageError::MissingHeader(_)
        ));
    }

    #[test]
    fn update_same_abbrlink_changes_nothing() {
        let fs = MemoryFs::new();
        let layout = blog_layout();
        let doc = layout.posts_dir().join("p.md");
        fs.add_file_dated(&doc, post("aaaa1111", "text\n"), date("2024-01-01"), date("2024-01-02"));

        let opts = UpdateOptions {
            source: doc.clone(),
            ..UpdateOptions::default()
        };
        let report = update(&fs, &layout, &opts).unwrap();

        assert_eq!(report.header, HeaderAction::Kept);
        assert!(report.migration.is_none());
        assert_eq!(fs.modified(&doc).unwrap(), date("2024-01-02"), "not rewritten");
    }

    #[test]
    fn date_subdir_is_year_and_month() {
        assert_eq!(date_subdir(date("2024-05-09")), PathBuf::from("2024/05"));
    }
}
