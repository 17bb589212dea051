//! Image reference scanning.
//!
//! Two syntaxes are recognized in a document body:
//!
//! - Markdown: `![alt text](path/to/image.png)`
//! - HTML: `<img src="path/to/image.png" alt="..." width="300">`
//!
//! [`scan`] returns every occurrence with byte spans into the body, so
//! callers can build [`Splice`](crate::rewrite::Splice)s without re-searching
//! the text. External URLs (`http://`, `https://`) and `data:` payloads are
//! reported too; use [`is_local`] to filter them.
//!
//! Images already staged live under the layout's public prefix
//! (`/src/assets/images/posts/<abbrlink>/<file>`). [`posted_path`] splits
//! such a path into its abbrlink segment and filename.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\(([^)]+)\)").expect("valid markdown image pattern"));

static HTML_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\s+(?:[^>]*?\s)?src=["']([^"']+)["'][^>]*?>"#)
        .expect("valid html image pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSyntax {
    Markdown,
    Html,
}

/// One image reference found in a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub syntax: RefSyntax,
    /// Span of the whole reference (`![..](..)` or `<img ...>`).
    pub span: Range<usize>,
    /// Span of the path alone.
    pub path_span: Range<usize>,
    /// The full matched text.
    pub text: &'a str,
    /// The referenced path or URL.
    pub path: &'a str,
}

impl ImageRef<'_> {
    /// The reference text with its path swapped for `new_path`.
    ///
    /// Markdown alt text and every other HTML attribute are preserved.
    pub fn with_path(&self, new_path: &str) -> String {
        let start = self.path_span.start - self.span.start;
        let end = self.path_span.end - self.span.start;
        format!("{}{}{}", &self.text[..start], new_path, &self.text[end..])
    }
}

/// Find every image reference in `body`, ordered by position.
pub fn scan(body: &str) -> Vec<ImageRef<'_>> {
    let mut refs = Vec::new();
    for caps in MARKDOWN_IMAGE.captures_iter(body) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        refs.push(ImageRef {
            syntax: RefSyntax::Markdown,
            span: whole.range(),
            path_span: path.range(),
            text: whole.as_str(),
            path: path.as_str(),
        });
    }
    for caps in HTML_IMAGE.captures_iter(body) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        refs.push(ImageRef {
            syntax: RefSyntax::Html,
            span: whole.range(),
            path_span: path.range(),
            text: whole.as_str(),
            path: path.as_str(),
        });
    }
    refs.sort_by_key(|r| r.span.start);
    refs
}

/// Whether a reference points at a local file (not a URL or inline data).
pub fn is_local(path: &str) -> bool {
    !(path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:"))
}

/// A path under the public per-post image prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedPath<'a> {
    pub abbrlink: &'a str,
    pub filename: &'a str,
}

/// Split `<prefix>/<abbrlink>/<filename>` into its parts.
///
/// Returns `None` if `path` is not under `prefix` or lacks either segment.
/// The filename may itself contain further slashes.
pub fn posted_path<'a>(path: &'a str, prefix: &str) -> Option<PostedPath<'a>> {
    let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
    let (abbrlink, filename) = rest.split_once('/')?;
    if abbrlink.is_empty() || filename.is_empty() {
        return None;
    }
    Some(PostedPath { abbrlink, filename })
}
