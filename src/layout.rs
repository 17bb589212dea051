//! Blog directory layout.
//!
//! ```text
//! <root>/
//! ├── stager.toml
//! ├── src/content/posts/            # posts_dir: staged documents
//! │   └── 2024/05/my-post.md
//! └── src/assets/images/            # images_dir
//!     └── posts/
//!         └── 1a2b3c4d/             # one directory per abbrlink
//!             └── 1a2b3c4d-9f86d081.png
//! ```
//!
//! Documents reference their images by public URL, which is the image path
//! relative to the site root with a leading slash:
//! `/src/assets/images/posts/1a2b3c4d/1a2b3c4d-9f86d081.png`.

use crate::abbrlink::Abbrlink;
use crate::config::StagerConfig;
use std::path::{Component, Path, PathBuf};

/// Name of the per-post subdirectory under the images directory.
pub const POSTS_SEGMENT: &str = "posts";

/// Resolved paths for one blog checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    root: PathBuf,
    posts_dir: PathBuf,
    post_images_dir: PathBuf,
    public_prefix: String,
}

impl SiteLayout {
    pub fn new(root: &Path, config: &StagerConfig) -> Self {
        let images_rel = config.images_dir.trim_matches('/');
        Self {
            root: root.to_path_buf(),
            posts_dir: normalize_path(&root.join(&config.posts_dir)),
            post_images_dir: normalize_path(&root.join(images_rel).join(POSTS_SEGMENT)),
            public_prefix: format!("/{images_rel}/{POSTS_SEGMENT}"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all staged documents.
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Directory holding one subdirectory of images per abbrlink.
    pub fn post_images_dir(&self) -> &Path {
        &self.post_images_dir
    }

    /// Public URL prefix of per-post images, without trailing slash.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Image directory for a post identifier.
    pub fn image_dir(&self, abbrlink: &str) -> PathBuf {
        self.post_images_dir.join(abbrlink)
    }

    /// Disk path of one image of a post.
    pub fn image_path(&self, abbrlink: &str, filename: &str) -> PathBuf {
        self.image_dir(abbrlink).join(filename)
    }

    /// Public URL of one image of a post.
    pub fn public_url(&self, abbrlink: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.public_prefix, abbrlink, filename)
    }

    /// Canonical filename for an image relocated into `abbrlink`'s directory.
    ///
    /// `<abbrlink>-<digest8(original stem)><original extension>`. Only the
    /// basename is hashed, so the same file name from two different drafts of
    /// one post maps to the same target.
    pub fn relocated_filename(&self, abbrlink: &Abbrlink, original: &Path) -> String {
        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = original
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        format!(
            "{}-{}{}",
            abbrlink,
            crate::abbrlink::digest8(stem.as_bytes()),
            ext
        )
    }

    /// Map a public image URL back to its location on disk.
    pub fn resolve_public(&self, url: &str) -> PathBuf {
        normalize_path(&self.root.join(url.trim_start_matches('/')))
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SiteLayout {
        SiteLayout::new(Path::new("/blog"), &StagerConfig::default())
    }

    #[test]
    fn default_layout_paths() {
        let l = layout();
        assert_eq!(l.posts_dir(), Path::new("/blog/src/content/posts"));
        assert_eq!(
            l.post_images_dir(),
            Path::new("/blog/src/assets/images/posts")
        );
        assert_eq!(l.public_prefix(), "/src/assets/images/posts");
    }

    #[test]
    fn image_locations_for_abbrlink() {
        let l = layout();
        assert_eq!(
            l.image_path("1a2b3c4d", "x.png"),
            Path::new("/blog/src/assets/images/posts/1a2b3c4d/x.png")
        );
        assert_eq!(
            l.public_url("1a2b3c4d", "x.png"),
            "/src/assets/images/posts/1a2b3c4d/x.png"
        );
    }

    #[test]
    fn relocated_filename_hashes_stem_and_keeps_extension() {
        let l = layout();
        let link = Abbrlink::new("1a2b3c4d").unwrap();
        let name = l.relocated_filename(&link, Path::new("/drafts/img/diagram.png"));
        let expected = format!("1a2b3c4d-{}.png", crate::abbrlink::digest8(b"diagram"));
        assert_eq!(name, expected);
    }

    #[test]
    fn relocated_filename_without_extension() {
        let l = layout();
        let link = Abbrlink::new("abc").unwrap();
        let name = l.relocated_filename(&link, Path::new("/drafts/raw"));
        assert_eq!(name, format!("abc-{}", crate::abbrlink::digest8(b"raw")));
    }

    #[test]
    fn resolve_public_maps_back_under_root() {
        let l = layout();
        assert_eq!(
            l.resolve_public("/src/assets/images/posts/abc/x.png"),
            Path::new("/blog/src/assets/images/posts/abc/x.png")
        );
    }

    #[test]
    fn custom_images_dir_changes_prefix() {
        let config = StagerConfig {
            images_dir: "/static/img/".into(),
            ..StagerConfig::default()
        };
        let l = SiteLayout::new(Path::new("/site"), &config);
        assert_eq!(l.public_prefix(), "/static/img/posts");
        assert_eq!(l.post_images_dir(), Path::new("/site/static/img/posts"));
    }

    #[test]
    fn normalize_path_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }
}
