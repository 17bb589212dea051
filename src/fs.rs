//! Filesystem access behind a trait.
//!
//! Every side effect the stager performs (reading drafts, writing posts,
//! copying and deleting images, walking the corpus, pruning directories) goes
//! through [`FileSystem`]. The production implementation is [`RealFs`]; the
//! test suite uses an in-memory fake (`MemoryFs`) so checker, migration and
//! cleanup behavior can be exercised without touching disk.
//!
//! Timestamps are exposed as calendar dates in local time, which is the only
//! resolution the front matter records.

use chrono::{DateTime, Local, NaiveDate};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `contents` to `path`. The parent directory must exist.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy a file, overwriting `to` if present. The parent of `to` must exist.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Immediate children of a directory, sorted by path.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Creation date of a file (local time).
    fn created(&self, path: &Path) -> io::Result<NaiveDate>;

    /// Last modification date of a file (local time).
    fn modified(&self, path: &Path) -> io::Result<NaiveDate>;

    /// Every regular file below `root`, recursively, sorted by path.
    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for child in self.read_dir(&dir)? {
                if self.is_dir(&child) {
                    pending.push(child);
                } else {
                    files.push(child);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Every Markdown document below `root`, sorted by path.
pub fn markdown_files(fs: &dyn FileSystem, root: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(fs
        .walk_files(root)?
        .into_iter()
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("md"))
                .unwrap_or(false)
        })
        .collect())
}

/// Remove every empty directory below `root`, deepest first.
///
/// A directory that only contained empty directories is removed too. `root`
/// itself is kept. Failures are logged and skipped; the removed directories
/// are returned.
pub fn prune_empty_dirs(fs: &dyn FileSystem, root: &Path) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    prune_recursive(fs, root, &mut removed);
    removed
}

fn prune_recursive(fs: &dyn FileSystem, dir: &Path, removed: &mut Vec<PathBuf>) {
    let children = match fs.read_dir(dir) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", dir.display(), e);
            return;
        }
    };
    for child in children.into_iter().filter(|c| fs.is_dir(c)) {
        prune_recursive(fs, &child, removed);
        match fs.read_dir(&child) {
            Ok(rest) if rest.is_empty() => match fs.remove_dir(&child) {
                Ok(()) => {
                    tracing::info!("Removed empty directory {}", child.display());
                    removed.push(child);
                }
                Err(e) => tracing::warn!("Cannot remove {}: {}", child.display(), e),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!("Cannot list {}: {}", child.display(), e),
        }
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

fn local_date(time: std::time::SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|e| e.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn created(&self, path: &Path) -> io::Result<NaiveDate> {
        std::fs::metadata(path)?.created().map(local_date)
    }

    fn modified(&self, path: &Path) -> io::Result<NaiveDate> {
        std::fs::metadata(path)?.modified().map(local_date)
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct MemFile {
        contents: Vec<u8>,
        created: NaiveDate,
        modified: NaiveDate,
    }

    #[derive(Debug, Default)]
    struct Tree {
        files: BTreeMap<PathBuf, MemFile>,
        dirs: BTreeSet<PathBuf>,
    }

    /// In-memory directory model. Paths are compared lexically.
    ///
    /// Behaves like a strict real filesystem: writing or copying into a
    /// missing directory fails, and removing a non-empty directory fails.
    #[derive(Debug, Default)]
    pub struct MemoryFs {
        tree: Mutex<Tree>,
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
    }

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    impl MemoryFs {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file, creating its ancestors. Dated 2024-01-01.
        pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
            self.add_file_dated(path, contents, date("2024-01-01"), date("2024-01-01"));
        }

        pub fn add_file_dated(
            &self,
            path: impl AsRef<Path>,
            contents: impl AsRef<[u8]>,
            created: NaiveDate,
            modified: NaiveDate,
        ) {
            let path = path.as_ref();
            let mut tree = self.tree.lock().unwrap();
            if let Some(parent) = path.parent() {
                add_ancestors(&mut tree.dirs, parent);
            }
            tree.files.insert(
                path.to_path_buf(),
                MemFile {
                    contents: contents.as_ref().to_vec(),
                    created,
                    modified,
                },
            );
        }

        pub fn add_dir(&self, path: impl AsRef<Path>) {
            add_ancestors(&mut self.tree.lock().unwrap().dirs, path.as_ref());
        }

        pub fn set_modified(&self, path: impl AsRef<Path>, modified: NaiveDate) {
            if let Some(f) = self.tree.lock().unwrap().files.get_mut(path.as_ref()) {
                f.modified = modified;
            }
        }

        pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
            self.tree
                .lock()
                .unwrap()
                .files
                .get(path.as_ref())
                .map(|f| String::from_utf8_lossy(&f.contents).to_string())
        }

        pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
            self.tree.lock().unwrap().files.contains_key(path.as_ref())
        }

        pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
            self.tree.lock().unwrap().dirs.contains(path.as_ref())
        }

        /// All file paths, sorted.
        pub fn file_paths(&self) -> Vec<PathBuf> {
            self.tree.lock().unwrap().files.keys().cloned().collect()
        }
    }

    fn add_ancestors(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn parent_exists(tree: &Tree, path: &Path) -> bool {
        match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => tree.dirs.contains(p),
            _ => true,
        }
    }

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.contents(path).ok_or_else(|| not_found(path))
        }

        fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            let mut tree = self.tree.lock().unwrap();
            if !parent_exists(&tree, path) {
                return Err(not_found(path.parent().unwrap_or(path)));
            }
            let today = Local::now().date_naive();
            let created = tree.files.get(path).map(|f| f.created).unwrap_or(today);
            tree.files.insert(
                path.to_path_buf(),
                MemFile {
                    contents: contents.as_bytes().to_vec(),
                    created,
                    modified: today,
                },
            );
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            let tree = self.tree.lock().unwrap();
            tree.files.contains_key(path) || tree.dirs.contains(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.has_dir(path)
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.add_dir(path);
            Ok(())
        }

        fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
            let mut tree = self.tree.lock().unwrap();
            let file = tree.files.get(from).cloned().ok_or_else(|| not_found(from))?;
            if !parent_exists(&tree, to) {
                return Err(not_found(to.parent().unwrap_or(to)));
            }
            tree.files.insert(to.to_path_buf(), file);
            Ok(())
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.tree
                .lock()
                .unwrap()
                .files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| not_found(path))
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            let mut tree = self.tree.lock().unwrap();
            if !tree.dirs.contains(path) {
                return Err(not_found(path));
            }
            let occupied = tree.files.keys().any(|f| f.parent() == Some(path))
                || tree.dirs.iter().any(|d| d.parent() == Some(path));
            if occupied {
                return Err(io::Error::other(format!(
                    "{} is not empty",
                    path.display()
                )));
            }
            tree.dirs.remove(path);
            Ok(())
        }

        fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            let tree = self.tree.lock().unwrap();
            if !tree.dirs.contains(path) {
                return Err(not_found(path));
            }
            let mut children: Vec<PathBuf> = tree
                .files
                .keys()
                .chain(tree.dirs.iter())
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect();
            children.sort();
            Ok(children)
        }

        fn created(&self, path: &Path) -> io::Result<NaiveDate> {
            let tree = self.tree.lock().unwrap();
            tree.files
                .get(path)
                .map(|f| f.created)
                .ok_or_else(|| not_found(path))
        }

        fn modified(&self, path: &Path) -> io::Result<NaiveDate> {
            let tree = self.tree.lock().unwrap();
            tree.files
                .get(path)
                .map(|f| f.modified)
                .ok_or_else(|| not_found(path))
        }
    }

    // =========================================================================
    // MemoryFs behavior
    // =========================================================================

    #[test]
    fn memory_fs_write_requires_parent() {
        let fs = MemoryFs::new();
        assert!(fs.write(Path::new("/missing/a.md"), "x").is_err());
        fs.add_dir("/present");
        fs.write(Path::new("/present/a.md"), "x").unwrap();
        assert_eq!(fs.contents("/present/a.md").as_deref(), Some("x"));
    }

    #[test]
    fn memory_fs_remove_dir_refuses_non_empty() {
        let fs = MemoryFs::new();
        fs.add_file("/d/a.png", b"x");
        assert!(fs.remove_dir(Path::new("/d")).is_err());
        fs.remove_file(Path::new("/d/a.png")).unwrap();
        fs.remove_dir(Path::new("/d")).unwrap();
        assert!(!fs.has_dir("/d"));
    }

    // =========================================================================
    // Traversal helpers (shared default implementations)
    // =========================================================================

    #[test]
    fn walk_files_recurses_and_sorts() {
        let fs = MemoryFs::new();
        fs.add_file("/root/b/2.png", b"");
        fs.add_file("/root/a.md", b"");
        fs.add_file("/root/b/c/1.png", b"");
        fs.add_dir("/root/empty");
        let files = fs.walk_files(Path::new("/root")).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/root/a.md"),
                PathBuf::from("/root/b/2.png"),
                PathBuf::from("/root/b/c/1.png"),
            ]
        );
    }

    #[test]
    fn markdown_files_filters_extension() {
        let fs = MemoryFs::new();
        fs.add_file("/posts/a.md", b"");
        fs.add_file("/posts/2024/b.MD", b"");
        fs.add_file("/posts/notes.txt", b"");
        let docs = markdown_files(&fs, Path::new("/posts")).unwrap();
        assert_eq!(
            docs,
            vec![PathBuf::from("/posts/2024/b.MD"), PathBuf::from("/posts/a.md")]
        );
    }

    #[test]
    fn prune_removes_nested_empty_dirs_but_keeps_root() {
        let fs = MemoryFs::new();
        fs.add_dir("/img/posts/a/deeper");
        fs.add_file("/img/posts/b/keep.png", b"");
        fs.add_dir("/img/posts/c");
        let removed = prune_empty_dirs(&fs, Path::new("/img/posts"));
        assert_eq!(
            removed,
            vec![
                PathBuf::from("/img/posts/a/deeper"),
                PathBuf::from("/img/posts/a"),
                PathBuf::from("/img/posts/c"),
            ]
        );
        assert!(fs.has_dir("/img/posts"));
        assert!(fs.has_dir("/img/posts/b"));
    }

    // =========================================================================
    // RealFs
    // =========================================================================

    #[test]
    fn real_fs_walk_and_prune() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("x/y")).unwrap();
        std::fs::create_dir_all(root.join("z")).unwrap();
        std::fs::write(root.join("z/post.md"), "hi").unwrap();

        let fs = RealFs;
        assert_eq!(fs.walk_files(root).unwrap(), vec![root.join("z/post.md")]);
        assert_eq!(markdown_files(&fs, root).unwrap().len(), 1);

        let removed = prune_empty_dirs(&fs, root);
        assert_eq!(removed, vec![root.join("x/y"), root.join("x")]);
        assert!(root.join("z").is_dir());
    }

    #[test]
    fn real_fs_modified_is_today_for_fresh_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        std::fs::write(&path, "x").unwrap();
        assert_eq!(RealFs.modified(&path).unwrap(), Local::now().date_naive());
    }
}
