//! # Post Stager
//!
//! Stages Markdown drafts into a static blog. A draft gets a stable short
//! identifier (its *abbrlink*), a front matter header, normalized inline
//! markup, and its local images copied into a per-post image directory with
//! the references rewritten to public URLs.
//!
//! # Commands
//!
//! ```text
//! add      draft.md  →  <posts>/YYYY/MM/draft.md  (+ <images>/posts/<abbrlink>/*)
//! update   post.md   →  new abbrlink, links and image directory moved along
//! check    corpus    →  image links filed under another abbrlink, stale dates
//! cleanup  corpus    →  images no post references, then empty directories
//! ```
//!
//! Everything that rewrites text is a pure function returning a
//! [`rewrite::Rewrite`] (new text plus the edits made), and everything that
//! touches the disk goes through the [`fs::FileSystem`] trait. Commands
//! compose the two, so the batch logic runs against an in-memory filesystem
//! in tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`stage`] | `add` and `update`: the staging pipeline |
//! | [`check`] | Link consistency and `updated` date checking |
//! | [`cleanup`] | Orphan image collection and empty directory pruning |
//! | [`migrate`] | Moving image links and files from one abbrlink to another |
//! | [`relocate`] | Copying a draft's local images into its image directory |
//! | [`frontmatter`] | Creating and patching the header block |
//! | [`markup`] | Inline markup normalization (`==mark==`, `~sub~`, ...) |
//! | [`refs`] | Image reference scanner for `![alt](path)` and `<img src>` |
//! | [`rewrite`] | `Rewrite` results and one-pass span splicing |
//! | [`abbrlink`] | Identifier generation and validation |
//! | [`layout`] | Blog directory layout and public URL mapping |
//! | [`fs`] | Filesystem trait and the real implementation |
//! | [`prompt`] | Yes/no confirmation |
//! | [`config`] | `stager.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content-Derived Identifiers
//!
//! A generated abbrlink is the first 8 hex characters of the SHA-256 digest of
//! the draft as read from disk. Staging the same draft twice yields the same
//! identifier, so a re-run overwrites rather than duplicates. Relocated image
//! files are named `<abbrlink>-<digest of the original stem><ext>` by the same
//! function.
//!
//! ## Headers Are Patched, Never Regenerated
//!
//! Once a document has a header, the stager only rewrites single lines
//! (`abbrlink:`, `updated:`). Field order, quoting and any keys it doesn't
//! know about are left alone, and markup normalization and image relocation
//! only ever run on first ingestion.
//!
//! ## Copy, Then Delete
//!
//! Image moves copy the file and remove the original only after the copy
//! succeeded. A failing file is logged and skipped, and the batch continues.

pub mod abbrlink;
pub mod check;
pub mod cleanup;
pub mod config;
pub mod frontmatter;
pub mod fs;
pub mod layout;
pub mod markup;
pub mod migrate;
pub mod output;
pub mod prompt;
pub mod refs;
pub mod relocate;
pub mod rewrite;
pub mod stage;

#[cfg(test)]
pub(crate) mod test_helpers;
