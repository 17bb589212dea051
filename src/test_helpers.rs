//! Shared test utilities for the post-stager test suite.
//!
//! Provides the stock site layout, staged-post fixtures and assertions over
//! rewritten text.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let layout = blog_layout();
//! let content = post("abc12345", "![x](/src/assets/images/posts/abc12345/x.png)\n");
//! assert_header_field(&content, "abbrlink", "abc12345");
//! ```

use std::path::Path;

use crate::config::StagerConfig;
use crate::frontmatter;
use crate::layout::SiteLayout;

// =========================================================================
// Layout
// =========================================================================

/// Root of the in-memory blog used by unit tests.
pub const BLOG_ROOT: &str = "/blog";

/// Stock layout rooted at [`BLOG_ROOT`].
pub fn blog_layout() -> SiteLayout {
    SiteLayout::new(Path::new(BLOG_ROOT), &StagerConfig::default())
}

// =========================================================================
// Fixtures
// =========================================================================

/// A staged post: full header (published 2024-01-01, updated 2024-01-03)
/// followed by `body`.
pub fn post(abbrlink: &str, body: &str) -> String {
    format!(
        "---\n\
         title: Fixture\n\
         published: 2024-01-01\n\
         updated: 2024-01-03\n\
         tags:\n  - 未分类\n\
         toc: true\n\
         lang: zh\n\
         abbrlink: {abbrlink}\n\
         ---\n\n\
         {body}"
    )
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert a header field has the given value.
pub fn assert_header_field(content: &str, key: &str, expected: &str) {
    assert_eq!(
        frontmatter::field(content, key),
        Some(expected),
        "header field '{key}' in:\n{content}"
    );
}
