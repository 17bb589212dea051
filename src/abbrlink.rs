//! Post identifiers ("abbrlinks").
//!
//! Every staged post carries a short identifier in its front matter. The same
//! token names the post's image directory (`posts/<abbrlink>/`) and prefixes
//! every image file inside it, so a post and its images can always be matched
//! up again.
//!
//! ## Generation
//!
//! Generated abbrlinks are the first 8 hex characters of the SHA-256 digest
//! of the raw draft text. This is deterministic: staging the same draft twice
//! yields the same abbrlink. Two drafts with byte-identical content collide,
//! and no uniqueness check is made against posts already on disk.
//!
//! The same truncated digest ([`digest8`]) is used to name relocated image
//! files from their original basename.
//!
//! ## Caller-supplied abbrlinks
//!
//! Abbrlinks given on the command line or found in existing front matter are
//! not required to be hex. They only need to be usable as a single path
//! segment: non-empty, no whitespace, no `/` or `\`.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hex characters kept from a digest.
pub const DIGEST_LEN: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AbbrlinkError {
    #[error("abbrlink must not be empty")]
    Empty,
    #[error("abbrlink {0:?} contains whitespace or a path separator")]
    InvalidChar(String),
}

/// A post identifier, guaranteed to be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Abbrlink(String);

impl Abbrlink {
    /// Validate a caller-supplied abbrlink.
    pub fn new(value: &str) -> Result<Self, AbbrlinkError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AbbrlinkError::Empty);
        }
        if value
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(AbbrlinkError::InvalidChar(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Derive an abbrlink from document content.
    pub fn generate(content: &str) -> Self {
        Self(digest8(content.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Abbrlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Abbrlink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Abbrlink {
    type Err = AbbrlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// First [`DIGEST_LEN`] lowercase hex characters of the SHA-256 of `bytes`.
pub fn digest8(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = format!("{:x}", digest);
    hex.truncate(DIGEST_LEN);
    hex
}
