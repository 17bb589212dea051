//! Result types for text rewriting.
//!
//! Every rewrite in the crate (markup normalization, image reference
//! relocation, abbrlink migration, front matter patches) is a pure function
//! from an input string to a [`Rewrite`]: the new text plus the list of
//! [`Edit`]s that produced it. Callers decide what to do with the edits
//! (log them, count them, or ignore them); nothing is mutated in place.

use std::ops::Range;

/// One substitution applied to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub before: String,
    pub after: String,
}

impl Edit {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Rewritten text along with the edits that were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub edits: Vec<Edit>,
}

impl Rewrite {
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            edits: Vec::new(),
        }
    }

    pub fn is_changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// A replacement for a byte range of some source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub span: Range<usize>,
    pub replacement: String,
}

/// Apply all splices to `text` in a single left-to-right pass.
///
/// Splices may be given in any order. A splice overlapping an earlier one is
/// dropped, so the result is well defined even if two scanners matched the
/// same region.
pub fn splice(text: &str, splices: &[Splice]) -> Rewrite {
    let mut ordered: Vec<&Splice> = splices.iter().collect();
    ordered.sort_by_key(|s| (s.span.start, s.span.end));

    let mut out = String::with_capacity(text.len());
    let mut edits = Vec::new();
    let mut cursor = 0;
    for s in ordered {
        if s.span.start < cursor || s.span.end > text.len() {
            continue;
        }
        out.push_str(&text[cursor..s.span.start]);
        out.push_str(&s.replacement);
        let before = &text[s.span.clone()];
        if before != s.replacement {
            edits.push(Edit::new(before, s.replacement.clone()));
        }
        cursor = s.span.end;
    }
    out.push_str(&text[cursor..]);

    Rewrite { text: out, edits }
}
