//! Custom inline markup normalization.
//!
//! Drafts are written with a handful of shorthand delimiters that the blog's
//! Markdown renderer doesn't understand. On first ingestion they are rewritten
//! into plain inline HTML tags:
//!
//! | Draft        | Staged                 |
//! |--------------|------------------------|
//! | `==text==`   | `<mark>text</mark>`    |
//! | `!!!text!!!` | `<kbd>text</kbd>`      |
//! | `~~text~~`   | `<s>text</s>`          |
//! | `^text^`     | `<sup>text</sup>`      |
//! | `~text~`     | `<sub>text</sub>`      |
//! | `++text++`   | `<ins>text</ins>`      |
//!
//! Rules run in table order. `~~` must run before `~`, otherwise the
//! single-tilde rule would eat strikethrough pairs. The inner text of each
//! rule excludes the delimiter character, so a match never spans a second
//! delimiter.

use crate::rewrite::{Edit, Rewrite};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One delimiter pair and the tag it becomes.
pub struct MarkupRule {
    pub tag: &'static str,
    pattern: Regex,
}

static RULES: Lazy<Vec<MarkupRule>> = Lazy::new(|| {
    [
        ("mark", r"==([^=]+)=="),
        ("kbd", r"!!!([^!]+)!!!"),
        ("s", r"~~([^~]+)~~"),
        ("sup", r"\^([^\^]+)\^"),
        ("sub", r"~([^~]+)~"),
        ("ins", r"\+\+([^+]+)\+\+"),
    ]
    .into_iter()
    .map(|(tag, pattern)| MarkupRule {
        tag,
        pattern: Regex::new(pattern).expect("markup patterns are valid"),
    })
    .collect()
});

/// The normalization rules in application order.
pub fn rules() -> &'static [MarkupRule] {
    &RULES
}

/// Rewrite all custom delimiters in `text` into inline tags.
///
/// With `skip` set the text is returned untouched.
pub fn normalize(text: &str, skip: bool) -> Rewrite {
    if skip {
        return Rewrite::unchanged(text);
    }

    let mut current = text.to_string();
    let mut edits = Vec::new();
    for rule in rules() {
        let replaced = rule.pattern.replace_all(&current, |caps: &Captures| {
            let after = format!("<{tag}>{}</{tag}>", &caps[1], tag = rule.tag);
            edits.push(Edit::new(&caps[0], after.clone()));
            after
        });
        current = replaced.into_owned();
    }

    Rewrite {
        text: current,
        edits,
    }
}
