//! Front matter (header block) creation and patching.
//!
//! Staged posts start with a `---`-delimited block of `key: value` lines:
//!
//! ```text
//! ---
//! title: My Title
//! published: 2024-01-02
//! updated: 2024-01-03
//! tags:
//!   - 未分类
//! toc: true
//! lang: zh
//! abbrlink: 1a2b3c4d
//! ---
//!
//! # My Title
//! ...
//! ```
//!
//! A draft without a header gets a fresh one from [`FrontMatter::render`].
//! A document that already has one is only ever patched line-by-line
//! ([`set_abbrlink`], [`set_updated`]) so hand edits, field order and any
//! extra keys survive untouched.

use crate::abbrlink::Abbrlink;
use crate::rewrite::{Edit, Rewrite};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;

pub const DELIMITER: &str = "---";

/// Date format used by every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static ABBRLINK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^abbrlink:[ \t]*([^\s]+)[ \t]*$").expect("valid abbrlink line pattern")
});

/// Header fields for a newly staged post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub published: NaiveDate,
    pub updated: NaiveDate,
    pub tags: Vec<String>,
    pub toc: bool,
    pub lang: String,
    pub abbrlink: Abbrlink,
}

impl FrontMatter {
    /// Render the header block followed by one blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&format!("title: {}\n", yaml_scalar(&self.title)));
        out.push_str(&format!("published: {}\n", format_date(self.published)));
        out.push_str(&format!("updated: {}\n", format_date(self.updated)));
        out.push_str("tags:\n");
        for tag in &self.tags {
            out.push_str(&format!("  - {}\n", yaml_scalar(tag)));
        }
        out.push_str(&format!("toc: {}\n", self.toc));
        out.push_str(&format!("lang: {}\n", self.lang));
        out.push_str(&format!("abbrlink: {}\n", self.abbrlink));
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Quote a scalar when it wouldn't survive as a plain YAML value.
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value != value.trim()
        || value.contains(": ")
        || value.contains(" #")
        || value.ends_with(':')
        || value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c));
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Byte range of the header lines (between, not including, the delimiters),
/// and the offset where the body starts.
fn header_bounds(content: &str) -> Option<(Range<usize>, usize)> {
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != DELIMITER {
        return None;
    }
    let inner_start = first_end + 1;
    let mut offset = inner_start;
    for line in content[inner_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((inner_start..offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Whether the document starts with a complete header block.
pub fn has_header(content: &str) -> bool {
    header_bounds(content).is_some()
}

/// Header lines without delimiters, or `None` if there is no header.
pub fn header(content: &str) -> Option<&str> {
    header_bounds(content).map(|(inner, _)| &content[inner])
}

/// The document without its header block.
pub fn body(content: &str) -> &str {
    match header_bounds(content) {
        Some((_, body_start)) => &content[body_start..],
        None => content,
    }
}

/// Value of a top-level `key: value` line in the header.
///
/// Surrounding quotes are stripped. Empty values (list keys like `tags:`)
/// yield `None`.
pub fn field<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    header(content)?.lines().find_map(|line| {
        let rest = line.strip_prefix(key)?.strip_prefix(':')?;
        let value = rest.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        (!value.is_empty()).then_some(value)
    })
}

/// The header's abbrlink, if present.
pub fn header_abbrlink(content: &str) -> Option<&str> {
    field(content, "abbrlink")
}

/// An `abbrlink:` line carried in a document that has no header block yet,
/// e.g. a draft copied back out of the blog.
pub fn inline_abbrlink(content: &str) -> Option<Abbrlink> {
    ABBRLINK_LINE
        .captures(content)
        .and_then(|c| Abbrlink::new(&c[1]).ok())
}

/// Replace the value of a header line `key: old` with `new_value`.
///
/// When `old` is given, only a line whose current value equals it is
/// rewritten. Returns `None` if no line matched.
fn replace_field_line(
    content: &str,
    key: &str,
    old: Option<&str>,
    new_value: &str,
) -> Option<Rewrite> {
    let (inner, _) = header_bounds(content)?;
    let mut offset = inner.start;
    for line in content[inner.clone()].split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if let Some(rest) = bare.strip_prefix(key).and_then(|r| r.strip_prefix(':'))
            && old.is_none_or(|o| rest.trim() == o)
        {
            let replacement = format!("{key}: {new_value}");
            let span = offset..offset + bare.len();
            let mut text = String::with_capacity(content.len() + new_value.len());
            text.push_str(&content[..span.start]);
            text.push_str(&replacement);
            text.push_str(&content[span.end..]);
            let edits = if bare == replacement {
                Vec::new()
            } else {
                vec![Edit::new(bare, replacement)]
            };
            return Some(Rewrite { text, edits });
        }
        offset += line.len();
    }
    None
}

/// Point the header's `abbrlink:` at `new` if it currently says `old`.
pub fn set_abbrlink(content: &str, old: &str, new: &Abbrlink) -> Rewrite {
    if old == new.as_str() {
        return Rewrite::unchanged(content);
    }
    replace_field_line(content, "abbrlink", Some(old), new.as_str())
        .unwrap_or_else(|| Rewrite::unchanged(content))
}

/// Set the header's `updated:` date.
///
/// An existing `updated` line is rewritten; otherwise a new line is inserted
/// right after `published:`. Without either, the content is unchanged.
pub fn set_updated(content: &str, date: NaiveDate) -> Rewrite {
    let value = format_date(date);
    if field(content, "updated").is_some() {
        return replace_field_line(content, "updated", None, &value)
            .unwrap_or_else(|| Rewrite::unchanged(content));
    }

    let Some((inner, _)) = header_bounds(content) else {
        return Rewrite::unchanged(content);
    };
    let mut offset = inner.start;
    for line in content[inner.clone()].split_inclusive('\n') {
        offset += line.len();
        if line.starts_with("published:") {
            let inserted = format!("updated: {value}\n");
            let mut text = String::with_capacity(content.len() + inserted.len());
            text.push_str(&content[..offset]);
            text.push_str(&inserted);
            text.push_str(&content[offset..]);
            return Rewrite {
                text,
                edits: vec![Edit::new("", inserted.trim_end())],
            };
        }
    }
    Rewrite::unchanged(content)
}

/// Text of the first level-1 heading in a Markdown body.
pub fn first_heading(body: &str) -> Option<String> {
    let mut in_h1 = false;
    let mut title = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let trimmed = title.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_h1 = false;
                title.clear();
            }
            Event::Text(text) | Event::Code(text) if in_h1 => title.push_str(&text),
            _ => {}
        }
    }
    None
}
