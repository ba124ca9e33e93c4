//! Bilibili-style `<d>` element comment streams

use crate::Result;
use danmaku_core::{Color, CommentMode, CommentRecord};
use log::debug;

/// Parses a raw comment stream
///
/// The bytes are decoded as UTF-8 and scanned for `<d p="...">text</d>`
/// records. Records come back in stream order; the timeline sorts them
/// on load.
pub fn parse(bytes: &[u8]) -> Result<Vec<CommentRecord>> {
    Ok(parse_str(std::str::from_utf8(bytes)?))
}

/// Parses an already-decoded comment stream
///
/// Malformed entries are skipped, never fatal.
pub fn parse_str(text: &str) -> Vec<CommentRecord> {
    let mut records = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("<d ") {
        rest = &rest[start + 3..];
        let Some(tag_end) = rest.find('>') else {
            debug!("skipping unterminated comment element");
            break;
        };
        let tag = &rest[..tag_end];
        rest = &rest[tag_end + 1..];
        let Some(body_end) = rest.find("</d>") else {
            debug!("skipping unterminated comment element");
            break;
        };
        let body = &rest[..body_end];
        rest = &rest[body_end + 4..];

        match parse_entry(tag, body) {
            Some(record) => records.push(record),
            None => debug!("skipping malformed comment entry: {tag:?}"),
        }
    }

    records
}

/// Decodes one `<d>` element into a record
///
/// The `p` attribute carries positional fields: start time in seconds,
/// mode, font size and packed color, optionally followed by metadata
/// fields that are ignored here.
fn parse_entry(tag: &str, body: &str) -> Option<CommentRecord> {
    let attrs = attribute(tag, "p")?;
    let mut fields = attrs.split(',');

    let seconds: f64 = fields.next()?.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let mode_raw: u32 = fields.next()?.trim().parse().ok()?;
    let size: u32 = fields.next()?.trim().parse().ok()?;
    let packed_color: u32 = fields.next()?.trim().parse().ok()?;

    let mode = CommentMode::from_raw(mode_raw).ok()?;
    let start_time_ms = (seconds * 1000.0).round() as u64;

    Some(CommentRecord::new(
        mode,
        unescape(body),
        start_time_ms,
        Color::from_packed(packed_color),
        size,
    ))
}

/// Extracts a double-quoted attribute value from a start tag
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!("{name}=\"");
    let start = tag.find(&pattern)? + pattern.len();
    let end = tag[start..].find('"')? + start;
    Some(&tag[start..end])
}

/// Resolves the predefined XML entities in a text payload
///
/// `&amp;` must be resolved last so escaped entity names stay literal.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
