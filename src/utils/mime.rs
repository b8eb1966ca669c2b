//! MIME type detection for the upload path.

use std::path::Path;

/// MIME type for SVG documents.
pub const SVG: &str = "image/svg+xml";

/// Check whether a declared MIME type signals SVG content.
///
/// Tolerates parameters (`image/svg+xml; charset=utf-8`) and case
/// differences, since upload collaborators pass the type through verbatim
/// from the client.
#[inline]
pub fn is_svg(mime: &str) -> bool {
    mime.split(';')
        .next()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(SVG))
}

/// Guess MIME type from file extension.
///
/// Only the types this pipeline cares about are mapped; everything else
/// falls back to `application/octet-stream`.
pub fn from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("svg") => SVG,
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
