//! Upload-time SVG sanitization.
//!
//! The one path where a failure surfaces to the caller instead of
//! degrading silently: accepting unsafe or empty content at upload time
//! is unacceptable, so a rejected upload is an error, not a pass-through.

use thiserror::Error;

use crate::sanitize;
use crate::utils::mime;

/// Upload rejection reasons, surfaced to the upload collaborator.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded SVG is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("uploaded SVG contained no allowed content after sanitization")]
    Rejected,
}

/// Route an uploaded file buffer through the sanitizer.
///
/// - Non-SVG MIME types pass through untouched: `Ok(None)` means "keep
///   the original buffer".
/// - SVG buffers are sanitized against the same allow-list the render
///   pipeline uses; `Ok(Some(bytes))` is the replacement to persist.
/// - Empty sanitizer output rejects the upload with a descriptive error.
pub fn sanitize_upload(buffer: &[u8], declared_mime: &str) -> Result<Option<Vec<u8>>, UploadError> {
    if !mime::is_svg(declared_mime) {
        return Ok(None);
    }

    let text = std::str::from_utf8(buffer).map_err(|_| UploadError::InvalidEncoding)?;
    let sanitized = sanitize::sanitize(text);
    if sanitized.is_empty() {
        return Err(UploadError::Rejected);
    }
    Ok(Some(sanitized.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_svg_mime_passes_through() {
        let buffer = b"\x89PNG\r\n";
        assert!(matches!(
            sanitize_upload(buffer, "image/png"),
            Ok(None)
        ));
    }

    #[test]
    fn test_svg_upload_sanitized() {
        let raw = br#"<svg onload="evil()"><path d="M0 0"/></svg>"#;
        let out = sanitize_upload(raw, "image/svg+xml").unwrap().unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("onload"));
        assert!(text.contains("<path"));
    }

    #[test]
    fn test_empty_sanitization_rejects_upload() {
        let raw = b"<html><script>alert(1)</script></html>";
        assert!(matches!(
            sanitize_upload(raw, "image/svg+xml"),
            Err(UploadError::Rejected)
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let raw = [0xff, 0xfe, 0x00];
        assert!(matches!(
            sanitize_upload(&raw, "image/svg+xml"),
            Err(UploadError::InvalidEncoding)
        ));
    }

    #[test]
    fn test_mime_parameters_still_route_through_sanitizer() {
        let raw = br#"<svg><path d="M0 0"/></svg>"#;
        assert!(matches!(
            sanitize_upload(raw, "image/svg+xml; charset=utf-8"),
            Ok(Some(_))
        ));
    }
}
