//! Source documents: a read-only view over the file being converted.
//!
//! The adapter never owns vault content: the host hands it bytes, a
//! filename and a MIME type, and gets an outcome back. The only logic here
//! is the extension→MIME guess used when the host has nothing better.

use std::path::Path;

/// The file to be OCR'd. Borrowed for the duration of one conversion call.
#[derive(Debug, Clone)]
pub struct SourceDocument<'a> {
    /// Raw file content, read once by the caller.
    pub bytes: &'a [u8],
    /// Original filename, used for the multipart part name and for note
    /// metadata.
    pub filename: &'a str,
    /// Declared content type, e.g. `application/pdf` or `image/png`.
    pub mime_type: &'a str,
}

impl<'a> SourceDocument<'a> {
    pub fn new(bytes: &'a [u8], filename: &'a str, mime_type: &'a str) -> Self {
        Self {
            bytes,
            filename,
            mime_type,
        }
    }
}

/// Guess a MIME type from a filename extension.
///
/// Returns `None` for extensions no backend accepts; callers decide whether
/// that is an error or a reason to fall back to `application/octet-stream`.
pub fn guess_mime_type(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
