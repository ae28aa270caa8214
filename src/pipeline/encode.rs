//! Body encoding: base64 data URIs and the multipart/form-data body.
//!
//! JSON backends take the document as a base64 data URI embedded in the
//! request body; the multipart backend takes the raw bytes. The multipart
//! body is assembled by hand rather than through a form builder so the wire
//! contract (one boundary token delimiting exactly one `file` part and one
//! `prompt` part) is a pure function over bytes that tests can inspect
//! directly.

use crate::document::SourceDocument;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;
use uuid::Uuid;

/// Wrap document bytes in a `data:<mime>;base64,…` URI.
pub fn data_uri(bytes: &[u8], mime_type: &str) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded document → {} bytes base64", b64.len());
    format!("data:{};base64,{}", mime_type, b64)
}

/// A fully assembled multipart/form-data body.
pub struct MultipartBody {
    /// Value for the `Content-Type` header, boundary included.
    pub content_type: String,
    /// The raw body bytes.
    pub body: Vec<u8>,
}

/// Build the multipart body for the local multipart backend.
///
/// Layout (CRLF line endings, per RFC 7578):
/// one `file` part carrying the raw document bytes under the document's
/// declared content type, one `prompt` text part, each introduced by
/// `--<boundary>`, the whole body terminated by `--<boundary>--`.
pub fn multipart_body(doc: &SourceDocument<'_>, prompt: &str) -> MultipartBody {
    let boundary = format!("ocr2md-{}", Uuid::new_v4().simple());

    let mut body: Vec<u8> = Vec::with_capacity(doc.bytes.len() + prompt.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            doc.filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", doc.mime_type).as_bytes());
    body.extend_from_slice(doc.bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"prompt\"\r\n\r\n");
    body.extend_from_slice(prompt.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    debug!(
        "Built multipart body: {} bytes, boundary {}",
        body.len(),
        boundary
    );

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    }
}
