//! Error types for the ocr2md library.
//!
//! Every failure is terminal for the current call; there is no retry or
//! backoff layer. [`OcrError`] is the only error type that crosses the
//! adapter boundary: transport exceptions, unparseable bodies and
//! backend-reported failures are all folded into one of its variants before
//! a caller ever sees them.
//!
//! [`FailureKind`] is the flat classification the caller (and the test
//! suite) can branch on without matching every variant's payload.

use thiserror::Error;

/// All errors returned by the OCR adapter.
///
/// One variant per entry in the failure taxonomy; see [`FailureKind`] for
/// the payload-free classification.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// The profile is missing a credential or endpoint it needs.
    #[error("Backend '{backend}' is not configured: {detail}")]
    Config { backend: String, detail: String },

    // ── Wire errors ──────────────────────────────────────────────────────
    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the backend's own error message when its error envelope
    /// parsed, otherwise a truncated slice of the raw response body.
    #[error("Backend '{backend}' returned HTTP {status}: {message}")]
    Http {
        backend: String,
        status: u16,
        message: String,
    },

    /// 2xx status, but the body is not valid JSON.
    #[error("Backend '{backend}' returned an unparseable response: {detail}")]
    MalformedResponse { backend: String, detail: String },

    /// 2xx status and valid JSON, but the envelope's own success indicator
    /// signals an application-level failure (non-zero code, error object).
    #[error("Backend '{backend}' reported an error: {message}")]
    Backend { backend: String, message: String },

    /// The success envelope parsed, but the extracted text field is absent
    /// or empty.
    #[error("No text extracted")]
    EmptyResult { backend: String },

    /// Network-level failure (DNS, connection refused, reset) before any
    /// HTTP status was received.
    #[error("Request to backend '{backend}' failed: {detail}")]
    Transport { backend: String, detail: String },
}

/// Flat failure classification, one entry per [`OcrError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Http,
    MalformedResponse,
    Backend,
    EmptyResult,
    Transport,
}

impl OcrError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            OcrError::Config { .. } => FailureKind::Config,
            OcrError::Http { .. } => FailureKind::Http,
            OcrError::MalformedResponse { .. } => FailureKind::MalformedResponse,
            OcrError::Backend { .. } => FailureKind::Backend,
            OcrError::EmptyResult { .. } => FailureKind::EmptyResult,
            OcrError::Transport { .. } => FailureKind::Transport,
        }
    }

    /// Name of the backend that produced this error.
    pub fn backend(&self) -> &str {
        match self {
            OcrError::Config { backend, .. }
            | OcrError::Http { backend, .. }
            | OcrError::MalformedResponse { backend, .. }
            | OcrError::Backend { backend, .. }
            | OcrError::EmptyResult { backend }
            | OcrError::Transport { backend, .. } => backend,
        }
    }
}
