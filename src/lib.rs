//! # ocr2md
//!
//! Convert PDFs and scanned images to Markdown notes via pluggable OCR
//! backends.
//!
//! ## Why this crate?
//!
//! OCR services all do the same job but none of them speak the same
//! dialect: some want a JSON body with a base64 data URI, others a
//! multipart upload or an OpenAI-style vision-chat payload, and each wraps
//! success and failure in its own envelope. This crate collapses
//! those differences into one parametrized adapter: a [`BackendProfile`]
//! describes how to reach and speak to a backend, and every response is
//! normalized into a single outcome type. Adding a backend is a new
//! profile, not a new code path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes
//!  │
//!  ├─ 1. Profile   resolve backend settings into a BackendProfile
//!  ├─ 2. Encode    base64 data URI or multipart body
//!  ├─ 3. POST      exactly one HTTP call, no retry
//!  ├─ 4. Classify  status + envelope → Markdown or classified failure
//!  └─ 5. Note      ConversionResult + YAML front matter for the vault
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr2md::{convert, BackendProfile, SourceDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("scan.png")?;
//!     let doc = SourceDocument::new(&bytes, "scan.png", "image/png");
//!     let profile = BackendProfile::local_chat("http://localhost:11434");
//!     let extraction = convert(&doc, &profile).await?;
//!     println!("{}", extraction.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Backends
//!
//! | Preset | Wire format | Endpoint |
//! |--------|-------------|----------|
//! | `cloud` | JSON `{model, file}` | `/api/paas/v4/layout_parsing` |
//! | `local-multipart` | multipart `file` + `prompt` | `/v1/chat/completions` |
//! | `local-chat` | vision-chat messages | `/chat/completions` |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod adapter;
pub mod document;
pub mod error;
pub mod note;
pub mod pipeline;
pub mod profile;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use adapter::{convert, convert_with_client, test_connection, ConnectionReport};
pub use document::{guess_mime_type, SourceDocument};
pub use error::{FailureKind, OcrError};
pub use note::{ConversionResult, Extraction, NoteMetadata, OcrOutcome};
pub use profile::{BackendKind, BackendProfile, RequestEncoding, ResponseShape};
