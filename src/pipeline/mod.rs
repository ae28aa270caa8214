//! Pipeline stages for one OCR conversion call.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and keeps the adapter
//! in [`crate::adapter`] a thin sequence of calls.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ encode ──▶ request ──▶ POST ──▶ response
//! (bytes)    (base64 /   (payload    (adapter) (classify)
//!             multipart)  types)
//! ```
//!
//! 1. [`encode`]   — base64 data URIs and the multipart/form-data body
//! 2. [`request`]  — serde payload types for each backend shape
//! 3. [`response`] — the normalization policy: status + body → outcome

pub mod encode;
pub mod request;
pub mod response;
