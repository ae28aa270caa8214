//! The instructional prompt sent alongside every document.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the cloud, multipart and chat backends
//!    all send the same instructions, so tightening a rule happens in
//!    exactly one place and the backends cannot drift apart.
//!
//! 2. **Testability** — unit tests can inspect the constant directly
//!    without talking to a real backend.
//!
//! Callers override it via [`crate::profile::BackendProfile::prompt`]; the
//! constant is used only when no override is provided.

/// Default instructional prompt for converting a document to Markdown.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are an expert document transcriber. Convert the attached document to clean, well-structured Markdown.

Follow these rules precisely:

1. Preserve ALL text content completely and accurately, in reading order.
2. Use # / ## / ### headings to match the document's visual hierarchy.
3. Convert tables to GFM pipe format.
4. Wrap code in fenced blocks and render formulas as LaTeX ($inline$, $$display$$).
5. Ignore page numbers, repeated headers/footers, and decorative rules.
6. Output ONLY the Markdown content — no commentary, no surrounding fences."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_forbids_fences_and_commentary() {
        assert!(DEFAULT_OCR_PROMPT.contains("ONLY the Markdown"));
        assert!(DEFAULT_OCR_PROMPT.contains("no commentary"));
    }
}
