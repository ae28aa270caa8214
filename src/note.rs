//! Result types: the adapter's outcome and the record handed to the
//! formatter/persistence collaborator.
//!
//! [`Extraction`] is what `convert` produces; it lives only as long as the
//! call that made it. [`ConversionResult`] is the outbound shape the vault
//! writer consumes; it is serialisable so hosts can log it, queue it, or
//! hand it across a plugin boundary.

use crate::document::SourceDocument;
use crate::error::OcrError;
use serde::{Deserialize, Serialize};

/// Successful extraction: the backend's Markdown, verbatim, plus the label
/// of the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Extracted Markdown exactly as the backend returned it.
    pub markdown: String,
    /// Profile name, recorded as the model label in note metadata.
    pub model_label: String,
}

/// The adapter's only externally visible result: exactly one of success or
/// classified failure per call.
pub type OcrOutcome = Result<Extraction, OcrError>;

/// Metadata recorded alongside the converted note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteMetadata {
    /// Backend/model label that produced the text.
    pub model: String,
    /// Filename of the source document in the vault.
    pub source_file: String,
}

/// The record handed to the external vault-writing routine.
///
/// `images` carries vault-relative paths of images extracted alongside the
/// text; the current backends return text only, so it is empty, but the
/// field is part of the formatter contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub markdown: String,
    pub images: Vec<String>,
    pub metadata: NoteMetadata,
}

impl ConversionResult {
    /// Fold an outcome into the formatter record.
    ///
    /// Failures produce `success = false` with an empty body; the caller
    /// surfaces the error message to the user separately and decides
    /// whether to persist anything at all.
    pub fn from_outcome(outcome: &OcrOutcome, doc: &SourceDocument<'_>) -> Self {
        match outcome {
            Ok(extraction) => Self {
                success: true,
                markdown: extraction.markdown.clone(),
                images: Vec::new(),
                metadata: NoteMetadata {
                    model: extraction.model_label.clone(),
                    source_file: doc.filename.to_string(),
                },
            },
            Err(err) => Self {
                success: false,
                markdown: String::new(),
                images: Vec::new(),
                metadata: NoteMetadata {
                    model: err.backend().to_string(),
                    source_file: doc.filename.to_string(),
                },
            },
        }
    }

    /// Render the note body with YAML front matter.
    ///
    /// The front matter records provenance (model, source file) so a note
    /// found months later still says where its text came from.
    pub fn render_note(&self) -> String {
        let mut note = String::with_capacity(self.markdown.len() + 128);
        note.push_str("---\n");
        note.push_str(&format!("model: \"{}\"\n", self.metadata.model));
        note.push_str(&format!("source_file: \"{}\"\n", self.metadata.source_file));
        note.push_str("---\n\n");
        note.push_str(&self.markdown);
        if !self.markdown.ends_with('\n') {
            note.push('\n');
        }
        note
    }
}
