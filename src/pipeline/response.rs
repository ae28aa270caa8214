//! Response classification: (status, body) → extracted Markdown or a
//! classified failure.
//!
//! Every backend reports success and failure differently; this module is
//! the single place those differences are flattened. Classification order
//! is fixed and shape-independent:
//!
//! 1. non-2xx status → [`OcrError::Http`], message from the backend's error
//!    envelope when it parses, else a truncated slice of the raw body
//! 2. 2xx but the body is not valid JSON → [`OcrError::MalformedResponse`]
//! 3. the envelope's own success indicator signals failure →
//!    [`OcrError::Backend`]
//! 4. the extracted text field is absent or empty → [`OcrError::EmptyResult`]
//! 5. otherwise the extracted field, verbatim (no trimming, no mutation)
//!
//! Rule 4 is deliberate: one upstream backend used to substitute the
//! literal "No text extracted" into the persisted note instead of failing.
//! Here an empty extraction is a failure for every shape, uniformly.

use crate::error::OcrError;
use crate::profile::ResponseShape;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Upper bound for raw-body slices quoted in error messages.
const BODY_SNIPPET_MAX: usize = 300;

/// The raw body kept when a JSON parse fails, truncated for diagnostics.
#[derive(Debug)]
pub struct RawBody {
    pub snippet: String,
}

/// Parse `body` as `T`, or hand back a truncated copy of the raw text.
///
/// This is the one "try JSON, fall back to raw text" step every error path
/// shares; call sites never repeat the parse/fallback dance.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, RawBody> {
    serde_json::from_str(body).map_err(|_| RawBody {
        snippet: truncate_snippet(body),
    })
}

fn truncate_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_SNIPPET_MAX {
        return trimmed.to_string();
    }
    let mut end = BODY_SNIPPET_MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

// ── Envelope types ───────────────────────────────────────────────────────

/// Cloud layout-parsing envelope: success and error share one shape.
#[derive(Debug, Deserialize)]
struct LayoutEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<LayoutData>,
}

#[derive(Debug, Deserialize)]
struct LayoutData {
    #[serde(default)]
    md_result: Option<String>,
}

/// OpenAI-compatible chat envelope. `error`/`message` cover the two error
/// forms local servers emit.
#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
    #[serde(default)]
    error: Option<ChatError>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}

// ── Classification ───────────────────────────────────────────────────────

/// Classify one HTTP exchange into extracted Markdown or an [`OcrError`].
///
/// `backend` names the profile for error messages; `status`/`body` are the
/// raw response. Transport-level failures never reach this function; the
/// adapter maps those to [`OcrError::Transport`] before a body exists.
pub fn classify(
    shape: ResponseShape,
    backend: &str,
    status: u16,
    body: &str,
) -> Result<String, OcrError> {
    if !(200..300).contains(&status) {
        let message =
            error_message(shape, body).unwrap_or_else(|| truncate_snippet(body));
        return Err(OcrError::Http {
            backend: backend.to_string(),
            status,
            message,
        });
    }

    match shape {
        ResponseShape::LayoutParsing => classify_layout(backend, body),
        ResponseShape::ChatCompletions => classify_chat(backend, body),
    }
}

/// Pull a human-readable message out of a backend error envelope, if the
/// body is one.
fn error_message(shape: ResponseShape, body: &str) -> Option<String> {
    match shape {
        ResponseShape::LayoutParsing => {
            let env: LayoutEnvelope = decode_json(body).ok()?;
            env.msg.filter(|m| !m.is_empty())
        }
        ResponseShape::ChatCompletions => {
            let env: ChatEnvelope = decode_json(body).ok()?;
            env.error
                .map(|e| e.message)
                .or(env.message)
                .filter(|m| !m.is_empty())
        }
    }
}

fn classify_layout(backend: &str, body: &str) -> Result<String, OcrError> {
    let env: LayoutEnvelope = decode_json(body).map_err(|raw| OcrError::MalformedResponse {
        backend: backend.to_string(),
        detail: raw.snippet,
    })?;

    if env.code != 0 {
        let message = env
            .msg
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("backend code {}", env.code));
        return Err(OcrError::Backend {
            backend: backend.to_string(),
            message,
        });
    }

    match env.data.and_then(|d| d.md_result) {
        Some(md) if !md.is_empty() => Ok(md),
        _ => Err(OcrError::EmptyResult {
            backend: backend.to_string(),
        }),
    }
}

fn classify_chat(backend: &str, body: &str) -> Result<String, OcrError> {
    let env: ChatEnvelope = decode_json(body).map_err(|raw| OcrError::MalformedResponse {
        backend: backend.to_string(),
        detail: raw.snippet,
    })?;

    if let Some(err) = env.error {
        return Err(OcrError::Backend {
            backend: backend.to_string(),
            message: err.message,
        });
    }

    let choices = match env.choices {
        Some(c) => c,
        // A 2xx with no `choices` but a bare `message` is the second error
        // form some local servers use.
        None => {
            return Err(match env.message.filter(|m| !m.is_empty()) {
                Some(message) => OcrError::Backend {
                    backend: backend.to_string(),
                    message,
                },
                None => OcrError::EmptyResult {
                    backend: backend.to_string(),
                },
            });
        }
    };

    match choices.into_iter().next().and_then(|c| c.message.content) {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(OcrError::EmptyResult {
            backend: backend.to_string(),
        }),
    }
}
