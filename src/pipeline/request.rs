//! Request payload types for each backend shape.
//!
//! Private-ish serde types per backend, assembled from a
//! ([`SourceDocument`], [`BackendProfile`]) pair. The multipart backend has
//! no JSON payload; its body is built in [`crate::pipeline::encode`].

use crate::document::SourceDocument;
use crate::pipeline::encode;
use crate::profile::{BackendProfile, ResponseShape};
use serde::Serialize;

/// The JSON body for a [`RequestEncoding::Json`] backend, one variant per
/// response shape.
///
/// [`RequestEncoding::Json`]: crate::profile::RequestEncoding::Json
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JsonPayload {
    Layout(LayoutParsingRequest),
    Chat(ChatRequest),
}

/// Cloud layout-parsing body: `{model, file: dataURI}`.
#[derive(Debug, Serialize)]
pub struct LayoutParsingRequest {
    pub model: String,
    pub file: String,
}

/// OpenAI-compatible vision-chat body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Build the JSON payload for `profile` from `doc`.
///
/// The document bytes land in the body as a base64 data URI either way;
/// the shape decides whether the envelope is layout-parsing (`{model,
/// file}`) or a single-turn user message with a text part and an
/// `image_url` part.
pub fn build_json_payload(doc: &SourceDocument<'_>, profile: &BackendProfile) -> JsonPayload {
    let uri = encode::data_uri(doc.bytes, doc.mime_type);
    match profile.shape {
        ResponseShape::LayoutParsing => JsonPayload::Layout(LayoutParsingRequest {
            model: profile.model_id.clone(),
            file: uri,
        }),
        ResponseShape::ChatCompletions => JsonPayload::Chat(ChatRequest {
            model: profile.model_id.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: profile.prompt_text().to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl { url: uri },
                    },
                ],
            }],
            max_tokens: profile.max_tokens,
        }),
    }
}
