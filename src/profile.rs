//! Backend profiles: how to reach and speak to one specific OCR service.
//!
//! All per-backend behaviour is data, not control flow. A [`BackendProfile`]
//! carries the endpoint, the request encoding, and the response shape; the
//! adapter in [`crate::adapter`] is the single code path that consumes it.
//! Adding a backend means adding a profile (and, if its envelope is new, a
//! [`ResponseShape`] variant), never another copy of the request/response
//! plumbing.
//!
//! # Design choice: builder over constructor
//! Profiles are resolved from user settings at call time, and most callers
//! only change one or two fields of a preset. The builder lets them do that
//! without a ten-argument constructor, and `build()` is the one place where
//! cross-field validation lives.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};

/// How the request body is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestEncoding {
    /// JSON body with the document embedded as a base64 data URI.
    Json,
    /// multipart/form-data body with raw file bytes and a prompt part.
    Multipart,
}

/// Which envelope the backend wraps its result (and its errors) in.
///
/// This is the tagged-variant response descriptor: it drives both the JSON
/// payload layout for [`RequestEncoding::Json`] and the classification of
/// the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseShape {
    /// Cloud layout-parsing API: request `{model, file}`, success
    /// `{code, msg, data: {md_result}}`, error `{code, msg}`.
    LayoutParsing,
    /// OpenAI-compatible chat API: request `{model, messages, max_tokens}`,
    /// success `{choices: [{message: {content}}]}`, error
    /// `{error: {message, type}}` or bare `{message}`.
    ChatCompletions,
}

/// Known backend identifiers used for settings/CLI lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Cloud,
    LocalMultipart,
    LocalChat,
}

impl BackendKind {
    /// Parse a settings/CLI string into a backend kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cloud" => Some(Self::Cloud),
            "local-multipart" => Some(Self::LocalMultipart),
            "local-chat" => Some(Self::LocalChat),
            _ => None,
        }
    }
}

/// Configuration describing one OCR backend.
///
/// Immutable once built; resolved from current settings once per conversion
/// call (settings may change between calls, so profiles are never cached).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendProfile {
    /// Human-readable backend label; becomes the model label on success
    /// results and the backend name in every error message.
    pub name: String,

    /// Scheme + host (+ optional port), no trailing slash.
    pub base_url: String,

    /// API key, sent as `Authorization: Bearer <key>` when present.
    /// Local backends typically run unauthenticated and leave this unset.
    pub api_key: Option<String>,

    /// Request body encoding.
    pub encoding: RequestEncoding,

    /// Response envelope descriptor.
    pub shape: ResponseShape,

    /// Sub-path the conversion POST goes to.
    pub convert_path: String,

    /// Sub-path probed by `test_connection` before falling back to `/`.
    pub health_path: String,

    /// Model identifier sent in JSON payloads.
    pub model_id: String,

    /// Instructional prompt override. `None` uses
    /// [`crate::prompts::DEFAULT_OCR_PROMPT`].
    pub prompt: Option<String>,

    /// Completion-token cap for chat-style backends. Dense scans can exceed
    /// 2 000 output tokens; setting this too low truncates the Markdown
    /// mid-sentence. Ignored by the layout-parsing shape.
    pub max_tokens: Option<u32>,
}

impl BackendProfile {
    /// Cloud layout-parsing backend.
    ///
    /// The key is required at request time; the profile itself builds
    /// without one so the settings surface can construct it before the user
    /// has pasted a key.
    pub fn cloud(api_key: impl Into<String>) -> Self {
        Self {
            name: "cloud".to_string(),
            base_url: "https://open.bigmodel.cn".to_string(),
            api_key: Some(api_key.into()),
            encoding: RequestEncoding::Json,
            shape: ResponseShape::LayoutParsing,
            convert_path: "/api/paas/v4/layout_parsing".to_string(),
            health_path: "/api/paas/v4/models".to_string(),
            model_id: "glm-4v-flash".to_string(),
            prompt: None,
            max_tokens: None,
        }
    }

    /// Local inference server accepting multipart uploads
    /// (`file` + `prompt` fields) on the OpenAI-compatible chat path.
    pub fn local_multipart(base_url: impl Into<String>) -> Self {
        Self {
            name: "local-multipart".to_string(),
            base_url: normalise_base_url(base_url.into()),
            api_key: None,
            encoding: RequestEncoding::Multipart,
            shape: ResponseShape::ChatCompletions,
            convert_path: "/v1/chat/completions".to_string(),
            health_path: "/v1/models".to_string(),
            model_id: "deepseek-ocr".to_string(),
            prompt: None,
            max_tokens: None,
        }
    }

    /// Local OpenAI-compatible vision-chat server (Ollama, LM Studio, vLLM).
    pub fn local_chat(base_url: impl Into<String>) -> Self {
        Self {
            name: "local-chat".to_string(),
            base_url: normalise_base_url(base_url.into()),
            api_key: None,
            encoding: RequestEncoding::Json,
            shape: ResponseShape::ChatCompletions,
            convert_path: "/chat/completions".to_string(),
            health_path: "/v1/models".to_string(),
            model_id: "llava".to_string(),
            prompt: None,
            max_tokens: Some(4096),
        }
    }

    /// Preset for a known backend kind.
    pub fn preset(kind: BackendKind, endpoint_or_key: impl Into<String>) -> Self {
        match kind {
            BackendKind::Cloud => Self::cloud(endpoint_or_key),
            BackendKind::LocalMultipart => Self::local_multipart(endpoint_or_key),
            BackendKind::LocalChat => Self::local_chat(endpoint_or_key),
        }
    }

    /// Start a builder for a custom backend.
    pub fn builder(name: impl Into<String>) -> BackendProfileBuilder {
        BackendProfileBuilder {
            profile: Self {
                name: name.into(),
                base_url: String::new(),
                api_key: None,
                encoding: RequestEncoding::Json,
                shape: ResponseShape::ChatCompletions,
                convert_path: "/chat/completions".to_string(),
                health_path: "/v1/models".to_string(),
                model_id: String::new(),
                prompt: None,
                max_tokens: None,
            },
        }
    }

    /// Full URL for the conversion POST.
    pub fn convert_url(&self) -> String {
        format!("{}{}", self.base_url, self.convert_path)
    }

    /// Full URL for the health probe.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    /// Fallback URL probed when the health path does not answer 200.
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// The instructional prompt this profile sends.
    pub fn prompt_text(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_OCR_PROMPT)
    }

    /// Checks required at request time rather than build time: a cloud
    /// profile without a key is constructible (the settings UI needs that)
    /// but not usable.
    pub(crate) fn check_usable(&self) -> Result<(), OcrError> {
        if self.shape == ResponseShape::LayoutParsing
            && self.api_key.as_deref().unwrap_or("").is_empty()
        {
            return Err(OcrError::Config {
                backend: self.name.clone(),
                detail: "API key is not set".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for a custom [`BackendProfile`].
#[derive(Debug)]
pub struct BackendProfileBuilder {
    profile: BackendProfile,
}

impl BackendProfileBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.profile.base_url = normalise_base_url(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.profile.api_key = Some(key.into());
        self
    }

    pub fn encoding(mut self, encoding: RequestEncoding) -> Self {
        self.profile.encoding = encoding;
        self
    }

    pub fn shape(mut self, shape: ResponseShape) -> Self {
        self.profile.shape = shape;
        self
    }

    pub fn convert_path(mut self, path: impl Into<String>) -> Self {
        self.profile.convert_path = path.into();
        self
    }

    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.profile.health_path = path.into();
        self
    }

    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.profile.model_id = model.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.profile.prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.profile.max_tokens = Some(n);
        self
    }

    /// Build the profile, validating constraints.
    pub fn build(self) -> Result<BackendProfile, OcrError> {
        let p = &self.profile;
        if p.base_url.is_empty() {
            return Err(OcrError::Config {
                backend: p.name.clone(),
                detail: "base URL must not be empty".to_string(),
            });
        }
        if !p.base_url.starts_with("http://") && !p.base_url.starts_with("https://") {
            return Err(OcrError::Config {
                backend: p.name.clone(),
                detail: format!("base URL '{}' must start with http:// or https://", p.base_url),
            });
        }
        if p.model_id.is_empty() {
            return Err(OcrError::Config {
                backend: p.name.clone(),
                detail: "model id must not be empty".to_string(),
            });
        }
        if !p.convert_path.starts_with('/') {
            return Err(OcrError::Config {
                backend: p.name.clone(),
                detail: format!("convert path '{}' must start with '/'", p.convert_path),
            });
        }
        Ok(self.profile)
    }
}

fn normalise_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
