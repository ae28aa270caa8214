//! The adapter's public contract: [`convert`] and [`test_connection`].
//!
//! One conversion call is one HTTP POST: no retry, no backoff, no shared
//! state between calls. The profile is consumed as-is (the caller resolves
//! it from current settings each time), the document is read once, and the
//! outcome is handed back for the caller to persist. The adapter is safe to
//! invoke concurrently for independent documents; ordering between
//! concurrent calls is not guaranteed.

use crate::document::SourceDocument;
use crate::error::OcrError;
use crate::note::{Extraction, OcrOutcome};
use crate::pipeline::{encode, request, response};
use crate::profile::{BackendProfile, RequestEncoding};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for the lightweight health probes. Conversion calls
/// deliberately carry no client-side timeout beyond the transport default.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Convert one document through the given backend.
///
/// Exactly one of `Ok`/`Err` per call; transport exceptions, unparseable
/// bodies and backend-reported failures all come back as [`OcrError`]
/// variants, never as panics or raw client errors.
pub async fn convert(doc: &SourceDocument<'_>, profile: &BackendProfile) -> OcrOutcome {
    profile.check_usable()?;
    let client = http_client(&profile.name)?;
    convert_with_client(&client, doc, profile).await
}

/// [`convert`] with a caller-supplied client, for hosts that pool
/// connections across conversions.
pub async fn convert_with_client(
    client: &Client,
    doc: &SourceDocument<'_>,
    profile: &BackendProfile,
) -> OcrOutcome {
    profile.check_usable()?;

    let url = profile.convert_url();
    info!(
        "Converting '{}' ({} bytes, {}) via backend '{}'",
        doc.filename,
        doc.bytes.len(),
        doc.mime_type,
        profile.name
    );

    // ── Step 1: Encode the request body ──────────────────────────────────
    let mut req = client.post(&url);
    if let Some(key) = profile.api_key.as_deref().filter(|k| !k.is_empty()) {
        req = req.bearer_auth(key);
    }
    req = match profile.encoding {
        RequestEncoding::Json => req.json(&request::build_json_payload(doc, profile)),
        RequestEncoding::Multipart => {
            let m = encode::multipart_body(doc, profile.prompt_text());
            req.header(reqwest::header::CONTENT_TYPE, m.content_type)
                .body(m.body)
        }
    };

    // ── Step 2: One POST, run to completion ──────────────────────────────
    let resp = req.send().await.map_err(|e| {
        warn!("Backend '{}': transport failure: {}", profile.name, e);
        OcrError::Transport {
            backend: profile.name.clone(),
            detail: e.to_string(),
        }
    })?;

    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(|e| {
        warn!(
            "Backend '{}': failed reading response body (HTTP {}): {}",
            profile.name, status, e
        );
        OcrError::Transport {
            backend: profile.name.clone(),
            detail: format!("failed reading response body: {e}"),
        }
    })?;
    debug!(
        "Backend '{}': HTTP {}, {} byte body",
        profile.name,
        status,
        body.len()
    );

    // ── Step 3: Classify ─────────────────────────────────────────────────
    match response::classify(profile.shape, &profile.name, status, &body) {
        Ok(markdown) => {
            info!(
                "Backend '{}': extracted {} bytes of markdown from '{}'",
                profile.name,
                markdown.len(),
                doc.filename
            );
            Ok(Extraction {
                markdown,
                model_label: profile.name.clone(),
            })
        }
        Err(err) => {
            warn!("Backend '{}': {} (HTTP {})", profile.name, err, status);
            Err(err)
        }
    }
}

/// Outcome of a connection probe: a boolean plus the caller-visible
/// diagnostic the settings surface shows next to its "test connection"
/// button.
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    pub ok: bool,
    pub detail: String,
}

/// Probe the backend's health path; on anything but 200, try the bare root
/// once before declaring failure.
///
/// Never returns an error: connection refusal, DNS failure and non-200
/// statuses all fold into `ok = false` with a diagnostic `detail`.
pub async fn test_connection(profile: &BackendProfile) -> ConnectionReport {
    let client = match http_client(&profile.name) {
        Ok(c) => c,
        Err(e) => {
            return ConnectionReport {
                ok: false,
                detail: e.to_string(),
            }
        }
    };

    let health_url = profile.health_url();
    let primary = probe(&client, &health_url).await;
    if let Ok(200) = primary {
        return ConnectionReport {
            ok: true,
            detail: format!("{health_url} answered HTTP 200"),
        };
    }

    let root_url = profile.root_url();
    debug!(
        "Backend '{}': health path did not answer 200, falling back to {}",
        profile.name, root_url
    );
    let fallback = probe(&client, &root_url).await;
    if let Ok(200) = fallback {
        return ConnectionReport {
            ok: true,
            detail: format!("{root_url} answered HTTP 200"),
        };
    }

    let detail = format!(
        "{} ({}); {} ({})",
        health_url,
        describe(&primary),
        root_url,
        describe(&fallback),
    );
    warn!("Backend '{}': connection test failed: {}", profile.name, detail);
    ConnectionReport { ok: false, detail }
}

async fn probe(client: &Client, url: &str) -> Result<u16, String> {
    client
        .get(url)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .map(|r| r.status().as_u16())
        .map_err(|e| e.to_string())
}

fn describe(result: &Result<u16, String>) -> String {
    match result {
        Ok(status) => format!("HTTP {status}"),
        Err(detail) => detail.clone(),
    }
}

fn http_client(backend: &str) -> Result<Client, OcrError> {
    Client::builder().build().map_err(|e| OcrError::Transport {
        backend: backend.to_string(),
        detail: format!("failed to construct HTTP client: {e}"),
    })
}
