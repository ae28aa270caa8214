//! CLI binary for ocr2md.
//!
//! A thin shim playing the host-application role: it reads the input file,
//! resolves a backend profile from flags and environment, runs the
//! conversion, and persists the rendered note.

use anyhow::{bail, Context, Result};
use clap::Parser;
use ocr2md::{
    convert, guess_mime_type, test_connection, BackendKind, BackendProfile, ConversionResult,
    SourceDocument,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a scan with a local Ollama/LM Studio style server (stdout)
  ocr2md scan.png --backend local-chat --endpoint http://localhost:11434

  # Convert a PDF through the cloud layout-parsing API into a note
  OCR2MD_API_KEY=sk-... ocr2md report.pdf --backend cloud -o report.md

  # Local multipart inference server
  ocr2md invoice.pdf --backend local-multipart --endpoint http://localhost:8000 -o invoice.md

  # Check a backend is reachable before converting
  ocr2md --test-connection --backend local-chat --endpoint http://localhost:11434 scan.png

  # Structured output for scripting
  ocr2md scan.png --json > result.json

BACKENDS:
  cloud            JSON {model, file: dataURI} → /api/paas/v4/layout_parsing (needs API key)
  local-multipart  multipart file+prompt       → /v1/chat/completions
  local-chat       vision-chat messages        → /chat/completions

ENVIRONMENT VARIABLES:
  OCR2MD_API_KEY    API key for the cloud backend
  OCR2MD_ENDPOINT   Base URL for local backends (e.g. http://localhost:11434)
  OCR2MD_BACKEND    Default backend name
"#;

/// Convert PDFs and scanned images to Markdown notes via OCR backends.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "Convert PDFs and scanned images to Markdown notes via OCR backends",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF or image to convert.
    input: PathBuf,

    /// Write the rendered note to this file instead of stdout.
    #[arg(short, long, env = "OCR2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Backend: cloud, local-multipart, local-chat.
    #[arg(long, env = "OCR2MD_BACKEND", default_value = "local-chat")]
    backend: String,

    /// Base URL of a local backend (e.g. http://localhost:11434).
    #[arg(long, env = "OCR2MD_ENDPOINT", default_value = "http://localhost:11434")]
    endpoint: String,

    /// API key for the cloud backend.
    #[arg(long, env = "OCR2MD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the backend's default model id.
    #[arg(long, env = "OCR2MD_MODEL")]
    model: Option<String>,

    /// Completion-token cap for chat-style backends.
    #[arg(long, env = "OCR2MD_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Path to a text file containing a custom OCR prompt.
    #[arg(long, env = "OCR2MD_PROMPT")]
    prompt_file: Option<PathBuf>,

    /// Override the MIME type instead of guessing from the extension.
    #[arg(long)]
    mime: Option<String>,

    /// Print the ConversionResult as JSON instead of the note body.
    #[arg(long)]
    json: bool,

    /// Probe the backend's health endpoint and exit.
    #[arg(long)]
    test_connection: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let profile = build_profile(&cli).await?;

    // ── Connection test mode ─────────────────────────────────────────────
    if cli.test_connection {
        let report = test_connection(&profile).await;
        if report.ok {
            eprintln!("{} {}", green("✔"), report.detail);
            return Ok(());
        }
        eprintln!("{} {}", red("✘"), report.detail);
        std::process::exit(1);
    }

    // ── Read the document ────────────────────────────────────────────────
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read '{}'", cli.input.display()))?;
    let filename = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let mime = match cli.mime.as_deref() {
        Some(m) => m,
        None => guess_mime_type(filename).with_context(|| {
            format!(
                "Cannot guess a MIME type for '{filename}'. \
                 Pass --mime (e.g. --mime application/pdf)."
            )
        })?,
    };
    let doc = SourceDocument::new(&bytes, filename, mime);

    // ── Convert ──────────────────────────────────────────────────────────
    let outcome = convert(&doc, &profile).await;
    let result = ConversionResult::from_outcome(&outcome, &doc);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if let Err(e) = &outcome {
            eprintln!("{} {}", red("✘"), e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let extraction = match outcome {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            std::process::exit(1);
        }
    };

    // ── Persist the note ─────────────────────────────────────────────────
    let note = result.render_note();
    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &note)?;
        if !cli.quiet {
            eprintln!(
                "{} '{}' → {}  ({} chars, backend {})",
                green("✔"),
                filename,
                bold(&output_path.display().to_string()),
                extraction.markdown.len(),
                extraction.model_label,
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(note.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to a `BackendProfile`.
async fn build_profile(cli: &Cli) -> Result<BackendProfile> {
    let kind = match BackendKind::parse(&cli.backend) {
        Some(k) => k,
        None => bail!(
            "Unknown backend '{}'. Expected: cloud, local-multipart, local-chat.",
            cli.backend
        ),
    };

    let mut profile = match kind {
        BackendKind::Cloud => {
            let key = cli.api_key.clone().unwrap_or_default();
            if key.is_empty() {
                bail!("The cloud backend needs an API key. Pass --api-key or set OCR2MD_API_KEY.");
            }
            BackendProfile::cloud(key)
        }
        BackendKind::LocalMultipart => BackendProfile::local_multipart(cli.endpoint.clone()),
        BackendKind::LocalChat => BackendProfile::local_chat(cli.endpoint.clone()),
    };

    if let Some(ref model) = cli.model {
        profile.model_id = model.clone();
    }
    if let Some(n) = cli.max_tokens {
        profile.max_tokens = Some(n);
    }
    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        profile.prompt = Some(prompt);
    }

    Ok(profile)
}

/// Atomic write: temp file in the target directory, then rename.
fn write_atomic(path: &PathBuf, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write '{}'", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move note into place at '{}'", path.display()))?;
    Ok(())
}
