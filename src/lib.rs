//! # urlsumma
//!
//! A TUI application that summarises a YouTube video or a web page from its URL
//! using a hosted LLM.
//!
//! ## Features
//!
//! - **Two loaders**: video transcripts for YouTube links, readable text for everything else
//! - **Single pass**: the whole document goes into one prompt, the reply is shown as-is
//! - **Explicit failures**: every error maps to a message the user sees

pub mod agent;
pub mod config;
pub mod document;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod scraper;
pub mod source;
pub mod summary;
pub mod ui;
pub mod validate;
pub mod youtube;

pub use config::Config;
pub use document::LoadedDocument;
pub use pipeline::{Orchestrator, PipelineError, Stage, Submission};
pub use summary::Summary;

use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "urlsumma=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr, for one-shot CLI commands.
///
/// Honours `RUST_LOG`; defaults to info level for this crate.
pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to a file, so the TUI keeps the terminal to itself
pub fn setup_file_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
