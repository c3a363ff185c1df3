//! urlsumma CLI - summarise a YouTube video or web page from its URL
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use urlsumma::agent::GroqClient;
use urlsumma::loader::WebLoader;
use urlsumma::{ui, Config, Orchestrator, PipelineError};

#[derive(Parser)]
#[command(name = "urlsumma")]
#[command(author, version, about = "TUI for summarising YouTube videos and web pages", long_about = None)]
struct Cli {
    /// Path to a config file (default: ./urlsumma.toml or ~/.config/urlsumma/urlsumma.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip TLS certificate verification when fetching web pages (unsafe)
    #[arg(long, global = true)]
    insecure: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a single URL and print the result
    Summarise {
        /// URL of a YouTube video or web page
        url: String,
        /// Show the extracted text instead of a summary
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.insecure {
        config.fetch.accept_invalid_certs = true;
    }

    match cli.command {
        Some(Commands::Summarise { url, raw }) => {
            urlsumma::setup_logging();
            let orchestrator = build_orchestrator(&config)?;

            if raw {
                show_raw(&orchestrator, &url).await
            } else {
                summarise(&orchestrator, &url).await
            }
        }
        None => {
            // Default: Launch the TUI
            if let Some(cache) = dirs::cache_dir() {
                urlsumma::setup_file_logging(&cache.join("urlsumma").join("urlsumma.log"))?;
            }
            let orchestrator = build_orchestrator(&config)?;
            ui::run(Arc::new(orchestrator)).await
        }
    }
}

fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator<WebLoader, GroqClient>> {
    let loader = WebLoader::new(&config.fetch)?;
    let summarizer = GroqClient::from_config(config)?;
    Ok(Orchestrator::new(loader, summarizer, config.prompt_template()?))
}

async fn summarise(
    orchestrator: &Orchestrator<WebLoader, GroqClient>,
    url: &str,
) -> anyhow::Result<()> {
    eprintln!("Summarising: {}", url);

    let submission = orchestrator
        .submit(url, |stage| eprintln!("{}", format!("… {stage}").dimmed()))
        .await;

    match submission.outcome {
        Ok(summary) => {
            println!("{}", summary.text);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

/// Report a failed request the way the TUI does and exit non-zero
fn fail(error: &PipelineError) -> ! {
    eprintln!("{} {}", "error:".red().bold(), error.user_message());
    std::process::exit(1);
}

/// Print the extracted document without calling the LLM
async fn show_raw(
    orchestrator: &Orchestrator<WebLoader, GroqClient>,
    url: &str,
) -> anyhow::Result<()> {
    eprintln!("Fetching: {}", url);

    let document = match orchestrator.extract(url).await {
        Ok(document) => document,
        Err(e) => fail(&e),
    };
    println!("Source: {}", document.kind());
    let meta = document.metadata();
    let title = meta.title.clone().unwrap_or_else(|| "No title".to_string());

    println!("\n=== {} ===\n", title.bold());
    if let Some(author) = &meta.author {
        println!("By: {}", author);
    }
    if let Some(length) = meta.length {
        let secs = length.as_secs();
        println!("Length: {}:{:02}", secs / 60, secs % 60);
    }
    if let Some(language) = &meta.language {
        println!("Language: {}", language);
    }
    println!("{}", document.content());
    println!(
        "\n--- Extracted {} characters in {} segments ---",
        document.char_count(),
        document.segments().len()
    );
    Ok(())
}
