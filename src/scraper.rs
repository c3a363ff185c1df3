//! Web scraping module for generic pages.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use crate::config::FetchConfig;
use crate::document::{DocumentMetadata, LoadedDocument, Segment};
use crate::loader::{FetchError, LoadError};
use crate::source::SourceKind;
use crate::validate::ValidatedUrl;
use lazy_static::lazy_static;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref BLOCKS: Selector =
        Selector::parse("p, h1, h2, h3, h4, h5, h6, li, blockquote, pre").unwrap();
    /// Regions that usually hold the main content, best first
    static ref MAIN_REGIONS: Vec<Selector> =
        ["article", "main", "[role='main']", ".content", "#content"]
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect();
}

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetches generic pages and strips them to readable text
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a configured HTTP client for scraping
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for page fetches");
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page and extract its text
    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<LoadedDocument, LoadError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status).into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let body = response.text().await.map_err(FetchError::from)?;
        info!(%status, bytes = body.len(), "page fetched");

        match content_type.as_deref().map(PageFormat::from_content_type) {
            Some(PageFormat::Other(mime)) => Err(LoadError::UnsupportedContent(format!(
                "{url} is {mime}, not a text page"
            ))),
            Some(PageFormat::Plain) => extract_plain(url.as_str(), &body),
            Some(PageFormat::Html) | None => extract_page(url.as_str(), &body),
        }
    }
}

enum PageFormat {
    Html,
    Plain,
    Other(String),
}

impl PageFormat {
    fn from_content_type(value: &str) -> Self {
        let mime = value.split(';').next().unwrap_or("").trim();
        match mime {
            "text/html" | "application/xhtml+xml" | "" => PageFormat::Html,
            "text/plain" | "text/markdown" => PageFormat::Plain,
            other => PageFormat::Other(other.to_string()),
        }
    }
}

/// Build a document from an HTML page
pub fn extract_page(url: &str, html: &str) -> Result<LoadedDocument, LoadError> {
    let document = Html::parse_document(html);

    let metadata = DocumentMetadata {
        title: extract_title(&document),
        ..DocumentMetadata::default()
    };
    let segments = extract_segments(&document);

    LoadedDocument::new(url, SourceKind::GenericPage, segments, metadata).ok_or_else(|| {
        LoadError::UnsupportedContent(format!("no readable text found at {url}"))
    })
}

/// Build a document from a plain-text response, one segment per paragraph
fn extract_plain(url: &str, body: &str) -> Result<LoadedDocument, LoadError> {
    let segments = body
        .split("\n\n")
        .map(collapse_whitespace)
        .map(Segment::new)
        .collect();

    LoadedDocument::new(url, SourceKind::GenericPage, segments, DocumentMetadata::default())
        .ok_or_else(|| LoadError::UnsupportedContent(format!("empty text at {url}")))
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    [&*TITLE, &*H1].into_iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(visible_text)
            .filter(|t| !t.is_empty())
    })
}

/// Extract readable blocks, preferring the main content region
fn extract_segments(document: &Html) -> Vec<Segment> {
    for selector in MAIN_REGIONS.iter() {
        if let Some(region) = document.select(selector).next() {
            let segments = blocks_in(region);
            if !segments.is_empty() {
                return segments;
            }
        }
    }

    let Some(body) = document.select(&BODY).next() else {
        return Vec::new();
    };

    let segments = blocks_in(body);
    if !segments.is_empty() {
        return segments;
    }

    // Pages that keep their text in bare divs
    let text = visible_text(body);
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment::new(text)]
    }
}

/// Outermost text blocks under `root`, in document order
fn blocks_in(root: ElementRef) -> Vec<Segment> {
    root.select(&BLOCKS)
        .filter(|element| {
            !element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| BLOCKS.matches(&ancestor))
        })
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .map(Segment::new)
        .collect()
}

/// Text of an element excluding scripts and styles, whitespace collapsed
fn visible_text(root: ElementRef) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_ELEMENTS.contains(&el.value().name()));
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
