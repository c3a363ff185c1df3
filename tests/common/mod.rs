#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use urlsumma::agent::{ProviderError, Summarizer, Summary};
use urlsumma::document::{DocumentMetadata, LoadedDocument, Segment};
use urlsumma::loader::{ContentLoader, FetchError, LoadError};
use urlsumma::prompt::PromptTemplate;
use urlsumma::source::{classify, MatchPolicy, SourceKind};
use urlsumma::validate::ValidatedUrl;

/// What the mock loader answers with
pub enum Canned {
    Text(Vec<&'static str>),
    Status(u16),
    Unsupported,
}

pub struct MockLoader {
    canned: Canned,
    pub calls: AtomicUsize,
}

impl MockLoader {
    pub fn new(canned: Canned) -> Self {
        Self {
            canned,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentLoader for MockLoader {
    fn classify(&self, url: &ValidatedUrl) -> SourceKind {
        classify(url, MatchPolicy::Substring)
    }

    async fn load(&self, url: &ValidatedUrl) -> Result<LoadedDocument, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Text(parts) => Ok(LoadedDocument::new(
                url.as_str(),
                self.classify(url),
                parts.iter().map(|p| Segment::new(*p)).collect(),
                DocumentMetadata::default(),
            )
            .expect("canned text is not blank")),
            Canned::Status(code) => Err(FetchError::Status(
                StatusCode::from_u16(*code).expect("valid status code"),
            )
            .into()),
            Canned::Unsupported => Err(LoadError::UnsupportedContent(
                "no readable text found".to_string(),
            )),
        }
    }
}

pub struct MockSummarizer {
    reply: Result<&'static str, u16>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockSummarizer {
    pub fn replying(text: &'static str) -> Self {
        Self {
            reply: Ok(text),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails like the provider answering with `status`
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        document: &LoadedDocument,
        template: &PromptTemplate,
    ) -> Result<Summary, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push(template.render(&document.content()));

        match self.reply {
            Ok(text) => Ok(Summary::new(text.to_string(), "mock-model")),
            Err(401) => Err(ProviderError::Authentication("Invalid API Key".to_string())),
            Err(429) => Err(ProviderError::RateLimited("quota exceeded".to_string())),
            Err(status) => Err(ProviderError::Rejected {
                status,
                message: "request too large".to_string(),
            }),
        }
    }
}

/// Video with an English caption track
pub const CAPTIONED_VIDEO: &str = "Cap7ionsVid";
/// Video whose player response lists no caption tracks
pub const UNCAPTIONED_VIDEO: &str = "NoCaptions1";
/// Video whose caption track serves an empty body
pub const WITHHELD_VIDEO: &str = "EmptyTrack1";

/// Serve canned HTTP responses on a local port.
///
/// Routes: `/article`, `/missing` (404), `/app` (script only), `/image` (PNG),
/// `/watch?v=<id>` (watch page) and `/timedtext?v=<id>` (captions).
pub async fn spawn_site() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let target = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, content_type, body) = route(addr, target);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn route(addr: SocketAddr, target: &str) -> (&'static str, &'static str, String) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let video_id = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .unwrap_or_default();

    match path {
        "/watch" => ("200 OK", "text/html; charset=utf-8", watch_page(addr, video_id)),
        "/timedtext" if video_id == CAPTIONED_VIDEO => (
            "200 OK",
            "text/xml; charset=UTF-8",
            r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">Ferris explains ownership</text><text start="1.5" dur="2">and borrowing &amp;amp; lifetimes</text></transcript>"#.to_string(),
        ),
        "/timedtext" => ("200 OK", "text/xml; charset=UTF-8", String::new()),
        _ => {
            let (status, content_type, body) = static_route(path);
            (status, content_type, body.to_string())
        }
    }
}

fn watch_page(addr: SocketAddr, video_id: &str) -> String {
    let mut player = serde_json::json!({
        "playabilityStatus": { "status": "OK" },
        "videoDetails": {
            "videoId": video_id,
            "title": "Ownership in Rust",
            "author": "Ferris",
            "lengthSeconds": "212"
        }
    });
    if video_id != UNCAPTIONED_VIDEO {
        player["captions"] = serde_json::json!({
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [{
                    "baseUrl": format!("http://{addr}/timedtext?v={video_id}&lang=en"),
                    "languageCode": "en"
                }]
            }
        });
    }
    format!("<html><body><script>var ytInitialPlayerResponse = {player};var meta = {{}};</script></body></html>")
}

fn static_route(path: &str) -> (&'static str, &'static str, &'static str) {
    match path {
        "/article" => (
            "200 OK",
            "text/html; charset=utf-8",
            "<html><head><title>Ferris</title></head><body><article><h1>Ferris the crab</h1><p>Ferris is the unofficial mascot of Rust.</p></article></body></html>",
        ),
        "/app" => (
            "200 OK",
            "text/html",
            "<html><body><div id=\"root\"></div><script>boot()</script></body></html>",
        ),
        "/image" => ("200 OK", "image/png", "PNG"),
        _ => ("404 Not Found", "text/html", "<html><body><h1>Not Found</h1></body></html>"),
    }
}
