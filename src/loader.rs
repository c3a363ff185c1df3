//! Content loading: picks a strategy for a URL and returns its text.
//!
//! Video pages go through [`crate::youtube`], everything else through
//! [`crate::scraper`].

use crate::config::FetchConfig;
use crate::document::LoadedDocument;
use crate::scraper::PageFetcher;
use crate::source::{classify, MatchPolicy, SourceKind, VideoHost};
use crate::validate::ValidatedUrl;
use crate::youtube::TranscriptFetcher;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

/// Why a source could not be fetched
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("server answered HTTP {0}")]
    Status(StatusCode),
    #[error("no video id found in {0}")]
    NoVideoId(String),
    #[error("video unavailable: {0}")]
    VideoUnavailable(String),
    #[error("no transcript available for video {0}")]
    NoTranscript(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = error.status() {
            FetchError::Status(status)
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch content: {0}")]
    FetchFailure(#[from] FetchError),
    #[error("unsupported content: {0}")]
    UnsupportedContent(String),
}

/// Turns a validated URL into a document
#[async_trait]
pub trait ContentLoader: Send + Sync {
    /// Which strategy `load` will use for this URL
    fn classify(&self, url: &ValidatedUrl) -> SourceKind;

    async fn load(&self, url: &ValidatedUrl) -> Result<LoadedDocument, LoadError>;
}

/// Loader backed by real HTTP fetches
pub struct WebLoader {
    policy: MatchPolicy,
    pages: PageFetcher,
    videos: TranscriptFetcher,
}

impl WebLoader {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            policy: config.match_policy,
            pages: PageFetcher::new(config)?,
            videos: TranscriptFetcher::new(config)?,
        })
    }
}

#[async_trait]
impl ContentLoader for WebLoader {
    fn classify(&self, url: &ValidatedUrl) -> SourceKind {
        classify(url, self.policy)
    }

    async fn load(&self, url: &ValidatedUrl) -> Result<LoadedDocument, LoadError> {
        let kind = self.classify(url);
        info!(url = %url, kind = %kind, "loading content");

        let document = match kind {
            SourceKind::VideoPage(VideoHost::YouTube) => self.videos.fetch(url).await?,
            SourceKind::GenericPage => self.pages.fetch(url).await?,
        };

        debug!(
            segments = document.segments().len(),
            chars = document.char_count(),
            "content loaded"
        );
        Ok(document)
    }
}
