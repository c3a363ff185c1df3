//! YouTube transcript extraction.
//!
//! Reads the player response embedded in the public watch page, picks a
//! caption track and downloads its timed-text XML.

use crate::config::{FetchConfig, BROWSER_USER_AGENT};
use crate::document::{DocumentMetadata, LoadedDocument, Segment};
use crate::loader::{FetchError, LoadError};
use crate::source::{SourceKind, VideoHost};
use crate::validate::ValidatedUrl;
use lazy_static::lazy_static;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info};

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

lazy_static! {
    static ref ID_PATTERNS: Vec<Regex> = [
        r"youtube(?:-nocookie)?\.com/(?:.*[?&])?v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube(?:-nocookie)?\.com/(?:embed|shorts|live|v)/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
    static ref TEXT_ENTRY: Regex = Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").unwrap();
    static ref INNER_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref ENTITY: Regex =
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap();
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    author: Option<String>,
    length_seconds: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Tracklist,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// A caption track listed in the player response
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `asr` for auto-generated captions
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn is_english(&self) -> bool {
        self.language_code == "en" || self.language_code.starts_with("en-")
    }
}

/// What the watch page tells us about a video
#[derive(Debug)]
pub struct VideoInfo {
    pub metadata: DocumentMetadata,
    pub tracks: Vec<CaptionTrack>,
}

/// Fetches transcripts from YouTube
pub struct TranscriptFetcher {
    client: Client,
    /// Watch page endpoint, `{video_base_url}/watch`
    watch_url: String,
}

impl TranscriptFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        let watch_url = format!("{}/watch", config.video_base_url.trim_end_matches('/'));

        Ok(Self { client, watch_url })
    }

    /// Fetch the transcript and details of the video a URL points at
    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<LoadedDocument, LoadError> {
        let video_id = extract_video_id(url.as_str())
            .ok_or_else(|| FetchError::NoVideoId(url.to_string()))?;

        let watch_url = format!("{}?v={video_id}&hl=en", self.watch_url);
        let page = self.get_text(&watch_url).await?;
        let info = parse_watch_page(&page, &video_id)?;
        info!(video_id = %video_id, tracks = info.tracks.len(), "video details loaded");

        let track = select_track(&info.tracks)
            .ok_or_else(|| FetchError::NoTranscript(video_id.clone()))?;
        debug!(language = %track.language_code, generated = track.is_generated(), "caption track selected");

        let xml = self.get_text(&track.base_url).await?;
        let transcript = parse_timed_text(&xml);

        let metadata = DocumentMetadata {
            language: Some(track.language_code.clone()),
            ..info.metadata
        };

        LoadedDocument::new(
            url.as_str(),
            SourceKind::VideoPage(VideoHost::YouTube),
            vec![Segment::new(transcript)],
            metadata,
        )
        // An empty timed-text body is how captions are withheld
        .ok_or_else(|| FetchError::NoTranscript(video_id).into())
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }
}

/// Extract video ID from the common YouTube URL formats
pub fn extract_video_id(url: &str) -> Option<String> {
    ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Read video details and caption tracks out of a watch page
pub fn parse_watch_page(html: &str, video_id: &str) -> Result<VideoInfo, FetchError> {
    let player = extract_player_response(html).ok_or_else(|| {
        FetchError::UnexpectedResponse(format!("no player response in watch page for {video_id}"))
    })?;

    if let Some(playability) = &player.playability_status {
        if playability.status != "OK" {
            let reason = playability
                .reason
                .clone()
                .unwrap_or_else(|| playability.status.clone());
            return Err(FetchError::VideoUnavailable(reason));
        }
    }

    let details = player.video_details;
    let metadata = DocumentMetadata {
        title: details.as_ref().and_then(|d| d.title.clone()),
        author: details.as_ref().and_then(|d| d.author.clone()),
        length: details
            .as_ref()
            .and_then(|d| d.length_seconds.as_deref())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs),
        language: None,
    };

    let tracks = player
        .captions
        .map(|c| c.tracklist.caption_tracks)
        .unwrap_or_default();

    Ok(VideoInfo { metadata, tracks })
}

fn extract_player_response(html: &str) -> Option<PlayerResponse> {
    let marker = html.find(PLAYER_RESPONSE_MARKER)?;
    let rest = &html[marker..];
    let start = rest.find('{')?;

    // The JSON object is followed by more script; read only the first value
    serde_json::Deserializer::from_str(&rest[start..])
        .into_iter::<PlayerResponse>()
        .next()?
        .ok()
}

/// Manual English captions, then generated English, then whatever is first
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.is_english() && !t.is_generated())
        .or_else(|| tracks.iter().find(|t| t.is_english()))
        .or_else(|| tracks.first())
}

/// Join the `<text>` entries of a timed-text document into one string
pub fn parse_timed_text(xml: &str) -> String {
    let lines: Vec<String> = TEXT_ENTRY
        .captures_iter(xml)
        .map(|caps| {
            // Caption text is usually entity-escaped twice
            let once = unescape(&caps[1]);
            let twice = unescape(&once);
            let plain = INNER_TAG.replace_all(&twice, " ");
            plain.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    lines.join(" ")
}

/// Decode XML and HTML5 entities one at a time; unknown ones stay as written
fn unescape(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let entity = &caps[0];
        unescape_with(entity, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| entity.to_string())
    })
}
