//! Classification of a URL into the kind of source it points at.

use crate::validate::ValidatedUrl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Video platforms with a transcript strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoHost {
    YouTube,
}

impl VideoHost {
    pub const ALL: [VideoHost; 1] = [VideoHost::YouTube];

    /// Strings whose presence anywhere in a URL marks it as this host
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            VideoHost::YouTube => &["youtube.com", "youtu.be", "youtube-nocookie.com"],
        }
    }

    /// Registrable domains served by this host
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            VideoHost::YouTube => &["youtube.com", "youtu.be", "youtube-nocookie.com"],
        }
    }

    fn owns_host(self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains()
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }
}

impl fmt::Display for VideoHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoHost::YouTube => write!(f, "YouTube"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    VideoPage(VideoHost),
    GenericPage,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::VideoPage(host) => write!(f, "{host} video"),
            SourceKind::GenericPage => write!(f, "web page"),
        }
    }
}

/// How a URL is matched against the known video hosts.
///
/// `Substring` looks for a marker anywhere in the URL text, so
/// `https://example.com/?ref=youtube.com` is treated as a video page.
/// That misclassification is accepted; use `Host` to match on the
/// URL's host only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    #[default]
    Substring,
    Host,
}

/// Classify a validated URL
pub fn classify(url: &ValidatedUrl, policy: MatchPolicy) -> SourceKind {
    let hit = VideoHost::ALL.into_iter().find(|host| match policy {
        MatchPolicy::Substring => {
            let text = url.as_str().to_ascii_lowercase();
            host.markers().iter().any(|m| text.contains(m))
        }
        MatchPolicy::Host => url.host().is_some_and(|h| host.owns_host(h)),
    });

    match hit {
        Some(host) => SourceKind::VideoPage(host),
        None => SourceKind::GenericPage,
    }
}
