//! LoadedDocument - normalized text produced by the content loaders.

use crate::source::SourceKind;
use std::time::Duration;

/// Optional facts about where the text came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Page or video title
    pub title: Option<String>,
    /// Channel or author name, when the source exposes one
    pub author: Option<String>,
    /// Running time of a video
    pub length: Option<Duration>,
    /// Language code of a transcript
    pub language: Option<String>,
}

/// One block of extracted text, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Text extracted from a single URL.
///
/// Built once by a loader and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    url: String,
    kind: SourceKind,
    segments: Vec<Segment>,
    metadata: DocumentMetadata,
}

impl LoadedDocument {
    /// Returns `None` when there is no non-blank segment
    pub fn new(
        url: impl Into<String>,
        kind: SourceKind,
        segments: Vec<Segment>,
        metadata: DocumentMetadata,
    ) -> Option<Self> {
        let segments: Vec<Segment> = segments
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .collect();

        if segments.is_empty() {
            return None;
        }

        Some(Self {
            url: url.into(),
            kind,
            segments,
            metadata,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// All segments joined in order, separated by blank lines
    pub fn content(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Character count of `content()`
    pub fn char_count(&self) -> usize {
        self.content().chars().count()
    }
}
