//! Request orchestration: validate, load, summarise.
//!
//! One call to [`Orchestrator::submit`] is one user request. Every failure is
//! terminal for that request; a new submit starts from scratch.

use crate::agent::{ProviderError, Summarizer, Summary};
use crate::document::LoadedDocument;
use crate::loader::{ContentLoader, FetchError, LoadError};
use crate::prompt::PromptTemplate;
use crate::source::SourceKind;
use crate::validate::{validate, ValidationError};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Where a request currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Loading,
    Summarizing,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Loading => "loading",
            Stage::Summarizing => "summarising",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl PipelineError {
    /// The message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(ValidationError::EmptyInput) => {
                "Please provide the URL".to_string()
            }
            PipelineError::Validation(ValidationError::MalformedUrl(_)) => {
                "Please provide a valid Url. It may be a Youtube video url or website url"
                    .to_string()
            }
            PipelineError::Load(LoadError::FetchFailure(cause)) => match cause {
                FetchError::Status(status) => {
                    format!("Could not fetch the page: the server answered {status}")
                }
                FetchError::Timeout => "Could not fetch the page: the request timed out".to_string(),
                FetchError::Network(e) => format!("Could not fetch the page: {e}"),
                FetchError::NoVideoId(_) => {
                    "This looks like a video link, but no video id was found in it".to_string()
                }
                FetchError::VideoUnavailable(reason) => {
                    format!("The video is not available: {reason}")
                }
                FetchError::NoTranscript(_) => "The video has no transcript to summarise".to_string(),
                FetchError::UnexpectedResponse(e) => format!("Could not read the video page: {e}"),
            },
            PipelineError::Load(LoadError::UnsupportedContent(e)) => {
                format!("No readable text to summarise: {e}")
            }
            PipelineError::Provider(e) => match e {
                ProviderError::Authentication(m) => {
                    format!("The LLM provider refused the API key: {m}")
                }
                ProviderError::RateLimited(m) => {
                    format!("The LLM provider rate limit or quota was hit: {m}")
                }
                ProviderError::Network(m) => format!("Could not reach the LLM provider: {m}"),
                ProviderError::Rejected { status, message } => {
                    format!("The LLM provider rejected the request ({status}): {message}")
                }
                ProviderError::MalformedResponse(m) => {
                    format!("The LLM provider sent an unusable response: {m}")
                }
            },
        }
    }
}

/// Result of one request
#[derive(Debug)]
pub struct Submission {
    /// Stages passed through, ending in `Done` or `Failed`
    pub trace: Vec<Stage>,
    /// How the URL was classified, when it got that far
    pub kind: Option<SourceKind>,
    pub outcome: Result<Summary, PipelineError>,
}

impl Submission {
    /// The stage the request ended in
    pub fn final_stage(&self) -> Stage {
        self.trace.last().copied().unwrap_or(Stage::Idle)
    }
}

/// Runs the validate → load → summarise sequence
pub struct Orchestrator<L, S> {
    loader: L,
    summarizer: S,
    template: PromptTemplate,
}

impl<L: ContentLoader, S: Summarizer> Orchestrator<L, S> {
    pub fn new(loader: L, summarizer: S, template: PromptTemplate) -> Self {
        Self {
            loader,
            summarizer,
            template,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    /// Run one request, reporting each stage to `on_stage` as it is entered
    pub async fn submit<F>(&self, raw: &str, mut on_stage: F) -> Submission
    where
        F: FnMut(Stage) + Send,
    {
        let mut trace = Vec::with_capacity(4);
        let mut enter = |stage: Stage| {
            info!(%stage, "stage");
            trace.push(stage);
            on_stage(stage);
        };

        let mut kind = None;
        let outcome = self.run(raw, &mut kind, &mut enter).await;

        match &outcome {
            Ok(summary) => {
                info!(chars = summary.text.len(), "summary ready");
                enter(Stage::Done);
            }
            Err(e) => {
                warn!("request failed: {e}");
                enter(Stage::Failed);
            }
        }

        Submission {
            trace,
            kind,
            outcome,
        }
    }

    /// Validate and load a URL without summarising it
    pub async fn extract(&self, raw: &str) -> Result<LoadedDocument, PipelineError> {
        let url = validate(raw)?;
        info!(url = %url, kind = %self.loader.classify(&url), "extracting");
        Ok(self.loader.load(&url).await?)
    }

    async fn run<F>(
        &self,
        raw: &str,
        kind: &mut Option<SourceKind>,
        enter: &mut F,
    ) -> Result<Summary, PipelineError>
    where
        F: FnMut(Stage) + Send,
    {
        enter(Stage::Validating);
        let url = validate(raw)?;
        *kind = Some(self.loader.classify(&url));

        enter(Stage::Loading);
        let document = self.loader.load(&url).await?;

        enter(Stage::Summarizing);
        let summary = self.summarizer.summarize(&document, &self.template).await?;
        Ok(summary)
    }
}
