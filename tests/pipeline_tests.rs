mod common;

use common::{spawn_site, Canned, MockLoader, MockSummarizer, WITHHELD_VIDEO};
use urlsumma::config::FetchConfig;
use urlsumma::loader::{FetchError, LoadError, WebLoader};
use urlsumma::prompt::PromptTemplate;
use urlsumma::source::{SourceKind, VideoHost};
use urlsumma::validate::ValidationError;
use urlsumma::{Orchestrator, PipelineError, Stage};

const SUCCESS_TRACE: [Stage; 4] = [
    Stage::Validating,
    Stage::Loading,
    Stage::Summarizing,
    Stage::Done,
];

fn orchestrator(
    canned: Canned,
    summarizer: MockSummarizer,
) -> Orchestrator<MockLoader, MockSummarizer> {
    Orchestrator::new(MockLoader::new(canned), summarizer, PromptTemplate::default())
}

#[tokio::test]
async fn summary_is_shown_unchanged() {
    let orchestrator = orchestrator(
        Canned::Text(vec!["Rust 1.0 shipped in May 2015.", "It has no GC."]),
        MockSummarizer::replying("This article discusses..."),
    );

    let submission = orchestrator
        .submit("https://example.com/article", |_| {})
        .await;

    assert_eq!(submission.trace, SUCCESS_TRACE);
    assert_eq!(submission.final_stage(), Stage::Done);
    assert_eq!(submission.kind, Some(SourceKind::GenericPage));
    assert_eq!(submission.outcome.unwrap().text, "This article discusses...");
}

#[tokio::test]
async fn prompt_carries_all_segments_in_order() {
    let summarizer = MockSummarizer::replying("ok");
    let orchestrator = Orchestrator::new(
        MockLoader::new(Canned::Text(vec!["first part", "second part"])),
        summarizer,
        PromptTemplate::new("Summarise:\n{text}\nEnd").unwrap(),
    );

    let submission = orchestrator.submit("https://example.com", |_| {}).await;
    assert!(submission.outcome.is_ok());

    assert_eq!(
        orchestrator.summarizer().prompts(),
        vec!["Summarise:\nfirst part\n\nsecond part\nEnd".to_string()]
    );
}

#[tokio::test]
async fn empty_input_fails_before_loading() {
    let orchestrator = orchestrator(
        Canned::Text(vec!["unused"]),
        MockSummarizer::replying("unused"),
    );

    for input in ["", "   ", "\n\t"] {
        let submission = orchestrator.submit(input, |_| {}).await;
        assert_eq!(submission.trace, [Stage::Validating, Stage::Failed]);
        assert_eq!(submission.kind, None);

        let err = submission.outcome.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(ValidationError::EmptyInput)));
        assert_eq!(err.user_message(), "Please provide the URL");
    }
    assert_eq!(orchestrator.loader().calls(), 0);
}

#[tokio::test]
async fn malformed_input_fails_before_loading() {
    let orchestrator = orchestrator(
        Canned::Text(vec!["unused"]),
        MockSummarizer::replying("unused"),
    );

    for input in ["not a url", "htp://bad"] {
        let submission = orchestrator.submit(input, |_| {}).await;
        assert_eq!(submission.final_stage(), Stage::Failed);

        let err = submission.outcome.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::MalformedUrl(_))
        ));
        assert_eq!(
            err.user_message(),
            "Please provide a valid Url. It may be a Youtube video url or website url"
        );
    }
    assert_eq!(orchestrator.loader().calls(), 0);
}

#[tokio::test]
async fn loader_failure_stops_before_summarizing() {
    let orchestrator = orchestrator(Canned::Status(404), MockSummarizer::replying("unused"));

    let submission = orchestrator
        .submit("https://example.com/gone", |_| {})
        .await;

    assert_eq!(
        submission.trace,
        [Stage::Validating, Stage::Loading, Stage::Failed]
    );
    let err = submission.outcome.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Load(LoadError::FetchFailure(FetchError::Status(s))) if s.as_u16() == 404
    ));
    assert!(err.user_message().contains("404"));
}

#[tokio::test]
async fn unsupported_content_is_surfaced() {
    let orchestrator = orchestrator(Canned::Unsupported, MockSummarizer::replying("unused"));

    let err = orchestrator
        .submit("https://example.com/app", |_| {})
        .await
        .outcome
        .unwrap_err();

    assert!(matches!(err, PipelineError::Load(LoadError::UnsupportedContent(_))));
    assert!(err.user_message().starts_with("No readable text to summarise"));
}

#[tokio::test]
async fn provider_failures_end_in_failed() {
    for (status, needle) in [(401, "API key"), (429, "rate limit"), (413, "413")] {
        let orchestrator = orchestrator(
            Canned::Text(vec!["some text"]),
            MockSummarizer::failing(status),
        );

        let submission = orchestrator.submit("https://example.com", |_| {}).await;
        assert_eq!(
            submission.trace,
            [
                Stage::Validating,
                Stage::Loading,
                Stage::Summarizing,
                Stage::Failed
            ]
        );
        let message = submission.outcome.unwrap_err().user_message();
        assert!(message.contains(needle), "{message}");
    }
}

#[tokio::test]
async fn callback_sees_the_same_stages_as_the_trace() {
    let orchestrator = orchestrator(Canned::Text(vec!["text"]), MockSummarizer::replying("done"));

    let mut seen = Vec::new();
    let submission = orchestrator
        .submit("https://example.com", |stage| seen.push(stage))
        .await;

    assert_eq!(seen, submission.trace);
    assert!(seen.last().unwrap().is_terminal());
}

#[tokio::test]
async fn repeated_requests_behave_the_same() {
    let orchestrator = orchestrator(
        Canned::Text(vec!["deterministic"]),
        MockSummarizer::replying("same every time"),
    );
    let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    let first = orchestrator.submit(url, |_| {}).await;
    let second = orchestrator.submit(url, |_| {}).await;

    assert_eq!(first.kind, Some(SourceKind::VideoPage(VideoHost::YouTube)));
    assert_eq!(first.kind, second.kind);
    assert_eq!(first.trace, second.trace);
    assert_eq!(first.trace, SUCCESS_TRACE);
    assert_eq!(orchestrator.loader().calls(), 2);
}

#[tokio::test]
async fn marker_in_query_string_is_treated_as_video() {
    let orchestrator = orchestrator(Canned::Text(vec!["x"]), MockSummarizer::replying("y"));

    let submission = orchestrator
        .submit("https://example.com/?ref=youtube.com", |_| {})
        .await;

    assert_eq!(submission.kind, Some(SourceKind::VideoPage(VideoHost::YouTube)));
}

#[tokio::test]
async fn http_404_from_a_real_fetch_fails_the_request() {
    let addr = spawn_site().await;
    let loader = WebLoader::new(&FetchConfig::default()).unwrap();
    let orchestrator = Orchestrator::new(
        loader,
        MockSummarizer::replying("unused"),
        PromptTemplate::default(),
    );

    let submission = orchestrator
        .submit(&format!("http://{addr}/missing"), |_| {})
        .await;

    assert_eq!(
        submission.trace,
        [Stage::Validating, Stage::Loading, Stage::Failed]
    );
    assert!(matches!(
        submission.outcome,
        Err(PipelineError::Load(LoadError::FetchFailure(FetchError::Status(s)))) if s.as_u16() == 404
    ));
}

#[tokio::test]
async fn real_fetch_feeds_the_summarizer() {
    let addr = spawn_site().await;
    let loader = WebLoader::new(&FetchConfig::default()).unwrap();
    let orchestrator = Orchestrator::new(
        loader,
        MockSummarizer::replying("This article discusses..."),
        PromptTemplate::default(),
    );

    let submission = orchestrator
        .submit(&format!("http://{addr}/article"), |_| {})
        .await;

    assert_eq!(submission.trace, SUCCESS_TRACE);
    assert_eq!(submission.outcome.unwrap().text, "This article discusses...");
}

#[tokio::test]
async fn withheld_transcript_is_reported_as_missing() {
    let addr = spawn_site().await;
    let config = FetchConfig {
        video_base_url: format!("http://{addr}"),
        ..FetchConfig::default()
    };
    let orchestrator = Orchestrator::new(
        WebLoader::new(&config).unwrap(),
        MockSummarizer::replying("unused"),
        PromptTemplate::default(),
    );

    let submission = orchestrator
        .submit(&format!("https://youtu.be/{WITHHELD_VIDEO}"), |_| {})
        .await;

    assert_eq!(submission.final_stage(), Stage::Failed);
    assert_eq!(submission.kind, Some(SourceKind::VideoPage(VideoHost::YouTube)));
    let err = submission.outcome.unwrap_err();
    assert_eq!(err.user_message(), "The video has no transcript to summarise");
    assert!(orchestrator.summarizer().prompts().is_empty());
}

#[tokio::test]
async fn extract_returns_the_document_without_summarizing() {
    let orchestrator = orchestrator(
        Canned::Text(vec!["first part", "second part"]),
        MockSummarizer::replying("unused"),
    );

    let document = orchestrator.extract(" https://example.com/a ").await.unwrap();

    assert_eq!(document.content(), "first part\n\nsecond part");
    assert_eq!(orchestrator.loader().calls(), 1);
    assert!(orchestrator.summarizer().prompts().is_empty());
}

#[tokio::test]
async fn extract_failures_carry_user_messages() {
    let orchestrator = orchestrator(Canned::Status(404), MockSummarizer::replying("unused"));

    let err = orchestrator.extract("").await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(ValidationError::EmptyInput)));
    assert_eq!(err.user_message(), "Please provide the URL");

    let err = orchestrator.extract("not a url").await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Please provide a valid Url. It may be a Youtube video url or website url"
    );
    assert_eq!(orchestrator.loader().calls(), 0);

    let err = orchestrator.extract("https://example.com/gone").await.unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::FetchFailure(_))));
    assert!(err.user_message().contains("404"));
}
