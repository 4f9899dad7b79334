//! End-to-end pipeline tests over the in-memory mocks.

use std::sync::Arc;

use newswire::testing::{
    DispatchErrorKind, MemoryContentStore, MemoryLedger, MemoryLogSink, MockGenerator,
    MockMessenger, MockPhotoResolver, MockSendCall, MockVideoFetcher,
};
use newswire::{
    DispatchTargets, DuplicateGate, ExtractedContent, GenerationCoordinator, Pipeline,
    PipelineSettings, ProcessingStatus, RetryPolicy, TelegramDispatcher, WebsiteDispatcher,
};

const ARTICLE_BODY: &str = "The finance ministry announced a revised budget framework on \
    Tuesday, shifting spending toward infrastructure and capping new borrowing for the \
    fiscal year. Analysts called the move a signal of tighter policy ahead.";

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay_ms: 1,
        max_delay_ms: 2,
    }
}

fn settings() -> PipelineSettings {
    PipelineSettings::new("@newsroom")
        .with_category("بورس")
        .with_retry(fast_retry())
}

fn item() -> ExtractedContent {
    ExtractedContent::new(
        "Budget framework revised ahead of fiscal year",
        "<p>The ministry published the revision on Tuesday morning...</p>",
        "The ministry published the revision on Tuesday morning...",
        "https://news.example/articles/budget-revision",
        "https://news.example/feed.xml",
    )
    .with_image_url("https://news.example/images/budget.jpg")
}

struct Harness {
    pipeline: Pipeline,
    generator: Arc<MockGenerator>,
    messenger: Arc<MockMessenger>,
    store: Arc<MemoryContentStore>,
    log_sink: Arc<MemoryLogSink>,
}

fn harness(
    generator: MockGenerator,
    messenger: MockMessenger,
    video_fetcher: MockVideoFetcher,
    resolver: MockPhotoResolver,
    ledger: MemoryLedger,
    settings: PipelineSettings,
) -> Harness {
    let generator = Arc::new(generator);
    let messenger = Arc::new(messenger);
    let store = Arc::new(MemoryContentStore::new());
    let log_sink = Arc::new(MemoryLogSink::new());

    let pipeline = Pipeline::new(
        GenerationCoordinator::new(generator.clone()),
        DuplicateGate::new(Arc::new(ledger)),
        TelegramDispatcher::new(
            messenger.clone(),
            Arc::new(video_fetcher),
            Arc::new(resolver),
        ),
        WebsiteDispatcher::new(store.clone()),
        log_sink.clone(),
        settings,
    );

    Harness {
        pipeline,
        generator,
        messenger,
        store,
        log_sink,
    }
}

#[tokio::test]
async fn both_channels_succeed() {
    let h = harness(
        MockGenerator::new()
            .with_response(ARTICLE_BODY)
            .with_response(format!("<p>{}</p>\nKEYWORDS: budget, fiscal", ARTICLE_BODY)),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    assert!(result.telegram.as_ref().unwrap().success);
    assert!(result.website.as_ref().unwrap().success);
    assert_eq!(h.generator.call_count(), 2);
    assert_eq!(h.store.article_count(), 1);
    assert_eq!(h.log_sink.record_count(), 1);
    assert!(matches!(
        h.messenger.calls().as_slice(),
        [MockSendCall::Photo { .. }]
    ));
}

#[tokio::test]
async fn duplicate_is_skipped_before_generation() {
    let ledger = MemoryLedger::new();
    ledger.add_entry(
        "https://news.example/feed.xml",
        "Budget framework revised ahead of fiscal year",
        "https://other.example/mirror",
    );
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        ledger,
        settings(),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::DuplicateSkip);
    assert_eq!(h.generator.call_count(), 0);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.log_sink.record_count(), 1);
    assert_eq!(
        h.log_sink.records()[0].status,
        ProcessingStatus::DuplicateSkip
    );
}

#[tokio::test]
async fn skip_flag_bypasses_duplicate_gate() {
    let ledger = MemoryLedger::new();
    ledger.add_entry(
        "https://news.example/feed.xml",
        "Budget framework revised ahead of fiscal year",
        "https://news.example/articles/budget-revision",
    );
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        ledger,
        settings(),
    );

    let targets = DispatchTargets::telegram_only().with_skip_duplicate_check();
    let result = h.pipeline.process_item(&item(), &targets).await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    assert_eq!(h.generator.call_count(), 1);
}

#[tokio::test]
async fn item_without_image_is_rejected_before_generation() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let no_image = ExtractedContent::new(
        "Headline only",
        "<p>Body text without any usable media attached.</p>",
        "Body text without any usable media attached.",
        "https://news.example/articles/text-only",
        "https://news.example/feed.xml",
    );
    let result = h.pipeline.process_item(&no_image, &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::NoImage);
    assert_eq!(h.generator.call_count(), 0);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.log_sink.record_count(), 1);
}

#[tokio::test]
async fn empty_targets_rejected_before_generation() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h
        .pipeline
        .process_item(&item(), &DispatchTargets::default())
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(result.telegram.is_none());
    assert!(result.website.is_none());
    assert_eq!(h.generator.call_count(), 0);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.log_sink.record_count(), 1);
}

#[tokio::test]
async fn video_failure_falls_back_to_photo() {
    // Download fails, the by-reference send exhausts its retries, and
    // the cascade lands on the photo tier.
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new().with_video_failures(vec![
            DispatchErrorKind::Network,
            DispatchErrorKind::Network,
        ]),
        MockVideoFetcher::new().with_failure(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let with_video = item().with_video_url("https://cdn.example/clip.mp4");
    let result = h
        .pipeline
        .process_item(&with_video, &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    let calls = h.messenger.calls();
    assert!(matches!(
        calls.as_slice(),
        [
            MockSendCall::Video { by_url: true, .. },
            MockSendCall::Video { by_url: true, .. },
            MockSendCall::Photo { .. },
        ]
    ));
}

#[tokio::test]
async fn video_success_skips_photo_tier() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let with_video = item().with_video_url("https://cdn.example/clip.mp4");
    let result = h
        .pipeline
        .process_item(&with_video, &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    assert!(matches!(
        h.messenger.calls().as_slice(),
        [MockSendCall::Video { by_url: false, .. }]
    ));
}

#[tokio::test]
async fn invalid_photo_rejects_item_without_text_fallback() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new().with_failure(DispatchErrorKind::InvalidMedia),
        MemoryLedger::new(),
        settings(),
    );

    let result = h
        .pipeline
        .process_item(&item(), &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(!result.telegram.as_ref().unwrap().success);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.log_sink.record_count(), 1);
}

#[tokio::test]
async fn rejected_recipient_aborts_cascade() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new().with_photo_failures(vec![DispatchErrorKind::Rejected]),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h
        .pipeline
        .process_item(&item(), &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    // one photo attempt, no retry, no text fallback
    assert!(matches!(
        h.messenger.calls().as_slice(),
        [MockSendCall::Photo { .. }]
    ));
}

#[tokio::test]
async fn network_exhaustion_falls_back_to_text() {
    let h = harness(
        MockGenerator::new(),
        MockMessenger::new().with_photo_failures(vec![
            DispatchErrorKind::Network,
            DispatchErrorKind::RateLimited,
        ]),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h
        .pipeline
        .process_item(&item(), &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    let calls = h.messenger.calls();
    assert!(matches!(
        calls.as_slice(),
        [
            MockSendCall::Photo { .. },
            MockSendCall::Photo { .. },
            MockSendCall::Text { .. },
        ]
    ));
}

#[tokio::test]
async fn one_channel_failure_is_partial() {
    let h = harness(
        MockGenerator::new()
            .with_response(ARTICLE_BODY)
            .with_response(format!("<p>{}</p>", ARTICLE_BODY)),
        MockMessenger::new().with_photo_failures(vec![DispatchErrorKind::Rejected]),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::PartialFailure);
    assert!(!result.telegram.as_ref().unwrap().success);
    assert!(result.website.as_ref().unwrap().success);
    assert_eq!(h.store.article_count(), 1);
}

#[tokio::test]
async fn generation_failure_fails_both_channels() {
    let h = harness(
        MockGenerator::new().with_failures(2),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.store.article_count(), 0);
    assert_eq!(h.log_sink.record_count(), 1);
}

#[tokio::test]
async fn combined_mode_uses_one_generation_call() {
    let combined = format!(
        "{{\"telegram\": \"{body}\", \"website\": \"<p>{body}</p>\", \
         \"keywords\": [\"budget\", \"fiscal\"]}}",
        body = ARTICLE_BODY
    );
    let h = harness(
        MockGenerator::new().with_response(combined),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings().with_combined_generation(true),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.store.article_count(), 1);
}

#[tokio::test]
async fn combined_parse_failure_fails_both_channels() {
    let h = harness(
        MockGenerator::new().with_response("this response never became JSON"),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings().with_combined_generation(true),
    );

    let result = h.pipeline.process_item(&item(), &DispatchTargets::both()).await;

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(h.messenger.calls().is_empty());
    assert_eq!(h.store.article_count(), 0);
}

#[tokio::test]
async fn colliding_slug_gets_counter_suffix() {
    let h = harness(
        MockGenerator::new()
            .with_response(format!("<p>{}</p>", ARTICLE_BODY))
            .with_response(format!("<p>{} Updated.</p>", ARTICLE_BODY)),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let first = ExtractedContent::new(
        "Markets Rally",
        "<p>First report on the rally with enough detail to rewrite.</p>",
        "First report on the rally with enough detail to rewrite.",
        "https://news.example/articles/rally-1",
        "https://news.example/feed.xml",
    )
    .with_image_url("https://news.example/images/rally.jpg");
    let second = ExtractedContent::new(
        "Markets: Rally?",
        "<p>A second, unrelated story that happens to share the headline.</p>",
        "A second, unrelated story that happens to share the headline.",
        "https://other.example/articles/rally",
        "https://other.example/feed.xml",
    )
    .with_image_url("https://other.example/images/rally.jpg");

    let targets = DispatchTargets::website_only();
    let r1 = h.pipeline.process_item(&first, &targets).await;
    let r2 = h.pipeline.process_item(&second, &targets).await;

    assert_eq!(r1.status, ProcessingStatus::Sent);
    assert_eq!(r2.status, ProcessingStatus::Sent);
    assert_eq!(h.store.article_count(), 2);
    assert!(h.store.html_for("markets-rally").is_some());
    assert!(h.store.html_for("markets-rally-2").is_some());
}

#[tokio::test]
async fn caption_stays_within_photo_budget() {
    let h = harness(
        MockGenerator::new().with_response("A sentence of filler. ".repeat(120)),
        MockMessenger::new(),
        MockVideoFetcher::new(),
        MockPhotoResolver::new(),
        MemoryLedger::new(),
        settings(),
    );

    let result = h
        .pipeline
        .process_item(&item(), &DispatchTargets::telegram_only())
        .await;

    assert_eq!(result.status, ProcessingStatus::Sent);
    match h.messenger.calls().as_slice() {
        [MockSendCall::Photo { caption_len, .. }] => {
            assert!(*caption_len <= newswire::PHOTO_CAPTION_BUDGET);
        }
        other => panic!("unexpected call sequence: {:?}", other),
    }
}
