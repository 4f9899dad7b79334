//! Testing utilities including mock implementations.
//!
//! These are useful for testing the pipeline without real AI calls,
//! a live bot token, or network access. Mocks return deterministic,
//! configurable responses and track their calls for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{DispatchError, DispatchResult, GenerationError, GenerationResult, Result};
use crate::traits::{
    ArticleDraft, ContentStore, DispatchLedger, DownloadedVideo, GenerationRequest,
    GenerationResponse, GenerationService, ImageBounds, ImageProcessor, LedgerEntry, LogSink,
    MediaPayload, Messenger, PhotoResolver, StoredArticle, VideoFetcher,
};
use crate::types::{GenerationUsage, LogRecord};

/// A mock generation backend.
///
/// Returns queued responses in order, then a plausible default. Can
/// be scripted to fail the next N calls with a service error.
#[derive(Default)]
pub struct MockGenerator {
    responses: Arc<RwLock<Vec<String>>>,
    failures_remaining: Arc<RwLock<u32>>,
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    pub prompt: String,
    pub preferred_provider: Option<String>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response; queued responses are consumed in order.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses.write().unwrap().push(content.into());
        self
    }

    /// Fail the next `n` calls with a service error.
    pub fn with_failures(self, n: u32) -> Self {
        *self.failures_remaining.write().unwrap() = n;
        self
    }

    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<GenerationResponse> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            prompt: request.prompt.clone(),
            preferred_provider: request.preferred_provider.clone(),
        });

        {
            let mut failures = self.failures_remaining.write().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(GenerationError::Service("scripted backend failure".into()));
            }
        }

        let content = {
            let mut queue = self.responses.write().unwrap();
            if queue.is_empty() {
                "The committee approved the measure after a long session. \
                 Officials said the change takes effect next month and applies \
                 nationwide."
                    .to_string()
            } else {
                queue.remove(0)
            }
        };

        Ok(GenerationResponse {
            content,
            usage: GenerationUsage::new(120, 80),
            provider: request.preferred_provider,
            model: Some("mock-1".to_string()),
        })
    }
}

/// Record of a send made through the mock messenger.
#[derive(Debug, Clone)]
pub enum MockSendCall {
    Text { chat_id: String, len: usize },
    Photo { chat_id: String, bytes: usize, caption_len: usize },
    Video { chat_id: String, by_url: bool, caption_len: usize },
}

/// A mock messaging backend with per-method scripted failures.
#[derive(Default)]
pub struct MockMessenger {
    calls: Arc<RwLock<Vec<MockSendCall>>>,
    text_failures: Arc<RwLock<Vec<DispatchErrorKind>>>,
    photo_failures: Arc<RwLock<Vec<DispatchErrorKind>>>,
    video_failures: Arc<RwLock<Vec<DispatchErrorKind>>>,
    next_id: AtomicI64,
}

/// Failure kinds a mock can be scripted with; cloneable stand-in for
/// the non-Clone error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    Network,
    RateLimited,
    Rejected,
    InvalidMedia,
}

impl DispatchErrorKind {
    fn into_error(self) -> DispatchError {
        match self {
            DispatchErrorKind::Network => DispatchError::Network("scripted: connection reset".into()),
            DispatchErrorKind::RateLimited => DispatchError::RateLimited("scripted: 429".into()),
            DispatchErrorKind::Rejected => DispatchError::Rejected("scripted: chat not found".into()),
            DispatchErrorKind::InvalidMedia => {
                DispatchError::InvalidMedia("scripted: bad dimensions".into())
            }
        }
    }
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next text sends with the given kinds, in order.
    pub fn with_text_failures(self, kinds: Vec<DispatchErrorKind>) -> Self {
        *self.text_failures.write().unwrap() = kinds;
        self
    }

    pub fn with_photo_failures(self, kinds: Vec<DispatchErrorKind>) -> Self {
        *self.photo_failures.write().unwrap() = kinds;
        self
    }

    pub fn with_video_failures(self, kinds: Vec<DispatchErrorKind>) -> Self {
        *self.video_failures.write().unwrap() = kinds;
        self
    }

    pub fn calls(&self) -> Vec<MockSendCall> {
        self.calls.read().unwrap().clone()
    }

    fn next_failure(queue: &Arc<RwLock<Vec<DispatchErrorKind>>>) -> Option<DispatchError> {
        let mut queue = queue.write().unwrap();
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0).into_error())
        }
    }

    fn next_message_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> DispatchResult<String> {
        self.calls.write().unwrap().push(MockSendCall::Text {
            chat_id: chat_id.to_string(),
            len: text.chars().count(),
        });
        match Self::next_failure(&self.text_failures) {
            Some(e) => Err(e),
            None => Ok(self.next_message_id()),
        }
    }

    async fn send_photo(
        &self,
        chat_id: &str,
        photo: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String> {
        let bytes = match &photo {
            MediaPayload::Bytes { data, .. } => data.len(),
            MediaPayload::Url(_) => 0,
        };
        self.calls.write().unwrap().push(MockSendCall::Photo {
            chat_id: chat_id.to_string(),
            bytes,
            caption_len: caption.chars().count(),
        });
        match Self::next_failure(&self.photo_failures) {
            Some(e) => Err(e),
            None => Ok(self.next_message_id()),
        }
    }

    async fn send_video(
        &self,
        chat_id: &str,
        video: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String> {
        self.calls.write().unwrap().push(MockSendCall::Video {
            chat_id: chat_id.to_string(),
            by_url: matches!(video, MediaPayload::Url(_)),
            caption_len: caption.chars().count(),
        });
        match Self::next_failure(&self.video_failures) {
            Some(e) => Err(e),
            None => Ok(self.next_message_id()),
        }
    }
}

/// A mock photo resolver: returns fixed bytes, or a scripted error.
#[derive(Default)]
pub struct MockPhotoResolver {
    failure: Arc<RwLock<Option<DispatchErrorKind>>>,
}

impl MockPhotoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every resolution fail with the given kind.
    pub fn with_failure(self, kind: DispatchErrorKind) -> Self {
        *self.failure.write().unwrap() = Some(kind);
        self
    }
}

#[async_trait]
impl PhotoResolver for MockPhotoResolver {
    async fn resolve_photo(
        &self,
        _image_url: &str,
        _apply_watermark: bool,
    ) -> DispatchResult<Vec<u8>> {
        match *self.failure.read().unwrap() {
            Some(kind) => Err(kind.into_error()),
            None => Ok(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        }
    }
}

/// A mock image processor reporting fixed dimensions.
pub struct MockImageProcessor {
    dimensions: (u32, u32),
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self {
            dimensions: (1280, 720),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = (width, height);
        self
    }
}

impl Default for MockImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor for MockImageProcessor {
    fn probe(&self, _bytes: &[u8]) -> DispatchResult<(u32, u32)> {
        Ok(self.dimensions)
    }

    fn resize_to_bounds(&self, bytes: &[u8], _bounds: &ImageBounds) -> DispatchResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn watermark(&self, bytes: &[u8]) -> DispatchResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// A mock video fetcher that writes a small temp file, or fails.
#[derive(Default)]
pub struct MockVideoFetcher {
    fail: bool,
    counter: AtomicU32,
}

impl MockVideoFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every download fail with a network error.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl VideoFetcher for MockVideoFetcher {
    async fn download(&self, url: &str) -> DispatchResult<DownloadedVideo> {
        if self.fail {
            return Err(DispatchError::Network(format!("scripted: download of {} failed", url)));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "newswire-mock-{}-{}.mp4",
            std::process::id(),
            n
        ));
        tokio::fs::write(&path, b"mock video bytes")
            .await
            .map_err(|e| DispatchError::Network(format!("temp write: {}", e)))?;
        Ok(DownloadedVideo::new(path, 16))
    }
}

/// An in-memory dispatch ledger.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Arc<RwLock<HashMap<String, Vec<LedgerEntry>>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(
        &self,
        feed_url: impl Into<String>,
        title: impl Into<String>,
        source_url: impl Into<String>,
    ) {
        self.entries
            .write()
            .unwrap()
            .entry(feed_url.into())
            .or_default()
            .push(LedgerEntry {
                title: title.into(),
                source_url: source_url.into(),
            });
    }
}

#[async_trait]
impl DispatchLedger for MemoryLedger {
    async fn recent_entries(&self, feed_url: &str) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .get(feed_url)
            .cloned()
            .unwrap_or_default())
    }
}

/// An in-memory content store keyed by slug.
#[derive(Default)]
pub struct MemoryContentStore {
    articles: Arc<RwLock<HashMap<String, (StoredArticle, String)>>>,
    next_id: AtomicI64,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored HTML for a slug, for assertions.
    pub fn html_for(&self, slug: &str) -> Option<String> {
        self.articles
            .read()
            .unwrap()
            .get(slug)
            .map(|(_, html)| html.clone())
    }

    pub fn article_count(&self) -> usize {
        self.articles.read().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn upsert_article(&self, draft: ArticleDraft) -> DispatchResult<StoredArticle> {
        let mut articles = self.articles.write().unwrap();
        let stored = match articles.get(&draft.slug) {
            Some((existing, _)) => StoredArticle {
                id: existing.id.clone(),
                slug: draft.slug.clone(),
                title: draft.title.clone(),
            },
            None => StoredArticle {
                id: (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string(),
                slug: draft.slug.clone(),
                title: draft.title.clone(),
            },
        };
        articles.insert(draft.slug.clone(), (stored.clone(), draft.html));
        Ok(stored)
    }

    async fn find_by_slug(&self, slug: &str) -> DispatchResult<Option<StoredArticle>> {
        Ok(self
            .articles
            .read()
            .unwrap()
            .get(slug)
            .map(|(article, _)| article.clone()))
    }
}

/// An in-memory append-only log sink.
#[derive(Default)]
pub struct MemoryLogSink {
    records: Arc<RwLock<Vec<LogRecord>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn create_log_record(&self, record: LogRecord) -> Result<String> {
        let mut records = self.records.write().unwrap();
        records.push(record);
        Ok(records.len().to_string())
    }
}
