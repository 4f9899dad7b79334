//! Newswire: a content dispatch pipeline.
//!
//! Takes extracted news items (RSS or scraped), rewrites them through
//! an AI generation backend, and delivers the result to a messaging
//! channel and a website content store. The pipeline gates items
//! before any paid generation call (image present, not a duplicate of
//! a recent dispatch), serializes generation calls so concurrent items
//! cannot interleave backend usage, and degrades channel delivery
//! through a video, photo, text cascade with capped backoff.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use newswire::{
//!     DispatchTargets, DuplicateGate, ExtractedContent, GenerationCoordinator, Pipeline,
//!     PipelineSettings, TelegramDispatcher, WebsiteDispatcher,
//! };
//! use newswire::testing::{
//!     MemoryContentStore, MemoryLedger, MemoryLogSink, MockGenerator, MockMessenger,
//!     MockPhotoResolver, MockVideoFetcher,
//! };
//!
//! # async fn run() {
//! let pipeline = Pipeline::new(
//!     GenerationCoordinator::new(Arc::new(MockGenerator::new())),
//!     DuplicateGate::new(Arc::new(MemoryLedger::new())),
//!     TelegramDispatcher::new(
//!         Arc::new(MockMessenger::new()),
//!         Arc::new(MockVideoFetcher::new()),
//!         Arc::new(MockPhotoResolver::new()),
//!     ),
//!     WebsiteDispatcher::new(Arc::new(MemoryContentStore::new())),
//!     Arc::new(MemoryLogSink::new()),
//!     PipelineSettings::new("@my_channel"),
//! );
//!
//! let item = ExtractedContent::new(
//!     "Central bank holds rates",
//!     "<p>The central bank held its benchmark rate steady...</p>",
//!     "The central bank held its benchmark rate steady...",
//!     "https://news.example/articles/rates",
//!     "https://news.example/feed.xml",
//! )
//! .with_image_url("https://news.example/images/rates.jpg");
//!
//! let result = pipeline.process_item(&item, &DispatchTargets::both()).await;
//! println!("status: {:?}", result.status);
//! # }
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] — per-item orchestration and the duplicate gate
//! - [`generation`] — prompts, provider selection, FIFO-serialized calls
//! - [`caption`] — channel caption sanitizing, truncation, tag repair
//! - [`dispatch`] — channel dispatchers, media resolution, hashtags
//! - [`traits`] — seams for the generation backend, messenger, stores
//! - [`testing`] — in-memory and scripted mock implementations

pub mod caption;
pub mod dispatch;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

pub use caption::{sanitize_caption, PHOTO_CAPTION_BUDGET, TEXT_MESSAGE_BUDGET};
pub use dispatch::{
    build_caption, clean_website_html, hashtags_for_category, slugify, HttpVideoFetcher,
    MediaResolver, TelegramDispatcher, WebsiteDispatcher,
};
pub use error::{DispatchError, GenerationError, PipelineError, Result};
pub use generation::{Channel, GenerationCoordinator, ProviderConfig};
pub use pipeline::{DuplicateGate, Pipeline};
pub use traits::{
    ContentStore, DispatchLedger, GenerationRequest, GenerationResponse, GenerationService,
    ImageProcessor, LogSink, MediaPayload, Messenger, PhotoResolver, VideoFetcher,
};
pub use types::{
    ChannelGeneration, DispatchOutcome, DispatchTargets, ExtractedContent, GeneratedPayload,
    GenerationUsage, LengthTier, LogRecord, PipelineSettings, ProcessingResult, ProcessingStatus,
    RetryPolicy,
};
