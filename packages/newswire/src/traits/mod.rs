//! Core trait abstractions.
//!
//! Every external collaborator of the pipeline sits behind one of
//! these seams so the orchestration can be exercised with the mocks in
//! [`crate::testing`].

pub mod generator;
pub mod media;
pub mod messenger;
pub mod store;

pub use generator::{GenerationRequest, GenerationResponse, GenerationService};
pub use media::{DownloadedVideo, ImageBounds, ImageProcessor, PhotoResolver, VideoFetcher};
pub use messenger::{MediaPayload, Messenger};
pub use store::{ArticleDraft, ContentStore, DispatchLedger, LedgerEntry, LogSink, StoredArticle};
