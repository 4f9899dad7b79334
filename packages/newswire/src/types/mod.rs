//! Domain types for the dispatch pipeline.

pub mod config;
pub mod content;
pub mod outcome;

pub use config::{DispatchTargets, LengthTier, PipelineSettings, RetryPolicy};
pub use content::{ChannelGeneration, ExtractedContent, GeneratedPayload, GenerationUsage};
pub use outcome::{DispatchOutcome, LogRecord, ProcessingResult, ProcessingStatus};
