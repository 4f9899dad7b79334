//! Typed errors for the dispatch pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The layering mirrors the
//! pipeline: generation failures and dispatch failures are distinct
//! enums, wrapped by `PipelineError` at the orchestration level.

use telegram_rs::TelegramError;
use thiserror::Error;

/// Errors that can occur while processing one item end to end.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Item has no resolvable image; stops the pipeline before any
    /// paid generation call
    #[error("no image available for item: {title}")]
    NoImage { title: String },

    /// Text generation failed
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Channel delivery failed
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Log sink rejected the outcome record
    #[error("log sink error: {0}")]
    LogSink(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Duplicate ledger lookup failed
    #[error("ledger error: {0}")]
    Ledger(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from the generation coordinator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend returned an empty response
    #[error("empty generation output")]
    Empty,

    /// Output too short to be a plausible article ({len} chars)
    #[error("generation output too short: {len} chars")]
    TooShort { len: usize },

    /// Combined-mode response contained no parseable JSON object
    #[error("generation format error: {0}")]
    Format(String),

    /// The backend itself failed
    #[error("generation service error: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from channel delivery, classified by cause.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Transient network failure (connection reset, timeout, DNS);
    /// retried with backoff, then degraded down the media cascade
    #[error("network error: {0}")]
    Network(String),

    /// Backend rate limit; retried with backoff
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Misconfiguration (bad recipient, auth); never retried, never
    /// cascaded
    #[error("dispatch rejected: {0}")]
    Rejected(String),

    /// Media failed platform validation (dimensions, size) even after
    /// a re-encode attempt
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    /// Content store operation failed
    #[error("content store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// Whether the failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Network(_) | DispatchError::RateLimited(_)
        )
    }
}

impl From<TelegramError> for DispatchError {
    fn from(err: TelegramError) -> Self {
        if err.is_fatal() {
            DispatchError::Rejected(err.to_string())
        } else if err.is_media_rejection() {
            DispatchError::InvalidMedia(err.to_string())
        } else if err.is_retryable() {
            match &err {
                TelegramError::Api { status: 429, .. } => {
                    DispatchError::RateLimited(err.to_string())
                }
                _ => DispatchError::Network(err.to_string()),
            }
        } else {
            DispatchError::Rejected(err.to_string())
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for generation operations.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_network_maps_to_network() {
        let err: DispatchError = TelegramError::Network("reset".into()).into();
        assert!(matches!(err, DispatchError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_telegram_429_maps_to_rate_limited() {
        let err: DispatchError = TelegramError::Api {
            status: 429,
            description: "Too Many Requests".into(),
        }
        .into();
        assert!(matches!(err, DispatchError::RateLimited(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_chat_not_found_maps_to_rejected() {
        let err: DispatchError = TelegramError::Api {
            status: 400,
            description: "Bad Request: chat not found".into(),
        }
        .into();
        assert!(matches!(err, DispatchError::Rejected(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_bad_dimensions_maps_to_invalid_media() {
        let err: DispatchError = TelegramError::Api {
            status: 400,
            description: "Bad Request: PHOTO_INVALID_DIMENSIONS".into(),
        }
        .into();
        assert!(matches!(err, DispatchError::InvalidMedia(_)));
    }
}
