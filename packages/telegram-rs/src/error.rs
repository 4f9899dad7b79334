//! Error types for the Telegram client.

use thiserror::Error;

/// Result type for Telegram client operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

/// Telegram client errors.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration error (missing bot token, invalid chat id)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Bot API returned `ok: false` (or a non-2xx status)
    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },

    /// Parse error (unexpected response shape)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl TelegramError {
    /// Whether the operation is worth retrying with backoff.
    ///
    /// Network-class failures and rate limiting (429) or server-side
    /// errors (5xx) are transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelegramError::Network(_) | TelegramError::Timeout(_) => true,
            TelegramError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether the error indicates misconfiguration rather than a
    /// transient failure. Fatal errors must not be retried and must not
    /// trigger a media fallback.
    pub fn is_fatal(&self) -> bool {
        match self {
            TelegramError::Config(_) => true,
            TelegramError::Api {
                status,
                description,
            } => {
                if *status == 401 || *status == 403 {
                    return true;
                }
                let desc = description.to_lowercase();
                desc.contains("chat not found")
                    || desc.contains("bot was blocked")
                    || desc.contains("bot was kicked")
                    || desc.contains("chat_id is empty")
                    || desc.contains("unauthorized")
            }
            _ => false,
        }
    }

    /// Whether the API rejected the attached media itself (bad image
    /// dimensions, unsupported format, oversized file).
    pub fn is_media_rejection(&self) -> bool {
        match self {
            TelegramError::Api {
                status,
                description,
            } if *status == 400 => {
                let desc = description.to_lowercase();
                desc.contains("photo_invalid_dimensions")
                    || desc.contains("wrong file identifier")
                    || desc.contains("image_process_failed")
                    || desc.contains("file is too big")
                    || desc.contains("failed to get http url content")
                    || desc.contains("wrong type of the web page content")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable_not_fatal() {
        let err = TelegramError::Api {
            status: 429,
            description: "Too Many Requests: retry after 5".into(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_chat_not_found_is_fatal() {
        let err = TelegramError::Api {
            status: 400,
            description: "Bad Request: chat not found".into(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_bad_dimensions_is_media_rejection() {
        let err = TelegramError::Api {
            status: 400,
            description: "Bad Request: PHOTO_INVALID_DIMENSIONS".into(),
        };
        assert!(err.is_media_rejection());
        assert!(!err.is_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(TelegramError::Timeout("sendPhoto".into()).is_retryable());
    }
}
