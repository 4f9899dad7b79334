//! Minimal Telegram Bot API client
//!
//! A thin client over the Bot API with no domain-specific logic.
//! Supports text messages, photo and video uploads (by URL or raw
//! bytes), and chat lookup.
//!
//! # Example
//!
//! ```rust,ignore
//! use telegram_rs::{TelegramClient, MediaSource};
//!
//! let client = TelegramClient::new(bot_token)?;
//!
//! let msg = client.send_message("@mychannel", "<b>hello</b>", None).await?;
//!
//! let msg = client
//!     .send_photo("@mychannel", MediaSource::url(image_url), "caption", None)
//!     .await?;
//! ```
//!
//! Errors carry `is_retryable()` / `is_fatal()` / `is_media_rejection()`
//! predicates so callers can decide between backoff, abort, and media
//! fallback without string-matching at the call site.

pub mod error;
pub mod types;

pub use error::{Result, TelegramError};
pub use types::{ApiEnvelope, Chat, MediaSource, Message, SendOptions};

use reqwest::multipart;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http_client: Client,
    bot_token: String,
    base_url: String,
}

impl TelegramClient {
    /// Create a client with the given bot token.
    ///
    /// Uploads can be slow for large videos, so the underlying HTTP
    /// client uses a generous 180s request timeout.
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(180))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TelegramError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            bot_token: bot_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create from environment variable `TELEGRAM_BOT_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| TelegramError::Config("TELEGRAM_BOT_TOKEN not set".into()))?;
        Self::new(token)
    }

    /// Set a custom base URL (local Bot API server, test doubles).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    /// Send a text message. Text must respect the platform's 4096-char
    /// limit; the client does not truncate.
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: Option<SendOptions>,
    ) -> Result<Message> {
        let opts = options.unwrap_or_default();
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": opts.parse_mode,
            "disable_web_page_preview": opts.disable_web_page_preview,
            "disable_notification": opts.disable_notification,
        });

        debug!(chat_id = %chat_id, len = text.len(), "sendMessage");
        self.call_json("sendMessage", body).await
    }

    /// Send a photo with an optional caption (≤ 1024 chars per the
    /// platform limit; the client does not truncate).
    pub async fn send_photo(
        &self,
        chat_id: &str,
        photo: MediaSource,
        caption: &str,
        options: Option<SendOptions>,
    ) -> Result<Message> {
        let opts = options.unwrap_or_default();
        match photo {
            MediaSource::Url(url) => {
                let body = json!({
                    "chat_id": chat_id,
                    "photo": url,
                    "caption": caption,
                    "parse_mode": opts.parse_mode,
                    "disable_notification": opts.disable_notification,
                });
                debug!(chat_id = %chat_id, photo = %url, "sendPhoto (url)");
                self.call_json("sendPhoto", body).await
            }
            MediaSource::Bytes { data, file_name } => {
                debug!(chat_id = %chat_id, bytes = data.len(), "sendPhoto (upload)");
                let form = multipart::Form::new()
                    .text("chat_id", chat_id.to_string())
                    .text("caption", caption.to_string())
                    .text("parse_mode", opts.parse_mode)
                    .part(
                        "photo",
                        multipart::Part::bytes(data).file_name(file_name),
                    );
                self.call_multipart("sendPhoto", form).await
            }
        }
    }

    /// Send a video with an optional caption. Same caption limit as
    /// photos; files above the platform's upload ceiling are rejected
    /// by the API, not by this client.
    pub async fn send_video(
        &self,
        chat_id: &str,
        video: MediaSource,
        caption: &str,
        options: Option<SendOptions>,
    ) -> Result<Message> {
        let opts = options.unwrap_or_default();
        match video {
            MediaSource::Url(url) => {
                let body = json!({
                    "chat_id": chat_id,
                    "video": url,
                    "caption": caption,
                    "parse_mode": opts.parse_mode,
                    "supports_streaming": true,
                    "disable_notification": opts.disable_notification,
                });
                debug!(chat_id = %chat_id, video = %url, "sendVideo (url)");
                self.call_json("sendVideo", body).await
            }
            MediaSource::Bytes { data, file_name } => {
                debug!(chat_id = %chat_id, bytes = data.len(), "sendVideo (upload)");
                let form = multipart::Form::new()
                    .text("chat_id", chat_id.to_string())
                    .text("caption", caption.to_string())
                    .text("parse_mode", opts.parse_mode)
                    .text("supports_streaming", "true")
                    .part(
                        "video",
                        multipart::Part::bytes(data).file_name(file_name),
                    );
                self.call_multipart("sendVideo", form).await
            }
        }
    }

    /// Look up chat metadata. Useful as a startup credential check:
    /// a bad token or unknown channel fails here with a fatal error.
    pub async fn get_chat(&self, chat_id: &str) -> Result<Chat> {
        let body = json!({ "chat_id": chat_id });
        self.call_json("getChat", body).await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error(method, e))?;

        Self::handle_response(method, response).await
    }

    async fn call_multipart<T: DeserializeOwned>(
        &self,
        method: &str,
        form: multipart::Form,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport_error(method, e))?;

        Self::handle_response(method, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TelegramError::Network(e.to_string()))?;

        // The Bot API reports failures both via HTTP status and via the
        // envelope, with the useful description in the envelope.
        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            if status >= 400 {
                TelegramError::Api {
                    status,
                    description: text.chars().take(200).collect(),
                }
            } else {
                TelegramError::Parse(format!("{}: {}", method, e))
            }
        })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(method = %method, status, description = %description, "Bot API error");
            return Err(TelegramError::Api {
                status: envelope.error_code.unwrap_or(status),
                description,
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Parse(format!("{}: ok response without result", method)))
    }
}

fn classify_transport_error(method: &str, e: reqwest::Error) -> TelegramError {
    if e.is_timeout() {
        TelegramError::Timeout(format!("{}: {}", method, e))
    } else {
        TelegramError::Network(format!("{}: {}", method, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new("123:abc")
            .unwrap()
            .with_base_url("http://localhost:8081");
        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_envelope_error_parse() {
        let raw = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let envelope: ApiEnvelope<Message> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(400));
    }

    #[test]
    fn test_envelope_result_parse() {
        let raw = r#"{"ok":true,"result":{"message_id":42,"text":"hi"}}"#;
        let envelope: ApiEnvelope<Message> = serde_json::from_str(raw).unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.result.unwrap().message_id, 42);
    }
}
