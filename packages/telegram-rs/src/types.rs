//! Bot API wire types.

use serde::{Deserialize, Serialize};

/// Standard Bot API response envelope.
///
/// Every method returns `{"ok": true, "result": ...}` on success or
/// `{"ok": false, "error_code": ..., "description": ...}` on failure.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    pub error_code: Option<u16>,
    pub description: Option<String>,
}

/// A sent message, trimmed to the fields callers use.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Chat metadata from `getChat`.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Media payload: a remote URL the API fetches itself, or raw bytes
/// uploaded as multipart form data.
#[derive(Debug, Clone)]
pub enum MediaSource {
    Url(String),
    Bytes { data: Vec<u8>, file_name: String },
}

impl MediaSource {
    pub fn url(url: impl Into<String>) -> Self {
        MediaSource::Url(url.into())
    }

    pub fn bytes(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        MediaSource::Bytes {
            data,
            file_name: file_name.into(),
        }
    }
}

/// Optional per-message parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SendOptions {
    pub parse_mode: String,
    pub disable_web_page_preview: bool,
    pub disable_notification: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            parse_mode: "HTML".to_string(),
            disable_web_page_preview: true,
            disable_notification: false,
        }
    }
}
