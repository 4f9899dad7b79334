//! The messaging backend seam.

use async_trait::async_trait;

use crate::error::DispatchResult;

/// Media attached to an outgoing message: a remote URL the backend
/// fetches itself, or bytes uploaded directly.
#[derive(Debug, Clone)]
pub enum MediaPayload {
    Url(String),
    Bytes { data: Vec<u8>, file_name: String },
}

impl MediaPayload {
    pub fn url(url: impl Into<String>) -> Self {
        MediaPayload::Url(url.into())
    }

    pub fn bytes(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        MediaPayload::Bytes {
            data,
            file_name: file_name.into(),
        }
    }
}

/// Messaging channel backend (Telegram in production).
///
/// Methods return the external message identifier on success. Errors
/// must already be classified (`DispatchError`) so the dispatcher can
/// decide between retry, cascade fallback, and abort without knowing
/// the backend's wire format.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> DispatchResult<String>;

    async fn send_photo(
        &self,
        chat_id: &str,
        photo: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String>;

    async fn send_video(
        &self,
        chat_id: &str,
        video: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String>;
}
