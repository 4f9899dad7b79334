//! The messaging-channel dispatcher.
//!
//! Delivery cascades down media fidelity: video, then photo, then
//! plain text. Network-class failures are retried with capped
//! exponential backoff before falling to the next tier; rejected
//! recipients abort immediately, and invalid media rejects the item
//! because an image is mandatory policy for this channel.

use std::future::Future;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use telegram_rs::{MediaSource, TelegramClient};

use crate::caption::{apply_rules, sanitize_caption, telegram_cleanup_rules};
use crate::caption::{PHOTO_CAPTION_BUDGET, TEXT_MESSAGE_BUDGET};
use crate::dispatch::hashtags::hashtags_for_category;
use crate::error::{DispatchError, DispatchResult};
use crate::traits::{MediaPayload, Messenger, PhotoResolver, VideoFetcher};
use crate::types::{DispatchOutcome, ExtractedContent, PipelineSettings, RetryPolicy};

use async_trait::async_trait;

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: &str, text: &str) -> DispatchResult<String> {
        let message = self
            .send_message(chat_id, text, None)
            .await
            .map_err(DispatchError::from)?;
        Ok(message.message_id.to_string())
    }

    async fn send_photo(
        &self,
        chat_id: &str,
        photo: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String> {
        let message = TelegramClient::send_photo(self, chat_id, photo.into(), caption, None)
            .await
            .map_err(DispatchError::from)?;
        Ok(message.message_id.to_string())
    }

    async fn send_video(
        &self,
        chat_id: &str,
        video: MediaPayload,
        caption: &str,
    ) -> DispatchResult<String> {
        let message = TelegramClient::send_video(self, chat_id, video.into(), caption, None)
            .await
            .map_err(DispatchError::from)?;
        Ok(message.message_id.to_string())
    }
}

impl From<MediaPayload> for MediaSource {
    fn from(payload: MediaPayload) -> Self {
        match payload {
            MediaPayload::Url(url) => MediaSource::Url(url),
            MediaPayload::Bytes { data, file_name } => MediaSource::Bytes { data, file_name },
        }
    }
}

/// Build the channel caption: cleaned body, then the source link,
/// then category hashtags, in fixed order.
pub fn build_caption(body: &str, source_url: &str, category: Option<&str>) -> String {
    let mut caption = apply_rules(body, &telegram_cleanup_rules());
    caption.push_str(&format!(
        "\n\n📰 <a href=\"{}\">مشروح خبر</a>",
        source_url
    ));
    if let Some(category) = category {
        let tags = hashtags_for_category(category);
        if !tags.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&tags.join(" "));
        }
    }
    caption
}

/// Retry loop for one cascade stage: retryable errors back off and try
/// again up to the attempt ceiling, everything else returns at once.
async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> DispatchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DispatchResult<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    stage = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient failure"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Per-item cascade dispatcher for the messaging channel.
pub struct TelegramDispatcher {
    messenger: Arc<dyn Messenger>,
    video_fetcher: Arc<dyn VideoFetcher>,
    resolver: Arc<dyn PhotoResolver>,
}

impl TelegramDispatcher {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        video_fetcher: Arc<dyn VideoFetcher>,
        resolver: Arc<dyn PhotoResolver>,
    ) -> Self {
        Self {
            messenger,
            video_fetcher,
            resolver,
        }
    }

    /// Run the cascade for one item. Always produces an outcome,
    /// never panics the pipeline.
    pub async fn dispatch(
        &self,
        item: &ExtractedContent,
        body: &str,
        settings: &PipelineSettings,
    ) -> DispatchOutcome {
        let raw_caption = build_caption(body, &item.source_url, settings.category.as_deref());
        let caption = sanitize_caption(&raw_caption, PHOTO_CAPTION_BUDGET);
        let policy = settings.retry;

        // Video tier: any failure here falls through, it never sinks
        // the item.
        if let Some(video_url) = &item.video_url {
            match self.try_video(video_url, &caption, settings, &policy).await {
                Ok(id) => {
                    info!(title = %item.title, message_id = %id, "sent as video");
                    return DispatchOutcome::sent(id);
                }
                Err(e) if matches!(e, DispatchError::Rejected(_)) => {
                    return DispatchOutcome::failed(e.to_string());
                }
                Err(e) => {
                    warn!(title = %item.title, error = %e, "video tier failed, falling back to photo");
                }
            }
        }

        // Photo tier: invalid media rejects the item outright (image
        // is mandatory), only network exhaustion falls to text.
        if let Some(image_url) = &item.image_url {
            match self.try_photo(image_url, &caption, settings, &policy).await {
                Ok(id) => {
                    info!(title = %item.title, message_id = %id, "sent as photo");
                    return DispatchOutcome::sent(id);
                }
                Err(e @ (DispatchError::Rejected(_) | DispatchError::InvalidMedia(_))) => {
                    return DispatchOutcome::failed(e.to_string());
                }
                Err(e) => {
                    warn!(title = %item.title, error = %e, "photo tier failed, falling back to text");
                }
            }
        }

        // Text tier: last resort, and the defensive path for items
        // that somehow arrive without media.
        let text = sanitize_caption(&raw_caption, TEXT_MESSAGE_BUDGET);
        match with_retry(&policy, "text", || {
            self.messenger.send_text(&settings.chat_id, &text)
        })
        .await
        {
            Ok(id) => {
                info!(title = %item.title, message_id = %id, "sent as text");
                DispatchOutcome::sent(id)
            }
            Err(e) => DispatchOutcome::failed(e.to_string()),
        }
    }

    async fn try_video(
        &self,
        video_url: &str,
        caption: &str,
        settings: &PipelineSettings,
        policy: &RetryPolicy,
    ) -> DispatchResult<String> {
        // Download-then-upload is preferred; backends reject exotic
        // formats passed by reference. The handle deletes the temp
        // file when this function returns, on every path.
        match self.video_fetcher.download(video_url).await {
            Ok(video) => {
                let data = video
                    .read()
                    .await
                    .map_err(|e| DispatchError::Network(format!("temp read: {}", e)))?;
                let file_name = video.file_name();
                with_retry(policy, "video", || {
                    self.messenger.send_video(
                        &settings.chat_id,
                        MediaPayload::bytes(data.clone(), file_name.clone()),
                        caption,
                    )
                })
                .await
            }
            Err(e) => {
                warn!(url = %video_url, error = %e, "video download failed, trying by reference");
                with_retry(policy, "video", || {
                    self.messenger.send_video(
                        &settings.chat_id,
                        MediaPayload::url(video_url),
                        caption,
                    )
                })
                .await
            }
        }
    }

    async fn try_photo(
        &self,
        image_url: &str,
        caption: &str,
        settings: &PipelineSettings,
        policy: &RetryPolicy,
    ) -> DispatchResult<String> {
        let bytes = with_retry(policy, "photo-fetch", || {
            self.resolver
                .resolve_photo(image_url, settings.enable_watermark)
        })
        .await?;

        let file_name = "photo.jpg".to_string();
        with_retry(policy, "photo", || {
            self.messenger.send_photo(
                &settings.chat_id,
                MediaPayload::bytes(bytes.clone(), file_name.clone()),
                caption,
            )
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_caption_order() {
        let caption = build_caption("<p>Body text.</p>", "https://src.example/a", Some("بورس"));
        let link_pos = caption.find("مشروح خبر").unwrap();
        let tag_pos = caption.find("#بورس").unwrap();
        let body_pos = caption.find("Body text.").unwrap();
        assert!(body_pos < link_pos);
        assert!(link_pos < tag_pos);
    }

    #[test]
    fn test_build_caption_without_category_has_no_hashtags() {
        let caption = build_caption("Body.", "https://src.example/a", None);
        assert!(!caption.contains('#'));
        assert!(caption.contains("https://src.example/a"));
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_fatal() {
        let policy = RetryPolicy::default();
        let mut calls = 0u32;
        let result: DispatchResult<String> = with_retry(&policy, "t", || {
            calls += 1;
            async move { Err(DispatchError::Rejected("chat not found".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_with_retry_retries_network() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let mut calls = 0u32;
        let result: DispatchResult<String> = with_retry(&policy, "t", || {
            calls += 1;
            let fail = calls < 3;
            async move {
                if fail {
                    Err(DispatchError::Network("reset".into()))
                } else {
                    Ok("42".to_string())
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "42");
        assert_eq!(calls, 3);
    }
}
