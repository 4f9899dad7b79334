//! Media acquisition and validation for the messaging channel.
//!
//! Photos are downloaded to a byte buffer, validated against platform
//! bounds, and re-encoded or watermarked through the [`ImageProcessor`]
//! seam. Videos are fetched to a temp file whose handle cleans up on
//! drop, with a hard size ceiling.

use futures::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use async_trait::async_trait;

use crate::error::{DispatchError, DispatchResult};
use crate::traits::{
    DownloadedVideo, ImageBounds, ImageProcessor, PhotoResolver, VideoFetcher,
};

/// Upload ceiling for videos; larger files are not worth remuxing.
pub const VIDEO_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Resolves an image URL into upload-ready bytes.
pub struct MediaResolver {
    http_client: Client,
    processor: Arc<dyn ImageProcessor>,
    bounds: ImageBounds,
}

impl MediaResolver {
    pub fn new(processor: Arc<dyn ImageProcessor>) -> DispatchResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DispatchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            processor,
            bounds: ImageBounds::default(),
        })
    }

    pub fn with_bounds(mut self, bounds: ImageBounds) -> Self {
        self.bounds = bounds;
        self
    }

    async fn fetch_bytes(&self, url: &str) -> DispatchResult<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DispatchError::Network(format!("image fetch: {}", e)))?;

        if !response.status().is_success() {
            return Err(DispatchError::Network(format!(
                "image fetch: HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DispatchError::Network(format!("image body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PhotoResolver for MediaResolver {
    /// Fetch, validate, and prepare a photo for upload.
    ///
    /// Undersized images are rejected outright ([`DispatchError::InvalidMedia`]);
    /// oversized ones are re-encoded. The watermark is applied last so
    /// re-encoding cannot strip it.
    async fn resolve_photo(
        &self,
        image_url: &str,
        apply_watermark: bool,
    ) -> DispatchResult<Vec<u8>> {
        let bytes = self.fetch_bytes(image_url).await?;
        debug!(url = %image_url, bytes = bytes.len(), "image downloaded");

        let (width, height) = self.processor.probe(&bytes)?;
        if self.bounds.too_small(width, height) {
            return Err(DispatchError::InvalidMedia(format!(
                "image {}x{} below minimum {} px",
                width, height, self.bounds.min_side
            )));
        }

        let mut bytes = if self.bounds.accepts(width, height, bytes.len()) {
            bytes
        } else {
            info!(width, height, bytes = bytes.len(), "re-encoding image to platform bounds");
            self.processor.resize_to_bounds(&bytes, &self.bounds)?
        };

        if apply_watermark {
            bytes = self.processor.watermark(&bytes)?;
        }
        Ok(bytes)
    }
}

/// Downloads direct video files over HTTP to a temp file.
///
/// Streaming manifests (HLS) need a remuxing backend and are reported
/// via [`VideoFetcher::is_stream_url`]; this fetcher rejects them.
pub struct HttpVideoFetcher {
    http_client: Client,
    temp_dir: PathBuf,
    counter: AtomicU64,
}

impl HttpVideoFetcher {
    pub fn new() -> DispatchResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(180))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DispatchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            temp_dir: std::env::temp_dir(),
            counter: AtomicU64::new(0),
        })
    }

    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Temp path for one download. Items can carry videos concurrently,
    /// so the name takes a per-fetcher counter on top of the pid; a
    /// shared path would let one download truncate another's file and
    /// one handle's drop delete the other's.
    fn next_temp_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        self.temp_dir
            .join(format!("newswire-video-{}-{}.mp4", std::process::id(), n))
    }
}

#[async_trait]
impl VideoFetcher for HttpVideoFetcher {
    async fn download(&self, url: &str) -> DispatchResult<DownloadedVideo> {
        if self.is_stream_url(url) {
            return Err(DispatchError::InvalidMedia(format!(
                "streaming manifest needs remuxing: {}",
                url
            )));
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DispatchError::Network(format!("video fetch: {}", e)))?;

        if !response.status().is_success() {
            return Err(DispatchError::Network(format!(
                "video fetch: HTTP {} from {}",
                response.status(),
                url
            )));
        }

        if let Some(len) = response.content_length() {
            if len > VIDEO_MAX_BYTES {
                return Err(DispatchError::InvalidMedia(format!(
                    "video is {} bytes, ceiling is {}",
                    len, VIDEO_MAX_BYTES
                )));
            }
        }

        let path = self.next_temp_path();
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| DispatchError::Network(format!("temp file: {}", e)))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    // handle cleans up the partial file
                    drop(file);
                    drop(DownloadedVideo::new(path, written));
                    return Err(DispatchError::Network(format!("video stream: {}", e)));
                }
            };
            written += chunk.len() as u64;
            if written > VIDEO_MAX_BYTES {
                drop(file);
                drop(DownloadedVideo::new(path, written));
                return Err(DispatchError::InvalidMedia(format!(
                    "video exceeded {} byte ceiling mid-download",
                    VIDEO_MAX_BYTES
                )));
            }
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                drop(DownloadedVideo::new(path, written));
                return Err(DispatchError::Network(format!("temp write: {}", e)));
            }
        }

        if let Err(e) = file.flush().await {
            warn!(error = %e, "temp file flush failed");
        }
        info!(url = %url, bytes = written, "video downloaded");
        Ok(DownloadedVideo::new(path, written))
    }
}
