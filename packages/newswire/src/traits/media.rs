//! Image and video processing seams.
//!
//! Codec internals (decode, resize, watermark compositing) are
//! external; the pipeline only needs dimension/size validation and a
//! scoped handle for downloaded video files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::DispatchResult;

/// Platform limits a photo must satisfy before upload.
#[derive(Debug, Clone, Copy)]
pub struct ImageBounds {
    /// Minimum pixels per side.
    pub min_side: u32,
    /// Maximum pixels per side.
    pub max_side: u32,
    /// Maximum encoded size in bytes.
    pub max_bytes: usize,
}

impl Default for ImageBounds {
    fn default() -> Self {
        Self {
            min_side: 100,
            max_side: 5_000,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ImageBounds {
    /// Whether the given dimensions and size are acceptable as-is.
    pub fn accepts(&self, width: u32, height: u32, byte_len: usize) -> bool {
        width >= self.min_side
            && height >= self.min_side
            && width <= self.max_side
            && height <= self.max_side
            && byte_len <= self.max_bytes
    }

    /// Whether the image is too small to salvage (upscaling tiny
    /// tracking pixels is never worth it).
    pub fn too_small(&self, width: u32, height: u32) -> bool {
        width < self.min_side || height < self.min_side
    }
}

/// Resolves an image URL into upload-ready bytes: fetch, validate
/// against [`ImageBounds`], re-encode, watermark.
#[async_trait]
pub trait PhotoResolver: Send + Sync {
    async fn resolve_photo(
        &self,
        image_url: &str,
        apply_watermark: bool,
    ) -> DispatchResult<Vec<u8>>;
}

/// Image codec operations the photo path depends on.
pub trait ImageProcessor: Send + Sync {
    /// Decode just enough to report `(width, height)`.
    fn probe(&self, bytes: &[u8]) -> DispatchResult<(u32, u32)>;

    /// Re-encode so dimensions and size fit the bounds.
    fn resize_to_bounds(&self, bytes: &[u8], bounds: &ImageBounds) -> DispatchResult<Vec<u8>>;

    /// Composite the configured watermark onto the image.
    fn watermark(&self, bytes: &[u8]) -> DispatchResult<Vec<u8>>;
}

/// A downloaded video scoped to one dispatch attempt.
///
/// The backing temp file is removed when the handle drops, so cleanup
/// happens on success and failure paths alike.
#[derive(Debug)]
pub struct DownloadedVideo {
    path: PathBuf,
    file_size: u64,
}

impl DownloadedVideo {
    pub fn new(path: PathBuf, file_size: u64) -> Self {
        Self { path, file_size }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read the file into memory for a multipart upload.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// File name to present to the messaging backend.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string())
    }
}

impl Drop for DownloadedVideo {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove temp video");
            }
        }
    }
}

/// Video acquisition (HLS remux, direct download) behind one seam.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Fetch the video to a local temp file, honoring the platform's
    /// upload ceiling.
    async fn download(&self, url: &str) -> DispatchResult<DownloadedVideo>;

    /// Whether the URL is a streaming manifest that must be remuxed
    /// rather than passed to the backend by reference.
    fn is_stream_url(&self, url: &str) -> bool {
        url.contains(".m3u8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_accepts_normal_photo() {
        let bounds = ImageBounds::default();
        assert!(bounds.accepts(1280, 720, 500_000));
    }

    #[test]
    fn test_bounds_rejects_tracking_pixel() {
        let bounds = ImageBounds::default();
        assert!(!bounds.accepts(1, 1, 100));
        assert!(bounds.too_small(1, 1));
    }

    #[test]
    fn test_bounds_rejects_oversized() {
        let bounds = ImageBounds::default();
        assert!(!bounds.accepts(6_000, 4_000, 500_000));
        assert!(!bounds.too_small(6_000, 4_000));
    }

    #[test]
    fn test_downloaded_video_removes_file_on_drop() {
        let path = std::env::temp_dir().join("newswire-test-drop.mp4");
        std::fs::write(&path, b"x").unwrap();
        let video = DownloadedVideo::new(path.clone(), 1);
        drop(video);
        assert!(!path.exists());
    }
}
