//! Channel delivery: the messaging cascade and the website upsert.

pub mod hashtags;
pub mod media;
pub mod telegram;
pub mod website;

pub use hashtags::hashtags_for_category;
pub use media::{HttpVideoFetcher, MediaResolver, VIDEO_MAX_BYTES};
pub use telegram::{build_caption, TelegramDispatcher};
pub use website::{clean_website_html, slugify, WebsiteDispatcher};
