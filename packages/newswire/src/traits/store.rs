//! Content store, dispatch ledger, and log sink seams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchResult, Result};
use crate::types::LogRecord;

/// Article payload for the website channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub slug: String,
    pub title: String,
    pub html: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A stored article, as the content store reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: String,
    pub slug: String,
    pub title: String,
}

/// Website content store (relational persistence lives behind this).
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Update in place if the slug exists, else create.
    async fn upsert_article(&self, draft: ArticleDraft) -> DispatchResult<StoredArticle>;

    async fn find_by_slug(&self, slug: &str) -> DispatchResult<Option<StoredArticle>>;
}

/// A previously dispatched item, as the ledger remembers it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub title: String,
    pub source_url: String,
}

/// Record store backing the duplicate gate.
///
/// Advisory only: the gate is a membership test, not a lock, so two
/// near-simultaneous identical items can both pass.
#[async_trait]
pub trait DispatchLedger: Send + Sync {
    /// Successfully dispatched items for a feed, most recent first.
    /// Implementations typically scope this to the current day.
    async fn recent_entries(&self, feed_url: &str) -> Result<Vec<LedgerEntry>>;
}

/// Append-only sink for outcome records.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Persist one record; returns the assigned id.
    async fn create_log_record(&self, record: LogRecord) -> Result<String>;
}
