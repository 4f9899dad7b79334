//! Per-channel outcomes and the append-only log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::DispatchTargets;
use super::content::ExtractedContent;

/// Result of one channel's delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub success: bool,

    /// Message id or article slug assigned by the channel backend.
    pub external_id: Option<String>,

    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn sent(external_id: impl Into<String>) -> Self {
        Self {
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

/// Terminal status of one item's pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Every targeted channel succeeded
    Sent,
    /// At least one channel succeeded, at least one failed
    PartialFailure,
    /// No targeted channel succeeded
    Failed,
    /// Rejected by the duplicate gate before generation
    DuplicateSkip,
    /// Rejected by the image gate before generation
    NoImage,
}

/// One outcome record per processed item, written regardless of
/// success or failure. Created at the end of the pipeline and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub title: String,
    pub source_url: String,
    pub feed_url: String,
    pub targets: DispatchTargets,
    pub status: ProcessingStatus,
    pub telegram_outcome: Option<DispatchOutcome>,
    pub website_outcome: Option<DispatchOutcome>,
    pub extracted_content: ExtractedContent,
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(
        extracted: &ExtractedContent,
        targets: DispatchTargets,
        status: ProcessingStatus,
        telegram_outcome: Option<DispatchOutcome>,
        website_outcome: Option<DispatchOutcome>,
    ) -> Self {
        Self {
            title: extracted.title.clone(),
            source_url: extracted.source_url.clone(),
            feed_url: extracted.feed_url.clone(),
            targets,
            status,
            telegram_outcome,
            website_outcome,
            extracted_content: extracted.clone(),
            created_at: Utc::now(),
        }
    }
}

/// What `process_item` hands back to the caller.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub status: ProcessingStatus,
    pub telegram: Option<DispatchOutcome>,
    pub website: Option<DispatchOutcome>,

    /// Id assigned by the log sink, when the write succeeded.
    pub log_id: Option<String>,
}

impl ProcessingResult {
    /// Derive the aggregate status from per-channel outcomes.
    pub fn status_from_outcomes(
        telegram: Option<&DispatchOutcome>,
        website: Option<&DispatchOutcome>,
    ) -> ProcessingStatus {
        let outcomes: Vec<&DispatchOutcome> =
            telegram.into_iter().chain(website.into_iter()).collect();
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        if succeeded == outcomes.len() && !outcomes.is_empty() {
            ProcessingStatus::Sent
        } else if succeeded > 0 {
            ProcessingStatus::PartialFailure
        } else {
            ProcessingStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_all_sent() {
        let status = ProcessingResult::status_from_outcomes(
            Some(&DispatchOutcome::sent("1")),
            Some(&DispatchOutcome::sent("slug")),
        );
        assert_eq!(status, ProcessingStatus::Sent);
    }

    #[test]
    fn test_status_partial() {
        let status = ProcessingResult::status_from_outcomes(
            Some(&DispatchOutcome::sent("1")),
            Some(&DispatchOutcome::failed("store down")),
        );
        assert_eq!(status, ProcessingStatus::PartialFailure);
    }

    #[test]
    fn test_status_failed_when_empty() {
        let status = ProcessingResult::status_from_outcomes(None, None);
        assert_eq!(status, ProcessingStatus::Failed);
    }
}
