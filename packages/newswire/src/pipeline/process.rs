//! Per-item orchestration.
//!
//! Gates run before generation (image, then duplicate), generation
//! runs before dispatch, and the two channels are dispatched
//! independently: one channel's failure never aborts the other. One
//! log record is written per item regardless of outcome.

use std::sync::Arc;
use tracing::{info, warn};

use crate::generation::{Channel, GenerationCoordinator};
use crate::dispatch::{TelegramDispatcher, WebsiteDispatcher};
use crate::pipeline::duplicate::DuplicateGate;
use crate::traits::LogSink;
use crate::types::{
    DispatchOutcome, DispatchTargets, ExtractedContent, GeneratedPayload, LogRecord,
    PipelineSettings, ProcessingResult, ProcessingStatus,
};

/// The content dispatch pipeline, invoked once per item.
pub struct Pipeline {
    coordinator: GenerationCoordinator,
    gate: DuplicateGate,
    telegram: TelegramDispatcher,
    website: WebsiteDispatcher,
    log_sink: Arc<dyn LogSink>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        coordinator: GenerationCoordinator,
        gate: DuplicateGate,
        telegram: TelegramDispatcher,
        website: WebsiteDispatcher,
        log_sink: Arc<dyn LogSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            coordinator,
            gate,
            telegram,
            website,
            log_sink,
            settings,
        }
    }

    /// Process one extracted item end to end.
    ///
    /// Never returns an error: every failure mode collapses into the
    /// result's status and per-channel outcomes, and the log record is
    /// written on every path.
    pub async fn process_item(
        &self,
        extracted: &ExtractedContent,
        targets: &DispatchTargets,
    ) -> ProcessingResult {
        info!(
            title = %extracted.title,
            source = %extracted.source_url,
            telegram = targets.telegram,
            website = targets.website,
            "processing item"
        );

        // No target selected means nothing could ever be attempted;
        // reject before the gates rather than reporting a hollow
        // failure after generation.
        if !targets.telegram && !targets.website {
            warn!(title = %extracted.title, "rejected: no dispatch target selected");
            return self
                .finish(extracted, targets, ProcessingStatus::Failed, None, None)
                .await;
        }

        // Image gate: no image, no paid generation call.
        if extracted.image_url.is_none() {
            warn!(title = %extracted.title, "rejected: no resolvable image");
            return self
                .finish(extracted, targets, ProcessingStatus::NoImage, None, None)
                .await;
        }

        // Duplicate gate, before generation for the same reason.
        if !targets.skip_duplicate_check {
            match self
                .gate
                .is_duplicate(&extracted.title, &extracted.source_url, &extracted.feed_url)
                .await
            {
                Ok(true) => {
                    return self
                        .finish(extracted, targets, ProcessingStatus::DuplicateSkip, None, None)
                        .await;
                }
                Ok(false) => {}
                Err(e) => {
                    // fail open: a broken ledger must not stall the feed
                    warn!(error = %e, "duplicate check failed, proceeding");
                }
            }
        }

        let payload = self.generate(extracted, targets).await;

        let telegram_outcome = if targets.telegram {
            Some(match &payload.telegram {
                Ok(Some(generation)) => {
                    self.telegram
                        .dispatch(extracted, &generation.body, &self.settings)
                        .await
                }
                Ok(None) => DispatchOutcome::failed("no telegram output generated"),
                Err(e) => DispatchOutcome::failed(e.clone()),
            })
        } else {
            None
        };

        let website_outcome = if targets.website {
            Some(match &payload.website {
                Ok(Some(generation)) => {
                    self.website
                        .dispatch(extracted, &generation.body, &payload.keywords)
                        .await
                }
                Ok(None) => DispatchOutcome::failed("no website output generated"),
                Err(e) => DispatchOutcome::failed(e.clone()),
            })
        } else {
            None
        };

        let status = ProcessingResult::status_from_outcomes(
            telegram_outcome.as_ref(),
            website_outcome.as_ref(),
        );
        self.finish(extracted, targets, status, telegram_outcome, website_outcome)
            .await
    }

    /// Run generation for the targeted channels. Per-channel results
    /// keep their own errors so one channel's generation failure does
    /// not sink the other.
    async fn generate(
        &self,
        extracted: &ExtractedContent,
        targets: &DispatchTargets,
    ) -> ChannelResults {
        let custom_prompt = targets.custom_prompt.as_deref();

        if self.settings.combined_generation && targets.telegram && targets.website {
            return match self
                .coordinator
                .generate_combined(extracted, &self.settings, custom_prompt)
                .await
            {
                Ok(GeneratedPayload {
                    telegram,
                    website,
                    keywords,
                }) => ChannelResults {
                    telegram: Ok(telegram),
                    website: Ok(website),
                    keywords,
                },
                // combined parse failure is fatal for the whole item
                Err(e) => ChannelResults {
                    telegram: Err(e.to_string()),
                    website: Err(e.to_string()),
                    keywords: vec![],
                },
            };
        }

        let mut results = ChannelResults::default();
        if targets.telegram {
            results.telegram = match self
                .coordinator
                .generate_for_channel(Channel::Telegram, extracted, &self.settings, custom_prompt)
                .await
            {
                Ok((generation, _)) => Ok(Some(generation)),
                Err(e) => Err(e.to_string()),
            };
        }
        if targets.website {
            match self
                .coordinator
                .generate_for_channel(Channel::Website, extracted, &self.settings, custom_prompt)
                .await
            {
                Ok((generation, keywords)) => {
                    results.website = Ok(Some(generation));
                    results.keywords = keywords;
                }
                Err(e) => results.website = Err(e.to_string()),
            }
        }
        results
    }

    /// Write the log record and assemble the result. The record is
    /// best-effort: a failing sink is logged, never propagated.
    async fn finish(
        &self,
        extracted: &ExtractedContent,
        targets: &DispatchTargets,
        status: ProcessingStatus,
        telegram_outcome: Option<DispatchOutcome>,
        website_outcome: Option<DispatchOutcome>,
    ) -> ProcessingResult {
        let record = LogRecord::new(
            extracted,
            targets.clone(),
            status,
            telegram_outcome.clone(),
            website_outcome.clone(),
        );

        let log_id = match self.log_sink.create_log_record(record).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(title = %extracted.title, error = %e, "failed to write log record");
                None
            }
        };

        info!(title = %extracted.title, status = ?status, "item processed");
        ProcessingResult {
            status,
            telegram: telegram_outcome,
            website: website_outcome,
            log_id,
        }
    }
}

/// Per-channel generation results with independent error capture.
struct ChannelResults {
    telegram: std::result::Result<Option<crate::types::ChannelGeneration>, String>,
    website: std::result::Result<Option<crate::types::ChannelGeneration>, String>,
    keywords: Vec<String>,
}

impl Default for ChannelResults {
    fn default() -> Self {
        Self {
            telegram: Ok(None),
            website: Ok(None),
            keywords: vec![],
        }
    }
}
