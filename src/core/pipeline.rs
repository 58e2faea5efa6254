//! Generation pipeline: one generative call per (service, location) pair.
//!
//! Pairs run strictly one at a time. Every provider call is paced by the
//! adaptive `RateController`; failed pairs are retried with a fixed policy and
//! then recorded as failed without stopping the run. A rerun skips every pair
//! that already has an override unless `force_update` is set.

use crate::core::prompt::{render_prompt, PromptContext};
use crate::core::rate::{RateController, RateLimitSettings};
use crate::core::repair::process_model_output;
use crate::core::report::{PairOutcome, PairReport, PipelineReport};
use crate::core::retry::{with_retry, RetryPolicy};
use crate::core::upsert::{OverrideUpserter, UpsertOutcome};
use crate::domain::model::{LocationKind, OverrideContent, ResolvedLocation, Service};
use crate::domain::ports::{ContentStore, TextGenerator};
use crate::utils::error::{PagesError, Result};
use crate::utils::monitor::RunMonitor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// false 為 dry-run，只列出要處理的組合
    pub execute: bool,
    /// false 時生成內容只寫進報告
    pub persist: bool,
    pub location_type: Option<LocationKind>,
    pub force_update: bool,
    pub service_slug: Option<String>,
    /// 每組完成後的固定間隔，與速率控制器的延遲無關
    pub pair_interval: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            execute: false,
            persist: false,
            location_type: None,
            force_update: false,
            service_slug: None,
            pair_interval: Duration::from_secs(60),
        }
    }
}

pub struct GenerationPipeline<'a, S: ContentStore, G: TextGenerator + ?Sized> {
    store: &'a S,
    generator: &'a G,
    rate: RateController,
    retry: RetryPolicy,
    monitor: Option<&'a RunMonitor>,
}

impl<'a, S: ContentStore, G: TextGenerator + ?Sized> GenerationPipeline<'a, S, G> {
    pub fn new(store: &'a S, generator: &'a G) -> Self {
        Self {
            store,
            generator,
            rate: RateController::new(RateLimitSettings::default()),
            retry: RetryPolicy::default(),
            monitor: None,
        }
    }

    pub fn with_rate_limit(mut self, settings: RateLimitSettings) -> Self {
        self.rate = RateController::new(settings);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_monitor(mut self, monitor: &'a RunMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn rate(&self) -> &RateController {
        &self.rate
    }

    /// services × 篩選後的 locations
    pub fn plan<'c>(
        &self,
        services: &'c [Service],
        locations: &'c [ResolvedLocation],
        options: &PipelineOptions,
    ) -> Vec<(&'c Service, &'c ResolvedLocation)> {
        let location_type = options.location_type;
        let service_slug = options.service_slug.as_deref();

        services
            .iter()
            .filter(|s| service_slug.map_or(true, |slug| s.slug == slug))
            .flat_map(move |service| {
                locations
                    .iter()
                    .filter(move |l| location_type.map_or(true, |kind| l.location.kind == kind))
                    .map(move |location| (service, location))
            })
            .collect()
    }

    pub async fn run(
        &self,
        services: &[Service],
        locations: &[ResolvedLocation],
        options: &PipelineOptions,
    ) -> PipelineReport {
        let mut report = PipelineReport::start(!options.execute, options.persist);
        let pairs = self.plan(services, locations, options);
        let total = pairs.len();

        tracing::info!(
            "🚀 Generation run {}: {} pairs (execute: {}, persist: {}, force: {})",
            report.run_id,
            total,
            options.execute,
            options.persist,
            options.force_update
        );

        let mut generated_before = false;
        for (done, (service, location)) in pairs.into_iter().enumerate() {
            let span = tracing::info_span!(
                "pair",
                service = %service.slug,
                location = %location.slug()
            );

            let entry = async {
                match self.existing_override(service, location, options).await {
                    Err(e) => self.failed(service, location, 0, &e),
                    Ok(true) => {
                        tracing::debug!("⏭️ Override exists, skipping");
                        self.entry(service, location, PairOutcome::Skipped, 0)
                    }
                    Ok(false) if !options.execute => {
                        self.entry(service, location, PairOutcome::Planned, 0)
                    }
                    Ok(false) => {
                        if generated_before && !options.pair_interval.is_zero() {
                            tracing::debug!(
                                "⏸️ Waiting {:?} before next pair",
                                options.pair_interval
                            );
                            tokio::time::sleep(options.pair_interval).await;
                        }
                        generated_before = true;
                        self.process_pair(service, location, options).await
                    }
                }
            }
            .instrument(span)
            .await;

            if let Some(monitor) = self.monitor {
                monitor.log_pair_progress(done + 1, total);
            }
            report.entries.push(entry);
        }

        report.finish();
        tracing::info!("🏁 {}", report.summary());
        report
    }

    async fn existing_override(
        &self,
        service: &Service,
        location: &ResolvedLocation,
        options: &PipelineOptions,
    ) -> Result<bool> {
        if options.force_update {
            return Ok(false);
        }
        Ok(self
            .store
            .find_override(&service.id, location.id())
            .await?
            .is_some())
    }

    async fn process_pair(
        &self,
        service: &Service,
        location: &ResolvedLocation,
        options: &PipelineOptions,
    ) -> PairReport {
        let last_attempt = AtomicU32::new(0);
        let generated = self.generate(service, location, &last_attempt).await;
        let attempts = last_attempt.load(Ordering::Relaxed);

        let content = match generated {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(attempts, error = %e, "❌ Generation failed, moving on");
                return self.failed(service, location, attempts, &e);
            }
        };

        if !options.persist {
            tracing::info!("📄 Generated (report only)");
            let mut entry = self.entry(service, location, PairOutcome::Generated, attempts);
            entry.content = Some(content);
            return entry;
        }

        match OverrideUpserter::new(self.store)
            .upsert(&service.id, location.id(), content)
            .await
        {
            Ok(UpsertOutcome::Created) => {
                tracing::info!("✅ Override created");
                self.entry(service, location, PairOutcome::Created, attempts)
            }
            Ok(UpsertOutcome::Updated) => {
                tracing::info!("✅ Override updated");
                self.entry(service, location, PairOutcome::Updated, attempts)
            }
            Err(e) => {
                tracing::error!(error = %e, "❌ Failed to store override");
                self.failed(service, location, attempts, &e)
            }
        }
    }

    async fn generate(
        &self,
        service: &Service,
        location: &ResolvedLocation,
        last_attempt: &AtomicU32,
    ) -> Result<OverrideContent> {
        let prompt = render_prompt(&PromptContext::build(service, location))?;
        let label = format!("{}:{}", service.slug, location.slug());

        let retried = with_retry(&self.retry, &label, |attempt| {
            last_attempt.store(attempt, Ordering::Relaxed);
            self.attempt(&prompt, service)
        })
        .await?;
        Ok(retried.value)
    }

    /// 單次呼叫：先依速率控制器等待，再生成、驗證、修復
    async fn attempt(&self, prompt: &str, service: &Service) -> Result<OverrideContent> {
        let delay = self.rate.jittered_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "⏳ Pacing generative call");
            tokio::time::sleep(delay).await;
        }

        let text = match self.generator.generate(prompt).await {
            Ok(text) => {
                self.rate.record_success();
                text
            }
            Err(e) => {
                self.rate.record_failure(e.retry_hint());
                return Err(e);
            }
        };

        process_model_output(&text, service)
    }

    fn entry(
        &self,
        service: &Service,
        location: &ResolvedLocation,
        outcome: PairOutcome,
        attempts: u32,
    ) -> PairReport {
        PairReport {
            service_slug: service.slug.clone(),
            location_slug: location.slug().to_string(),
            outcome,
            attempts,
            error: None,
            content: None,
        }
    }

    fn failed(
        &self,
        service: &Service,
        location: &ResolvedLocation,
        attempts: u32,
        error: &PagesError,
    ) -> PairReport {
        let mut entry = self.entry(service, location, PairOutcome::Failed, attempts);
        entry.error = Some(error.to_string());
        entry
    }
}
