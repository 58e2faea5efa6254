use crate::adapters::generator::HttpTextGenerator;
use crate::adapters::storage::LocalStorage;
use crate::adapters::store::DocumentStore;
use crate::config::GenerationConfig;
use crate::core::catalog::CatalogReader;
use crate::core::pipeline::{GenerationPipeline, PipelineOptions};
use crate::core::rate::RateLimitSettings;
use crate::core::report::{PipelineReport, ReportWriter};
use crate::core::retry::RetryPolicy;
use crate::domain::ports::{ContentStore, Storage, TextGenerator};
use crate::utils::error::{PagesError, Result};
use crate::utils::monitor::RunMonitor;

/// 載入目錄 → 執行管線 → 輸出報告
pub struct GenerationEngine<S: ContentStore, G: TextGenerator> {
    store: S,
    generator: G,
    rate_limit: RateLimitSettings,
    retry: RetryPolicy,
    monitor: RunMonitor,
}

impl GenerationEngine<DocumentStore<LocalStorage>, HttpTextGenerator> {
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let store = DocumentStore::new(LocalStorage::new(config.store_path()));
        let generator = HttpTextGenerator::new(config.generator_settings())?;

        Ok(Self::new(store, generator)
            .with_rate_limit(config.rate_limit())
            .with_retry_policy(config.retry_policy())
            .with_monitor(RunMonitor::new(config.monitoring_enabled())))
    }
}

impl<S: ContentStore, G: TextGenerator> GenerationEngine<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            rate_limit: RateLimitSettings::default(),
            retry: RetryPolicy::default(),
            monitor: RunMonitor::new(false),
        }
    }

    pub fn with_rate_limit(mut self, settings: RateLimitSettings) -> Self {
        self.rate_limit = settings;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_monitor(mut self, monitor: RunMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self, options: &PipelineOptions) -> Result<PipelineReport> {
        tracing::info!("📖 Loading catalog (model: {})", self.generator.model_name());
        let catalog = CatalogReader::new(&self.store).load().await?;
        self.monitor.log_stats("catalog");

        if let Some(slug) = &options.service_slug {
            if catalog.service_by_slug(slug).is_none() {
                return Err(PagesError::not_found("service", slug));
            }
        }

        let pipeline = GenerationPipeline::new(&self.store, &self.generator)
            .with_rate_limit(self.rate_limit)
            .with_retry_policy(self.retry)
            .with_monitor(&self.monitor);
        let report = pipeline
            .run(&catalog.services, &catalog.locations, options)
            .await;

        self.monitor.log_final_stats();
        Ok(report)
    }

    /// 執行並寫出報告，回傳報告與寫入的檔名
    pub async fn run_and_report<W: Storage>(
        &self,
        options: &PipelineOptions,
        writer: &ReportWriter<W>,
    ) -> Result<(PipelineReport, Vec<String>)> {
        let report = self.run(options).await?;
        let files = writer.write(&report).await?;
        tracing::info!("📦 Report files: {}", files.join(", "));
        Ok((report, files))
    }
}
