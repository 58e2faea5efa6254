use crate::domain::model::OverrideContent;
use crate::domain::ports::Storage;
use crate::utils::error::{PagesError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_REPORT_FILE: &str = "generation_report.csv";
pub const JSON_REPORT_FILE: &str = "generation_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairOutcome {
    /// dry-run：只列出會處理的組合
    Planned,
    /// 已有覆寫且未強制更新
    Skipped,
    Created,
    Updated,
    /// 已生成但只寫進報告 (未持久化)
    Generated,
    Failed,
}

impl PairOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairOutcome::Planned => "planned",
            PairOutcome::Skipped => "skipped",
            PairOutcome::Created => "created",
            PairOutcome::Updated => "updated",
            PairOutcome::Generated => "generated",
            PairOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    pub service_slug: String,
    pub location_slug: String,
    pub outcome: PairOutcome,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<OverrideContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub persist: bool,
    pub entries: Vec<PairReport>,
}

impl PipelineReport {
    pub fn start(dry_run: bool, persist: bool) -> Self {
        let started_at = Utc::now();
        Self {
            run_id: started_at.format("run-%Y%m%dT%H%M%SZ").to_string(),
            started_at,
            finished_at: None,
            dry_run,
            persist,
            entries: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn count(&self, outcome: PairOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &PairReport> {
        self.entries.iter().filter(|e| e.outcome == PairOutcome::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} pairs: {} created, {} updated, {} generated, {} skipped, {} planned, {} failed",
            self.entries.len(),
            self.count(PairOutcome::Created),
            self.count(PairOutcome::Updated),
            self.count(PairOutcome::Generated),
            self.count(PairOutcome::Skipped),
            self.count(PairOutcome::Planned),
            self.count(PairOutcome::Failed),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = PagesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(PagesError::InvalidConfigValue {
                field: "report.formats".to_string(),
                value: other.to_string(),
                reason: "supported formats are csv and json".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    service: &'a str,
    location: &'a str,
    outcome: &'a str,
    attempts: u32,
    error: &'a str,
}

pub struct ReportWriter<S: Storage> {
    storage: S,
    formats: Vec<ReportFormat>,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, formats: Vec<ReportFormat>) -> Self {
        Self { storage, formats }
    }

    /// 回傳寫入的檔名
    pub async fn write(&self, report: &PipelineReport) -> Result<Vec<String>> {
        let mut written = Vec::new();
        for format in &self.formats {
            let (file, bytes) = match format {
                ReportFormat::Csv => (CSV_REPORT_FILE, to_csv(report)?),
                ReportFormat::Json => (JSON_REPORT_FILE, serde_json::to_vec_pretty(report)?),
            };
            self.storage.write_file(file, &bytes).await?;
            tracing::debug!("📝 Report written to {} ({} bytes)", file, bytes.len());
            written.push(file.to_string());
        }
        Ok(written)
    }
}

pub fn to_csv(report: &PipelineReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in &report.entries {
        writer.serialize(CsvRow {
            service: &entry.service_slug,
            location: &entry.location_slug,
            outcome: entry.outcome.as_str(),
            attempts: entry.attempts,
            error: entry.error.as_deref().unwrap_or(""),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| PagesError::Io(e.into_error()))
}
