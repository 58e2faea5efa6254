use crate::adapters::generator::{GeneratorSettings, DEFAULT_TIMEOUT_SECS};
use crate::core::rate::RateLimitSettings;
use crate::core::report::ReportFormat;
use crate::core::retry::RetryPolicy;
use crate::utils::error::{PagesError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const THINKING_EFFORTS: &[&str] = &["low", "medium", "high"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub job: JobConfig,
    pub store: StoreConfig,
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub report: ReportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON 集合檔所在目錄
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub thinking_effort: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    pub initial_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_seconds")]
    pub delay_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_pair_interval_seconds")]
    pub pair_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    #[serde(default = "default_report_formats")]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_min_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_seconds() -> u64 {
    5
}

fn default_pair_interval_seconds() -> u64 {
    60
}

fn default_report_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            initial_delay_ms: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_retry_delay_seconds(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pair_interval_seconds: default_pair_interval_seconds(),
        }
    }
}

impl GenerationConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PagesError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GENERATOR_API_KEY})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PagesError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("generator.endpoint", &self.generator.endpoint)?;
        validation::validate_path("store.path", &self.store.path)?;
        validation::validate_path("report.output_path", &self.report.output_path)?;

        if self.generator.model.trim().is_empty() {
            return Err(PagesError::MissingConfig {
                field: "generator.model".to_string(),
            });
        }
        validation::validate_range("generator.temperature", self.generator.temperature, 0.0, 2.0)?;
        validation::validate_min("generator.max_output_tokens", self.generator.max_output_tokens, 1)?;
        validation::validate_min("generator.timeout_seconds", self.generator.timeout_seconds, 1)?;
        if let Some(effort) = &self.generator.thinking_effort {
            validation::validate_one_of("generator.thinking_effort", effort, THINKING_EFFORTS)?;
        }

        validation::validate_bounds(
            "rate_limit",
            self.rate_limit.min_delay_ms,
            self.rate_limit.max_delay_ms,
        )?;
        validation::validate_min("retry.max_attempts", self.retry.max_attempts, 1)?;

        self.report_formats()?;
        Ok(())
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        let generator = &self.generator;
        GeneratorSettings {
            endpoint: generator.endpoint.clone(),
            model: generator.model.clone(),
            api_key: generator
                .api_key
                .clone()
                .filter(|key| !key.is_empty() && !key.starts_with("${")),
            max_output_tokens: generator.max_output_tokens,
            temperature: generator.temperature,
            thinking_effort: generator.thinking_effort.clone(),
            timeout: Duration::from_secs(generator.timeout_seconds),
        }
    }

    pub fn rate_limit(&self) -> RateLimitSettings {
        RateLimitSettings {
            min_delay_ms: self.rate_limit.min_delay_ms,
            max_delay_ms: self.rate_limit.max_delay_ms,
            initial_delay_ms: self
                .rate_limit
                .initial_delay_ms
                .unwrap_or(self.rate_limit.min_delay_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            delay: Duration::from_secs(self.retry.delay_seconds),
        }
    }

    pub fn pair_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.pair_interval_seconds)
    }

    pub fn report_formats(&self) -> Result<Vec<ReportFormat>> {
        self.report.formats.iter().map(|f| f.parse()).collect()
    }

    pub fn store_path(&self) -> &str {
        &self.store.path
    }

    pub fn output_path(&self) -> &str {
        &self.report.output_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for GenerationConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
