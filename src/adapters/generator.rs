use crate::domain::ports::TextGenerator;
use crate::utils::error::{truncate_body, PagesError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 生成端點預設的硬性逾時
pub const DEFAULT_TIMEOUT_SECS: u64 = 240;

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub thinking_effort: Option<String>,
    pub timeout: Duration,
}

impl GeneratorSettings {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            max_output_tokens: 8192,
            temperature: 0.7,
            thinking_effort: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    max_output_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_effort: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

/// 呼叫外部文字生成端點：`{prompt} -> {text}`
pub struct HttpTextGenerator {
    settings: GeneratorSettings,
    client: Client,
}

impl HttpTextGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { settings, client })
    }

    fn map_send_error(&self, error: reqwest::Error) -> PagesError {
        if error.is_timeout() {
            PagesError::ProviderTimeout {
                seconds: self.settings.timeout.as_secs(),
            }
        } else {
            PagesError::Http(error)
        }
    }
}

/// Retry-After 只支援秒數格式
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            prompt,
            model: &self.settings.model,
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
            thinking_effort: self.settings.thinking_effort.as_deref(),
        };

        let mut request = self.client.post(&self.settings.endpoint).json(&body);
        if let Some(api_key) = &self.settings.api_key {
            request = request.bearer_auth(api_key);
        }

        tracing::debug!(
            model = %self.settings.model,
            prompt_chars = prompt.chars().count(),
            "📡 Calling text generator"
        );

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let retry_after = retry_after_ms(response.headers());
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "⚠️ Text generator returned an error status");
            return Err(PagesError::ProviderStatus {
                status: status.as_u16(),
                body: truncate_body(&text),
                retry_after_ms: retry_after,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| PagesError::UnparsableOutput {
                message: format!("unexpected generator envelope: {}", e),
            })?;
        Ok(parsed.text)
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
