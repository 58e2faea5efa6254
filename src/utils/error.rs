use thiserror::Error;

/// 錯誤回應內容保留的最大字元數
pub const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV report error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Generative provider returned {status}: {body}")]
    ProviderStatus {
        status: u16,
        body: String,
        retry_after_ms: Option<u64>,
    },

    #[error("Generative provider timed out after {seconds}s")]
    ProviderTimeout { seconds: u64 },

    #[error("Model output is not valid JSON: {message}")]
    UnparsableOutput { message: String },

    #[error("Override contract violated in {section}: {reason}")]
    StructuralValidation { section: String, reason: String },

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<PagesError> },

    #[error("Override already exists for service {service_id} / location {location_id}")]
    UpsertConflict {
        service_id: String,
        location_id: String,
    },

    #[error("{kind} not found: {slug}")]
    NotFound { kind: String, slug: String },

    #[error("Content store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Provider,
    Content,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PagesError {
    pub fn not_found(kind: &str, slug: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            slug: slug.to_string(),
        }
    }

    pub fn validation(section: &str, reason: impl Into<String>) -> Self {
        Self::StructuralValidation {
            section: section.to_string(),
            reason: reason.into(),
        }
    }

    /// 判斷錯誤是否值得重試（暫時性的供應商錯誤或結構錯誤）
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_)
            | Self::ProviderStatus { .. }
            | Self::ProviderTimeout { .. }
            | Self::UnparsableOutput { .. }
            | Self::StructuralValidation { .. } => true,
            _ => false,
        }
    }

    /// 供應商透過 Retry-After 提示的等待時間 (毫秒)
    pub fn retry_hint(&self) -> Option<u64> {
        match self {
            Self::ProviderStatus { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) => ErrorCategory::Network,
            Self::ProviderStatus { .. } | Self::ProviderTimeout { .. } => ErrorCategory::Provider,
            Self::RetriesExhausted { last, .. } => last.category(),
            Self::UnparsableOutput { .. }
            | Self::StructuralValidation { .. }
            | Self::NotFound { .. } => ErrorCategory::Content,
            Self::Io(_)
            | Self::Serialization(_)
            | Self::Csv(_)
            | Self::UpsertConflict { .. }
            | Self::Store { .. } => ErrorCategory::Storage,
            Self::Config { .. }
            | Self::ConfigValidation { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } | Self::UpsertConflict { .. } => ErrorSeverity::Low,
            Self::Http(_)
            | Self::ProviderStatus { .. }
            | Self::ProviderTimeout { .. }
            | Self::UnparsableOutput { .. }
            | Self::StructuralValidation { .. }
            | Self::RetriesExhausted { .. } => ErrorSeverity::Medium,
            Self::Serialization(_) | Self::Csv(_) | Self::Store { .. } => ErrorSeverity::High,
            Self::Io(_)
            | Self::Config { .. }
            | Self::ConfigValidation { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity to the generative endpoint".to_string(),
            ErrorCategory::Provider => {
                "The provider is throttling or slow; rerun later, completed pairs are skipped".to_string()
            }
            ErrorCategory::Content => match self {
                Self::NotFound { kind, .. } => format!("Verify the {} slug exists in the content store", kind),
                _ => "Rerun the job; model output varies between calls".to_string(),
            },
            ErrorCategory::Storage => "Check the content store directory and its JSON collections".to_string(),
            ErrorCategory::Configuration => "Review the TOML configuration file and environment variables".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { kind, slug } => format!("No {} with slug '{}'", kind, slug),
            Self::ProviderTimeout { seconds } => {
                format!("The text generator did not answer within {} seconds", seconds)
            }
            Self::RetriesExhausted { attempts, .. } => {
                format!("Generation failed after {} attempts", attempts)
            }
            other => other.to_string(),
        }
    }
}

/// 截斷錯誤內容，避免日誌被巨大的回應塞滿
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}

pub type Result<T> = std::result::Result<T, PagesError>;
