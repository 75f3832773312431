use crate::error::{ClaimsError, Result};
use crate::llm::AnswerFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Smallest chat model that supports strict structured outputs.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: String,
    /// Sampling temperature; the service default is used when unset.
    pub temperature: Option<f32>,
    /// Use `JsonObject` for models without structured-output support.
    pub answer_format: AnswerFormat,
    /// Per completion call.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number.
    pub retry_backoff_ms: u64,
    /// Documents classified at the same time in a batch.
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            answer_format: AnswerFormat::JsonSchema,
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            concurrency: 4,
        }
    }
}

impl ClassifierConfig {
    /// Defaults overridden by `FNOL_MODEL`, `FNOL_ANSWER_FORMAT`,
    /// `FNOL_TIMEOUT_SECS`, `FNOL_MAX_RETRIES` and `FNOL_CONCURRENCY` when
    /// present.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("FNOL_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("FNOL_ANSWER_FORMAT") {
            config.answer_format = AnswerFormat::parse(&raw).ok_or_else(|| {
                ClaimsError::InvalidConfig(format!(
                    "FNOL_ANSWER_FORMAT must be json_schema or json_object, got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(v) = env_number("FNOL_TIMEOUT_SECS")? {
            config.timeout_secs = v;
        }
        if let Some(v) = env_number("FNOL_MAX_RETRIES")? {
            config.max_retries = v;
        }
        if let Some(v) = env_number("FNOL_CONCURRENCY")? {
            config.concurrency = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ClaimsError::InvalidConfig("model must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ClaimsError::InvalidConfig("timeout_secs must be > 0".into()));
        }
        if self.concurrency == 0 {
            return Err(ClaimsError::InvalidConfig("concurrency must be > 0".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(attempt as u64))
    }
}

fn env_number<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClaimsError::InvalidConfig(format!("{} is not a number: '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
