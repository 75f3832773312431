use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Completion request failed: {0}")]
    CompletionFailed(String),

    #[error("Service returned status {status} for task '{task}': {body}")]
    ApiStatus {
        task: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response for task '{task}': {details}")]
    MalformedResponse { task: String, details: String },

    #[error("Completion for task '{task}' timed out after {seconds}s")]
    Timeout { task: String, seconds: u64 },

    #[error("Dataset shape mismatch: column '{column}' has {actual} entries, expected {expected}")]
    DatasetShapeMismatch {
        expected: usize,
        column: String,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClaimsError {
    pub(crate) fn malformed(task: &str, details: impl Into<String>) -> Self {
        ClaimsError::MalformedResponse {
            task: task.to_string(),
            details: details.into(),
        }
    }

    /// Failures that are worth another attempt: transport errors, timeouts,
    /// and the statuses 408, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ClaimsError::CompletionFailed(_) | ClaimsError::Timeout { .. } | ClaimsError::Http(_) => {
                true
            }
            ClaimsError::ApiStatus { status, .. } => {
                matches!(*status, 408 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

#[cfg(feature = "openai")]
impl From<reqwest::Error> for ClaimsError {
    fn from(e: reqwest::Error) -> Self {
        ClaimsError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
