use crate::error::Result;
use crate::llm::types::CompletionRequest;
use async_trait::async_trait;

/// Text-completion collaborator: sends a request, returns the raw JSON text
/// of the first answer.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[cfg(feature = "openai")]
pub use openai::OpenAiClient;

#[cfg(feature = "openai")]
mod openai {
    use super::CompletionService;
    use crate::error::{ClaimsError, Result};
    use crate::llm::types::*;
    use async_trait::async_trait;
    use log::debug;
    use reqwest::Client;

    const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    #[derive(Clone)]
    pub struct OpenAiClient {
        client: Client,
        api_key: String,
        base_url: String,
    }

    impl OpenAiClient {
        pub fn new(api_key: String) -> Self {
            Self {
                client: Client::new(),
                api_key,
                base_url: OPENAI_BASE_URL.to_string(),
            }
        }

        /// Point the client at an OpenAI-compatible endpoint.
        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into().trim_end_matches('/').to_string();
            self
        }

        /// Reads `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL`.
        pub fn from_env() -> Result<Self> {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
                ClaimsError::InvalidConfig("OPENAI_API_KEY must be set".to_string())
            })?;
            let client = Self::new(api_key);
            Ok(match std::env::var("OPENAI_BASE_URL") {
                Ok(url) if !url.trim().is_empty() => client.with_base_url(url),
                _ => client,
            })
        }
    }

    #[async_trait]
    impl CompletionService for OpenAiClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            let url = format!("{}/chat/completions", self.base_url);

            let payload = ChatCompletionRequest::from(request);

            let res = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await?;
            let status = res.status();

            if !status.is_success() {
                let body = res.text().await?;
                return Err(ClaimsError::ApiStatus {
                    task: request.task.clone(),
                    status: status.as_u16(),
                    body,
                });
            }

            let body: ChatCompletionResponse = res.json().await?;

            let content = body
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ClaimsError::malformed(&request.task, "no choices returned"))?
                .message
                .content
                .ok_or_else(|| ClaimsError::malformed(&request.task, "empty message content"))?;

            debug!("Raw answer for '{}': {}", request.task, content);
            Ok(content)
        }
    }
}
