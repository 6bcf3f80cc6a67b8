//! Generative text service implementations.
//!
//! `GenerativeService` is the seam the comparison pipeline talks to.
//! `GeminiClient` calls Google's `generateContent` REST endpoint.
//! The service sees only the prompt and returns raw text; it does not
//! interpret the content and never retries.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use policysage_core::{ComparisonPrompt, Error, Result};

use crate::config::GeminiConfig;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// A text generation backend asked to reply with a single JSON value.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Send the prompt and return the model's raw textual reply.
    async fn generate(&self, prompt: &ComparisonPrompt) -> Result<String>;

    /// Model identifier, used in logs and error messages.
    fn model(&self) -> &str;
}

/// Gemini client. Build once at startup and share; `reqwest::Client` pools connections.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn generate(&self, prompt: &ComparisonPrompt) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Upstream("GEMINI_API_KEY is not configured".into()))?;

        let url = self.endpoint();
        let body = GenerateContentRequest::json_reply(prompt.as_str());

        info!("Calling Gemini API with {} model...", self.config.model);
        debug!("Prompt length: {} chars", prompt.as_str().chars().count());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Invalid API response: {}", e)))?;

        info!("API response received");

        parsed.text().ok_or_else(|| {
            Error::Upstream(format!(
                "Model returned no text (finish reason: {})",
                parsed.stop_reason()
            ))
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "http://localhost:8080/v1beta/".into(),
            ..Default::default()
        });
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_missing_key_is_upstream_error() {
        let client = GeminiClient::new(GeminiConfig::default());
        let err = client
            .generate(&ComparisonPrompt::new("prompt".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(msg) if msg.contains("GEMINI_API_KEY")));
    }
}
