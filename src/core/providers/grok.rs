//! x.ai Grok client (OpenAI-compatible chat completions)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::ProviderSettings;
use crate::core::errors::{ProviderError, Result};
use crate::core::models::{ProviderId, ProviderResult};
use crate::core::provider::ProviderClient;
use crate::core::providers::{http_client, normalize_key};

/// Default x.ai endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1";
/// Default Grok model
pub const DEFAULT_MODEL: &str = "grok-4-1-fast-non-reasoning";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

/// Grok provider
#[derive(Debug, Clone)]
pub struct GrokClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl GrokClient {
    /// Create a client; a missing key is allowed and reported at call time
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(Duration::from_millis(settings.timeout_ms))?,
            api_key: normalize_key(settings.api_key.clone()),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    fn failed(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::call_failed(ProviderId::Grok, message)
    }
}

#[async_trait]
impl ProviderClient for GrokClient {
    fn id(&self) -> ProviderId {
        ProviderId::Grok
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        system_context: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> std::result::Result<ProviderResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable {
            provider: ProviderId::Grok,
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_context,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Grok API error ({}): {}", status, error_text);
            return Err(self.failed(format!("HTTP {} - {}", status.as_u16(), error_text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("invalid response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.failed("no completion in response"))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(self.failed("empty completion"));
        }

        let usage = parsed.usage.ok_or_else(|| self.failed("response missing usage"))?;
        let (tokens_in, tokens_out) = match (usage.prompt_tokens, usage.completion_tokens) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(self.failed("response usage incomplete")),
        };

        Ok(ProviderResult {
            text: text.to_string(),
            tokens_in,
            tokens_out,
        })
    }
}
