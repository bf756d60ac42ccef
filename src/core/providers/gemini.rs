//! Google Gemini client (generateContent API)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::ProviderSettings;
use crate::core::errors::{ProviderError, Result};
use crate::core::models::{ProviderId, ProviderResult};
use crate::core::provider::ProviderClient;
use crate::core::providers::{http_client, normalize_key};

/// Default Gemini endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

/// Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl GeminiClient {
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
        ProviderError::call_failed(ProviderId::Gemini, message)
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
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
            provider: ProviderId::Gemini,
        })?;

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: system_context }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: user_prompt }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini API error ({}): {}", status, error_text);
            return Err(self.failed(format!("HTTP {} - {}", status.as_u16(), error_text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("invalid response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .ok_or_else(|| self.failed("no candidate in response"))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(self.failed("empty candidate"));
        }

        let usage = parsed
            .usage_metadata
            .ok_or_else(|| self.failed("response missing usage metadata"))?;
        let (tokens_in, tokens_out) = match (usage.prompt_token_count, usage.candidates_token_count) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(self.failed("usage metadata incomplete")),
        };

        Ok(ProviderResult {
            text: text.to_string(),
            tokens_in,
            tokens_out,
        })
    }
}
