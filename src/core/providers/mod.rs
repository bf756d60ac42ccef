//! Provider implementations: Gemini, Grok and a scripted mock

pub mod gemini;
pub mod grok;
pub mod mock;

use std::time::Duration;

use crate::core::errors::Result;

/// Build the shared-shape HTTP client used by both remote providers
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}

/// Non-empty credential or nothing
pub(crate) fn normalize_key(api_key: Option<String>) -> Option<String> {
    api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
