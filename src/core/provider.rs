//! Provider capability shared by every model backend

use async_trait::async_trait;
use std::fmt::Debug;

use crate::core::errors::ProviderError;
use crate::core::models::{ProviderId, ProviderResult};

/// A remote model that turns a system context plus a user prompt into text.
///
/// Implementations own their credential and HTTP client and keep no other
/// state between calls. A missing credential must fail with
/// [`ProviderError::Unavailable`] before any network traffic, and a response
/// without usage counts or with empty text must fail rather than succeed.
#[async_trait]
pub trait ProviderClient: Send + Sync + Debug {
    /// Backend identity, used for pricing
    fn id(&self) -> ProviderId;

    /// Model identifier sent to the backend
    fn model(&self) -> &str;

    /// Whether a credential is configured
    fn is_configured(&self) -> bool;

    /// Generate a completion
    async fn generate(
        &self,
        system_context: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<ProviderResult, ProviderError>;
}
