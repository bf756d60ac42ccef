//! Scripted provider for tests.
//!
//! Never touches the network. Each call pops the next scripted reply; once the
//! script is exhausted the last reply repeats.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::errors::ProviderError;
use crate::core::models::{ProviderId, ProviderResult};
use crate::core::provider::ProviderClient;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this result
    Success(ProviderResult),
    /// Behave as if no credential were configured
    Unavailable,
    /// Fail the call with this message
    Failure(String),
}

/// Details of a call received by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Byte length of the system context
    pub system_context_len: usize,
    /// Full per-call prompt
    pub user_prompt: String,
    /// Requested temperature
    pub temperature: f32,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<MockReply>,
    last: Option<MockReply>,
    calls: Vec<RecordedCall>,
}

/// Mock implementation of [`ProviderClient`]
#[derive(Debug, Clone)]
pub struct MockProvider {
    id: ProviderId,
    model: String,
    delay: Option<Duration>,
    script: Arc<Mutex<Script>>,
    call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Mock with an empty script
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            model: format!("{}-mock", id),
            delay: None,
            script: Arc::new(Mutex::new(Script::default())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Provider that always answers with `text` and the given usage
    pub fn succeeding(id: ProviderId, text: &str, tokens_in: u64, tokens_out: u64) -> Self {
        Self::new(id).then(MockReply::Success(ProviderResult {
            text: text.to_string(),
            tokens_in,
            tokens_out,
        }))
    }

    /// Provider that always fails with a remote error
    pub fn failing(id: ProviderId, message: &str) -> Self {
        Self::new(id).then(MockReply::Failure(message.to_string()))
    }

    /// Provider with no credential
    pub fn unavailable(id: ProviderId) -> Self {
        Self::new(id).then(MockReply::Unavailable)
    }

    /// Append a reply to the script
    pub fn then(self, reply: MockReply) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push_back(reply);
        }
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    fn next_reply(&self, call: RecordedCall) -> Option<MockReply> {
        let mut script = self.script.lock().ok()?;
        script.calls.push(call);
        if let Some(reply) = script.replies.pop_front() {
            script.last = Some(reply);
        }
        script.last.clone()
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        system_context: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<ProviderResult, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply(RecordedCall {
            system_context_len: system_context.len(),
            user_prompt: user_prompt.to_string(),
            temperature,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(MockReply::Success(result)) => Ok(result),
            Some(MockReply::Unavailable) => Err(ProviderError::Unavailable { provider: self.id }),
            Some(MockReply::Failure(message)) => Err(ProviderError::call_failed(self.id, message)),
            None => Err(ProviderError::call_failed(self.id, "mock has no scripted reply")),
        }
    }
}
