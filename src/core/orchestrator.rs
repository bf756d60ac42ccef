//! Translation orchestrator with primary/secondary provider fallback

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::context::Context;
use crate::core::cost_ledger::CostLedger;
use crate::core::errors::{ProviderError, Result, TranslationError};
use crate::core::models::{
    LanguageCode, ProviderResult, SessionTotals, TranslationOutcome, TranslationRequest,
};
use crate::core::pricing::PricingTable;
use crate::core::prompt::build_prompt;
use crate::core::provider::ProviderClient;
use crate::core::providers::gemini::GeminiClient;
use crate::core::providers::grok::GrokClient;

const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Combines the Master context with a per-call prompt and sends it to the
/// primary provider, falling back to the secondary once on failure.
///
/// Cloning is cheap and clones share the same session ledger.
#[derive(Debug, Clone)]
pub struct TranslationOrchestrator {
    context: Context,
    pricing: Arc<PricingTable>,
    primary: Arc<dyn ProviderClient>,
    secondary: Arc<dyn ProviderClient>,
    ledger: Arc<CostLedger>,
    temperature: f32,
    attempt_timeout: Duration,
}

impl TranslationOrchestrator {
    /// Orchestrator with default temperature and attempt timeout
    pub fn new(
        context: Context,
        pricing: PricingTable,
        primary: Arc<dyn ProviderClient>,
        secondary: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            context,
            pricing: Arc::new(pricing),
            primary,
            secondary,
            ledger: Arc::new(CostLedger::new()),
            temperature: DEFAULT_TEMPERATURE,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Build Gemini (primary) and Grok (secondary) clients and load the Master file
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let path = config.context_path.as_ref().ok_or_else(|| TranslationError::ConfigError {
            message: "context_path is required".to_string(),
        })?;
        let context = Context::load(path, config.min_context_lines)?;

        Self::with_context(config, context)
    }

    /// Same as [`TranslationOrchestrator::from_config`] with an already loaded context
    pub fn with_context(config: &TranslatorConfig, context: Context) -> Result<Self> {
        let primary: Arc<dyn ProviderClient> = Arc::new(GeminiClient::new(&config.gemini)?);
        let secondary: Arc<dyn ProviderClient> = Arc::new(GrokClient::new(&config.grok)?);

        Ok(Self::new(context, config.pricing.clone(), primary, secondary)
            .with_temperature(config.temperature)
            .with_attempt_timeout(Duration::from_millis(config.attempt_timeout_ms)))
    }

    /// Copy of this orchestrator grounded on `context`; the session ledger stays shared
    pub fn replace_context(&self, context: Context) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Sampling temperature sent on every call
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Upper bound for one provider attempt
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Translate `source_text`
    pub async fn translate(
        &self,
        source_text: &str,
        source_lang: LanguageCode,
        target_lang: LanguageCode,
    ) -> Result<TranslationOutcome> {
        let request = TranslationRequest::new(source_text, source_lang, target_lang)?;
        self.translate_request(&request).await
    }

    /// Translate a request.
    ///
    /// A valid request fails with `TranslationFailed`, carrying the secondary's error,
    /// or with `ConfigError` when an unvalidated pricing table overflows.
    pub async fn translate_request(&self, request: &TranslationRequest) -> Result<TranslationOutcome> {
        request.validate()?;
        let prompt = build_prompt(request);
        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source_lang,
            request.target_lang
        );

        let (provider, result) = match self.attempt(self.primary.as_ref(), &prompt).await {
            Ok(result) => (&self.primary, result),
            Err(primary_err) => {
                warn!("Primary provider failed: {}, trying {}", primary_err, self.secondary.id());
                match self.attempt(self.secondary.as_ref(), &prompt).await {
                    Ok(result) => (&self.secondary, result),
                    Err(secondary_err) => {
                        warn!("Secondary provider also failed: {}", secondary_err);
                        return Err(TranslationError::TranslationFailed {
                            cause: secondary_err,
                        });
                    }
                }
            }
        };

        let cost = self
            .pricing
            .cost(provider.id(), result.tokens_in, result.tokens_out)
            .ok_or_else(|| TranslationError::ConfigError {
                message: format!(
                    "{} pricing overflows for {}+{} tokens",
                    provider.id(),
                    result.tokens_in,
                    result.tokens_out
                ),
            })?;
        let outcome = TranslationOutcome {
            translation: result.text,
            provider_used: provider.id(),
            model: provider.model().to_string(),
            cost,
            tokens_in: result.tokens_in,
            tokens_out: result.tokens_out,
        };

        let total = self.ledger.record(&outcome).await;
        info!(
            "Translated via {} ({}+{} tokens, cost {}, session total {})",
            outcome.model, outcome.tokens_in, outcome.tokens_out, outcome.cost, total
        );

        Ok(outcome)
    }

    /// One bounded provider call
    async fn attempt(
        &self,
        provider: &dyn ProviderClient,
        prompt: &str,
    ) -> std::result::Result<ProviderResult, ProviderError> {
        let call = provider.generate(self.context.text(), prompt, self.temperature);
        match tokio::time::timeout(self.attempt_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::call_failed(
                provider.id(),
                format!("timed out after {:?}", self.attempt_timeout),
            )),
        }
    }

    /// Snapshot of the running session totals
    pub async fn session_totals(&self) -> SessionTotals {
        self.ledger.snapshot().await
    }

    /// Line count of the Master in use
    pub fn context_lines(&self) -> usize {
        self.context.lines()
    }

    /// Provider tried first
    pub fn primary(&self) -> &dyn ProviderClient {
        self.primary.as_ref()
    }

    /// Provider tried once after a primary failure
    pub fn secondary(&self) -> &dyn ProviderClient {
        self.secondary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProviderId;
    use crate::core::pricing::PricingEntry;
    use crate::core::providers::mock::{MockProvider, MockReply};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn context() -> Context {
        Context::from_text("MASTER GLOSSARY\nショックキラー = shock absorber", 2).unwrap()
    }

    fn orchestrator(primary: &MockProvider, secondary: &MockProvider) -> TranslationOrchestrator {
        TranslationOrchestrator::new(
            context(),
            PricingTable::default(),
            Arc::new(primary.clone()),
            Arc::new(secondary.clone()),
        )
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "shock absorber", 1000, 500);
        let secondary = MockProvider::succeeding(ProviderId::Grok, "unused", 1, 1);
        let orchestrator = orchestrator(&primary, &secondary);

        let outcome = orchestrator.translate("ショックキラー", LanguageCode::Ja, LanguageCode::En).await.unwrap();

        assert_eq!(outcome.translation, "shock absorber");
        assert_eq!(outcome.provider_used, ProviderId::Gemini);
        assert_eq!(outcome.model, "gemini-mock");
        assert_eq!(outcome.tokens_in, 1000);
        assert_eq!(outcome.tokens_out, 500);
        assert_eq!(outcome.cost, dec("0.304"));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reference_cost_scenario() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "ok", 1000, 500);
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let pricing = PricingTable {
            gemini: PricingEntry::new(dec("0.20"), dec("0.50")),
            grok: PricingEntry::new(dec("1"), dec("1")),
            usd_to_local: dec("152.0"),
        };
        let orchestrator =
            TranslationOrchestrator::new(context(), pricing, Arc::new(primary), Arc::new(secondary));

        let outcome = orchestrator.translate("text", LanguageCode::Ja, LanguageCode::En).await.unwrap();
        assert_eq!(outcome.cost, dec("0.0684"));
        assert_eq!(orchestrator.session_totals().await.total_cost, dec("0.0684"));
    }

    #[tokio::test]
    async fn test_fallback_uses_secondary_rates() {
        let primary = MockProvider::failing(ProviderId::Gemini, "HTTP 503");
        let secondary = MockProvider::succeeding(ProviderId::Grok, "System Chart", 1000, 500);
        let orchestrator = orchestrator(&primary, &secondary);

        let outcome = orchestrator.translate("体系表", LanguageCode::Ja, LanguageCode::En).await.unwrap();

        assert_eq!(outcome.provider_used, ProviderId::Grok);
        assert_eq!(outcome.cost, dec("0.0684"));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
        assert_eq!(primary.calls()[0].user_prompt, secondary.calls()[0].user_prompt);
    }

    #[tokio::test]
    async fn test_missing_primary_credential_falls_back() {
        let primary = MockProvider::unavailable(ProviderId::Gemini);
        let secondary = MockProvider::succeeding(ProviderId::Grok, "Inline Mount", 10, 2);
        let orchestrator = orchestrator(&primary, &secondary);

        let outcome = orchestrator.translate("ストレート取付", LanguageCode::Ja, LanguageCode::En).await.unwrap();
        assert_eq!(outcome.provider_used, ProviderId::Grok);
    }

    #[tokio::test]
    async fn test_both_fail_leaves_total_unchanged() {
        let primary = MockProvider::failing(ProviderId::Gemini, "auth");
        let secondary = MockProvider::failing(ProviderId::Grok, "rate limited");
        let orchestrator = orchestrator(&primary, &secondary);

        let err = orchestrator.translate("text", LanguageCode::En, LanguageCode::De).await.unwrap_err();

        match err {
            TranslationError::TranslationFailed { cause } => {
                assert_eq!(cause.provider(), ProviderId::Grok);
                assert!(cause.to_string().contains("rate limited"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let totals = orchestrator.session_totals().await;
        assert_eq!(totals.total_cost, Decimal::ZERO);
        assert_eq!(totals.translations, 0);
    }

    #[tokio::test]
    async fn test_invalid_requests_never_reach_providers() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "x", 1, 1);
        let secondary = MockProvider::succeeding(ProviderId::Grok, "x", 1, 1);
        let orchestrator = orchestrator(&primary, &secondary);

        let same = orchestrator.translate("text", LanguageCode::Fr, LanguageCode::Fr).await;
        assert!(matches!(same, Err(TranslationError::InvalidRequest { .. })));

        let empty = orchestrator.translate("", LanguageCode::Ja, LanguageCode::En).await;
        assert!(matches!(empty, Err(TranslationError::InvalidRequest { .. })));

        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_pairs_only_succeed_or_fail_translation() {
        let primary = MockProvider::failing(ProviderId::Gemini, "down");
        let secondary = MockProvider::failing(ProviderId::Grok, "down")
            .then(MockReply::Failure("down".to_string()));
        let orchestrator = orchestrator(&primary, &secondary);

        for source in LanguageCode::ALL {
            for target in LanguageCode::ALL.into_iter().filter(|t| *t != source) {
                let result = orchestrator.translate("text", source, target).await;
                assert!(matches!(result, Err(TranslationError::TranslationFailed { .. })));
            }
        }
        assert_eq!(primary.call_count(), 90);
        assert_eq!(secondary.call_count(), 90);
    }

    #[tokio::test]
    async fn test_context_and_temperature_sent_every_call() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "ok", 1, 1);
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let orchestrator = orchestrator(&primary, &secondary).with_temperature(0.3);

        orchestrator.translate("one", LanguageCode::Ja, LanguageCode::En).await.unwrap();
        orchestrator.translate("two", LanguageCode::En, LanguageCode::Ko).await.unwrap();

        let calls = primary.calls();
        assert_eq!(calls.len(), 2);
        for call in &calls {
            assert_eq!(call.system_context_len, context().len());
            assert_eq!(call.temperature, 0.3);
        }
        assert!(calls[1].user_prompt.starts_with("Translate from EN to KO"));
    }

    #[tokio::test]
    async fn test_translation_passed_through_unmodified() {
        let raw = "  Shock killer? No: shock absorber.\n";
        let primary = MockProvider::succeeding(ProviderId::Gemini, raw, 1, 1);
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let orchestrator = orchestrator(&primary, &secondary);

        let outcome = orchestrator.translate("x", LanguageCode::Ja, LanguageCode::En).await.unwrap();
        assert_eq!(outcome.translation, raw);
    }

    #[tokio::test]
    async fn test_hung_primary_times_out_into_fallback() {
        let primary =
            MockProvider::succeeding(ProviderId::Gemini, "late", 1, 1).with_delay(Duration::from_secs(30));
        let secondary = MockProvider::succeeding(ProviderId::Grok, "on time", 1, 1);
        let orchestrator =
            orchestrator(&primary, &secondary).with_attempt_timeout(Duration::from_millis(50));

        let outcome = orchestrator.translate("x", LanguageCode::Ja, LanguageCode::En).await.unwrap();
        assert_eq!(outcome.translation, "on time");
        assert_eq!(outcome.provider_used, ProviderId::Grok);
    }

    #[tokio::test]
    async fn test_concurrent_calls_sum_exactly() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "ok", 1000, 500)
            .with_delay(Duration::from_millis(5));
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let orchestrator = orchestrator(&primary, &secondary);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator
                        .translate(&format!("text {}", i), LanguageCode::Ja, LanguageCode::En)
                        .await
                        .map(|o| o.cost)
                })
            })
            .collect();

        let mut sum = Decimal::ZERO;
        for handle in handles {
            sum += handle.await.unwrap().unwrap();
        }

        let totals = orchestrator.session_totals().await;
        assert_eq!(totals.translations, 20);
        assert_eq!(totals.total_cost, sum);
        assert_eq!(totals.total_cost, dec("6.08"));
    }

    #[test]
    fn test_from_config_requires_context_path() {
        let mut config = TranslatorConfig::default();
        config.grok.api_key = Some("k".to_string());
        let err = TranslationOrchestrator::from_config(&config).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[test]
    fn test_from_config_rejects_truncated_master() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "only\nthree\nlines").unwrap();

        let mut config = TranslatorConfig::default();
        config.grok.api_key = Some("k".to_string());
        config.context_path = Some(file.path().to_path_buf());
        config.min_context_lines = 4;

        let err = TranslationOrchestrator::from_config(&config).unwrap_err();
        assert!(matches!(err, TranslationError::ContextLoad(_)));

        config.min_context_lines = 3;
        let orchestrator = TranslationOrchestrator::from_config(&config).unwrap();
        assert_eq!(orchestrator.context_lines(), 3);
        assert_eq!(orchestrator.primary().id(), ProviderId::Gemini);
        assert!(!orchestrator.primary().is_configured());
        assert_eq!(orchestrator.secondary().id(), ProviderId::Grok);
    }

    #[tokio::test]
    async fn test_pricing_overflow_is_not_recorded() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "ok", u64::MAX, u64::MAX);
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let pricing = PricingTable {
            gemini: PricingEntry::new(Decimal::MAX, Decimal::MAX),
            ..PricingTable::default()
        };
        let orchestrator =
            TranslationOrchestrator::new(context(), pricing, Arc::new(primary), Arc::new(secondary));

        let err = orchestrator.translate("text", LanguageCode::Ja, LanguageCode::En).await.unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
        assert_eq!(orchestrator.session_totals().await.translations, 0);
    }

    #[tokio::test]
    async fn test_replace_context_keeps_ledger() {
        let primary = MockProvider::succeeding(ProviderId::Gemini, "ok", 1000, 500);
        let secondary = MockProvider::failing(ProviderId::Grok, "unused");
        let original = orchestrator(&primary, &secondary);
        original.translate("a", LanguageCode::Ja, LanguageCode::En).await.unwrap();

        let replaced = original.replace_context(Context::from_text("one\ntwo\nthree", 3).unwrap());
        replaced.translate("b", LanguageCode::Ja, LanguageCode::En).await.unwrap();

        assert_eq!(replaced.context_lines(), 3);
        assert_eq!(original.context_lines(), 2);
        assert_eq!(original.session_totals().await.translations, 2);
        assert_eq!(primary.calls()[1].system_context_len, "one\ntwo\nthree".len());
    }
}
