//! Core data models for translation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{Result, TranslationError};

/// Supported language codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    /// Japanese
    Ja,
    /// English
    En,
    /// German
    De,
    /// French
    Fr,
    /// Spanish
    Es,
    /// Portuguese
    Pt,
    /// Italian
    It,
    /// Korean
    Ko,
    /// Simplified Chinese (mainland)
    #[serde(alias = "zh-CN", alias = "zh")]
    Cn,
    /// Traditional Chinese (Taiwan)
    #[serde(alias = "zh-TW", alias = "zh-Hant")]
    Tw,
}

impl LanguageCode {
    /// All languages in display order
    pub const ALL: [LanguageCode; 10] = [
        LanguageCode::Ja,
        LanguageCode::En,
        LanguageCode::De,
        LanguageCode::Fr,
        LanguageCode::Es,
        LanguageCode::Pt,
        LanguageCode::It,
        LanguageCode::Ko,
        LanguageCode::Cn,
        LanguageCode::Tw,
    ];

    /// Short code, e.g. `ja`
    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::Ja => "ja",
            LanguageCode::En => "en",
            LanguageCode::De => "de",
            LanguageCode::Fr => "fr",
            LanguageCode::Es => "es",
            LanguageCode::Pt => "pt",
            LanguageCode::It => "it",
            LanguageCode::Ko => "ko",
            LanguageCode::Cn => "cn",
            LanguageCode::Tw => "tw",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::Ja => "Japanese",
            LanguageCode::En => "English",
            LanguageCode::De => "German",
            LanguageCode::Fr => "French",
            LanguageCode::Es => "Spanish",
            LanguageCode::Pt => "Portuguese",
            LanguageCode::It => "Italian",
            LanguageCode::Ko => "Korean",
            LanguageCode::Cn => "Chinese (CN)",
            LanguageCode::Tw => "Chinese (TW)",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let lang = match normalized.as_str() {
            "zh-cn" | "zh" => LanguageCode::Cn,
            "zh-tw" | "zh-hant" => LanguageCode::Tw,
            other => LanguageCode::ALL
                .into_iter()
                .find(|l| l.code() == other)
                .ok_or_else(|| TranslationError::invalid_request(format!("unsupported language: {}", s)))?,
        };
        Ok(lang)
    }
}

/// Identity of a remote model backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Google Gemini (primary)
    Gemini,
    /// x.ai Grok (secondary)
    Grok,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Gemini => write!(f, "gemini"),
            ProviderId::Grok => write!(f, "grok"),
        }
    }
}

/// Validated translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Language of `text`
    pub source_lang: LanguageCode,
    /// Requested output language
    pub target_lang: LanguageCode,
}

impl TranslationRequest {
    /// Build a request, rejecting empty text and identical languages
    pub fn new(text: impl Into<String>, source_lang: LanguageCode, target_lang: LanguageCode) -> Result<Self> {
        let request = Self {
            text: text.into(),
            source_lang,
            target_lang,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the request without building it, for fields set directly
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(TranslationError::invalid_request("source text is empty"));
        }
        if self.source_lang == self.target_lang {
            return Err(TranslationError::invalid_request(format!(
                "source and target language are both {}",
                self.source_lang
            )));
        }
        Ok(())
    }
}

/// Raw result of one provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResult {
    /// Generated text, trimmed
    pub text: String,
    /// Prompt tokens reported by the provider
    pub tokens_in: u64,
    /// Completion tokens reported by the provider
    pub tokens_out: u64,
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutcome {
    /// Translated text
    pub translation: String,
    /// Provider that produced the translation
    pub provider_used: ProviderId,
    /// Model name of that provider
    pub model: String,
    /// Cost in local currency units
    pub cost: Decimal,
    /// Prompt tokens billed
    pub tokens_in: u64,
    /// Completion tokens billed
    pub tokens_out: u64,
}

/// Running totals for the lifetime of an orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Sum of outcome costs
    pub total_cost: Decimal,
    /// Number of successful translations
    pub translations: u64,
    /// Sum of prompt tokens
    pub tokens_in: u64,
    /// Sum of completion tokens
    pub tokens_out: u64,
    /// When the session began
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl SessionTotals {
    /// Empty totals starting now
    pub fn new() -> Self {
        Self {
            total_cost: Decimal::ZERO,
            translations: 0,
            tokens_in: 0,
            tokens_out: 0,
            started_at: chrono::Utc::now(),
        }
    }

    /// Fold one outcome in
    pub fn add(&mut self, outcome: &TranslationOutcome) {
        self.total_cost += outcome.cost;
        self.translations += 1;
        self.tokens_in += outcome.tokens_in;
        self.tokens_out += outcome.tokens_out;
    }
}

impl Default for SessionTotals {
    fn default() -> Self {
        Self::new()
    }
}
