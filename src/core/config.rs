//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::context::DEFAULT_MIN_CONTEXT_LINES;
use crate::core::errors::{Result, TranslationError};
use crate::core::pricing::PricingTable;
use crate::core::providers::{gemini, grok};

/// Base name of the optional configuration file (`usi-translator.toml`, `.json`, `.yaml`)
pub const CONFIG_FILE_NAME: &str = "usi-translator";

/// Prefix of layered environment overrides, e.g. `USI__GROK__MODEL`
pub const ENV_PREFIX: &str = "USI";

const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Connection settings for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Secret key; blank means not configured
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the API
    pub endpoint: String,
    /// Model name sent on every call
    pub model: String,
    /// HTTP client timeout
    pub timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: String::new(),
            model: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProviderSettings {
    fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    /// A partially specified section keeps the provider's own defaults
    fn fill_missing(&mut self, endpoint: &str, model: &str) {
        if self.endpoint.is_empty() {
            self.endpoint = endpoint.to_string();
        }
        if self.model.is_empty() {
            self.model = model.to_string();
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(config_error(format!("{} endpoint is required", name)));
        }
        if self.model.trim().is_empty() {
            return Err(config_error(format!("{} model is required", name)));
        }
        if self.timeout_ms == 0 {
            return Err(config_error(format!("{} timeout_ms must be greater than 0", name)));
        }
        Ok(())
    }

    fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Path of the Master document
    pub context_path: Option<PathBuf>,
    /// Line count below which the Master counts as truncated
    pub min_context_lines: usize,
    /// Sampling temperature, 0 to 2
    pub temperature: f32,
    /// Upper bound for one provider attempt, including response decoding
    pub attempt_timeout_ms: u64,
    /// Tried first
    pub gemini: ProviderSettings,
    /// Fallback
    pub grok: ProviderSettings,
    /// Per-provider rates
    pub pricing: PricingTable,
    /// Shared password required by the HTTP API when set
    #[serde(skip_serializing)]
    pub access_password: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            context_path: None,
            min_context_lines: DEFAULT_MIN_CONTEXT_LINES,
            temperature: 0.1,
            attempt_timeout_ms: DEFAULT_TIMEOUT_MS,
            gemini: ProviderSettings::new(gemini::DEFAULT_ENDPOINT, gemini::DEFAULT_MODEL),
            grok: ProviderSettings::new(grok::DEFAULT_ENDPOINT, grok::DEFAULT_MODEL),
            pricing: PricingTable::default(),
            access_password: None,
        }
    }
}

impl TranslatorConfig {
    /// Load defaults, the optional config file in the working directory and environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`TranslatorConfig::load`], but `file` must exist when given
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let builder = config::Config::builder();
        let builder = match file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder.add_source(config::File::from(path))
            }
            None => builder.add_source(config::File::with_name(CONFIG_FILE_NAME).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.gemini.fill_missing(gemini::DEFAULT_ENDPOINT, gemini::DEFAULT_MODEL);
        config.grok.fill_missing(grok::DEFAULT_ENDPOINT, grok::DEFAULT_MODEL);
        config.apply_key_env();
        Ok(config)
    }

    /// Fill missing credentials from the conventional key variables
    fn apply_key_env(&mut self) {
        if !self.gemini.has_key() {
            self.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        if !self.grok.has_key() {
            self.grok.api_key = std::env::var("GROK_API_KEY")
                .or_else(|_| std::env::var("XAI_API_KEY"))
                .ok();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.gemini.validate("gemini")?;
        self.grok.validate("grok")?;

        if !self.gemini.has_key() && !self.grok.has_key() {
            return Err(config_error("at least one of the Gemini or Grok API keys is required"));
        }
        if !self.gemini.has_key() {
            warn!("Gemini API key not configured, every translation will use Grok");
        } else if !self.grok.has_key() {
            warn!("Grok API key not configured, no fallback is available");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(config_error("temperature must be between 0.0 and 2.0"));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(config_error("attempt_timeout_ms must be greater than 0"));
        }
        if self.min_context_lines == 0 {
            return Err(config_error("min_context_lines must be greater than 0"));
        }
        self.pricing.validate().map_err(config_error)?;

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> TranslationError {
    TranslationError::ConfigError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;

    fn keyed() -> TranslatorConfig {
        let mut config = TranslatorConfig::default();
        config.grok.api_key = Some("xai-test".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.min_context_lines, 47_000);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.grok.endpoint, "https://api.x.ai/v1");
    }

    #[test]
    fn test_config_validation() {
        assert!(keyed().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_keys() {
        let config = TranslatorConfig {
            gemini: ProviderSettings {
                api_key: Some("   ".to_string()),
                ..TranslatorConfig::default().gemini
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TranslationError::ConfigError { .. })));
    }

    #[test]
    fn test_config_validation_bad_temperature() {
        let config = TranslatorConfig {
            temperature: 3.5,
            ..keyed()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
context_path = "/srv/master.txt"
min_context_lines = 10
attempt_timeout_ms = 5000

[grok]
api_key = "from-file"
model = "grok-custom"

[pricing]
usd_to_local = 150.5

[pricing.grok]
input_per_million = "0.25"
output_per_million = 0.75
"#
        )
        .unwrap();

        let config = TranslatorConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.context_path, Some(PathBuf::from("/srv/master.txt")));
        assert_eq!(config.min_context_lines, 10);
        assert_eq!(config.attempt_timeout_ms, 5000);
        assert_eq!(config.grok.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.grok.model, "grok-custom");
        assert_eq!(config.grok.endpoint, grok::DEFAULT_ENDPOINT);
        assert_eq!(config.pricing.usd_to_local, "150.5".parse::<Decimal>().unwrap());
        assert_eq!(config.pricing.grok.input_per_million, "0.25".parse::<Decimal>().unwrap());
        assert_eq!(config.pricing.grok.output_per_million, "0.75".parse::<Decimal>().unwrap());
        assert_eq!(config.pricing.gemini, PricingTable::default().gemini);
    }
}
