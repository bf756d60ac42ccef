//! USI Translator - glossary-grounded technical translation library
//!
//! This library sends a large glossary/style document plus a per-call prompt
//! to Gemini, falls back to Grok when Gemini fails, and prices every call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod server;
pub mod cli;

// Re-export key types for convenience
pub use self::core::{
    config::TranslatorConfig,
    context::Context,
    errors::{ContextLoadError, ProviderError, TranslationError},
    models::{LanguageCode, ProviderId, ProviderResult, SessionTotals, TranslationOutcome, TranslationRequest},
    orchestrator::TranslationOrchestrator,
    pricing::{PricingEntry, PricingTable},
    provider::ProviderClient,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
