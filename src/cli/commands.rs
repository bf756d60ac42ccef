//! CLI command definitions and handlers

use clap::Subcommand;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::TranslatorConfig;
use crate::core::models::{LanguageCode, TranslationOutcome};
use crate::core::orchestrator::TranslationOrchestrator;

/// Commands for the USI translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a text (from --text, --file or stdin)
    Translate {
        /// Text to translate
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Source language (default: ja)
        #[arg(short, long, default_value = "ja")]
        source_lang: LanguageCode,

        /// Target language (default: en)
        #[arg(short, long, default_value = "en")]
        target_lang: LanguageCode,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported languages
    Languages,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn read_source(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e));
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Render an outcome the way the interactive front end shows it
pub fn render_outcome(outcome: &TranslationOutcome, target_lang: LanguageCode) -> String {
    format!(
        "   Model: {}\n   Cost: ¥{:.2}\n   Tokens: {}+{}\n\n📄 {} Translation:\n{}",
        outcome.model,
        outcome.cost.round_dp(2),
        outcome.tokens_in,
        outcome.tokens_out,
        target_lang.display_name(),
        outcome.translation
    )
}

/// Handle translate command
pub async fn handle_translate(
    config: &TranslatorConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    source_lang: LanguageCode,
    target_lang: LanguageCode,
    json: bool,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::info;

    let source_text = read_source(text, file)?;
    let orchestrator = TranslationOrchestrator::from_config(config)?;

    info!("Translating {} -> {}", source_lang, target_lang);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Translating...");

    let result = orchestrator.translate(&source_text, source_lang, target_lang).await;
    pb.finish_and_clear();

    let outcome = result.map_err(|e| anyhow::anyhow!("❌ Translation failed: {}", e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let totals = orchestrator.session_totals().await;
    println!("✅ Translation complete!");
    println!("{}", render_outcome(&outcome, target_lang));
    info!("Session total: ¥{:.2}", totals.total_cost.round_dp(2));

    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    for lang in LanguageCode::ALL {
        println!("{:<4} {}", lang.code(), lang.display_name());
    }
}

/// Handle server command
pub async fn handle_server(config: &TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    let orchestrator = TranslationOrchestrator::from_config(config)?;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("📚 Master: {} lines", orchestrator.context_lines());

    run_server(
        host,
        port,
        orchestrator,
        config.access_password.clone(),
        config.min_context_lines,
    )
    .await?;

    Ok(())
}
