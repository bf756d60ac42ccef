//! Main entry point for the USI translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usi_translator::cli::commands::{self, Commands};
use usi_translator::TranslatorConfig;

/// USI Translator - glossary-grounded technical translation
#[derive(Parser, Debug)]
#[command(name = "usi-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./usi-translator.{toml,json,yaml} if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Master context document
    #[arg(long)]
    context: Option<PathBuf>,

    /// Minimum line count of the Master document
    #[arg(long)]
    min_context_lines: Option<usize>,

    /// API key for Gemini (optional, defaults to GEMINI_API_KEY env var)
    #[arg(long)]
    gemini_api_key: Option<String>,

    /// API key for Grok (optional, defaults to GROK_API_KEY env var)
    #[arg(long)]
    grok_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration
    fn apply(&self, config: &mut TranslatorConfig) {
        if let Some(path) = &self.context {
            config.context_path = Some(path.clone());
        }
        if let Some(lines) = self.min_context_lines {
            config.min_context_lines = lines;
        }
        if let Some(key) = &self.gemini_api_key {
            config.gemini.api_key = Some(key.clone());
        }
        if let Some(key) = &self.grok_api_key {
            config.grok.api_key = Some(key.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("usi_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Execute command
    match &args.command {
        Some(Commands::Languages) => commands::handle_languages(),
        Some(Commands::Translate {
            text,
            file,
            source_lang,
            target_lang,
            json,
        }) => {
            let config = load_config(&args)?;
            commands::handle_translate(&config, text.clone(), file.clone(), *source_lang, *target_lang, *json)
                .await?;
        }
        Some(Commands::Server { host, port }) => {
            let config = load_config(&args)?;
            commands::handle_server(&config, host.clone(), *port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<TranslatorConfig> {
    let mut config = TranslatorConfig::load_from(args.config.as_deref())?;
    args.apply(&mut config);
    Ok(config)
}
