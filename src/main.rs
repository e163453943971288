//! Starter kit command line client
//!
//! Exercises the AI endpoints and the error reporter against a configured project

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starterkit::config::AppConfig;
use starterkit::models::ai::{AspectRatio, ImageOptions, Resolution};
use starterkit::utils::logging::init_logging;
use starterkit::{setup_global_error_handlers, AiClient, ErrorReporter, ErrorType, RuntimeError, Settings};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "starterkit", version, about = "Starter kit AI and error reporting client")]
struct Cli {
    /// JSON configuration file (defaults to ~/.config/starterkit/starterkit.json or ./starterkit.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate text from a prompt
    GenerateText {
        prompt: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Analyze an image by URL
    AnalyzeImageUrl { url: String, prompt: String },
    /// Show the remaining AI quota
    Quota,
    /// Generate an image and print its data URL
    GenerateImage {
        prompt: String,
        #[arg(long, default_value = "1:1")]
        aspect_ratio: AspectRatio,
        #[arg(long, default_value = "1K")]
        resolution: Resolution,
    },
    /// Send a test error report
    ReportError {
        message: String,
        #[arg(long)]
        stack: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::new().context("Failed to load settings")?;
    let app_config = match &cli.config {
        Some(path) => Some(AppConfig::load(path)?),
        None => AppConfig::load_default()?,
    };
    let settings = match app_config {
        Some(app_config) => settings.with_app_config(&app_config)?,
        None => settings,
    };

    // Initialize logging
    init_logging(&settings.logging)?;

    let reporter = ErrorReporter::new(settings.clone()).context("Failed to create error reporter")?;
    if setup_global_error_handlers(&reporter).is_none() {
        info!("Error reporting is not configured");
    }

    let client = AiClient::new(settings).context("Failed to create AI client")?;

    match cli.command {
        Command::GenerateText { prompt, system } => {
            let result = client.generate_text(&prompt, system.as_deref()).await?;
            println!("{}", result.text);
            info!("Remaining requests: {}", result.remaining_requests);
        }
        Command::AnalyzeImageUrl { url, prompt } => {
            let result = client.analyze_image_url(&url, &prompt).await?;
            println!("{}", result.analysis);
            info!("Remaining requests: {}", result.remaining_requests);
        }
        Command::Quota => {
            let quota = client.check_ai_quota().await?;
            println!("{}/{} requests left until {}", quota.remaining, quota.max, quota.period_end);
        }
        Command::GenerateImage {
            prompt,
            aspect_ratio,
            resolution,
        } => {
            let options = ImageOptions {
                aspect_ratio,
                resolution,
            };
            let image = client.generate_image(&prompt, Some(options)).await?;
            println!("{}", image.image_base64);
            info!("Remaining requests: {}", image.remaining_requests);
        }
        Command::ReportError { message, stack } => {
            let mut error = RuntimeError::new(message, ErrorType::JsError);
            error.stack = stack;
            reporter.report_error(error).await;
        }
    }

    Ok(())
}
