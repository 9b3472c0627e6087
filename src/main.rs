//! Subfetch - Reddit posts for Discord
//!
//! Entry point: loads configuration and secrets, prepares the scratch
//! directory and runs either the Discord bot or a one-off fetch.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use subfetch::bot;
use subfetch::cli::{Args, Commands};
use subfetch::config::{Config, Credentials};
use subfetch::media::MediaFactory;
use subfetch::pipeline::PostPipeline;
use subfetch::reddit::PageKind;
use subfetch::scratch::ScratchDir;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load .env before anything reads the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(anyhow::anyhow!("Failed to load .env: {}", e));
        }
    }

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Subfetch");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    let credentials = Credentials::from_env();

    let scratch = ScratchDir::new(&config.media.scratch_dir);

    match args.command {
        Commands::Run => {
            let token = credentials.require_discord_token()?.to_string();

            // Startup sanitation: leftovers belong to requests that died mid-flight
            scratch.ensure_exists()?;
            scratch.clean()?;

            let transcoder = MediaFactory::create_transcoder(config.media.clone());
            if let Err(e) = transcoder.check_availability().await {
                warn!("Video posts will fail until ffmpeg is available: {}", e);
            }

            let pipeline = Arc::new(PostPipeline::from_config(&config, &credentials)?);
            bot::run(&token, pipeline, config.discord.clone()).await?;
        }
        Commands::Fetch { subreddit, sort, json } => {
            let page = sort.as_deref().map(|s| s.parse::<PageKind>()).transpose()?;

            scratch.ensure_exists()?;
            let pipeline = PostPipeline::from_config(&config, &credentials)?;
            let result = pipeline.get_post_from_subreddit(&subreddit, page).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", bot::render_reply(&result));
            }
        }
        Commands::Clean => {
            scratch.ensure_exists()?;
            let removed = scratch.clean()?;
            println!("Removed {} files from {}", removed, scratch.path().display());
        }
        Commands::Init { output } => {
            if output.exists() {
                anyhow::bail!("{} already exists", output.display());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subfetch").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subfetch.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Serenity is chatty at debug level
    let filter = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("serenity=warn".parse::<Directive>()?);

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subfetch.log").display());

    Ok(())
}
