//! tyrano-assets - drive export to TyranoScript project sync
//!
//! Entry point for the command line tool that mirrors shared-drive folders
//! into a TyranoBuilder project: scenario text becomes `.ks`, music becomes
//! mp3, photos become JPEG.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use tyrano_assets::cli::{Args, Commands, ManifestAction};
use tyrano_assets::config::Config;
use tyrano_assets::error::AssetError;
use tyrano_assets::manifest::{Manifest, ProcessMode};
use tyrano_assets::media::MediaProcessorFactory;
use tyrano_assets::workflow::Workflow;

const LOG_FILE: &str = "tyrano-assets.log";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env_overrides();
    config.validate()?;

    match args.command {
        Commands::Process { src_root, dst_root, mode } => {
            let mode = parse_process_mode(&mode)?;
            let src_root = src_root.unwrap_or_else(|| config.paths.src_root.clone());
            let dst_root = dst_root.unwrap_or_else(|| config.paths.dst_root.clone());
            info!("Processing {} -> {} ({})", src_root.display(), dst_root.display(), mode);

            let workflow = Workflow::new(config)?;
            let summary = workflow.process_tree(&src_root, &dst_root, mode).await?;

            println!(
                "processed={} skipped={} failed={} mode={}",
                summary.processed, summary.skipped, summary.failed, summary.mode
            );
            if summary.failed > 0 {
                warn!("{} file(s) failed; see {} for details", summary.failed, LOG_FILE);
            }
        }
        Commands::Convert { input, output_dir, name } => {
            info!("Converting scenario: {}", input.display());
            let workflow = Workflow::new(config)?;
            let written = workflow.convert_text(&input, &output_dir, name.as_deref()).await?;
            println!("{}", written.display());
        }
        Commands::Manifest { action } => {
            let mut manifest = Manifest::load(&config.paths.manifest_path)?;
            match action {
                ManifestAction::List => {
                    if manifest.is_empty() {
                        println!("No processed files recorded.");
                    } else {
                        println!("{:<34} {}", "MD5", "File");
                        println!("{}", "-".repeat(80));
                        for (key, digest) in manifest.entries() {
                            println!("{:<34} {}", digest, key);
                        }
                    }
                }
                ManifestAction::Info => {
                    println!("Manifest: {}", manifest.path().display());
                    println!("Entries:  {}", manifest.len());
                }
                ManifestAction::Clear => {
                    let removed = manifest.clear();
                    manifest.save()?;
                    println!("Cleared {} entries", removed);
                }
            }
        }
        Commands::Check => {
            let media =
                MediaProcessorFactory::create_processor(config.media.clone(), config.image.clone());
            match media.check_availability() {
                Ok(()) => {
                    let version = media.get_version_info().await?;
                    println!("{:<14} ok  {}", config.media.binary_path, version);
                }
                Err(e) => println!("{:<14} missing  ({})", config.media.binary_path, e),
            }
            let image_state = if media.image_converter_available() { "ok" } else { "missing" };
            println!("{:<14} {}", config.image.binary_path, image_state);
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                return Err(AssetError::Config(format!(
                    "{} already exists; remove it first",
                    output.display()
                ))
                .into());
            }
            config.save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".tyrano-assets").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join(LOG_FILE).display()
    );

    Ok(())
}

/// Parse processing mode from string
fn parse_process_mode(mode: &str) -> Result<ProcessMode> {
    match mode.to_lowercase().as_str() {
        "diff" => Ok(ProcessMode::Diff),
        "full" => Ok(ProcessMode::Full),
        _ => Err(AssetError::Config(format!(
            "Invalid mode '{}'. Valid modes: diff, full",
            mode
        ))
        .into()),
    }
}
