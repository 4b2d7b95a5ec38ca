//! durafill - fill missing audio durations in a JSON collection
//!
//! Reads a collection, downloads every entry whose duration is null and that
//! has an `audio_url`, probes the audio length and writes
//! `<stem>_updated.<ext>` with the durations in milliseconds.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use durafill::Enricher;
use durafill_common::config::{load_toml_config, RunSettings};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for durafill
#[derive(Parser, Debug)]
#[command(name = "durafill")]
#[command(about = "Fill missing audio durations in a JSON collection")]
#[command(version, long_version = env!("DURAFILL_LONG_VERSION"))]
struct Args {
    /// Collection file to update
    #[arg(required_unless_present_any = ["profile", "list_profiles"])]
    input: Option<PathBuf>,

    /// Named profile to use instead of an input path
    #[arg(short, long, conflicts_with = "input")]
    profile: Option<String>,

    /// Directory for the updated file (default: next to the input)
    #[arg(short, long, env = "DURAFILL_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Concurrent downloads
    #[arg(short, long, env = "DURAFILL_WORKERS")]
    workers: Option<usize>,

    /// Per-download timeout in seconds
    #[arg(long, env = "DURAFILL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// TOML config file (default: <config dir>/durafill/config.toml)
    #[arg(short, long, env = "DURAFILL_CONFIG")]
    config: Option<PathBuf>,

    /// Print known profiles and exit
    #[arg(long)]
    list_profiles: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &toml_config.source {
        Some(path) => info!("Config: {}", path.display()),
        None => debug!("No config file found, using built-in defaults"),
    }

    let profiles = toml_config.profile_table();

    if args.list_profiles {
        for (name, path) in profiles.iter() {
            println!("{:<12} {}", name, path.display());
        }
        return Ok(());
    }

    let input = match (&args.input, &args.profile) {
        (Some(path), _) => path.clone(),
        (None, Some(name)) => profiles.resolve(name)?,
        (None, None) => bail!("an input path or --profile is required"),
    };

    let settings = RunSettings::resolve(
        args.workers,
        args.timeout_secs,
        args.output_dir.clone(),
        &toml_config,
    )?;

    info!("durafill {}", env!("DURAFILL_LONG_VERSION"));
    info!("Input: {}", input.display());

    let enricher = Enricher::from_settings(&settings)?;
    let report = enricher
        .enrich_file(&input, settings.output_dir.as_deref())
        .await
        .with_context(|| format!("Failed to update {}", input.display()))?;

    let summary = &report.summary;
    for (key, reason) in &summary.failures {
        warn!(key = %key, "{}", reason);
    }

    if report.written {
        println!(
            "{} attempted, {} updated, {} failed; saved to {}",
            summary.attempted,
            summary.updated,
            summary.failed,
            report.output_path.display()
        );
    } else {
        println!(
            "No entries need duration updates; {} left unchanged",
            report.output_path.display()
        );
    }

    Ok(())
}
