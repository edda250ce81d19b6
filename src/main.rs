use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use artifact_publisher::cli::Args;
use artifact_publisher::cloud::s3::S3Backend;
use artifact_publisher::cloud::Backend;
use artifact_publisher::cloud::uploader::{UploadReport, Uploader};
use artifact_publisher::config::PublishConfig;
use artifact_publisher::index::Indexer;
use artifact_publisher::manifest::Manifest;

fn main() -> ExitCode {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = initialize_logging(args.verbose) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(report) if report.failures.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Merge the configuration file with command-line overrides
fn load_config(args: &Args) -> Result<PublishConfig> {
    let mut config = PublishConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<UploadReport> {
    let config = load_config(args)?;
    let report = publish(&config, |bucket| S3Backend::new(&config.s3_config(bucket)))?;

    println!("{}", report.url);
    if !report.failures.is_empty() {
        let failures = serde_json::to_string_pretty(&report.failures)
            .context("Failed to serialize upload failures")?;
        println!("{}", failures);
    }

    info!(
        "Published {} ({} failures)",
        report.url,
        report.failures.len()
    );
    Ok(report)
}

/// Enumerate, index and upload. `connect` builds the backend for the
/// destination bucket and is not called on dry runs.
fn publish<B, F>(config: &PublishConfig, connect: F) -> Result<UploadReport>
where
    B: Backend,
    F: FnOnce(&str) -> Result<B>,
{
    let destination = config.destination();
    info!(
        "Publishing {} path(s) to {}",
        config.files.len(),
        destination.path()
    );

    let mut manifest = Manifest::new();
    for path in &config.files {
        manifest
            .add(path)
            .with_context(|| format!("Failed to enumerate {}", path.display()))?;
    }
    info!("Enumerated {} entries", manifest.len());

    if config.indexes {
        Indexer::new(&mut manifest).make_indexes(&config.index_options())?;
    }

    let report = if config.dry_run {
        UploadReport::dry_run(&manifest)
    } else {
        let backend = connect(&destination.container)?;
        Uploader::new(backend, destination, config.upload_options()).upload(&manifest)?
    };
    manifest.close()?;
    Ok(report)
}
