use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use droid_triage::artifacts::{Artifact, ArtifactManifest};
use droid_triage::cli::{Args, Commands};
use droid_triage::config::{load_or_default, DecoderConfig, PinLengths};
use droid_triage::constants::{CATEGORY_LOCAL_TIME, ERROR_LOG_FILE_NAME, FINDINGS_FILE_NAME, SUMMARY_FILE_NAME};
use droid_triage::decoders::{DecoderKind, FsMediaSink};
use droid_triage::models::Finding;
use droid_triage::pipeline::{DecodingPipeline, Diagnostics, FindingAggregator, PipelineReport};
use droid_triage::utils::summary;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // Handle subcommands
    if let Some(cmd) = &args.command {
        return handle_subcommand(cmd);
    }

    let input = args
        .input
        .clone()
        .ok_or_else(|| anyhow!("No input directory given (see --help)"))?;

    info!("Starting Android artifact decoding");
    let started = Utc::now();

    // Load configuration and apply command-line overrides
    let config = load_and_process_config(&args)?;

    // Setup output directory
    let output_dir = setup_output_directory(&input, &args)?;

    // Ingest pulled artifacts
    let manifest = ArtifactManifest::from_directory(&input)?;
    let pipeline = DecodingPipeline::with_defaults(config);

    // Artifacts the registry wants but the acquisition did not provide
    let absent = record_absent_artifacts(&manifest, &pipeline);

    // Decode
    let sink = FsMediaSink::new(&output_dir);
    let mut report = pipeline.run_with(&manifest, &sink, seed_findings());
    let mut diagnostics = absent;
    diagnostics.extend(report.diagnostics);
    report.diagnostics = diagnostics;

    // Write outputs
    let records: Vec<_> = manifest.iter().map(Artifact::record).collect();
    write_outputs(&output_dir, &report)?;
    write_run_summary(&output_dir, started, &records, &report)?;

    info!(
        "Decoding completed: {} findings, {} diagnostics, output in {}",
        report.findings.len(),
        report.diagnostics.len(),
        output_dir.display()
    );
    Ok(())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands (init-config and list-decoders)
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path } => {
            info!("Creating default decoder configuration at {}", path.display());
            DecoderConfig::default().save_to_yaml_file(path)?;
            info!("Configuration created successfully");
            Ok(())
        }
        Commands::ListDecoders => {
            for kind in DecoderKind::all() {
                let artifacts: Vec<_> = kind
                    .normalizer()
                    .artifacts()
                    .iter()
                    .map(|a| a.canonical_name())
                    .collect();
                info!("{:<24} {}", kind.name(), artifacts.join(", "));
            }
            Ok(())
        }
    }
}

/// Load configuration and apply command-line overrides
fn load_and_process_config(args: &Args) -> Result<DecoderConfig> {
    let mut config = load_or_default(args.config.as_deref())?;

    if args.min_pin_length.is_some() || args.max_pin_length.is_some() {
        let min = args.min_pin_length.unwrap_or(config.pin_lengths.min);
        let max = args.max_pin_length.unwrap_or_else(|| config.pin_lengths.max.max(min));
        config.pin_lengths = PinLengths::new(min, max).context("Invalid PIN length override")?;
    }
    if args.workers.is_some() {
        config.recovery_workers = args.workers;
    }
    if args.no_gesture_crack {
        config.crack_gesture_pattern = false;
    }
    config.disabled_decoders.extend(args.disabled_decoders());

    for name in &config.disabled_decoders {
        if !DecoderKind::all().iter().any(|k| k.name().eq_ignore_ascii_case(name)) {
            warn!("Unknown decoder name in disabled list: {}", name);
        }
    }

    Ok(config)
}

fn setup_output_directory(input: &Path, args: &Args) -> Result<PathBuf> {
    let output_dir = args.output_dir(input)?;

    fs::create_dir_all(&output_dir)
        .context(format!("Failed to create output directory {}", output_dir.display()))?;

    info!("Output directory created at {}", output_dir.display());
    Ok(output_dir)
}

fn record_absent_artifacts(manifest: &ArtifactManifest, pipeline: &DecodingPipeline) -> Diagnostics {
    let mut absent = Diagnostics::new();
    for kind in manifest.missing_kinds(&pipeline.registry().kinds()) {
        absent.record_absent(kind.canonical_name());
    }
    if !absent.is_empty() {
        info!("{} expected artifacts were not retrieved", absent.len());
    }
    absent
}

/// Acquisition-time facts that precede every decoded finding
fn seed_findings() -> FindingAggregator {
    let mut aggregator = FindingAggregator::new();
    aggregator.push(Finding::scalar(
        CATEGORY_LOCAL_TIME,
        Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string(),
    ));
    aggregator
}

fn write_outputs(output_dir: &Path, report: &PipelineReport) -> Result<()> {
    let findings_path = output_dir.join(FINDINGS_FILE_NAME);
    let findings = serde_json::to_string_pretty(&report.findings)
        .context("Failed to serialize findings to JSON")?;
    fs::write(&findings_path, findings)
        .context(format!("Failed to write {}", findings_path.display()))?;
    info!("Findings written to {}", findings_path.display());

    let log_path = output_dir.join(ERROR_LOG_FILE_NAME);
    fs::write(&log_path, report.diagnostics.to_error_log())
        .context(format!("Failed to write {}", log_path.display()))?;
    info!("Error log written to {}", log_path.display());

    Ok(())
}

fn write_run_summary(
    output_dir: &Path,
    started: chrono::DateTime<Utc>,
    records: &[droid_triage::artifacts::ArtifactRecord],
    report: &PipelineReport,
) -> Result<PathBuf> {
    let summary_json = summary::create_run_summary(started, Utc::now(), records, report)?;
    let summary_path = output_dir.join(SUMMARY_FILE_NAME);

    fs::write(&summary_path, &summary_json)
        .context("Failed to write run summary")?;

    info!("Run summary written to {}", summary_path.display());
    Ok(summary_path)
}
