//! # AVI Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento configurazione (file JSON + override da CLI)
//! - Verifica che l'encoder sia disponibile
//! - Avvio del batch, Ctrl-C per cancellarlo
//! - Ogni file convertito viene salvato appena pronto; report finale
//!
//! ## Esempio di utilizzo:
//! ```bash
//! avi-converter ./uploads clip.avi --workers 3 --output converted_videos
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use avi_converter::{
    file_manager::FileManager, json_output::JsonMessage, platform::PlatformCommands,
    progress::ProgressManager, BatchCoordinator, BatchReport, Config, Converter,
};

#[derive(Parser)]
#[command(name = "avi-converter")]
#[command(about = "Convert video files to MP4 with ffmpeg, several at a time")]
struct Args {
    /// Video files or directories to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for converted files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel conversions
    #[arg(short, long)]
    workers: Option<usize>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Per-file timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output progress and results as JSON lines
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json_output = args.json;
    if let Err(e) = run(args).await {
        if json_output {
            JsonMessage::error(e.to_string(), e.chain().nth(1).map(|s| s.to_string())).emit();
        }
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ffmpeg) = args.ffmpeg {
        config.ffmpeg_path = Some(ffmpeg);
    }
    if args.timeout.is_some() {
        config.task_timeout_secs = args.timeout;
    }
    config.json_output = args.json;
    config.validate()?;

    info!("Platform: {}", PlatformCommands::system_info());

    let inputs = FileManager::collect_inputs(&args.inputs, &config)?;
    if inputs.is_empty() {
        return Err(anyhow::anyhow!(
            "No video files to convert (accepted extensions: {})",
            config.input_extensions.join(", ")
        ));
    }

    let converter = Converter::new(&config);
    if !converter.is_available().await {
        return Err(anyhow::anyhow!(
            "Dependency missing: {} is required for video conversion",
            converter.tool().display()
        ));
    }

    let coordinator_config = config.clone();
    let progress = if config.json_output {
        ProgressManager::hidden()
    } else {
        ProgressManager::new(inputs.len() as u64)
    };
    let progress_clone = progress.clone();
    let json_output = config.json_output;
    let coordinator = BatchCoordinator::new(coordinator_config)
        .with_output_dir(config.output_path.clone())
        .with_progress(move |state, result| {
            if json_output {
                JsonMessage::file_complete(result).emit();
                JsonMessage::progress(state).emit();
            } else {
                if let Some(saved) = result.saved_path() {
                    info!("💾 {} -> {}", result.source_name, saved.display());
                }
                progress_clone.file_finished(result);
            }
        });

    let cancel = CancellationToken::new();
    let ct = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            ct.cancel();
        }
    });

    if json_output {
        JsonMessage::start(inputs.len(), config.workers, config.output_path.clone()).emit();
    } else {
        info!("Converting {} file(s) with {} worker(s)", inputs.len(), config.workers);
    }

    let report = coordinator.run(inputs, cancel).await?;
    progress.finish(&report.format_summary());
    print_report(&report, &config);

    if report.cancelled {
        return Err(anyhow::anyhow!("Batch cancelled: {} file(s) not converted", report.not_run_count()));
    }
    if report.failed_count() > 0 {
        return Err(anyhow::anyhow!("{} file(s) failed to convert", report.failed_count()));
    }
    Ok(())
}

fn print_report(report: &BatchReport, config: &Config) {
    if config.json_output {
        JsonMessage::complete(report).emit();
        return;
    }

    info!("=== Conversion Complete ===");
    info!("Converted: {} file(s)", report.succeeded_count());
    if report.failed_count() > 0 {
        let names: Vec<&str> = report.failures().map(|r| r.source_name.as_str()).collect();
        error!("Failed to convert: {}", names.join(", "));
        for failed in report.failures() {
            error!("  {}: {}", failed.source_name, failed.error_detail().unwrap_or_default());
        }
    }
    if report.not_run_count() > 0 {
        warn!("Not converted (cancelled): {} file(s)", report.not_run_count());
    }
    info!("Output directory: {}", config.output_path.display());
    info!("Total time: {:.1}s", report.elapsed.as_secs_f64());
}
