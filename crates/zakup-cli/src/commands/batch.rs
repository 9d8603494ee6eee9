//! Batch processing command for multiple supplier documents.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use zakup_core::{ExtractionResult, OfferPipeline};

use super::process::OutputFormat;
use super::{ServiceArgs, build_service, detect_format, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Stop at the first failed document
    #[arg(long)]
    fail_fast: bool,

    #[command(flatten)]
    service: ServiceArgs,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "docx")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    // The structuring client is blocking; construct it off the async
    // runtime and share one connection pool across the whole batch.
    let service = {
        let config = config.clone();
        let service_args = args.service;
        tokio::task::spawn_blocking(move || build_service(&config, &service_args)).await?
    };
    let mut processed = 0usize;
    let mut needs_review = 0usize;
    let mut failed = 0usize;

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        pb.set_message(name.clone());

        match extract_one(&path, service.clone(), &config).await {
            Ok(result) => {
                processed += 1;
                if result.needs_manual_review {
                    needs_review += 1;
                }
                if let Some(ref output_dir) = args.output_dir {
                    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("offer");
                    let ext = match args.format {
                        OutputFormat::Json => "json",
                        OutputFormat::Text => "txt",
                    };
                    let out_path = output_dir.join(format!("{stem}.{ext}"));
                    fs::write(&out_path, super::process::format_result(&result, args.format)?)?;
                }
                debug!("{}: confidence {}", name, result.confidence);
            }
            Err(e) => {
                failed += 1;
                error!("{}: {}", name, e);
                if args.fail_fast {
                    pb.abandon_with_message(format!("failed on {name}"));
                    return Err(e);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!(
        "{} Processed {} files in {:.1}s: {} ok, {} need review, {} failed",
        style("✓").green(),
        processed + failed,
        start.elapsed().as_secs_f32(),
        processed,
        needs_review,
        failed
    );

    Ok(())
}

async fn extract_one(
    path: &PathBuf,
    service: std::sync::Arc<dyn zakup_core::StructuringService>,
    config: &zakup_core::ZakupConfig,
) -> anyhow::Result<ExtractionResult> {
    let format = detect_format(path)?;
    let content = fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let pipeline = OfferPipeline::with_config(service, config.pipeline.clone());

    let result =
        tokio::task::spawn_blocking(move || pipeline.extract(&content, &file_name, format))
            .await??;
    Ok(result)
}
