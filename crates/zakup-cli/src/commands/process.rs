//! Process command - extract an offer from a single supplier document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use zakup_core::{ExtractionResult, OfferPipeline};

use super::{ServiceArgs, build_service, detect_format, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let format = detect_format(&args.input)?;
    let content = fs::read(&args.input)?;
    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    // The structuring client and the pipeline are blocking; keep them off
    // the async runtime threads entirely.
    let service_args = args.service;
    let pipeline_config = config.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || {
        let service = build_service(&config, &service_args);
        let pipeline = OfferPipeline::with_config(service, pipeline_config);
        pipeline.extract(&content, &file_name, format)
    })
    .await??;

    let output = format_result(&result, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if result.needs_manual_review {
        eprintln!(
            "{} Extraction needs manual review (confidence {})",
            style("!").yellow(),
            result.confidence
        );
    }

    debug!("total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render an extraction result in the requested output format.
pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(text_summary(result)),
    }
}

fn text_summary(result: &ExtractionResult) -> String {
    let offer = &result.offer;
    let mut out = String::new();

    out.push_str(&format!("Файл:       {}\n", result.source_file_name));
    out.push_str(&format!(
        "Поставщик:  {}\n",
        offer.company.as_deref().unwrap_or("—")
    ));
    out.push_str(&format!(
        "Сумма:      {}\n",
        offer
            .total_price
            .map(|p| format!("{} {}", p, offer.currency.code()))
            .unwrap_or_else(|| "—".to_string())
    ));
    out.push_str(&format!(
        "Доставка:   {}\n",
        offer.delivery_term.as_deref().unwrap_or("—")
    ));
    out.push_str(&format!(
        "Оплата:     {}\n",
        offer.payment_term.as_deref().unwrap_or("—")
    ));
    if let Some(valid_until) = offer.valid_until {
        out.push_str(&format!("Действует:  до {}\n", valid_until));
    }

    if !offer.positions.is_empty() {
        out.push_str("Позиции:\n");
        for (i, item) in offer.positions.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} — {} {}{}\n",
                i + 1,
                item.name,
                item.quantity,
                item.unit.token(),
                item.total_price
                    .map(|p| format!(", {} {}", p, offer.currency.code()))
                    .unwrap_or_default()
            ));
        }
    }

    out.push_str(&format!(
        "Надёжность: {}/100{}\n",
        result.confidence,
        if result.needs_manual_review {
            " (требуется проверка)"
        } else {
            ""
        }
    ));

    out
}
