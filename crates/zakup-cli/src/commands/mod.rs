//! CLI subcommands and shared helpers.

pub mod batch;
pub mod process;

use std::path::Path;
use std::sync::Arc;

use zakup_core::{
    DisabledStructuring, DocumentFormat, OllamaTransport, StructuringClient, StructuringService,
    ZakupConfig,
};

/// Load configuration from a file or fall back to defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<ZakupConfig> {
    match config_path {
        Some(path) => Ok(ZakupConfig::from_file(Path::new(path))?),
        None => Ok(ZakupConfig::default()),
    }
}

/// Structuring service options shared by the subcommands.
#[derive(clap::Args)]
pub(crate) struct ServiceArgs {
    /// Skip the structuring service; every document takes the fallback path
    #[arg(long)]
    pub offline: bool,

    /// Structuring service base URL (overrides config)
    #[arg(long)]
    pub service_url: Option<String>,

    /// Structuring model name (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Structuring request timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Build the structuring service from configuration and CLI overrides.
pub(crate) fn build_service(
    config: &ZakupConfig,
    args: &ServiceArgs,
) -> Arc<dyn StructuringService> {
    if args.offline {
        return Arc::new(DisabledStructuring);
    }

    let mut structuring = config.structuring.clone();
    if let Some(url) = &args.service_url {
        structuring.base_url = url.clone();
    }
    if let Some(model) = &args.model {
        structuring.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        structuring.timeout_secs = timeout;
    }

    Arc::new(StructuringClient::new(OllamaTransport::from_config(&structuring)))
}

/// Map a file path to a supported document format via its extension.
pub(crate) fn detect_format(path: &Path) -> anyhow::Result<DocumentFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    Ok(DocumentFormat::from_extension(ext)?)
}
