//! Site data extraction command.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_llm::{ImagePart, RetryingGateway};
use storefront_site::{Orchestrator, OrchestratorConfig};

use crate::config;

/// Run the extract command.
pub async fn run(
    config_path: &Path,
    description: &str,
    images: Vec<ImagePart>,
    out: Option<PathBuf>,
) -> Result<()> {
    let settings = config::load(config_path)?;
    let gateway =
        RetryingGateway::vertex(&settings.gateway).context("Model gateway is not configured")?;

    tracing::info!("Extracting site data with {}...", settings.gateway.model);

    let orchestrator = Orchestrator::new(Arc::new(gateway), OrchestratorConfig::default())
        .with_images(images);
    let site = orchestrator.extract_site(description).await?;
    let json = site.to_json_pretty();

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Site data written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
