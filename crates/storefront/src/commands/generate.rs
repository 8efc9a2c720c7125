//! Full site generation command.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_llm::{ImagePart, RetryingGateway};
use storefront_site::{
    DryRunWriter, FallbackPolicy, GenerationReport, Orchestrator, OrchestratorConfig,
};

use crate::config::{self, Settings};

/// Command-line options for `generate`.
#[derive(Debug, Default)]
pub struct Options {
    pub images: Vec<ImagePart>,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub placeholder_on_failure: bool,
    pub minify_css: bool,
}

/// Run the generate command.
pub async fn run(config_path: &Path, description: &str, options: Options) -> Result<()> {
    let settings = config::load(config_path)?;
    let gateway =
        RetryingGateway::vertex(&settings.gateway).context("Model gateway is not configured")?;
    let config = orchestrator_config(&settings, &options);

    tracing::info!(
        "Generating storefront into {} with {}...",
        config.output_dir.display(),
        settings.gateway.model
    );

    let mut orchestrator =
        Orchestrator::new(Arc::new(gateway), config).with_images(options.images);
    if options.dry_run {
        orchestrator = orchestrator.with_writer(Arc::new(DryRunWriter::new()));
    }

    let cancel = orchestrator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current artifact...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let report = orchestrator.run(description).await?;
    log_report(&report);

    if report.cancelled {
        anyhow::bail!("Generation cancelled");
    }
    if !report.failures.is_empty() {
        anyhow::bail!("{} artifact(s) failed to generate", report.failures.len());
    }

    Ok(())
}

/// Combine loaded settings with command-line flags.
fn orchestrator_config(settings: &Settings, options: &Options) -> OrchestratorConfig {
    OrchestratorConfig {
        output_dir: options
            .output
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone()),
        minify_css: options.minify_css || settings.minify_css,
        fallback: if options.placeholder_on_failure {
            FallbackPolicy::UsePlaceholder
        } else {
            FallbackPolicy::Abort
        },
        placeholder_name: options
            .name
            .clone()
            .or_else(|| settings.business_name.clone())
            .unwrap_or_default(),
    }
}

fn log_report(report: &GenerationReport) {
    if report.used_placeholder {
        tracing::warn!("Site data extraction failed; placeholder data was used");
    }

    tracing::info!(
        "Wrote {} files in {}ms",
        report.written.len(),
        report.duration_ms
    );

    for path in &report.raw_outputs {
        tracing::warn!("No code extracted, raw response kept at {}", path.display());
    }

    for failure in &report.failures {
        tracing::error!(
            "{} ({}): {}",
            failure.artifact,
            failure.path.display(),
            failure.error
        );
    }

    tracing::info!("Output: {}", report.output_dir.display());
}
