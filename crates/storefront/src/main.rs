//! Storefront CLI - generate artisan storefront websites with a hosted model.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Generate artisan storefront websites from a business description")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to storefront.toml config file
    #[arg(short, long, default_value = "storefront.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default storefront.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Extract and validate site data without generating code
    Extract {
        #[command(flatten)]
        input: DescriptionInput,

        /// Product photo to send with the description (repeatable)
        #[arg(long = "image", value_name = "FILE")]
        images: Vec<PathBuf>,

        /// Write the JSON record here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate the full website project
    Generate {
        #[command(flatten)]
        input: DescriptionInput,

        /// Product photo to send with the description (repeatable)
        #[arg(long = "image", value_name = "FILE")]
        images: Vec<PathBuf>,

        /// Business name used if placeholder data is needed
        #[arg(long)]
        name: Option<String>,

        /// Output directory (defaults to config or "generated-site")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log what would be written without touching the filesystem
        #[arg(long)]
        dry_run: bool,

        /// Continue with placeholder data if extraction fails
        #[arg(long)]
        placeholder_on_failure: bool,

        /// Minify the generated stylesheet
        #[arg(long)]
        minify_css: bool,
    },

    /// Render a prompt template
    Prompt {
        /// Template name
        name: String,

        /// Template input as KEY=VALUE
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

/// Business description, given inline or read from a file.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct DescriptionInput {
    /// Business description text
    #[arg(short, long)]
    description: Option<String>,

    /// File containing the business description
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl DescriptionInput {
    fn read(&self) -> Result<String> {
        let text = match (&self.description, &self.input) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => anyhow::bail!("Provide --description or --input"),
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            anyhow::bail!("Business description is empty");
        }
        Ok(text)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Extract { input, images, out } => {
            let description = input.read()?;
            let images = commands::load_images(&images)?;
            commands::extract::run(&cli.config, &description, images, out).await?;
        }
        Commands::Generate {
            input,
            images,
            name,
            output,
            dry_run,
            placeholder_on_failure,
            minify_css,
        } => {
            let description = input.read()?;
            let options = commands::generate::Options {
                images: commands::load_images(&images)?,
                name,
                output,
                dry_run,
                placeholder_on_failure,
                minify_css,
            };
            commands::generate::run(&cli.config, &description, options).await?;
        }
        Commands::Prompt { name, set } => {
            commands::prompt::run(&name, &set)?;
        }
    }

    Ok(())
}
