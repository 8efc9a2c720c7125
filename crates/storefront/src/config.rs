//! Settings loaded once at startup from storefront.toml and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use storefront_llm::{GatewayConfig, RetryPolicy, DEFAULT_LOCATION, DEFAULT_MODEL};

/// Configuration file structure (storefront.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    model: ModelSettings,
    #[serde(default)]
    output: OutputSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ModelSettings {
    name: String,
    project: Option<String>,
    location: String,
    temperature: f32,
    max_output_tokens: u32,
    retry_attempts: u32,
    request_timeout_secs: u64,
    endpoint: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let gateway = GatewayConfig::default();
        Self {
            name: DEFAULT_MODEL.to_string(),
            project: None,
            location: DEFAULT_LOCATION.to_string(),
            temperature: gateway.temperature,
            max_output_tokens: gateway.max_output_tokens,
            retry_attempts: gateway.retry.attempts,
            request_timeout_secs: gateway.request_timeout.as_secs(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OutputSettings {
    dir: String,
    minify_css: bool,
    business_name: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "generated-site".to_string(),
            minify_css: false,
            business_name: None,
        }
    }
}

/// Resolved settings for a run.
#[derive(Debug)]
pub struct Settings {
    pub gateway: GatewayConfig,
    pub output_dir: PathBuf,
    pub minify_css: bool,
    pub business_name: Option<String>,
}

/// Load settings from `path` (if it exists) and the process environment.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<Settings> {
    let file = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file = parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        file
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        ConfigFile::default()
    };

    Ok(resolve(file, |key| {
        std::env::var(key).ok().filter(|value| !value.trim().is_empty())
    }))
}

fn parse(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Merge file settings with environment overrides.
fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Settings {
    let model = file.model;

    let gateway = GatewayConfig {
        model: env("MODEL").unwrap_or(model.name),
        project: env("PROJECT_ID").or(model.project),
        location: env("GOOGLE_CLOUD_LOCATION").unwrap_or(model.location),
        temperature: model.temperature,
        max_output_tokens: model.max_output_tokens,
        request_timeout: Duration::from_secs(model.request_timeout_secs),
        retry: RetryPolicy {
            attempts: model.retry_attempts,
            ..Default::default()
        },
        endpoint: model.endpoint,
        access_token: env("GOOGLE_ACCESS_TOKEN"),
    };

    Settings {
        gateway,
        output_dir: PathBuf::from(file.output.dir),
        minify_css: file.output.minify_css,
        business_name: file.output.business_name.filter(|name| !name.trim().is_empty()),
    }
}

/// Default storefront.toml written by `storefront init`.
pub const DEFAULT_CONFIG: &str = r#"# Storefront Configuration
#
# Environment variables override these values:
#   PROJECT_ID, GOOGLE_CLOUD_LOCATION, MODEL
# The access token is only read from GOOGLE_ACCESS_TOKEN
# (for example: export GOOGLE_ACCESS_TOKEN=$(gcloud auth print-access-token)).

[model]
# Model identifier
name = "gemini-2.5-pro"

# Google Cloud project hosting Vertex AI
# project = "my-project"

# Deployment location
location = "us-central1"

# Sampling temperature
temperature = 0.4

# Maximum tokens per response
max_output_tokens = 8024

# Total attempts per model call, including the first
retry_attempts = 2

# Timeout for a single request
request_timeout_secs = 120

# Service endpoint override
# endpoint = "https://us-central1-aiplatform.googleapis.com"

[output]
# Directory for the generated project
dir = "generated-site"

# Minify the generated stylesheet
minify_css = false

# Business name used for placeholder data when extraction fails
# business_name = "Clay Corner"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_matches_built_in_defaults() {
        let settings = resolve(parse(DEFAULT_CONFIG).unwrap(), no_env);
        let defaults = resolve(ConfigFile::default(), no_env);

        assert_eq!(settings.gateway, defaults.gateway);
        assert_eq!(settings.output_dir, PathBuf::from("generated-site"));
        assert!(!settings.minify_css);
        assert_eq!(settings.business_name, None);
        assert_eq!(settings.gateway, GatewayConfig::default());
    }

    #[test]
    fn file_values_apply() {
        let file = parse(
            r#"
[model]
project = "kiln-42"
retry_attempts = 4
request_timeout_secs = 30

[output]
dir = "site"
minify_css = true
business_name = "Kiln & Co"
"#,
        )
        .unwrap();

        let settings = resolve(file, no_env);

        assert_eq!(settings.gateway.project.as_deref(), Some("kiln-42"));
        assert_eq!(settings.gateway.retry.attempts, 4);
        assert_eq!(settings.gateway.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.gateway.model, DEFAULT_MODEL);
        assert_eq!(settings.output_dir, PathBuf::from("site"));
        assert!(settings.minify_css);
        assert_eq!(settings.business_name.as_deref(), Some("Kiln & Co"));
    }

    #[test]
    fn environment_overrides_file() {
        let file = parse("[model]\nproject = \"from-file\"\nname = \"file-model\"\n").unwrap();
        let env: HashMap<&str, &str> = [
            ("PROJECT_ID", "from-env"),
            ("GOOGLE_CLOUD_LOCATION", "europe-west4"),
            ("GOOGLE_ACCESS_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let settings = resolve(file, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.gateway.project.as_deref(), Some("from-env"));
        assert_eq!(settings.gateway.location, "europe-west4");
        assert_eq!(settings.gateway.model, "file-model");
        assert_eq!(settings.gateway.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load(&dir.path().join("storefront.toml")).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("generated-site"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront.toml");
        fs::write(&path, "[model\nname = ").unwrap();

        let err = load(&path).unwrap_err();

        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
