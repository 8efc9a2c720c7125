//! Gateway configuration.

use std::fmt;
use std::time::Duration;

use crate::traits::TransportError;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default deployment location.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Project value shipped in sample environment files; treated as unset.
pub const PLACEHOLDER_PROJECT: &str = "YOUR_GOOGLE_CLOUD_PROJECT_ID";

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total transport calls per invocation, including the first
    pub attempts: u32,

    /// Delay before the first retry
    pub initial_backoff: Duration,

    /// Upper bound for any single delay
    pub max_backoff: Duration,

    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without waiting.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (1 = the first retry).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);

        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            self.max_backoff
        } else {
            Duration::from_secs_f64(secs.max(0.0))
        }
    }
}

/// Everything needed to reach the model, fixed for the gateway's lifetime.
#[derive(Clone, PartialEq)]
pub struct GatewayConfig {
    /// Model identifier (e.g. "gemini-2.5-pro")
    pub model: String,

    /// Cloud project hosting the deployment
    pub project: Option<String>,

    /// Deployment location (e.g. "us-central1")
    pub location: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens in a response
    pub max_output_tokens: u32,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,

    /// Retry budget per invocation
    pub retry: RetryPolicy,

    /// Override for the service endpoint (scheme and host)
    pub endpoint: Option<String>,

    /// OAuth access token sent as a bearer credential
    pub access_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            project: None,
            location: DEFAULT_LOCATION.to_string(),
            temperature: 0.4,
            max_output_tokens: 8024,
            request_timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            endpoint: None,
            access_token: None,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("model", &self.model)
            .field("project", &self.project)
            .field("location", &self.location)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GatewayConfig {
    /// Check that the configuration can reach the service.
    pub fn validate(&self) -> Result<(), TransportError> {
        match self.project.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(TransportError::MissingConfig(
                    "project is not set (PROJECT_ID)".to_string(),
                ))
            }
            Some(PLACEHOLDER_PROJECT) => {
                return Err(TransportError::MissingConfig(
                    "project is still the placeholder value".to_string(),
                ))
            }
            Some(_) => {}
        }

        if self.model.trim().is_empty() {
            return Err(TransportError::MissingConfig("model is empty".to_string()));
        }

        if self.access_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(TransportError::MissingConfig(
                "access token is not set (GOOGLE_ACCESS_TOKEN)".to_string(),
            ));
        }

        Ok(())
    }

    /// Service endpoint, derived from the location unless overridden.
    pub fn endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.trim_end_matches('/').to_string();
        }
        if self.location == "global" {
            "https://aiplatform.googleapis.com".to_string()
        } else {
            format!("https://{}-aiplatform.googleapis.com", self.location)
        }
    }

    /// Full URL of the content generation method for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.endpoint(),
            self.project.as_deref().unwrap_or_default().trim(),
            self.location,
            self.model
        )
    }
}
