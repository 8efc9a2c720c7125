//! Trait definitions for model access.

use std::fmt;

use async_trait::async_trait;

/// An image sent alongside the prompt.
#[derive(Clone, PartialEq)]
pub struct ImagePart {
    /// MIME type such as "image/png"
    pub mime_type: String,

    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImagePart {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

impl fmt::Debug for ImagePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePart")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// User prompt text
    pub prompt: String,

    /// Optional system instruction
    pub system_instruction: Option<String>,

    /// Images attached after the prompt
    pub images: Vec<ImagePart>,
}

/// Errors from the model transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Missing model configuration: {0}")]
    MissingConfig(String),

    #[error("Request to model service failed: {0}")]
    Request(String),

    #[error("Model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model service rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Invalid response from model service: {0}")]
    InvalidResponse(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Gateway does not support {0}")]
    Unsupported(String),

    #[error("Model call failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// Whether another attempt could succeed.
    ///
    /// Configuration, credential and client errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::InvalidResponse(_) | Self::EmptyResponse => true,
            Self::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::MissingConfig(_)
            | Self::Unauthorized { .. }
            | Self::Unsupported(_)
            | Self::Exhausted { .. } => false,
        }
    }
}

/// A single attempt at a model call. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response text.
    async fn send(&self, request: &ModelRequest) -> Result<String, TransportError>;
}

/// Text-in, text-out access to a generative model.
///
/// Implementations own their retry budget; callers see either text or a final
/// [`TransportError`]. No validation of the output happens at this layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, TransportError>;

    /// Like [`invoke`](Self::invoke) with images attached to the prompt.
    ///
    /// Text-only gateways refuse images instead of dropping them.
    async fn invoke_with_images(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        images: &[ImagePart],
    ) -> Result<String, TransportError> {
        if images.is_empty() {
            self.invoke(prompt, system_instruction).await
        } else {
            Err(TransportError::Unsupported("image input".to_string()))
        }
    }
}
