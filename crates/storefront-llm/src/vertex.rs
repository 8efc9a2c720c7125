//! Vertex AI `generateContent` transport.

use std::fmt;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::retry::RetryingGateway;
use crate::traits::{ModelRequest, Transport, TransportError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Single-attempt HTTP transport to a Vertex AI hosted model.
pub struct VertexTransport {
    client: Client,
    url: String,
    access_token: String,
    generation: GenerationConfig,
}

impl fmt::Debug for VertexTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexTransport")
            .field("url", &self.url)
            .field("access_token", &"<redacted>")
            .field("generation", &self.generation)
            .finish()
    }
}

impl VertexTransport {
    /// Build a transport from validated configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: config.generate_url(),
            access_token: config.access_token.clone().unwrap_or_default(),
            generation: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    /// Endpoint this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for VertexTransport {
    async fn send(&self, request: &ModelRequest) -> Result<String, TransportError> {
        let parts = std::iter::once(Part::Text {
            text: &request.prompt,
        })
        .chain(request.images.iter().map(|image| Part::Inline {
            inline_data: InlineData {
                mime_type: &image.mime_type,
                data: BASE64.encode(&image.data),
            },
        }))
        .collect();

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(|text| SystemInstruction {
                    parts: vec![Part::Text { text }],
                }),
            generation_config: self.generation.clone(),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TransportError::EmptyResponse);
        }

        Ok(text)
    }
}

impl RetryingGateway<VertexTransport> {
    /// Gateway to Vertex AI using the configuration's retry policy.
    pub fn vertex(config: &GatewayConfig) -> Result<Self, TransportError> {
        let transport = VertexTransport::new(config)?;
        tracing::debug!("Model gateway targeting {}", transport.url());
        Ok(Self::new(transport, config.retry.clone()))
    }
}
