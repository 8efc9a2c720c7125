//! Structured extraction: model text in, validated [`Record`] out.

use std::sync::Arc;

use serde_json::Value;
use storefront_schema::{object_spans, Record, Schema, ValidationError};

use crate::traits::{ImagePart, ModelGateway, TransportError};

/// One extraction call: a prompt and the schema its answer must satisfy.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub prompt: String,
    pub schema: Arc<Schema>,
    pub system_instruction: Option<String>,
    pub images: Vec<ImagePart>,
}

impl ExtractionRequest {
    pub fn new(prompt: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            system_instruction: None,
            images: Vec::new(),
        }
    }

    /// Attach images the model should read alongside the prompt.
    pub fn with_images(mut self, images: Vec<ImagePart>) -> Self {
        self.images = images;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Errors that can occur during extraction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("No usable JSON object in model output: {message}")]
    Parse { message: String },

    #[error("Model output failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl ExtractionError {
    /// Whether asking the model again with the error attached may help.
    pub fn is_correctable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Validation(_))
    }
}

/// Extractor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Extra attempts made with the previous error appended to the prompt
    pub correction_attempts: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            correction_attempts: 1,
        }
    }
}

/// Turns free-form model output into schema-conformant records.
///
/// Parse and validation failures get one self-correcting retry by default.
/// Transport failures are returned as-is: the gateway has already spent its
/// own retry budget. No default data is ever substituted here.
pub struct StructuredExtractor {
    gateway: Arc<dyn ModelGateway>,
    config: ExtractorConfig,
}

impl StructuredExtractor {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_config(gateway, ExtractorConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn ModelGateway>, config: ExtractorConfig) -> Self {
        Self { gateway, config }
    }

    /// Run the extraction cycle for `request`.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Record, ExtractionError> {
        let system = steering_instruction(&request.schema, request.system_instruction.as_deref());
        let total = 1 + self.config.correction_attempts;
        let mut prompt = request.prompt.clone();
        let mut attempt = 1;

        loop {
            tracing::debug!(
                "Extracting {} (attempt {}/{})",
                request.schema.name(),
                attempt,
                total
            );

            let raw = self
                .gateway
                .invoke_with_images(&prompt, Some(&system), &request.images)
                .await?;

            match parse_record(&raw, &request.schema) {
                Ok(record) => {
                    tracing::info!(
                        "Extracted {} record on attempt {}",
                        request.schema.name(),
                        attempt
                    );
                    return Ok(record);
                }
                Err(e) if attempt < total => {
                    tracing::warn!("Rejected model output: {}. Asking for a correction", e);
                    prompt = correction_prompt(&request.prompt, &e);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Giving up on {} after {} attempts: {}",
                        request.schema.name(),
                        attempt,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Isolate, parse and validate the JSON object in a raw model response.
///
/// Every top-level `{...}` span is tried in order and the first that parses and
/// validates wins. When none does, the error from the first span is returned.
pub fn parse_record(raw: &str, schema: &Schema) -> Result<Record, ExtractionError> {
    let mut first_error = None;

    for span in object_spans(raw) {
        let result = serde_json::from_str::<Value>(span)
            .map_err(|e| ExtractionError::Parse {
                message: e.to_string(),
            })
            .and_then(|value| Record::validate(value, schema).map_err(ExtractionError::from));

        match result {
            Ok(record) => return Ok(record),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or_else(|| ExtractionError::Parse {
        message: "response contains no JSON object".to_string(),
    }))
}

fn steering_instruction(schema: &Schema, system: Option<&str>) -> String {
    let mut instruction = String::new();
    if let Some(system) = system {
        instruction.push_str(system.trim_end());
        instruction.push_str("\n\n");
    }
    instruction.push_str(
        "Respond with exactly one JSON object and nothing else: no markdown fences, \
         no comments, no explanations. Fields marked with ? are optional. \
         The object must have this shape:\n",
    );
    instruction.push_str(&schema.describe());
    instruction
}

fn correction_prompt(original: &str, error: &ExtractionError) -> String {
    format!(
        "{}\n\nYour previous response was rejected: {}\n\
         Reply again with only the corrected JSON object.",
        original.trim_end(),
        error
    )
}
