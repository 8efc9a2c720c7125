//! Storefront project generation.
//!
//! Renders prompt templates, drives the model through the fixed artifact
//! list and writes the resulting Next.js sources.

pub mod assets;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod writer;

pub use orchestrator::{
    artifact_tasks, ArtifactError, ArtifactFailure, FallbackPolicy, GenerationError,
    GenerationReport, GenerationTask, Orchestrator, OrchestratorConfig, SITE_DATA_PATH,
};
pub use progress::{ProgressReporter, TracingProgress};
pub use prompts::{bindings, Bindings, PromptRegistry, PromptTemplate, TemplateError};
pub use writer::{DryRunWriter, FileWriter, FsWriter, WriteError};
