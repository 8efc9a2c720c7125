//! Model access for storefront generation.
//!
//! [`ModelGateway`] is the text-in, text-out seam to a hosted model;
//! [`RetryingGateway`] adds a bounded retry budget on top of a single-attempt
//! [`Transport`] such as [`VertexTransport`]. [`StructuredExtractor`] builds on
//! the gateway to turn responses into validated records.

pub mod config;
pub mod extractor;
pub mod retry;
pub mod traits;
pub mod vertex;

pub use config::{GatewayConfig, RetryPolicy, DEFAULT_LOCATION, DEFAULT_MODEL};
pub use extractor::{
    parse_record, ExtractionError, ExtractionRequest, ExtractorConfig, StructuredExtractor,
};
pub use retry::RetryingGateway;
pub use traits::{ImagePart, ModelGateway, ModelRequest, Transport, TransportError};
pub use vertex::VertexTransport;
