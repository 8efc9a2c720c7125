//! Record schemas and validation for structured model output.
//!
//! This crate describes the shape a model response must take ([`Schema`]),
//! locates JSON objects inside free-form responses ([`object_spans`]),
//! validates them ([`validate`]), and wraps the survivors as immutable
//! [`Record`]s. It also carries the storefront site schema and the code block
//! extraction used for generated source files.

pub mod codeblock;
pub mod record;
pub mod schema;
pub mod site;
pub mod span;
pub mod validate;

pub use codeblock::{extract_code, Language};
pub use record::Record;
pub use schema::{Field, FieldType, Schema, SchemaBuilder};
pub use site::{site_schema, SiteData};
pub use span::object_spans;
pub use validate::{validate, ValidationError, ValidationErrorKind};
