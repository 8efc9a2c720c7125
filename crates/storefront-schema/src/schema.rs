//! Declarative record schemas.
//!
//! A [`Schema`] names a record type and lists its fields in declaration order.
//! Schemas are assembled once through [`SchemaBuilder`] and never mutated
//! afterwards; nested records share their schema through an [`Arc`].

use std::fmt::Write as _;
use std::sync::Arc;

/// Type constraint for a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Nested record described by another schema
    Record(Arc<Schema>),
    /// Ordered sequence with inclusive length bounds
    Sequence {
        item: Box<FieldType>,
        min: usize,
        max: Option<usize>,
    },
}

impl FieldType {
    /// Nested record field.
    pub fn record(schema: Schema) -> Self {
        Self::Record(Arc::new(schema))
    }

    /// Unbounded sequence of `item`.
    pub fn sequence(item: FieldType) -> Self {
        Self::Sequence {
            item: Box::new(item),
            min: 0,
            max: None,
        }
    }

    /// Sequence of `item` with inclusive length bounds.
    pub fn bounded_sequence(item: FieldType, min: usize, max: Option<usize>) -> Self {
        Self::Sequence {
            item: Box::new(item),
            min,
            max,
        }
    }

    /// JSON type name used in validation messages.
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Record(_) => "object",
            Self::Sequence { .. } => "array",
        }
    }
}

/// A named field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    required: bool,
    description: Option<String>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// An immutable record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Start building a schema with the given record name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render a compact description of the JSON shape this schema accepts.
    ///
    /// Optional fields are marked with `?`, sequence bounds are spelled out, and
    /// field descriptions follow as `// ...` hints. The output is meant for model
    /// prompts, not for machines.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        describe_record(self, 0, &mut out);
        out
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Add a field that must be present and non-null.
    pub fn required(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name.into(), field_type, true)
    }

    /// Add a field that may be absent or null.
    pub fn optional(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name.into(), field_type, false)
    }

    /// Attach a description to the most recently added field.
    pub fn doc(mut self, description: impl Into<String>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.description = Some(description.into());
        }
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
        }
    }

    fn push(mut self, name: String, field_type: FieldType, required: bool) -> Self {
        self.fields.push(Field {
            name,
            field_type,
            required,
            description: None,
        });
        self
    }
}

fn describe_record(schema: &Schema, indent: usize, out: &mut String) {
    out.push_str("{\n");
    for field in &schema.fields {
        pad(indent + 1, out);
        let marker = if field.required { "" } else { "?" };
        let _ = write!(out, "\"{}\"{}: ", field.name, marker);
        describe_type(&field.field_type, indent + 1, out);
        if let Some(desc) = &field.description {
            let _ = write!(out, " // {}", desc);
        }
        out.push('\n');
    }
    pad(indent, out);
    out.push('}');
}

fn describe_type(field_type: &FieldType, indent: usize, out: &mut String) {
    match field_type {
        FieldType::Record(schema) => describe_record(schema, indent, out),
        FieldType::Sequence { item, min, max } => {
            out.push('[');
            describe_type(item, indent, out);
            out.push(']');
            match (min, max) {
                (0, None) => {}
                (min, None) => {
                    let _ = write!(out, " (at least {} items)", min);
                }
                (0, Some(max)) => {
                    let _ = write!(out, " (at most {} items)", max);
                }
                (min, Some(max)) => {
                    let _ = write!(out, " ({} to {} items)", min, max);
                }
            }
        }
        other => out.push_str(other.json_name()),
    }
}

fn pad(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
