//! Validated records.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::Schema;
use crate::validate::{validate, ValidationError};

/// A JSON value that has passed validation against a named schema.
///
/// The only way to obtain a `Record` is [`Record::validate`], so holding one
/// proves the value conforms. The value is never mutated afterwards; fields the
/// schema does not mention are preserved as they arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: String,
    value: Value,
}

impl Record {
    /// Validate `value` against `schema` and wrap it.
    pub fn validate(value: Value, schema: &Schema) -> Result<Self, ValidationError> {
        validate(&value, schema)?;
        Ok(Self {
            schema: schema.name().to_string(),
            value,
        })
    }

    /// Name of the schema this record conforms to.
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Look up a nested value by dotted path. Numeric segments index arrays.
    ///
    /// `record.get("products.0.name")`
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Deserialize the record into a typed structure.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }

    /// Pretty-printed JSON text of the record.
    pub fn to_json_pretty(&self) -> String {
        // Serializing a `Value` cannot fail.
        serde_json::to_string_pretty(&self.value).unwrap_or_default()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
