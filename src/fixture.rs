//! Immutable per-case fixture values.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field name reserved for the per-run scratch mapping.
pub const DATA_FIELD: &str = "data";

/// Caller-supplied values copied into the registry before a case runs.
///
/// Fixtures are built once and never mutated afterwards; every binder keeps
/// its own copy and re-applies it at the start of each case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fixture {
    fields: Map<String, Value>,
}

impl Fixture {
    /// Creates a fixture with no fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Builds a fixture from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotAnObject`] when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, FixtureError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FixtureError::NotAnObject {
                kind: value_kind(&other).to_owned(),
            }),
        }
    }

    /// Builds a fixture from any serialisable record.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Serialize`] when serde rejects the value, or
    /// [`FixtureError::NotAnObject`] when it does not serialise to a map.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, FixtureError> {
        let json =
            serde_json::to_value(value).map_err(|err| FixtureError::Serialize(err.to_string()))?;
        Self::from_value(json)
    }

    /// Returns the value stored under `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Iterates over the fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Number of fields in the fixture.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the fixture carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Value> for Fixture {
    type Error = FixtureError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for Fixture {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Errors raised while building fixtures or decoding fixture fields.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FixtureError {
    /// Raised when a fixture source is not a JSON object.
    #[error("fixture must be an object, got {kind}")]
    NotAnObject {
        /// JSON kind that was supplied instead.
        kind: String,
    },
    /// Raised when serde cannot serialise the fixture source.
    #[error("failed to serialise fixture: {0}")]
    Serialize(String),
    /// Raised when a stored field cannot be decoded into the requested type.
    #[error("failed to decode field `{field}`: {message}")]
    Decode {
        /// Field that failed to decode.
        field: String,
        /// Decoder error message.
        message: String,
    },
}

pub(crate) fn decode_field<T: serde::de::DeserializeOwned>(
    field: &str,
    value: Value,
) -> Result<T, FixtureError> {
    serde_json::from_value(value).map_err(|err| FixtureError::Decode {
        field: field.to_owned(),
        message: err.to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Serialize)]
    struct Response {
        status: u16,
        body: &'static str,
    }

    #[rstest]
    fn builder_replaces_repeated_fields() {
        let fixture = Fixture::new().with("x", 1).with("x", "two");
        assert_eq!(fixture.len(), 1);
        assert_eq!(fixture.get("x"), Some(&json!("two")));
    }

    #[rstest]
    fn from_serialize_accepts_structs() {
        let fixture = Fixture::from_serialize(&Response {
            status: 503,
            body: "busy",
        })
        .expect("struct should serialise to an object");
        assert_eq!(fixture.get("status"), Some(&json!(503)));
        assert_eq!(fixture.get("body"), Some(&json!("busy")));
    }

    #[rstest]
    #[case(json!(null), "null")]
    #[case(json!([1, 2]), "array")]
    #[case(json!("text"), "string")]
    #[case(json!(4), "number")]
    fn from_value_rejects_non_objects(#[case] value: Value, #[case] kind: &str) {
        let err = Fixture::from_value(value).expect_err("non-object should be rejected");
        assert_eq!(
            err,
            FixtureError::NotAnObject {
                kind: kind.to_owned()
            }
        );
    }
}
