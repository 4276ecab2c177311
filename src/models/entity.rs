//! Entity Model
//!
//! Loosely-typed records returned by the upstream API (stories, comments,
//! jobs, polls, users). No schema is enforced; accessors return `None` for
//! absent or wrong-typed fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream-assigned item identifier.
pub type ItemId = u64;

// == Entity ==
/// A JSON object as delivered by the upstream service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Returns the raw value of a field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a numeric field as `f64`.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Returns a string field.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The `id` field, when it is a non-negative integer.
    pub fn id(&self) -> Option<ItemId> {
        self.0.get("id").and_then(Value::as_u64)
    }

    /// The `type` field (`story`, `comment`, `job`, `poll`, `pollopt`).
    pub fn kind(&self) -> Option<&str> {
        self.get_string("type")
    }

    /// Unix timestamp used for ordering; missing or non-numeric reads as 0.
    pub fn sort_time(&self) -> f64 {
        self.get_number("time").unwrap_or(0.0)
    }
}

impl TryFrom<Value> for Entity {
    type Error = Value;

    /// Accepts only JSON objects; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}
