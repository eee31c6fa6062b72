//! Successful call outcomes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// What a successful call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// No body and no error: the call is reported as plain `true`.
    Empty,
    /// Raw body text, returned when JSON decoding was not requested.
    Text(String),
    /// A JSON object decoded associatively, keys kept in document order.
    Mapping(Map<String, Value>),
    /// Any other decoded JSON value.
    Structured(Value),
}

impl Reply {
    /// True for the empty-success outcome.
    pub fn is_true(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The associatively decoded object; `None` for structured values.
    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            Reply::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// The decoded JSON, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Reply::Mapping(map) => Some(Value::Object(map)),
            Reply::Structured(value) => Some(value),
            Reply::Empty | Reply::Text(_) => None,
        }
    }

    /// Convert a decoded reply into a caller-defined type.
    ///
    /// Raw text replies are parsed first; `Empty` is treated as JSON `null`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            Reply::Empty => serde_json::from_value(Value::Null),
            Reply::Text(text) => serde_json::from_str(&text),
            Reply::Mapping(map) => serde_json::from_value(Value::Object(map)),
            Reply::Structured(value) => serde_json::from_value(value),
        }
    }
}
