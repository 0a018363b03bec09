//! Successful command results.

use serde_json::Value;

/// A decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Body of a JSON envelope.
    Json(Value),
    /// Text that is not an envelope: dump output, XML/TSV, or unparseable JSON.
    Text(String),
    /// Raw bytes of a binary output type (msgpack, Apache Arrow).
    Binary(Vec<u8>),
}

impl Response {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}
