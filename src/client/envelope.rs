//! Response envelope extraction.
//!
//! Groonga wraps JSON responses in a header carrying the return code. Two
//! shapes exist:
//!
//! ```text
//! command_version 1/2:  [[return_code, start_time, elapsed, message?, ...], body]
//! command_version 3:    {"header": {"return_code": 0, "error": {"message": ..}}, "body": ..}
//! ```

use serde_json::Value;

use super::error::{ClientError, ClientResult, GroongaError};

/// Message used when a failed response carries none.
pub const DEFAULT_ERROR_MESSAGE: &str = "unexpected error";

/// Unwrap the body of a parsed response.
///
/// Bare strings pass through unchanged. A zero return code yields the body;
/// a non-zero one yields [`ClientError::Protocol`]. Anything without a
/// recognizable header, body and return code is
/// [`ClientError::MalformedResponse`].
pub fn extract_body(response: Value) -> ClientResult<Value> {
    if response.is_string() {
        return Ok(response);
    }

    let Some((return_code, message, body)) = split_envelope(&response) else {
        return Err(ClientError::MalformedResponse { response });
    };

    match return_code {
        Some(0) => Ok(body),
        Some(return_code) => Err(ClientError::Protocol(GroongaError {
            return_code,
            message: message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            response,
        })),
        None => Err(ClientError::MalformedResponse { response }),
    }
}

/// Pull return code, error message and body out of either shape.
fn split_envelope(response: &Value) -> Option<(Option<i64>, Option<String>, Value)> {
    match response {
        Value::Array(items) if items.len() >= 2 => {
            let header = items[0].as_array();
            let return_code = header.and_then(|h| h.first()).and_then(Value::as_i64);
            let message = header
                .and_then(|h| h.get(3))
                .and_then(Value::as_str)
                .map(str::to_string);
            Some((return_code, message, items[1].clone()))
        }
        Value::Object(map) => {
            let header = map.get("header")?;
            let body = map.get("body")?;
            let return_code = header.get("return_code").and_then(Value::as_i64);
            let message = header
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Some((return_code, message, body.clone()))
        }
        _ => None,
    }
}
