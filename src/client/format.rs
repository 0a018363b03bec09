//! Outbound serialization of commands.

use serde_json::Value;
use tracing::warn;

use crate::command::{ArgValue, Command, VALUES_ARGUMENT};

/// Payload sent when a `load` has no usable values.
const EMPTY_VALUES: &str = "[]";

/// Render a command as the text written to groonga's stdin.
///
/// Ordinary commands become one trimmed line. A `load` is rendered without
/// its `values` argument, followed by the payload on its own line.
pub fn format_command(command: &Command) -> String {
    if !command.is_load() {
        return format!("{}\n", command.render(&[]).trim());
    }

    let values = match command.argument(VALUES_ARGUMENT) {
        Some(ArgValue::Text(text)) => text.trim().to_string(),
        Some(ArgValue::Structured(value @ Value::Array(_))) => serialize_values(value),
        _ => EMPTY_VALUES.to_string(),
    };

    format!(
        "{}\n{}\n",
        command.render(&[VALUES_ARGUMENT]).trim(),
        values
    )
}

fn serialize_values(values: &Value) -> String {
    serde_json::to_string(values).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize load values; sending empty payload");
        EMPTY_VALUES.to_string()
    })
}
