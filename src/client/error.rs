//! Client error types.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::command::CommandError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A non-zero return code reported in a response envelope.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (return code: {return_code})")]
pub struct GroongaError {
    /// Return code from the response header.
    pub return_code: i64,
    /// Error message from the header, or `"unexpected error"`.
    pub message: String,
    /// The whole parsed response.
    pub response: Value,
}

/// Errors that can occur while running commands.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// The executable could not be started.
    #[error("failed to spawn {}: {source}", path.display())]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The process exited with a non-zero status.
    #[error("{}", exit_message(*code, diagnostic.as_deref()))]
    ProcessExited {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured stderr text.
        diagnostic: Option<String>,
    },

    /// The command text could not be parsed.
    #[error("command parse error: {0}")]
    Parse(#[from] CommandError),

    /// No complete response arrived before the deadline.
    #[error("timeout error after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The command completed without producing any output.
    #[error("empty data error")]
    EmptyResponse,

    /// The response envelope carried a non-zero return code.
    #[error(transparent)]
    Protocol(#[from] GroongaError),

    /// The response parsed but had no recognizable envelope.
    #[error("unexpected data type")]
    MalformedResponse {
        /// The parsed response.
        response: Value,
    },

    /// The process is gone; nothing was written.
    #[error("groonga already ended")]
    AlreadyEnded,

    /// Writing the command to the process failed.
    #[error("failed to write to groonga: {0}")]
    WriteFailed(#[source] Arc<io::Error>),

    /// The dispatcher stopped before answering.
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// An execution was still installed when the next one started.
    #[error("execution superseded while still in flight")]
    StaleExecution,
}

fn exit_message(code: Option<i32>, diagnostic: Option<&str>) -> String {
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    match diagnostic {
        Some(text) if !text.is_empty() => format!("[exit code: {code}] {text}"),
        _ => format!("[exit code: {code}]"),
    }
}

impl ClientError {
    /// Create a spawn error.
    pub fn spawn_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SpawnFailed {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Create a write error.
    pub fn write_failed(source: io::Error) -> Self {
        Self::WriteFailed(Arc::new(source))
    }

    /// Return code of a protocol error.
    pub fn return_code(&self) -> Option<i64> {
        match self {
            Self::Protocol(err) => Some(err.return_code),
            _ => None,
        }
    }

    /// Raw response attached to protocol and malformed-response errors.
    pub fn response(&self) -> Option<&Value> {
        match self {
            Self::Protocol(err) => Some(&err.response),
            Self::MalformedResponse { response } => Some(response),
            _ => None,
        }
    }

    /// Check if this error means the process is no longer usable.
    pub fn is_process_gone(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailed { .. } | Self::ProcessExited { .. } | Self::AlreadyEnded
        )
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ClientError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
