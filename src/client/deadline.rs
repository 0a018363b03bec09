//! Per-command deadline.

use std::time::Duration;

use tokio::time::Instant;

use super::error::ClientError;

/// Deadline armed when a command is dispatched.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    /// Arm a deadline `timeout` from now.
    pub(crate) fn arm(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    pub(crate) fn instant(&self) -> Instant {
        self.at
    }

    /// Error recorded when the deadline fires.
    pub(crate) fn error(&self) -> ClientError {
        ClientError::Timeout(self.timeout)
    }
}
