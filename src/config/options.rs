//! Options recognized by [`crate::client::GroongaClient`].

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Executable used when no path is configured.
pub const DEFAULT_GROONGA_PATH: &str = "groonga";

/// Lower bound for the output poll interval.
pub const MIN_READ_INTERVAL: Duration = Duration::from_millis(300);

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lower bound for the effective per-command deadline.
///
/// Collection advances one read interval at a time, so a deadline shorter
/// than this would starve it.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Client construction options.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use groonga_stdio::config::ClientOptions;
///
/// let options = ClientOptions::default()
///     .with_groonga_path("/opt/groonga/bin/groonga")
///     .with_open_only(true)
///     .with_read_interval(Duration::from_millis(50));
///
/// // Clamped upward.
/// assert_eq!(options.read_interval(), Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    groonga_path: PathBuf,
    open_only: bool,
    read_interval: Duration,
    timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            groonga_path: PathBuf::from(DEFAULT_GROONGA_PATH),
            open_only: false,
            read_interval: MIN_READ_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Use a different executable than `groonga` from `PATH`.
    pub fn with_groonga_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.groonga_path = path.into();
        self
    }

    /// Never pass the create flag, even when the database does not exist.
    pub fn with_open_only(mut self, open_only: bool) -> Self {
        self.open_only = open_only;
        self
    }

    /// Set the poll interval, clamped to at least [`MIN_READ_INTERVAL`].
    pub fn with_read_interval(mut self, interval: Duration) -> Self {
        self.read_interval = interval.max(MIN_READ_INTERVAL);
        self
    }

    /// Set the per-command timeout. See [`ClientOptions::effective_timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn groonga_path(&self) -> &Path {
        &self.groonga_path
    }

    pub fn open_only(&self) -> bool {
        self.open_only
    }

    pub fn read_interval(&self) -> Duration {
        self.read_interval
    }

    /// Configured timeout, before the floor is applied.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deadline armed for each command: the configured timeout, at least
    /// [`MIN_TIMEOUT`].
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.max(MIN_TIMEOUT)
    }
}
