//! TOML-based configuration for groonga-stdio.
//!
//! Supports a config file (groonga-stdio.toml) with environment variable
//! expansion.
//!
//! Example configuration:
//! ```toml
//! [client]
//! groonga_path = "${GROONGA_HOME}/bin/groonga"
//! open_only = false
//! read_interval = "500ms"
//! timeout = "1m"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::options::ClientOptions;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "GROONGA_STDIO_CONFIG";

/// Environment variable naming a Groonga install prefix.
pub const GROONGA_PATH_ENV_VAR: &str = "GROONGA_PATH";

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*(ms|s|m|h)?\s*$").unwrap());

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Client configuration.
    pub client: ClientSettings,
}

/// `[client]` table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientSettings {
    /// Path to the groonga executable (supports ${ENV_VAR} expansion).
    pub groonga_path: Option<String>,

    /// Open existing databases only; never create.
    pub open_only: bool,

    /// Output poll interval (e.g., "300ms", "1s").
    pub read_interval: Option<String>,

    /// Per-command timeout (e.g., "30s", "5m").
    pub timeout: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GROONGA_STDIO_CONFIG`
    /// 2. `./groonga-stdio.toml`
    /// 3. `~/.config/groonga-stdio/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("groonga-stdio.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("groonga-stdio").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get the groonga executable path.
    ///
    /// Uses the configured path, then `$GROONGA_PATH/bin/groonga`. Returns
    /// `None` when neither is set, leaving the lookup to `PATH`.
    pub fn groonga_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        if let Some(path) = &self.client.groonga_path {
            return Ok(Some(PathBuf::from(expand_env_vars(path)?)));
        }

        if let Ok(prefix) = env::var(GROONGA_PATH_ENV_VAR) {
            if !prefix.is_empty() {
                let executable = if cfg!(windows) { "groonga.exe" } else { "groonga" };
                return Ok(Some(PathBuf::from(prefix).join("bin").join(executable)));
            }
        }

        Ok(None)
    }

    /// Build client options from these settings.
    pub fn client_options(&self) -> Result<ClientOptions, SettingsError> {
        let mut options = ClientOptions::default().with_open_only(self.client.open_only);

        if let Some(path) = self.groonga_path()? {
            options = options.with_groonga_path(path);
        }
        if let Some(interval) = &self.client.read_interval {
            options = options.with_read_interval(parse_duration(interval)?);
        }
        if let Some(timeout) = &self.client.timeout {
            options = options.with_timeout(parse_duration(timeout)?);
        }

        Ok(options)
    }
}

/// Parse a duration such as `300ms`, `30s`, `5m` or `1h`.
///
/// A bare number is taken as milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, SettingsError> {
    let caps = DURATION_PATTERN
        .captures(s)
        .ok_or_else(|| SettingsError::InvalidDuration(s.to_string()))?;
    let amount: u64 = caps[1]
        .parse()
        .map_err(|_| SettingsError::InvalidDuration(s.to_string()))?;

    let duration = match caps.get(2).map(|m| m.as_str()) {
        None | Some("ms") => Duration::from_millis(amount),
        Some("s") => Duration::from_secs(amount),
        Some("m") => Duration::from_secs(amount.saturating_mul(60)),
        Some("h") => Duration::from_secs(amount.saturating_mul(3600)),
        Some(_) => return Err(SettingsError::InvalidDuration(s.to_string())),
    };
    Ok(duration)
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
