//! Configuration module for groonga-stdio.
//!
//! Handles client options, the settings file and environment variables.

mod options;
mod settings;

pub use options::{
    ClientOptions, DEFAULT_GROONGA_PATH, DEFAULT_TIMEOUT, MIN_READ_INTERVAL, MIN_TIMEOUT,
};
pub use settings::{
    expand_env_vars, parse_duration, ClientSettings, Settings, SettingsError, CONFIG_ENV_VAR,
    GROONGA_PATH_ENV_VAR,
};
