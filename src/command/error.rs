//! Command parsing errors.

use thiserror::Error;

/// Result type for command parsing.
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors raised while turning command text into a [`super::Command`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command line held no tokens.
    #[error("empty command")]
    Empty,

    /// A quoted section was never closed.
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    /// `--name` appeared as the last token.
    #[error("missing value for argument --{0}")]
    MissingValue(String),

    /// More positional arguments than the command accepts.
    #[error("unexpected positional argument for {command}: {value}")]
    UnexpectedPositional {
        /// Command name.
        command: String,
        /// The surplus token.
        value: String,
    },
}
