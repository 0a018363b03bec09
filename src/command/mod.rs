//! Groonga command model.
//!
//! A [`Command`] is a parsed command line: a name plus an ordered list of
//! named arguments. Commands are built from text with [`Command::parse`],
//! optionally merged with an option map (for example the `values` payload of
//! a `load`), and rendered back to the line syntax the process reads with
//! [`Command::render`].
//!
//! # Example
//!
//! ```
//! use groonga_stdio::command::{Command, Encoding};
//!
//! let cmd = Command::parse("select Memos --output_type msgpack").unwrap();
//! assert_eq!(cmd.argument("table").and_then(|v| v.as_text()), Some("Memos"));
//! assert_eq!(cmd.encoding(), Encoding::Binary);
//! ```

mod error;
mod lexer;
mod signature;

pub use error::{CommandError, CommandResult};
pub use lexer::{tokenize, Token};
pub use signature::positional_parameters;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Name of the bulk payload argument of `load`.
pub const VALUES_ARGUMENT: &str = "values";

/// An argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Plain text, as written on a command line.
    Text(String),
    /// A structured value supplied through an option map (arrays, objects).
    Structured(Value),
}

impl ArgValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Structured(_) => None,
        }
    }

    /// Text used on a command line. Structured values render as compact JSON.
    pub fn to_command_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Structured(v) => v.to_string(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        Self::Text(n.to_string())
    }
}

impl From<u64> for ArgValue {
    fn from(n: u64) -> Self {
        Self::Text(n.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        Self::Text(b.to_string())
    }
}

impl From<Value> for ArgValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Self::Text(s),
            Value::Null => Self::Text(String::new()),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => Self::Text(n.to_string()),
            structured => Self::Structured(structured),
        }
    }
}

/// Declared `--output_type` of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    Json,
    Xml,
    Tsv,
    MessagePack,
    ApacheArrow,
}

/// Parses an `--output_type` value. Unknown names fall back to JSON.
impl FromStr for OutputType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "xml" => Self::Xml,
            "tsv" => Self::Tsv,
            "msgpack" => Self::MessagePack,
            "apache-arrow" | "arrow" => Self::ApacheArrow,
            _ => Self::Json,
        })
    }
}

impl OutputType {

    /// Wire encoding of responses of this type.
    pub fn encoding(self) -> Encoding {
        match self {
            Self::Json => Encoding::Json,
            Self::Xml | Self::Tsv => Encoding::Text,
            Self::MessagePack | Self::ApacheArrow => Encoding::Binary,
        }
    }
}

/// How a response body is carried on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Structured text that parses as JSON.
    Json,
    /// Other text formats.
    Text,
    /// Opaque bytes, passed through untouched.
    Binary,
}

/// A parsed Groonga command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    arguments: Vec<(String, ArgValue)>,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Parse command text.
    pub fn parse(text: &str) -> CommandResult<Self> {
        Self::parse_with(text, std::iter::empty::<(String, ArgValue)>())
    }

    /// Parse command text and merge an option map into the arguments.
    ///
    /// Options override arguments of the same name found in the text.
    pub fn parse_with<I, K, V>(text: &str, options: I) -> CommandResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ArgValue>,
    {
        let mut tokens = tokenize(text)?.into_iter();
        let name = match tokens.next() {
            Some(token) if !token.text.is_empty() => token.text,
            _ => return Err(CommandError::Empty),
        };

        let mut command = Self::new(name);
        let positional = positional_parameters(&command.name);
        let mut next_positional = 0;

        while let Some(token) = tokens.next() {
            if token.is_option() {
                let key = token.text[2..].to_string();
                let value = tokens
                    .next()
                    .ok_or_else(|| CommandError::MissingValue(key.clone()))?;
                command.set_argument(key, value.text);
            } else {
                // Skip parameters already given by name.
                while next_positional < positional.len()
                    && command.argument(positional[next_positional]).is_some()
                {
                    next_positional += 1;
                }
                let Some(key) = positional.get(next_positional) else {
                    return Err(CommandError::UnexpectedPositional {
                        command: command.name.clone(),
                        value: token.text,
                    });
                };
                command.set_argument(*key, token.text);
                next_positional += 1;
            }
        }

        for (key, value) in options {
            command.set_argument(key, value);
        }

        Ok(command)
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments in insertion order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.arguments.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&ArgValue> {
        self.arguments
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Set an argument, replacing an existing value in place.
    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let value = value.into();
        match self.arguments.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.arguments.push((name, value)),
        }
    }

    /// Builder form of [`Command::set_argument`].
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set_argument(name, value);
        self
    }

    /// Remove and return an argument.
    pub fn remove_argument(&mut self, name: &str) -> Option<ArgValue> {
        let pos = self.arguments.iter().position(|(k, _)| k == name)?;
        Some(self.arguments.remove(pos).1)
    }

    /// Declared output type (`--output_type`, JSON by default).
    pub fn output_type(&self) -> OutputType {
        self.argument("output_type")
            .and_then(ArgValue::as_text)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Wire encoding of this command's response.
    pub fn encoding(&self) -> Encoding {
        self.output_type().encoding()
    }

    /// `--command_version`, if given and numeric.
    pub fn command_version(&self) -> Option<u32> {
        self.argument("command_version")
            .and_then(ArgValue::as_text)
            .and_then(|s| s.trim().parse().ok())
    }

    /// `load` commands carry a bulk payload after the command line.
    pub fn is_load(&self) -> bool {
        self.name == "load"
    }

    /// `dump` answers with re-issuable command text instead of an envelope.
    pub fn is_dump(&self) -> bool {
        self.name == "dump"
    }

    /// Render as `name --key value ...`, leaving out the listed arguments.
    pub fn render(&self, exclude: &[&str]) -> String {
        let mut out = self.name.clone();
        for (key, value) in &self.arguments {
            if exclude.contains(&key.as_str()) {
                continue;
            }
            out.push_str(" --");
            out.push_str(key);
            out.push(' ');
            out.push_str(&quote(&value.to_command_text()));
        }
        out
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&[]))
    }
}

/// Quote a value when the tokenizer would otherwise split or unescape it.
fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
