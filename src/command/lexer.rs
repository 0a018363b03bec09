//! Tokenizer for Groonga command lines.
//!
//! Splits on unquoted whitespace. Single and double quotes group a token and
//! accept backslash escapes; outside quotes a backslash escapes the next
//! character.

use super::error::{CommandError, CommandResult};

/// A single token of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Unescaped token text.
    pub text: String,
    /// Whether any part of the token was quoted.
    ///
    /// A quoted `"--name"` is a value, never an argument name.
    pub quoted: bool,
}

impl Token {
    /// True for `--name` tokens that introduce a named argument.
    pub fn is_option(&self) -> bool {
        !self.quoted && self.text.len() > 2 && self.text.starts_with("--")
    }
}

/// Split a command line into tokens.
pub fn tokenize(input: &str) -> CommandResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut text = String::new();
        let mut quoted = false;

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            match c {
                '"' | '\'' => {
                    quoted = true;
                    let mut closed = false;
                    while let Some(ch) = chars.next() {
                        if ch == c {
                            closed = true;
                            break;
                        }
                        if ch == '\\' {
                            match chars.next() {
                                Some(escaped) => text.push(unescape(escaped)),
                                None => break,
                            }
                        } else {
                            text.push(ch);
                        }
                    }
                    if !closed {
                        return Err(CommandError::UnterminatedQuote(c));
                    }
                }
                '\\' => match chars.next() {
                    Some(escaped) => text.push(escaped),
                    None => text.push('\\'),
                },
                _ => text.push(c),
            }
        }

        tokens.push(Token { text, quoted });
    }

    Ok(tokens)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}
