//! Turns collected output into a [`Response`] or an error.

use serde_json::Value;

use super::collector::Collected;
use super::envelope::extract_body;
use super::error::{ClientError, ClientResult};
use super::response::Response;
use crate::command::{Command, Encoding};

/// What the dispatcher knew about the command when it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResponseShape {
    pub(crate) encoding: Encoding,
    pub(crate) dump: bool,
}

impl ResponseShape {
    pub(crate) fn of(command: &Command) -> Self {
        Self {
            encoding: command.encoding(),
            dump: command.is_dump(),
        }
    }
}

/// Decide the outcome of one command.
///
/// A timeout always wins. Otherwise collected output is decoded by shape:
/// binary bytes verbatim, dump text verbatim, other text through the JSON
/// envelope (falling back to the raw text when it does not parse). With no
/// output, the recorded failure is reported, then a dead process, then an
/// empty response.
pub(crate) fn decode(
    shape: ResponseShape,
    collected: Option<Collected>,
    failure: Option<ClientError>,
    alive: bool,
) -> ClientResult<Response> {
    if let Some(err @ ClientError::Timeout(_)) = failure {
        return Err(err);
    }

    let Some(collected) = collected else {
        return Err(match failure {
            Some(err) => err,
            None if !alive => ClientError::AlreadyEnded,
            None => ClientError::EmptyResponse,
        });
    };

    if shape.encoding == Encoding::Binary {
        return Ok(Response::Binary(collected.bytes));
    }
    if shape.dump || shape.encoding == Encoding::Text {
        return Ok(Response::Text(collected.text));
    }

    match serde_json::from_str::<Value>(&collected.text) {
        Ok(value) => extract_body(value).map(Response::Json),
        Err(_) => Ok(Response::Text(collected.text)),
    }
}
