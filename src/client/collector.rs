//! Response framing.
//!
//! Groonga's stdio output has no length prefix and no terminator that holds
//! for every output type, so a response is considered complete once a poll
//! tick sees no new bytes after at least one byte arrived. The reader task
//! pushes chunks as they come in; each tick only checks whether anything
//! arrived since the previous one.
//!
//! A response with an empty body cannot be told apart from one that has not
//! started yet. Such commands complete through the deadline or process death.
//!
//! Output that arrives after its command timed out is dropped when the next
//! command is dispatched. Output that is still in flight at that point is
//! read as part of the next response.

use std::time::Duration;

use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use super::deadline::Deadline;
use super::supervisor::ProcessIo;

/// Why collection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// A tick passed with no new output.
    Quiet,
    /// The process died.
    ProcessEnded,
    /// The deadline fired first.
    TimedOut,
}

/// Output accumulated for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Collected {
    pub(crate) text: String,
    pub(crate) bytes: Vec<u8>,
}

/// Accumulates the text and raw byte views of the output side by side.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    text: String,
    bytes: Vec<u8>,
    // Bytes of a UTF-8 sequence split across chunks.
    partial: Vec<u8>,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Append a chunk to both views.
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
        self.partial.extend_from_slice(chunk);

        let mut rest = std::mem::take(&mut self.partial);
        loop {
            match std::str::from_utf8(&rest) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    rest.clear();
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    // Checked by from_utf8 above.
                    self.text
                        .push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    match err.error_len() {
                        Some(invalid) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            rest.drain(..valid_up_to + invalid);
                        }
                        None => {
                            rest.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
        self.partial = rest;
    }

    /// Flush and return what was collected, or `None` if nothing arrived.
    pub(crate) fn finish(mut self) -> Option<Collected> {
        if self.bytes.is_empty() {
            return None;
        }
        if !self.partial.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.partial));
        }
        Some(Collected {
            text: self.text,
            bytes: self.bytes,
        })
    }

    /// Read output until the response looks complete.
    ///
    /// Returns on the first tick that saw no new data after some data had
    /// arrived, on the first tick after the process died, or when the
    /// deadline fires, whichever comes first.
    pub(crate) async fn collect(
        &mut self,
        io: &mut ProcessIo,
        read_interval: Duration,
        deadline: &Deadline,
    ) -> Completion {
        let expiry = sleep_until(deadline.instant());
        tokio::pin!(expiry);

        let mut ticker = interval_at(Instant::now() + read_interval, read_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut received_since_tick = false;
        let mut output_open = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut expiry => return Completion::TimedOut,

                chunk = io.output.recv(), if output_open => match chunk {
                    Some(chunk) => {
                        self.push(&chunk);
                        received_since_tick = true;
                    }
                    None => output_open = false,
                },

                _ = ticker.tick() => {
                    if !io.is_alive() {
                        while let Ok(chunk) = io.output.try_recv() {
                            self.push(&chunk);
                        }
                        return Completion::ProcessEnded;
                    }
                    if !received_since_tick && !self.is_empty() {
                        return Completion::Quiet;
                    }
                    received_since_tick = false;
                }
            }
        }
    }
}
