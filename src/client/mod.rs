//! Groonga process communication.
//!
//! This module turns an interactive `groonga` process into a queued async
//! command API. Commands are written to the process's stdin one at a time;
//! the response is read back from stdout, framed by silence, and decoded.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     GroongaClient (facade)                      │
//! │  - Parses command text, enqueues, returns PendingResponse       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ mpsc (FIFO)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Dispatcher (one tokio task)                  │
//! │  Idle ──dispatch──▶ Executing ──complete──▶ Idle                │
//! │  - format_command  → stdin                                      │
//! │  - Collector       ← stdout chunks, silence per read interval   │
//! │  - Deadline        races the collector                          │
//! │  - decode          → Response / ClientError                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!              stdin (commands) │ stdout (responses)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │             groonga [-n] <db_path>   (Supervisor)               │
//! │  - exit / spawn failure marks the handle dead, never restarts   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#[allow(clippy::module_inception)]
mod client;
mod collector;
mod deadline;
mod decoder;
mod dispatcher;
pub mod envelope;
mod error;
mod format;
mod queue;
mod response;
pub mod supervisor;

pub use client::{GroongaClient, PendingResponse};
pub use envelope::extract_body;
pub use error::{ClientError, ClientResult, GroongaError};
pub use format::format_command;
pub use response::Response;
pub use supervisor::{invocation_args, Supervisor};
