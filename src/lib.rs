//! # groonga-stdio
//!
//! A queued async command/response client for a Groonga process driven over
//! its stdin/stdout.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Command text + options ("load --table T")         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [command]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Command (name, arguments, output type)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [client: queue → dispatcher]
//! ┌─────────────────────────────────────────────────────────┐
//! │        groonga process (stdin / stdout / stderr)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [collector → decoder → envelope]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Response (JSON body, text, raw bytes)             │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod command;
pub mod config;

pub use client::{ClientError, ClientResult, GroongaClient, PendingResponse, Response};
pub use command::Command;
pub use config::ClientOptions;
