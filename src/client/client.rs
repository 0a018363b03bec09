//! Public client facade.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::dispatcher::Dispatcher;
use super::error::{ClientError, ClientResult};
use super::queue::{command_queue, QueueEntry, QueueSender};
use super::response::Response;
use super::supervisor::Supervisor;
use crate::command::{ArgValue, Command};
use crate::config::{ClientOptions, Settings, SettingsError};

/// Async client for a groonga process running on a local database.
///
/// The client spawns `groonga [-n] <db_path>` and feeds it one command at a
/// time over stdin. Commands are queued; results come back in submission
/// order. Cloned handles share the same process and queue.
///
/// # Example
///
/// ```ignore
/// use groonga_stdio::client::GroongaClient;
/// use groonga_stdio::config::ClientOptions;
///
/// let client = GroongaClient::spawn("/tmp/db/people.db", ClientOptions::default());
///
/// client.command("table_create People TABLE_HASH_KEY ShortText").await?;
/// let loaded = client
///     .command_with("load --table People", [("values", r#"[{"_key":"alice"}]"#)])
///     .await?;
///
/// // The process exits once every handle is dropped.
/// ```
#[derive(Clone)]
pub struct GroongaClient {
    db_path: PathBuf,
    options: ClientOptions,
    queue: QueueSender,
    supervisor: Arc<Supervisor>,
}

impl GroongaClient {
    /// Spawn groonga for `db_path`.
    ///
    /// Must be called from within a tokio runtime. A failed spawn does not
    /// return an error: the client starts out dead, [`GroongaClient::last_error`]
    /// holds the reason and every command fails with
    /// [`ClientError::AlreadyEnded`].
    pub fn spawn(db_path: impl Into<PathBuf>, options: ClientOptions) -> Self {
        let db_path = db_path.into();
        let (supervisor, io) = Supervisor::spawn(&db_path, &options);
        let (queue, receiver) = command_queue();

        let dispatcher = Dispatcher::new(receiver, io, Arc::clone(&supervisor), &options);
        tokio::spawn(dispatcher.run());

        Self {
            db_path,
            options,
            queue,
            supervisor,
        }
    }

    /// Spawn groonga using settings configuration.
    pub fn from_settings(
        db_path: impl Into<PathBuf>,
        settings: &Settings,
    ) -> Result<Self, SettingsError> {
        Ok(Self::spawn(db_path, settings.client_options()?))
    }

    /// Submit command text.
    ///
    /// The command is queued before this returns; awaiting the returned
    /// future only waits for its result.
    pub fn command(&self, text: &str) -> PendingResponse {
        self.submit(Command::parse(text))
    }

    /// Submit command text with named arguments merged in.
    ///
    /// Use this for a `load` payload: `[("values", json!([...]))]`.
    pub fn command_with<I, K, V>(&self, text: &str, options: I) -> PendingResponse
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ArgValue>,
    {
        self.submit(Command::parse_with(text, options))
    }

    /// Submit an already built command.
    pub fn send(&self, command: Command) -> PendingResponse {
        self.submit(Ok(command))
    }

    fn submit(&self, command: Result<Command, crate::command::CommandError>) -> PendingResponse {
        let command = match command {
            Ok(command) => command,
            Err(err) => return PendingResponse::ready(Err(err.into())),
        };

        let (entry, reply) = QueueEntry::new(command);
        match self.queue.enqueue(entry) {
            Ok(()) => PendingResponse { reply },
            Err(_) => PendingResponse::ready(Err(ClientError::ChannelClosed)),
        }
    }

    /// Check if the groonga process is still running.
    pub fn is_alive(&self) -> bool {
        self.supervisor.is_alive()
    }

    /// Kill the groonga process. Returns whether a signal was delivered.
    pub fn terminate(&self) -> bool {
        self.supervisor.terminate()
    }

    /// Last process-level error: spawn failure or non-zero exit.
    pub fn last_error(&self) -> Option<ClientError> {
        self.supervisor.last_error()
    }

    /// Commands submitted and not yet completed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// OS process id of groonga, if it was spawned.
    pub fn pid(&self) -> Option<u32> {
        self.supervisor.pid()
    }
}

/// Result of a submitted command.
#[must_use = "the command is queued either way; await this to get its result"]
pub struct PendingResponse {
    reply: oneshot::Receiver<ClientResult<Response>>,
}

impl PendingResponse {
    fn ready(result: ClientResult<Response>) -> Self {
        let (tx, reply) = oneshot::channel();
        let _ = tx.send(result);
        Self { reply }
    }
}

impl Future for PendingResponse {
    type Output = ClientResult<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.reply)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|err| Err(err.into())))
    }
}
