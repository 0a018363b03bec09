//! Lifecycle of the groonga child process.
//!
//! The supervisor spawns the process with piped stdio and watches it until it
//! exits. It never restarts anything: once the process is gone the handle is
//! dead for good and every later command fails with
//! [`ClientError::AlreadyEnded`].

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::ClientError;
use crate::config::ClientOptions;

/// Flag asking groonga to create a new database.
pub const CREATE_FLAG: &str = "-n";

/// How long to wait for stdout and stderr to drain after the process exits.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

const READ_CHUNK_SIZE: usize = 8192;

/// Build the argument list for a database path.
///
/// The create flag is added when the database does not exist yet and
/// `open_only` was not requested. The path is always the last argument.
pub fn invocation_args(db_path: &Path, open_only: bool) -> Vec<OsString> {
    let mut args = Vec::with_capacity(2);
    if !open_only && !db_path.exists() {
        args.push(OsString::from(CREATE_FLAG));
    }
    args.push(db_path.as_os_str().to_owned());
    args
}

/// Shared view of the process state.
pub struct Supervisor {
    path: PathBuf,
    pid: Option<u32>,
    alive: watch::Sender<bool>,
    last_error: Mutex<Option<ClientError>>,
    kill_switch: Mutex<Option<oneshot::Sender<()>>>,
}

/// The pipe ends used by the dispatcher.
pub(crate) struct ProcessIo {
    pub(crate) stdin: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    pub(crate) output: mpsc::UnboundedReceiver<Vec<u8>>,
    pub(crate) alive: watch::Receiver<bool>,
}

impl ProcessIo {
    pub(crate) fn is_alive(&self) -> bool {
        *self.alive.borrow()
    }

    /// Write a formatted command and flush it.
    pub(crate) async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))?;
        stdin.write_all(data).await?;
        stdin.flush().await
    }

    /// Drop output already received that no command is waiting for.
    /// Returns the number of bytes dropped.
    pub(crate) fn discard_output(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(chunk) = self.output.try_recv() {
            dropped += chunk.len();
        }
        dropped
    }

    /// Close the process input.
    pub(crate) fn close_input(&mut self) {
        self.stdin = None;
    }

    /// Resolve once the process is dead.
    pub(crate) async fn wait_dead(&mut self) {
        let _ = self.alive.wait_for(|alive| !*alive).await;
    }
}

impl Supervisor {
    /// Spawn groonga for `db_path`.
    ///
    /// Must be called from within a tokio runtime. Spawn failures do not
    /// return an error: the supervisor starts out dead and keeps the failure
    /// as its last error.
    pub(crate) fn spawn(db_path: &Path, options: &ClientOptions) -> (Arc<Self>, ProcessIo) {
        let path = options.groonga_path().to_path_buf();
        let args = invocation_args(db_path, options.open_only());
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let spawned = Command::new(&path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to spawn groonga");
                let (alive_tx, alive_rx) = watch::channel(false);
                let supervisor = Arc::new(Self {
                    pid: None,
                    alive: alive_tx,
                    last_error: Mutex::new(Some(ClientError::spawn_failed(&path, err))),
                    kill_switch: Mutex::new(None),
                    path,
                });
                // output_tx drops here, so the output stream reads as closed.
                let io = ProcessIo {
                    stdin: None,
                    output: output_rx,
                    alive: alive_rx,
                };
                return (supervisor, io);
            }
        };

        let pid = child.id();
        info!(path = %path.display(), ?args, pid, "spawned groonga");

        let stdin = child
            .stdin
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncWrite + Send + Unpin>);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (alive_tx, alive_rx) = watch::channel(true);
        let (kill_tx, kill_rx) = oneshot::channel();

        let supervisor = Arc::new(Self {
            path,
            pid,
            alive: alive_tx,
            last_error: Mutex::new(None),
            kill_switch: Mutex::new(Some(kill_tx)),
        });

        let stdout_task = stdout.map(|stdout| spawn_output_reader(stdout, output_tx));
        let stderr_task = stderr.map(spawn_stderr_reader);
        spawn_exit_watcher(
            child,
            Arc::clone(&supervisor),
            kill_rx,
            stdout_task,
            stderr_task,
        );

        let io = ProcessIo {
            stdin,
            output: output_rx,
            alive: alive_rx,
        };
        (supervisor, io)
    }

    /// Executable this supervisor started (or tried to).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// OS process id, if the spawn succeeded.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Check if the process is still running.
    pub fn is_alive(&self) -> bool {
        *self.alive.borrow()
    }

    /// Last supervisor-level error (spawn failure, non-zero exit).
    pub fn last_error(&self) -> Option<ClientError> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    /// Send a kill signal to the process.
    ///
    /// Marks the handle dead immediately. Returns `false` if the process was
    /// already gone or the signal could not be delivered; never panics.
    pub fn terminate(&self) -> bool {
        if !self.is_alive() {
            return false;
        }
        let switch = self.kill_switch.lock().ok().and_then(|mut s| s.take());
        let delivered = switch.is_some_and(|tx| tx.send(()).is_ok());
        if delivered {
            debug!(pid = self.pid, "terminating groonga");
            self.alive.send_replace(false);
        }
        delivered
    }

    fn record_exit(&self, error: Option<ClientError>) {
        if let Some(error) = error {
            if let Ok(mut slot) = self.last_error.lock() {
                *slot = Some(error);
            }
        }
        self.alive.send_replace(false);
    }
}

fn spawn_output_reader(
    mut stdout: ChildStdout,
    output: mpsc::UnboundedSender<Vec<u8>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if output.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "groonga stdout read error");
                    break;
                }
            }
        }
    })
}

fn spawn_stderr_reader(stderr: ChildStderr) -> JoinHandle<String> {
    tokio::spawn(read_diagnostic(stderr))
}

async fn read_diagnostic<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut bytes = Vec::new();
    if let Err(err) = reader.read_to_end(&mut bytes).await {
        debug!(error = %err, "groonga stderr read error");
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}

fn spawn_exit_watcher(
    mut child: Child,
    supervisor: Arc<Supervisor>,
    mut kill_rx: oneshot::Receiver<()>,
    stdout_task: Option<JoinHandle<()>>,
    stderr_task: Option<JoinHandle<String>>,
) {
    tokio::spawn(async move {
        let (status, killed) = tokio::select! {
            status = child.wait() => (status, false),
            Ok(()) = &mut kill_rx => {
                if let Err(err) = child.start_kill() {
                    warn!(error = %err, "failed to kill groonga");
                }
                (child.wait().await, true)
            }
        };

        // Output written just before exit must reach the collector before
        // the process is reported dead.
        if let Some(task) = stdout_task {
            if tokio::time::timeout(DRAIN_GRACE, task).await.is_err() {
                debug!("groonga stdout still open after exit");
            }
        }

        let diagnostic = match stderr_task {
            Some(task) => match tokio::time::timeout(DRAIN_GRACE, task).await {
                Ok(Ok(text)) if !text.is_empty() => Some(text),
                _ => None,
            },
            None => None,
        };

        let error = match status {
            _ if killed => None,
            Ok(status) if status.success() => None,
            Ok(status) => Some(ClientError::ProcessExited {
                code: status.code(),
                diagnostic,
            }),
            Err(err) => Some(ClientError::ProcessExited {
                code: None,
                diagnostic: Some(err.to_string()),
            }),
        };

        match &error {
            Some(err) => warn!(pid = supervisor.pid, error = %err, "groonga exited"),
            None => debug!(pid = supervisor.pid, killed, "groonga exited"),
        }
        supervisor.record_exit(error);
    });
}
