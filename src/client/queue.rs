//! Channel-backed FIFO of submitted commands.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::error::ClientResult;
use super::response::Response;
use crate::command::Command;

/// A submitted command and where to deliver its result.
pub(crate) struct QueueEntry {
    pub(crate) command: Command,
    reply: oneshot::Sender<ClientResult<Response>>,
}

impl QueueEntry {
    pub(crate) fn new(command: Command) -> (Self, oneshot::Receiver<ClientResult<Response>>) {
        let (reply, rx) = oneshot::channel();
        (Self { command, reply }, rx)
    }
}

/// Create a connected queue pair.
pub(crate) fn command_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        QueueSender {
            tx,
            depth: Arc::clone(&depth),
        },
        QueueReceiver { rx, depth },
    )
}

/// Submission side, held by client handles.
#[derive(Clone)]
pub(crate) struct QueueSender {
    tx: mpsc::UnboundedSender<QueueEntry>,
    depth: Arc<AtomicUsize>,
}

impl QueueSender {
    /// Append to the tail. Gives the entry back if the dispatcher is gone.
    pub(crate) fn enqueue(&self, entry: QueueEntry) -> Result<(), QueueEntry> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.tx.send(entry).map_err(|err| {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            err.0
        })
    }

    /// Commands submitted and not yet completed, including the one in flight.
    pub(crate) fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

/// Dispatch side, owned by the dispatcher.
pub(crate) struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<QueueEntry>,
    depth: Arc<AtomicUsize>,
}

impl QueueReceiver {
    /// Pop the head, waiting for a submission. `None` once every sender is
    /// dropped and the queue is drained.
    pub(crate) async fn next(&mut self) -> Option<QueueEntry> {
        self.rx.recv().await
    }

    /// Deliver a result. A caller that dropped its future is ignored.
    pub(crate) fn complete(&self, entry: QueueEntry, result: ClientResult<Response>) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
        let _ = entry.reply.send(result);
    }
}
