//! Single-flight command execution.
//!
//! The dispatcher task owns the process pipes and the queue receiver. It pops
//! one command at a time, writes it, collects the response and delivers the
//! result before touching the next entry, so results come back in submission
//! order.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout_at;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::collector::{Collector, Completion};
use super::deadline::Deadline;
use super::decoder::{decode, ResponseShape};
use super::error::ClientError;
use super::format::format_command;
use super::queue::{QueueEntry, QueueReceiver};
use super::supervisor::{ProcessIo, Supervisor};
use crate::config::ClientOptions;

/// How long a closed process gets to exit on its own before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The command currently in flight.
pub(crate) struct ExecutionContext {
    id: Uuid,
    entry: QueueEntry,
    shape: ResponseShape,
    collector: Collector,
    deadline: Deadline,
    failure: Option<ClientError>,
}

impl ExecutionContext {
    fn new(entry: QueueEntry, timeout: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape: ResponseShape::of(&entry.command),
            entry,
            collector: Collector::new(),
            deadline: Deadline::arm(timeout),
            failure: None,
        }
    }
}

/// `Idle --dispatch--> Executing --complete--> Idle`
pub(crate) enum DispatchState {
    Idle,
    Executing(ExecutionContext),
}

pub(crate) struct Dispatcher {
    queue: QueueReceiver,
    state: DispatchState,
    io: ProcessIo,
    supervisor: Arc<Supervisor>,
    read_interval: Duration,
    timeout: Duration,
}

impl Dispatcher {
    pub(crate) fn new(
        queue: QueueReceiver,
        io: ProcessIo,
        supervisor: Arc<Supervisor>,
        options: &ClientOptions,
    ) -> Self {
        Self {
            queue,
            state: DispatchState::Idle,
            io,
            supervisor,
            read_interval: options.read_interval(),
            timeout: options.effective_timeout(),
        }
    }

    /// Drain the queue until every client handle is gone.
    pub(crate) async fn run(mut self) {
        while let Some(entry) = self.queue.next().await {
            self.execute(entry).await;
        }
        self.shutdown().await;
    }

    async fn execute(&mut self, entry: QueueEntry) {
        if !self.io.is_alive() {
            debug!(command = entry.command.name(), "groonga already ended");
            self.queue.complete(entry, Err(ClientError::AlreadyEnded));
            return;
        }

        self.install(ExecutionContext::new(entry, self.timeout));

        let Self {
            state, io, supervisor, read_interval, ..
        } = self;
        let DispatchState::Executing(ctx) = state else {
            return;
        };

        let stale = io.discard_output();
        if stale > 0 {
            debug!(execution = %ctx.id, bytes = stale, "discarded late output");
        }

        let line = format_command(&ctx.entry.command);
        debug!(execution = %ctx.id, command = ctx.entry.command.name(), "dispatching");

        // A process that stops reading stdin blocks the write once the pipe
        // is full, so the deadline covers the write too.
        match timeout_at(ctx.deadline.instant(), io.write(line.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(execution = %ctx.id, error = %err, "failed to write command");
                ctx.failure = Some(if io.is_alive() {
                    ClientError::write_failed(err)
                } else {
                    died(supervisor)
                });
                self.complete();
                return;
            }
            Err(_) => {
                warn!(execution = %ctx.id, "command write did not finish before the deadline");
                ctx.failure = Some(ctx.deadline.error());
                self.complete();
                return;
            }
        }

        let completion = ctx.collector.collect(io, *read_interval, &ctx.deadline).await;
        debug!(
            execution = %ctx.id,
            ?completion,
            bytes = ctx.collector.len(),
            "collection finished"
        );
        match completion {
            Completion::Quiet => {}
            Completion::TimedOut => ctx.failure = Some(ctx.deadline.error()),
            Completion::ProcessEnded => ctx.failure = Some(died(supervisor)),
        }

        self.complete();
    }

    /// Move to `Executing`. A context still sitting in the slot is a bug; it
    /// is failed so its caller does not hang.
    fn install(&mut self, ctx: ExecutionContext) {
        let previous = std::mem::replace(&mut self.state, DispatchState::Executing(ctx));
        if let DispatchState::Executing(stale) = previous {
            error!(execution = %stale.id, "stale execution found in the slot");
            self.queue
                .complete(stale.entry, Err(ClientError::StaleExecution));
        }
    }

    /// Move back to `Idle`, decode and deliver.
    fn complete(&mut self) {
        let DispatchState::Executing(ctx) = std::mem::replace(&mut self.state, DispatchState::Idle)
        else {
            return;
        };
        let result = decode(
            ctx.shape,
            ctx.collector.finish(),
            ctx.failure,
            self.io.is_alive(),
        );
        if let Err(err) = &result {
            debug!(execution = %ctx.id, error = %err, "command failed");
        }
        self.queue.complete(ctx.entry, result);
    }

    async fn shutdown(mut self) {
        self.io.close_input();
        if !self.io.is_alive() {
            return;
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, self.io.wait_dead())
            .await
            .is_err()
        {
            debug!("groonga did not exit after input closed");
            self.supervisor.terminate();
        }
    }
}

/// Error recorded when the process died under a command.
fn died(supervisor: &Supervisor) -> ClientError {
    supervisor.last_error().unwrap_or(ClientError::AlreadyEnded)
}
