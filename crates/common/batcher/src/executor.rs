use crate::config::BatchConfig;
use crate::error::FlushError;
use crate::sink::BatchSink;
use crate::sink::SinkError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::time::timeout_at;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;

enum Command<B> {
    Item(B),
    Flush(oneshot::Sender<Result<(), SinkError>>),
}

#[derive(Debug, Default)]
struct Counters {
    pushed: AtomicU64,
    processed: AtomicU64,
    dropped: AtomicU64,
}

/// Collects pushed items and delivers them to a sink in batches.
///
/// A batch is dispatched as soon as the buffer holds `max_batch_size`
/// items, or once `idle_timeout` has elapsed since the first item buffered
/// after the previous dispatch. The deadline is armed on that first item
/// only; later items within the window do not postpone it.
///
/// All buffering happens on a dedicated worker task which awaits each sink
/// call before taking the next command, so at most one delivery is in
/// flight per executor. A batch that the sink rejects is dropped, never
/// retried; the loss is visible through [`BatchExecutor::dropped_count`].
pub struct BatchExecutor<B> {
    commands: mpsc::UnboundedSender<Command<B>>,
    counters: Arc<Counters>,
}

impl<B> BatchExecutor<B> {
    /// Spawn the batching worker feeding the given sink.
    pub fn new<S>(config: BatchConfig, sink: S) -> BatchExecutor<B>
    where
        B: Send + 'static,
        S: BatchSink<B>,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            commands: rx,
            config,
            sink,
            buffer: Vec::new(),
            deadline: None,
            counters: Arc::clone(&counters),
        };
        tokio::spawn(worker.run());

        BatchExecutor { commands, counters }
    }

    /// Append an item to the pending buffer.
    ///
    /// Never blocks and never applies back-pressure; the item is enqueued
    /// and the call returns immediately.
    pub fn push(&self, item: B) {
        self.counters.pushed.fetch_add(1, Ordering::Relaxed);
        if self.commands.send(Command::Item(item)).is_err() {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            error!("Batching worker is gone, item dropped");
        }
    }

    /// Dispatch whatever is currently buffered and await the delivery.
    ///
    /// Flushing an empty buffer is a no-op: the sink is not invoked and
    /// `Ok(())` is returned. A sink failure is returned to this caller
    /// only; the failed batch is dropped either way.
    pub async fn flush(&self) -> Result<(), FlushError> {
        let (ack, done) = oneshot::channel();
        self.commands
            .send(Command::Flush(ack))
            .map_err(|_| FlushError::WorkerStopped)?;

        match done.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(FlushError::Sink(err)),
            Err(_) => Err(FlushError::WorkerStopped),
        }
    }

    /// Number of items pushed but not yet settled by a sink call.
    pub fn pending_count(&self) -> u64 {
        let pushed = self.counters.pushed.load(Ordering::Relaxed);
        let settled = self.counters.processed.load(Ordering::Relaxed)
            + self.counters.dropped.load(Ordering::Relaxed);
        pushed.saturating_sub(settled)
    }

    /// Total number of items the sink has accepted, across all batches.
    pub fn processed_count(&self) -> u64 {
        self.counters.processed.load(Ordering::Relaxed)
    }

    /// Total number of items lost to failed deliveries.
    pub fn dropped_count(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }
}

struct Worker<B, S> {
    commands: mpsc::UnboundedReceiver<Command<B>>,
    config: BatchConfig,
    sink: S,
    buffer: Vec<B>,
    deadline: Option<Instant>,
    counters: Arc<Counters>,
}

impl<B, S> Worker<B, S>
where
    B: Send + 'static,
    S: BatchSink<B>,
{
    async fn run(mut self) {
        loop {
            let command = match self.deadline {
                None => self.commands.recv().await,
                Some(deadline) => match timeout_at(deadline, self.commands.recv()).await {
                    Ok(command) => command,
                    Err(_) => {
                        // Quiet window elapsed
                        if let Err(err) = self.dispatch().await {
                            error!("Failed to deliver batch to sink: {err}");
                        }
                        continue;
                    }
                },
            };

            match command {
                None => break, // the last handle was dropped
                Some(Command::Item(item)) => {
                    self.buffer.push(item);
                    if self.buffer.len() >= self.config.max_batch_size() {
                        // Capacity preempts the idle deadline
                        if let Err(err) = self.dispatch().await {
                            error!("Failed to deliver batch to sink: {err}");
                        }
                    } else if self.deadline.is_none() {
                        self.deadline = Some(Instant::now() + self.config.idle_timeout());
                    }
                }
                Some(Command::Flush(ack)) => {
                    let _ = ack.send(self.dispatch().await);
                }
            }
        }

        // Residual drain before the worker exits
        if let Err(err) = self.dispatch().await {
            error!("Failed to deliver final batch to sink: {err}");
        }
    }

    /// Detach the buffer and hand it to the sink.
    ///
    /// Items arriving while the sink call is outstanding queue up in the
    /// command channel and land in the next buffer, so a batch never
    /// exceeds `max_batch_size` items.
    async fn dispatch(&mut self) -> Result<(), SinkError> {
        self.deadline = None;
        if self.buffer.is_empty() {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.buffer);
        let batch_size = batch.len() as u64;
        match self.sink.deliver(batch).await {
            Ok(()) => {
                self.counters.processed.fetch_add(batch_size, Ordering::Relaxed);
                debug!("Delivered a batch of {batch_size} items");
                Ok(())
            }
            Err(err) => {
                self.counters.dropped.fetch_add(batch_size, Ordering::Relaxed);
                Err(err)
            }
        }
    }
}
