use async_trait::async_trait;
use std::future::Future;

/// Errors crossing the sink boundary are opaque to the executor.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Downstream consumer of the batches produced by a
/// [`BatchExecutor`](crate::BatchExecutor).
///
/// Ownership of the batch transfers to the sink for the duration of the
/// call; the executor keeps no reference to a delivered batch and never
/// retries a failed one.
#[async_trait]
pub trait BatchSink<B>: Send + Sync + 'static {
    async fn deliver(&self, batch: Vec<B>) -> Result<(), SinkError>;
}

/// Adapter turning an async function into a [`BatchSink`].
pub struct FnSink<F> {
    deliver: F,
}

impl<F> FnSink<F> {
    pub fn new(deliver: F) -> FnSink<F> {
        FnSink { deliver }
    }
}

#[async_trait]
impl<B, F, Fut> BatchSink<B> for FnSink<F>
where
    B: Send + 'static,
    F: Fn(Vec<B>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SinkError>> + Send,
{
    async fn deliver(&self, batch: Vec<B>) -> Result<(), SinkError> {
        (self.deliver)(batch).await
    }
}
