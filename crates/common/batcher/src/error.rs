use crate::sink::SinkError;

/// Rejected batching parameters, reported when a config is built.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum InvalidBatchConfig {
    #[error("max_batch_size must be at least 1")]
    ZeroMaxBatchSize,

    #[error("idle_timeout must be a positive duration")]
    ZeroIdleTimeout,
}

/// Failure of an explicitly requested flush.
#[derive(thiserror::Error, Debug)]
pub enum FlushError {
    #[error("the batching worker is no longer running")]
    WorkerStopped,

    #[error("batch delivery failed: {0}")]
    Sink(#[source] SinkError),
}
