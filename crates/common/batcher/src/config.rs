use crate::error::InvalidBatchConfig;
use std::time::Duration;

/// The parameters for the batching process.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    max_batch_size: usize,
    idle_timeout: Duration,
}

impl BatchConfig {
    /// Get the buffer length that triggers an immediate dispatch.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Get the quiet period after which a partial batch is dispatched.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

/// Used to configure the parameters for batching. Start here.
#[derive(Debug, Default)]
pub struct BatchConfigBuilder {}

impl BatchConfigBuilder {
    /// Start configuring the batching parameters.
    pub fn new() -> BatchConfigBuilder {
        BatchConfigBuilder {}
    }

    /// Set the buffer length that triggers an immediate dispatch.
    pub fn max_batch_size(self, max_batch_size: usize) -> SizedBatchConfigBuilder {
        SizedBatchConfigBuilder { max_batch_size }
    }
}

/// Used to configure the parameters for batching.
#[derive(Debug)]
pub struct SizedBatchConfigBuilder {
    max_batch_size: usize,
}

impl SizedBatchConfigBuilder {
    /// Set the quiet period after which a partial batch is dispatched.
    pub fn idle_timeout(self, idle_timeout: Duration) -> BuildableBatchConfigBuilder {
        BuildableBatchConfigBuilder {
            max_batch_size: self.max_batch_size,
            idle_timeout,
        }
    }
}

/// Used to configure the parameters for batching.
#[derive(Debug)]
pub struct BuildableBatchConfigBuilder {
    max_batch_size: usize,
    idle_timeout: Duration,
}

impl BuildableBatchConfigBuilder {
    /// Finalise the batching parameters.
    ///
    /// Both parameters must be positive; zero is rejected, not coerced.
    pub fn build(self) -> Result<BatchConfig, InvalidBatchConfig> {
        if self.max_batch_size == 0 {
            return Err(InvalidBatchConfig::ZeroMaxBatchSize);
        }
        if self.idle_timeout.is_zero() {
            return Err(InvalidBatchConfig::ZeroIdleTimeout);
        }

        Ok(BatchConfig {
            max_batch_size: self.max_batch_size,
            idle_timeout: self.idle_timeout,
        })
    }
}
