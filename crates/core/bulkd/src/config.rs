use batcher::BatchConfig;
use batcher::BatchConfigBuilder;
use batcher::InvalidBatchConfig;
use clap::Parser;
use std::net::IpAddr;
use std::time::Duration;

/// Runtime configuration, taken from flags or the environment.
///
/// The defaults match the reference deployment: direct inserts batch up to
/// 1000 documents per second, grouped inserts accumulate much larger
/// batches that are written in chunks of 100, and counter increments batch
/// up to 5000 hits per second.
#[derive(Debug, Parser)]
#[command(name = "bulkd", version, about = "HTTP ingestion daemon batching writes to a backing store")]
pub struct BulkdConfig {
    /// Address the HTTP server binds to.
    #[arg(long, env = "BULKD_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port the HTTP server listens on.
    #[arg(long, env = "BULKD_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Batch capacity of the direct insert executor.
    #[arg(long, env = "INSERT_BULK_SIZE", default_value_t = 1000)]
    pub insert_bulk_size: usize,

    /// Quiescence timeout of the direct insert executor, in milliseconds.
    #[arg(long, env = "INSERT_BULK_TIMEOUT", default_value_t = 1000)]
    pub insert_bulk_timeout: u64,

    /// Batch capacity of the grouped insert executor.
    #[arg(long, env = "INSERT_GROUP_SIZE", default_value_t = 100_000)]
    pub insert_group_size: usize,

    /// Quiescence timeout of the grouped insert executor, in milliseconds.
    #[arg(long, env = "INSERT_GROUP_TIMEOUT", default_value_t = 60_000)]
    pub insert_group_timeout: u64,

    /// How many grouped inserts are written to the store concurrently.
    #[arg(long, env = "INSERT_GROUP_CHUNK_SIZE", default_value_t = 100)]
    pub insert_group_chunk_size: usize,

    /// Batch capacity of the counter increment executors.
    #[arg(long, env = "INCREASE_BULK_SIZE", default_value_t = 5000)]
    pub increase_bulk_size: usize,

    /// Quiescence timeout of the counter increment executors, in milliseconds.
    #[arg(long, env = "INCREASE_BULK_TIMEOUT", default_value_t = 1000)]
    pub increase_bulk_timeout: u64,
}

impl BulkdConfig {
    pub fn insert_bulk_batching(&self) -> Result<BatchConfig, InvalidBatchConfig> {
        BatchConfigBuilder::new()
            .max_batch_size(self.insert_bulk_size)
            .idle_timeout(Duration::from_millis(self.insert_bulk_timeout))
            .build()
    }

    pub fn insert_group_batching(&self) -> Result<BatchConfig, InvalidBatchConfig> {
        BatchConfigBuilder::new()
            .max_batch_size(self.insert_group_size)
            .idle_timeout(Duration::from_millis(self.insert_group_timeout))
            .build()
    }

    pub fn increase_bulk_batching(&self) -> Result<BatchConfig, InvalidBatchConfig> {
        BatchConfigBuilder::new()
            .max_batch_size(self.increase_bulk_size)
            .idle_timeout(Duration::from_millis(self.increase_bulk_timeout))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_deployment() {
        let config = BulkdConfig::parse_from(["bulkd"]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.insert_bulk_size, 1000);
        assert_eq!(config.insert_bulk_timeout, 1000);
        assert_eq!(config.insert_group_size, 100_000);
        assert_eq!(config.insert_group_timeout, 60_000);
        assert_eq!(config.insert_group_chunk_size, 100);
        assert_eq!(config.increase_bulk_size, 5000);
        assert_eq!(config.increase_bulk_timeout, 1000);
    }

    #[test]
    fn knobs_are_rejected_when_zero() {
        let config = BulkdConfig::parse_from(["bulkd", "--insert-bulk-size", "0"]);
        assert!(config.insert_bulk_batching().is_err());

        let config = BulkdConfig::parse_from(["bulkd", "--increase-bulk-timeout", "0"]);
        assert!(config.increase_bulk_batching().is_err());
    }
}
