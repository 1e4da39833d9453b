use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BatcherError;

/// Configuration for a [`Batcher`](crate::Batcher).
///
/// Use [`BatcherConfig::builder()`] for ergonomic construction, or
/// [`BatcherConfig::default()`] for sensible defaults (10 jobs, 1 second).
/// Fixed for the lifetime of the batcher it is given to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatcherConfig {
    /// Number of pending jobs that triggers an immediate flush.
    pub batch_size: usize,

    /// Maximum time between flushes while jobs are pending.
    pub batch_timeout: Duration,

    /// Capacity of the submission queue feeding the coordination loop.
    /// Producers wait for room when it is full.
    pub queue_capacity: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_timeout: Duration::from_secs(1),
            queue_capacity: 64,
        }
    }
}

impl BatcherConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> BatcherConfigBuilder {
        BatcherConfigBuilder::default()
    }

    /// Reject values the coordination loop cannot work with.
    pub fn validate(&self) -> Result<(), BatcherError> {
        if self.batch_size == 0 {
            return Err(BatcherError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.batch_timeout.is_zero() {
            return Err(BatcherError::InvalidConfig(
                "batch timeout must be greater than zero".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(BatcherError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`BatcherConfig`].
#[derive(Default)]
pub struct BatcherConfigBuilder {
    config: BatcherConfig,
}

impl BatcherConfigBuilder {
    /// Set the number of jobs that triggers a flush.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the maximum time a non-empty batch waits before it is flushed.
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.config.batch_timeout = timeout;
        self
    }

    /// Set the capacity of the submission queue.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Build the final [`BatcherConfig`].
    pub fn build(self) -> BatcherConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BatcherConfig::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.batch_timeout, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = BatcherConfig::builder()
            .with_batch_size(3)
            .with_batch_timeout(Duration::from_millis(250))
            .with_queue_capacity(8)
            .build();

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.batch_timeout, Duration::from_millis(250));
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = BatcherConfig::builder().with_batch_size(0).build();
        assert!(matches!(
            config.validate(),
            Err(BatcherError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = BatcherConfig::builder()
            .with_batch_timeout(Duration::ZERO)
            .build();
        assert!(matches!(
            config.validate(),
            Err(BatcherError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let config = BatcherConfig::builder().with_queue_capacity(0).build();
        assert!(config.validate().is_err());
    }
}
