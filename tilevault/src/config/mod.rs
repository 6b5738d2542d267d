//! Download engine configuration.

use std::time::Duration;

/// Default number of tiles fetched concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default delay between batches, bounding burst load on the tile server
/// and the device's I/O subsystem.
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 250;

/// Configuration for batched tile downloading.
///
/// Groups the tunables of the batch download engine, providing sensible
/// defaults while allowing customization.
///
/// # Example
///
/// ```
/// use tilevault::config::DownloadConfig;
/// use std::time::Duration;
///
/// // Using defaults
/// let config = DownloadConfig::default();
/// assert_eq!(config.batch_size(), 50);
/// assert_eq!(config.inter_batch_delay(), Duration::from_millis(250));
///
/// // Custom configuration
/// let config = DownloadConfig::new()
///     .with_batch_size(16)
///     .with_inter_batch_delay(Duration::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Tiles per concurrent batch; also the peak fan-out.
    batch_size: usize,
    /// Pause between consecutive batches.
    inter_batch_delay: Duration,
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    ///
    /// Batching bounds peak concurrency and memory, and gives a natural
    /// checkpoint granularity for metadata flushes and pause/cancel checks.
    /// A minimum of 1 is enforced. Default: 50 tiles.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the delay inserted between batches.
    ///
    /// Default: 250 milliseconds.
    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    /// Get the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Get the inter-batch delay.
    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(
            config.inter_batch_delay(),
            Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS)
        );
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(DownloadConfig::new(), DownloadConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = DownloadConfig::new()
            .with_batch_size(8)
            .with_inter_batch_delay(Duration::from_millis(10));

        assert_eq!(config.batch_size(), 8);
        assert_eq!(config.inter_batch_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_minimum_batch_size_enforced() {
        let config = DownloadConfig::new().with_batch_size(0);
        assert_eq!(config.batch_size(), 1);
    }

    #[test]
    fn test_copy_semantics() {
        let config1 = DownloadConfig::new().with_batch_size(4);
        let config2 = config1; // Copy, not move
        assert_eq!(config1.batch_size(), config2.batch_size());
    }
}
