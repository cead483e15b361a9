//! Ring and disruptor configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_RING_SIZE, DEFAULT_WAIT_TIMEOUT_MS, MIN_RING_SIZE};
use crate::error::{CoreError, Result};

/// Validated configuration shared by every ring buffer variant in this crate.
///
/// Construction is the only place size validity is checked; once built, a
/// `RingConfig`'s `size` is guaranteed to be a power of two no smaller than
/// [`MIN_RING_SIZE`].
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    size: usize,
    default_timeout: Duration,
}

impl RingConfig {
    /// Builds a configuration for a ring of the given size.
    ///
    /// Returns [`CoreError::InvalidSize`] if `size` is not a power of two or
    /// is smaller than [`MIN_RING_SIZE`].
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_RING_SIZE {
            return Err(CoreError::invalid_size(format!(
                "ring size {size} is below the minimum of {MIN_RING_SIZE}"
            )));
        }
        if !size.is_power_of_two() {
            return Err(CoreError::invalid_size(format!("ring size {size} is not a power of two")));
        }
        Ok(RingConfig { size, default_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS) })
    }

    /// Sets the timeout used when a blocking call omits one explicitly.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig::new(DEFAULT_RING_SIZE).expect("DEFAULT_RING_SIZE is a valid power of two")
    }
}

/// A configuration tuned for minimum latency: small ring, short default wait.
pub fn low_latency_config() -> RingConfig {
    RingConfig::new(64)
        .expect("64 is a valid power of two")
        .with_default_timeout(Duration::from_millis(50))
}

/// A configuration tuned for sustained throughput: large ring, generous wait.
pub fn high_throughput_config() -> RingConfig {
    RingConfig::new(1 << 16)
        .expect("1 << 16 is a valid power of two")
        .with_default_timeout(Duration::from_secs(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two() {
        let err = RingConfig::new(5).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSize { .. }));
    }

    #[test]
    fn rejects_zero() {
        assert!(RingConfig::new(0).is_err());
    }

    #[test]
    fn accepts_size_one_as_the_smallest_power_of_two() {
        // 2^0 = 1 is a power of two, so a single-slot ring must be
        // accepted even though every put immediately overwrites the
        // previous one.
        let cfg = RingConfig::new(1).unwrap();
        assert_eq!(cfg.size(), 1);
    }

    #[test]
    fn accepts_valid_size() {
        let cfg = RingConfig::new(4).unwrap();
        assert_eq!(cfg.size(), 4);
    }

    #[test]
    fn presets_are_valid() {
        assert!(low_latency_config().size().is_power_of_two());
        assert!(high_throughput_config().size().is_power_of_two());
    }
}
