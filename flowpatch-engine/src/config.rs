//! Engine configuration
//!
//! Bounds for the optimistic-concurrency retry cycle. The defaults are
//! deliberately small: total wall-clock time is a function of the
//! attempt ceiling and the doubling backoff schedule.

use std::time::Duration;

/// Retry configuration for the mutation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum read-mutate-write attempts before a version conflict is
    /// surfaced to the caller
    pub max_attempts: u32,

    /// Delay before the first retry; doubled on each subsequent retry
    pub base_delay: Duration,
}

impl EngineConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - FLOWPATCH_MAX_ATTEMPTS (optional, default: 3)
    /// - FLOWPATCH_RETRY_BASE_MS (optional, milliseconds, default: 100)
    pub fn from_env() -> anyhow::Result<Self> {
        let max_attempts = std::env::var("FLOWPATCH_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(3);

        let base_delay = std::env::var("FLOWPATCH_RETRY_BASE_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(100));

        let config = Self {
            max_attempts,
            base_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}
