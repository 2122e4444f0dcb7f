use std::time::Duration;

#[derive(Debug, Clone)]
/// Configuration for a levtree. Controls how often staged writes are flushed
pub struct Config {
    /// time between two periodic flushes of the funnel
    pub flush_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// config that practically never flushes on its own, so tests can flush explicitly
    pub fn debug() -> Self {
        Self {
            flush_interval: Duration::from_secs(3600),
        }
    }

    /// config that flushes very often
    pub fn debug_fast() -> Self {
        Self {
            flush_interval: Duration::from_millis(10),
        }
    }

    pub fn with_flush_interval(flush_interval: Duration) -> Self {
        Self { flush_interval }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.flush_interval >= Duration::from_millis(1),
            "flush interval must be at least 1ms"
        );
        anyhow::ensure!(
            self.flush_interval <= Duration::from_secs(24 * 3600),
            "flush interval must be at most a day"
        );
        Ok(())
    }
}
