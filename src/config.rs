use std::time::Duration;

pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;
pub const DEFAULT_SUMMARY_DELAY_MS: u64 = 1500;

/// Simulated processing latency for chat replies and summary generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub reply_delay: Duration,
    pub summary_delay: Duration,
}

impl Timing {
    pub fn from_millis(reply_delay_ms: u64, summary_delay_ms: u64) -> Self {
        Self {
            reply_delay: Duration::from_millis(reply_delay_ms),
            summary_delay: Duration::from_millis(summary_delay_ms),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from_millis(DEFAULT_REPLY_DELAY_MS, DEFAULT_SUMMARY_DELAY_MS)
    }
}
