//! Artificial "typing" delay before a reply.

use std::time::Duration;

use rand::Rng;

use parley_core::config::LatencyConfig;

/// Delay of `base + min(max_scaled, chars * per_char) + jitter`, where
/// jitter is uniform in `[0, jitter_ms)`.
#[derive(Debug, Clone)]
pub struct SimulatedLatency {
    config: LatencyConfig,
}

impl SimulatedLatency {
    pub fn new(config: LatencyConfig) -> Self {
        Self { config }
    }

    /// A latency that never waits.
    pub fn disabled() -> Self {
        Self::new(LatencyConfig {
            enabled: false,
            ..LatencyConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Deterministic part of the delay for an utterance.
    pub fn base_delay(&self, text: &str) -> Duration {
        let chars = text.chars().count() as u64;
        let scaled = chars
            .saturating_mul(self.config.per_char_ms)
            .min(self.config.max_scaled_ms);
        Duration::from_millis(self.config.base_ms + scaled)
    }

    /// Full delay including jitter. Zero when disabled.
    pub fn delay_for(&self, text: &str) -> Duration {
        if !self.config.enabled {
            return Duration::ZERO;
        }
        let jitter = if self.config.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..self.config.jitter_ms)
        };
        self.base_delay(text) + Duration::from_millis(jitter)
    }

    /// Sleep for [`delay_for`](Self::delay_for).
    pub async fn wait(&self, text: &str) {
        let delay = self.delay_for(text);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self::new(LatencyConfig::default())
    }
}
