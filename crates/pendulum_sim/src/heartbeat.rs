//! Pacing for the simulation driver
//!
//! Pure cosmetics: how long the driver waits after the intro and between
//! ticks. Waiting never changes the state machine.

use pendulum_core::SimulationConfig;
use std::time::Duration;

/// Configuration for the tick heartbeat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Pause between ticks (default: 300ms)
    pub interval: Duration,
    /// Pause after the intro banner, before the first tick (default: 4s)
    pub intro_pause: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            intro_pause: Duration::from_secs(4),
        }
    }
}

impl HeartbeatConfig {
    /// No pauses at all; ticks run back to back
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            intro_pause: Duration::ZERO,
        }
    }

    /// Very fast heartbeat for testing
    pub fn testing() -> Self {
        Self {
            interval: Duration::from_millis(10),
            intro_pause: Duration::ZERO,
        }
    }
}

impl From<&SimulationConfig> for HeartbeatConfig {
    fn from(cfg: &SimulationConfig) -> Self {
        Self {
            interval: Duration::from_millis(cfg.tick_interval_ms),
            intro_pause: Duration::from_millis(cfg.intro_pause_ms),
        }
    }
}
