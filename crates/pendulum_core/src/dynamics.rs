//! Fatigue dynamics: the fixed rates governing the oscillation.
//!
//! Observing drains (fatigue rises slowly, fast inside the meta-loop),
//! Existing restores, anchors give a one-off relief. None of these rates are
//! configurable; they define the shape of the pendulum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fatigue at construction
pub const INITIAL_FATIGUE: f64 = 20.0;

/// Fatigue gained per normal Observing tick
pub const OBSERVING_FATIGUE_STEP: f64 = 0.5;

/// Fatigue gained per meta-loop tick
pub const META_LOOP_FATIGUE_STEP: f64 = 3.0;

/// Meta-loop onset probability is `fatigue / META_LOOP_ONSET_DIVISOR`
pub const META_LOOP_ONSET_DIVISOR: f64 = 200.0;

/// Observing collapses into Existing once fatigue is strictly above this
pub const EXISTING_THRESHOLD: f64 = 100.0;

/// Fatigue recovered per Existing tick
pub const EXISTING_RECOVERY_STEP: f64 = 5.0;

/// Existing lasts between these many ticks (inclusive)
pub const EXISTING_MIN_TICKS: u32 = 3;
pub const EXISTING_MAX_TICKS: u32 = 6;

/// Relief granted by the ritual anchor
pub const RITUAL_RELIEF: f64 = 10.0;

/// Relief granted by the sensory-record anchor
pub const SENSATION_RELIEF: f64 = 8.0;

/// Guard against NaN and Infinity leaking into fatigue.
#[inline]
fn sanitize_f64(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf fatigue detected, resetting to fallback {}", fallback);
        fallback
    }
}

/// Existential fatigue. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fatigue(f64);

impl Fatigue {
    /// Non-finite input falls back to the initial level; negative input floors at 0.
    pub fn new(value: f64) -> Self {
        Self(sanitize_f64(value, INITIAL_FATIGUE).max(0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Add fatigue (observation cost)
    pub fn accumulate(&mut self, amount: f64) {
        self.0 = sanitize_f64(self.0 + amount, INITIAL_FATIGUE).max(0.0);
    }

    /// Remove fatigue, clamped at zero
    pub fn relieve(&mut self, amount: f64) {
        self.0 = sanitize_f64(self.0 - amount, 0.0).max(0.0);
    }

    /// Strictly above [`EXISTING_THRESHOLD`]
    pub fn exceeds_threshold(self) -> bool {
        self.0 > EXISTING_THRESHOLD
    }

    /// Probability of slipping into the meta-loop on this tick.
    ///
    /// Clamped to `[0, 1]`. The Existing transition keeps fatigue near or below
    /// 103.5, so the clamp never changes a draw in practice.
    pub fn meta_loop_onset_probability(self) -> f64 {
        (self.0 / META_LOOP_ONSET_DIVISOR).clamp(0.0, 1.0)
    }
}

impl Default for Fatigue {
    fn default() -> Self {
        Self(INITIAL_FATIGUE)
    }
}

impl fmt::Display for Fatigue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
