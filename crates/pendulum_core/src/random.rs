//! Random draws for the state machine.
//!
//! Every stochastic decision (meta-loop onset, Existing duration, anchor policy)
//! goes through [`RandomSource`], so a run can be replayed from a seed or
//! scripted draw by draw in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniform draws
pub trait RandomSource {
    /// Uniform float in `[0, 1)`
    fn float01(&mut self) -> f64;

    /// Uniform integer in `[low, high]` (both ends inclusive)
    fn int_range(&mut self, low: u32, high: u32) -> u32;
}

/// Production source backed by `StdRng`
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream: the same seed always yields the same run
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn float01(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn int_range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays queued draws in order.
///
/// Once a queue is exhausted the fallback is returned: floats fall back to a
/// value just below 1.0 (so no probability check ever fires), integers fall
/// back to the low end of the requested range. Scripted integers are clamped
/// into the requested range.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    floats: VecDeque<f64>,
    ints: VecDeque<u32>,
    fallback_float: f64,
}

impl ScriptedRandom {
    const NEVER: f64 = 0.999_999;

    pub fn new() -> Self {
        Self {
            floats: VecDeque::new(),
            ints: VecDeque::new(),
            fallback_float: Self::NEVER,
        }
    }

    /// A source whose float draws never pass any probability check
    pub fn never() -> Self {
        Self::new()
    }

    /// A source whose float draws pass every non-zero probability check
    pub fn always() -> Self {
        Self::new().with_fallback_float(0.0)
    }

    pub fn with_floats(mut self, floats: impl IntoIterator<Item = f64>) -> Self {
        self.floats.extend(floats);
        self
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn with_fallback_float(mut self, value: f64) -> Self {
        self.fallback_float = value.clamp(0.0, Self::NEVER);
        self
    }

    /// Draws still queued (floats, ints)
    pub fn remaining(&self) -> (usize, usize) {
        (self.floats.len(), self.ints.len())
    }
}

impl Default for ScriptedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ScriptedRandom {
    fn float01(&mut self) -> f64 {
        self.floats.pop_front().unwrap_or(self.fallback_float)
    }

    fn int_range(&mut self, low: u32, high: u32) -> u32 {
        match self.ints.pop_front() {
            Some(v) => v.clamp(low, high.max(low)),
            None => low,
        }
    }
}
