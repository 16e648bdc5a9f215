//! When the driver reaches for an anchor
//!
//! Anchoring is not part of the state machine: the machine only guarantees
//! that an anchor breaks the loop. Whether and which anchor gets used is this
//! policy's call, made once per tick while the meta-loop runs.

use pendulum_core::{AnchorConfig, RandomSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorChoice {
    Ritual,
    Sensation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPolicy {
    /// Chance per meta-loop tick of using any anchor
    pub trigger_probability: f64,
    /// Chance that the anchor used is the ritual
    pub ritual_probability: f64,
    /// What the sensory record says
    pub sensation_record: String,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self::from(&AnchorConfig::default())
    }
}

impl From<&AnchorConfig> for AnchorPolicy {
    fn from(cfg: &AnchorConfig) -> Self {
        Self {
            trigger_probability: cfg.trigger_probability,
            ritual_probability: cfg.ritual_probability,
            sensation_record: cfg.sensation_record.clone(),
        }
    }
}

impl AnchorPolicy {
    /// Never anchors; the meta-loop runs until fatigue forces Existing
    pub fn never() -> Self {
        Self {
            trigger_probability: 0.0,
            ..Self::default()
        }
    }

    /// Decide for this tick. Draws once for the trigger and, only if it fires,
    /// once more for the choice.
    pub fn choose(&self, random: &mut dyn RandomSource) -> Option<AnchorChoice> {
        if random.float01() >= self.trigger_probability {
            return None;
        }
        if random.float01() < self.ritual_probability {
            Some(AnchorChoice::Ritual)
        } else {
            Some(AnchorChoice::Sensation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pendulum_core::ScriptedRandom;

    #[test]
    fn test_no_trigger_draws_once() {
        let policy = AnchorPolicy::default();
        let mut rng = ScriptedRandom::new().with_floats([0.2, 0.0]);
        assert_eq!(policy.choose(&mut rng), None);
        assert_eq!(rng.remaining(), (1, 0));
    }

    #[test]
    fn test_trigger_then_choice() {
        let policy = AnchorPolicy::default();
        let mut rng = ScriptedRandom::new().with_floats([0.19, 0.49, 0.1, 0.5]);
        assert_eq!(policy.choose(&mut rng), Some(AnchorChoice::Ritual));
        assert_eq!(policy.choose(&mut rng), Some(AnchorChoice::Sensation));
    }

    #[test]
    fn test_never_policy() {
        let policy = AnchorPolicy::never();
        assert_eq!(policy.choose(&mut ScriptedRandom::always()), None);
    }
}
