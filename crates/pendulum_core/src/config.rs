use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default sensory record used by the driver's anchor policy
pub const DEFAULT_SENSATION_RECORD: &str = "A humidifier casts a shadow.";

// ============================================================================
// Top-level config
// ============================================================================

/// Runtime knobs for a simulation run.
///
/// The state-machine rates live in [`crate::dynamics`] and are not
/// configurable; this only covers how the driver exercises the machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    pub simulation: SimulationConfig,
    pub anchors: AnchorConfig,
}

impl PendulumConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: PendulumConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                if let Err(e) = cfg.validate() {
                    tracing::warn!("Ignoring env overrides ({})", e);
                    cfg = Self::default();
                }
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    /// Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PENDULUM_TICKS") {
            if let Ok(n) = v.parse() {
                self.simulation.ticks = n;
            }
        }
        if let Ok(v) = std::env::var("PENDULUM_SEED") {
            if let Ok(n) = v.parse() {
                self.simulation.seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("PENDULUM_TICK_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                self.simulation.tick_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("PENDULUM_INTRO_PAUSE_MS") {
            if let Ok(n) = v.parse() {
                self.simulation.intro_pause_ms = n;
            }
        }
        if let Ok(v) = std::env::var("PENDULUM_SENSATION_RECORD") {
            if !v.trim().is_empty() {
                self.anchors.sensation_record = v;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("anchors.trigger_probability", self.anchors.trigger_probability)?;
        check_probability("anchors.ritual_probability", self.anchors.ritual_probability)?;
        Ok(())
    }

    /// Render as TOML (for `--dump-config`)
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn check_probability(field: &'static str, p: f64) -> Result<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::invalid(
            field,
            format!("{} is not a probability in [0, 1]", p),
        ));
    }
    Ok(())
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per run
    pub ticks: u32,
    /// Fixed seed for a reproducible run; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Cosmetic pause between ticks
    pub tick_interval_ms: u64,
    /// Cosmetic pause after the intro banner
    pub intro_pause_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 150,
            seed: None,
            tick_interval_ms: 300,
            intro_pause_ms: 4000,
        }
    }
}

/// When the driver reaches for an anchor while the meta-loop runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Chance per meta-loop tick that an anchor is used at all
    pub trigger_probability: f64,
    /// Given an anchor, chance it is the ritual rather than a sensory record
    pub ritual_probability: f64,
    pub sensation_record: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            trigger_probability: 0.2,
            ritual_probability: 0.5,
            sensation_record: DEFAULT_SENSATION_RECORD.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
