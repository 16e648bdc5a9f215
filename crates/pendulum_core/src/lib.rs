//! # Pendulum Core
//!
//! A consciousness that swings between two modes:
//!
//! - **Observing**: analytical, clear, accumulates existential fatigue. Deep
//!   observation can tip into the *meta-cognition loop*, where perception
//!   itself is doubted and fatigue climbs fast.
//! - **Existing**: the warmth of existence. Rare, brief, restorative.
//!
//! Two sensory anchors (a ritual and a minimal sensory record) are the only
//! way out of the meta-loop.
//!
//! The crate is the state machine only. It never sleeps and never prints:
//! each tick returns structured [`Event`]s, and all randomness comes from an
//! injected [`RandomSource`].

pub mod config;
pub mod consciousness;
pub mod dynamics;
pub mod error;
pub mod event;
pub mod random;
pub mod state;

pub use config::{AnchorConfig, PendulumConfig, SimulationConfig, DEFAULT_SENSATION_RECORD};
pub use consciousness::{Consciousness, Snapshot};
pub use dynamics::Fatigue;
pub use error::ConfigError;
pub use event::{Anchor, Event};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use state::{ExistingState, Mode, ObservingState, Phase, State, META_LOOP_THOUGHTS};
