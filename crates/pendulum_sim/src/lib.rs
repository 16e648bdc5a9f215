//! # Pendulum Simulation Driver
//!
//! Runs the pendulum for a fixed number of ticks:
//! 1. Pacing each tick with the heartbeat (cosmetic, may be zero)
//! 2. Letting the anchor policy ground the meta-loop stochastically
//! 3. Forwarding every event to a sink
//! 4. Finalising with exactly one summary, however the run ends

mod heartbeat;
pub mod policy;
mod simulation;
mod sink;
mod summary;

pub use heartbeat::HeartbeatConfig;
pub use policy::{AnchorChoice, AnchorPolicy};
pub use simulation::Simulation;
pub use sink::{EventSink, RecordingSink};
pub use summary::{Outcome, RunStats, RunSummary};
