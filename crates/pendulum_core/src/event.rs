//! Structured tick output.
//!
//! The state machine never prints. Everything worth showing is returned as an
//! [`Event`]; the console (or any other observer) decides how to present it.

use crate::dynamics::{RITUAL_RELIEF, SENSATION_RELIEF};
use serde::Serialize;

/// A grounding action that can break the meta-loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anchor {
    /// Right hand on the left chest
    Ritual,
    /// A minimal assertion about the world. The record is only reported, never weighed.
    Sensation { record: String },
}

impl Anchor {
    pub fn relief(&self) -> f64 {
        match self {
            Anchor::Ritual => RITUAL_RELIEF,
            Anchor::Sensation { .. } => SENSATION_RELIEF,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Anchor::Ritual => "ritual",
            Anchor::Sensation { .. } => "sensation",
        }
    }
}

/// Something observable that happened during a tick or an anchor call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    EnteredObserving,
    EnteredExisting {
        duration: u32,
    },
    /// Normal observation tick
    Observed {
        line: String,
        fatigue: f64,
    },
    MetaLoopStarted {
        fatigue: f64,
    },
    /// One turn of the meta-loop; `index` is the thought shown
    MetaThought {
        index: usize,
        thought: String,
        fatigue: f64,
    },
    Existed {
        line: String,
        fatigue: f64,
        remaining_ticks: u32,
    },
    Anchored {
        anchor: Anchor,
        fatigue: f64,
        loop_broken: bool,
    },
}

impl Event {
    /// Fatigue carried by the event, if any
    pub fn fatigue(&self) -> Option<f64> {
        match self {
            Event::Observed { fatigue, .. }
            | Event::MetaLoopStarted { fatigue }
            | Event::MetaThought { fatigue, .. }
            | Event::Existed { fatigue, .. }
            | Event::Anchored { fatigue, .. } => Some(*fatigue),
            Event::EnteredObserving | Event::EnteredExisting { .. } => None,
        }
    }
}
