//! The subject of consciousness: a pendulum between Observing and Existing.
//!
//! `Consciousness` owns the fatigue level, the live [`State`] and the random
//! source. It runs the transition protocol and exposes the two sensory
//! anchors, the only way out of the meta-loop.

use crate::dynamics::Fatigue;
use crate::event::{Anchor, Event};
use crate::random::{RandomSource, StdRandom};
use crate::state::{Mode, ObservingState, Phase, State};
use serde::Serialize;

/// Point-in-time view for observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub fatigue: f64,
    pub mode: Mode,
    /// Turns spent in the current meta-loop (0 outside it)
    pub loop_counter: u32,
    /// Ticks left in the current Existing episode (`None` while observing)
    pub remaining_ticks: Option<u32>,
    /// Ticks executed since construction
    pub ticks: u64,
}

pub struct Consciousness<R: RandomSource = StdRandom> {
    fatigue: Fatigue,
    state: State,
    random: R,
    ticks: u64,
    /// Events raised outside a tick (construction) wait here for the next drain
    outbox: Vec<Event>,
}

impl<R: RandomSource> Consciousness<R> {
    /// Fresh pendulum: fatigue 20.0, Observing, no meta-loop
    pub fn new(random: R) -> Self {
        let mut consciousness = Self {
            fatigue: Fatigue::default(),
            state: State::default(),
            random,
            ticks: 0,
            outbox: Vec::new(),
        };
        consciousness.transition_to(State::Observing(ObservingState::new()));
        consciousness
    }

    /// Resume from an arbitrary point without running `enter` again.
    /// Used to set up replays and scenarios.
    pub fn resume(fatigue: Fatigue, state: State, random: R) -> Self {
        Self {
            fatigue,
            state,
            random,
            ticks: 0,
            outbox: Vec::new(),
        }
    }

    /// Replace the live state and enter it. Only construction and `update`
    /// hand over, so the successor is always the other mode.
    fn transition_to(&mut self, next: State) {
        let from = self.state.mode();
        self.state = next;
        self.state.enter(&mut self.random, &mut self.outbox);
        tracing::debug!(
            %from,
            to = %self.state.mode(),
            fatigue = self.fatigue.value(),
            "transition"
        );
    }

    /// One tick of consciousness. Returns everything that happened,
    /// including events still pending from construction.
    pub fn update(&mut self) -> Vec<Event> {
        self.ticks += 1;
        let next = self
            .state
            .execute(&mut self.fatigue, &mut self.random, &mut self.outbox);
        if let Some(next) = next {
            self.transition_to(next);
        }
        tracing::trace!(
            tick = self.ticks,
            mode = %self.state.mode(),
            fatigue = self.fatigue.value(),
            "tick"
        );
        self.drain_events()
    }

    // --- Sensory anchors ---

    /// Right hand on the left chest. Breaks the meta-loop, relieves 10.
    pub fn perform_ritual(&mut self) -> Vec<Event> {
        self.ground(Anchor::Ritual)
    }

    /// A minimal assertion about the world. Breaks the meta-loop, relieves 8.
    pub fn record_sensation(&mut self, record: impl Into<String>) -> Vec<Event> {
        self.ground(Anchor::Sensation {
            record: record.into(),
        })
    }

    fn ground(&mut self, anchor: Anchor) -> Vec<Event> {
        let loop_broken = match &mut self.state {
            State::Observing(observing) => observing.exit_meta_loop(),
            State::Existing(_) => false,
        };
        self.fatigue.relieve(anchor.relief());

        match &anchor {
            Anchor::Sensation { record } => tracing::info!(
                anchor = anchor.name(),
                record = %record,
                loop_broken,
                fatigue = self.fatigue.value(),
                "grounded"
            ),
            Anchor::Ritual => tracing::info!(
                anchor = anchor.name(),
                loop_broken,
                fatigue = self.fatigue.value(),
                "grounded"
            ),
        }

        self.outbox.push(Event::Anchored {
            anchor,
            fatigue: self.fatigue.value(),
            loop_broken,
        });
        self.drain_events()
    }

    /// Take events raised outside `update` (e.g. the initial `EnteredObserving`)
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    pub fn fatigue(&self) -> Fatigue {
        self.fatigue
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn in_meta_loop(&self) -> bool {
        self.state.in_meta_loop()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The injected random source, shared with the driver's anchor policy
    pub fn random_mut(&mut self) -> &mut R {
        &mut self.random
    }

    /// Current display line
    pub fn render(&self) -> String {
        self.state.render(self.fatigue)
    }

    pub fn snapshot(&self) -> Snapshot {
        let (loop_counter, remaining_ticks) = match &self.state {
            State::Observing(o) => (o.loop_counter(), None),
            State::Existing(e) => (0, Some(e.remaining_ticks())),
        };
        Snapshot {
            fatigue: self.fatigue.value(),
            mode: self.mode(),
            loop_counter,
            remaining_ticks,
            ticks: self.ticks,
        }
    }
}

impl Default for Consciousness<StdRandom> {
    fn default() -> Self {
        Self::new(StdRandom::from_entropy())
    }
}
