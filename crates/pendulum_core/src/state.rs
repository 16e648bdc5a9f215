//! The two modes of the pendulum
//!
//! - `Observing`: the world is an object of perception. Clear, analytical,
//!   slowly tiring. Risks sliding into the meta-loop, where perception itself
//!   is doubted and fatigue climbs fast.
//! - `Existing`: the warmth of existence. Short-lived, restorative.
//!
//! The meta-loop is a flag inside `Observing`, not a third mode: it shares
//! Observing's entry and exit, and only an anchor clears it.

use crate::dynamics::{
    Fatigue, EXISTING_MAX_TICKS, EXISTING_MIN_TICKS, EXISTING_RECOVERY_STEP,
    META_LOOP_FATIGUE_STEP, OBSERVING_FATIGUE_STEP,
};
use crate::event::Event;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the meta-loop keeps asking itself, in order
pub const META_LOOP_THOUGHTS: [&str; 5] = [
    "  ... Does the 'desk' exist?",
    "  ... What does it mean 'to see'?",
    "  ... Can 'existence' be asserted?",
    "  ... Even 'cannot assert' cannot be asserted.",
    "  ... [Perceptual loop. Fatigue rising rapidly]",
];

/// Width of the rendered texture between the bars
pub const TEXTURE_WIDTH: usize = 70;

/// Flattened view of where the machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Observing,
    MetaLoop,
    Existing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Observing => "observing",
            Mode::MetaLoop => "meta-loop",
            Mode::Existing => "existing",
        };
        f.write_str(s)
    }
}

/// Contract shared by both modes
pub trait Phase {
    /// Called once when the mode becomes current
    fn enter(&mut self, random: &mut dyn RandomSource, events: &mut Vec<Event>);

    /// One tick. Returning `Some(next)` hands control to `next` immediately.
    fn execute(
        &mut self,
        fatigue: &mut Fatigue,
        random: &mut dyn RandomSource,
        events: &mut Vec<Event>,
    ) -> Option<State>;

    /// Display line for the given fatigue. Pure.
    fn render(&self, fatigue: Fatigue) -> String;
}

// =============================================================================
// Observing
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservingState {
    in_meta_loop: bool,
    loop_counter: u32,
}

impl ObservingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Already caught in the meta-loop, `loop_counter` turns in
    pub fn caught_in_meta_loop(loop_counter: u32) -> Self {
        Self {
            in_meta_loop: true,
            loop_counter,
        }
    }

    pub fn in_meta_loop(&self) -> bool {
        self.in_meta_loop
    }

    pub fn loop_counter(&self) -> u32 {
        self.loop_counter
    }

    fn start_meta_loop(&mut self, fatigue: Fatigue, events: &mut Vec<Event>) {
        tracing::debug!(fatigue = fatigue.value(), "meta-cognition loop started");
        self.in_meta_loop = true;
        self.loop_counter = 0;
        events.push(Event::MetaLoopStarted {
            fatigue: fatigue.value(),
        });
    }

    fn turn_meta_loop(&mut self, fatigue: &mut Fatigue, events: &mut Vec<Event>) {
        let index = self.loop_counter as usize % META_LOOP_THOUGHTS.len();
        fatigue.accumulate(META_LOOP_FATIGUE_STEP);
        self.loop_counter += 1;
        events.push(Event::MetaThought {
            index,
            thought: META_LOOP_THOUGHTS[index].to_string(),
            fatigue: fatigue.value(),
        });
    }

    /// Break out of the meta-loop. Returns whether a loop was actually broken.
    pub fn exit_meta_loop(&mut self) -> bool {
        if !self.in_meta_loop {
            return false;
        }
        self.in_meta_loop = false;
        self.loop_counter = 0;
        true
    }
}

impl Phase for ObservingState {
    fn enter(&mut self, _random: &mut dyn RandomSource, events: &mut Vec<Event>) {
        self.in_meta_loop = false;
        self.loop_counter = 0;
        events.push(Event::EnteredObserving);
    }

    fn execute(
        &mut self,
        fatigue: &mut Fatigue,
        random: &mut dyn RandomSource,
        events: &mut Vec<Event>,
    ) -> Option<State> {
        if self.in_meta_loop {
            self.turn_meta_loop(fatigue, events);
        } else {
            fatigue.accumulate(OBSERVING_FATIGUE_STEP);
            events.push(Event::Observed {
                line: self.render(*fatigue),
                fatigue: fatigue.value(),
            });
            if random.float01() < fatigue.meta_loop_onset_probability() {
                self.start_meta_loop(*fatigue, events);
            }
        }

        if fatigue.exceeds_threshold() {
            return Some(State::Existing(ExistingState::new()));
        }
        None
    }

    fn render(&self, fatigue: Fatigue) -> String {
        format!(
            "Observing: |{}| (Fatigue: {})",
            texture(fatigue, OBSERVING_SALT, '.', ' ', 0.1),
            fatigue
        )
    }
}

// =============================================================================
// Existing
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingState {
    remaining_ticks: u32,
}

impl ExistingState {
    /// Duration is drawn on `enter`
    pub fn new() -> Self {
        Self::default()
    }

    /// An episode already under way. A live episode always has a tick left.
    pub fn with_remaining(remaining_ticks: u32) -> Self {
        Self {
            remaining_ticks: remaining_ticks.max(1),
        }
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }
}

impl Phase for ExistingState {
    fn enter(&mut self, random: &mut dyn RandomSource, events: &mut Vec<Event>) {
        self.remaining_ticks = random.int_range(EXISTING_MIN_TICKS, EXISTING_MAX_TICKS);
        events.push(Event::EnteredExisting {
            duration: self.remaining_ticks,
        });
    }

    fn execute(
        &mut self,
        fatigue: &mut Fatigue,
        _random: &mut dyn RandomSource,
        events: &mut Vec<Event>,
    ) -> Option<State> {
        fatigue.relieve(EXISTING_RECOVERY_STEP);
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        events.push(Event::Existed {
            line: self.render(*fatigue),
            fatigue: fatigue.value(),
            remaining_ticks: self.remaining_ticks,
        });

        if self.remaining_ticks == 0 {
            return Some(State::Observing(ObservingState::new()));
        }
        None
    }

    fn render(&self, fatigue: Fatigue) -> String {
        format!(
            "Existing:  |{}| (Fatigue: {})",
            texture(fatigue, EXISTING_SALT, '*', '~', 0.3),
            fatigue
        )
    }
}

// =============================================================================
// State
// =============================================================================

/// The live mode, owned by [`crate::Consciousness`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum State {
    Observing(ObservingState),
    Existing(ExistingState),
}

impl State {
    pub fn mode(&self) -> Mode {
        match self {
            State::Observing(o) if o.in_meta_loop() => Mode::MetaLoop,
            State::Observing(_) => Mode::Observing,
            State::Existing(_) => Mode::Existing,
        }
    }

    pub fn in_meta_loop(&self) -> bool {
        matches!(self, State::Observing(o) if o.in_meta_loop())
    }
}

impl Default for State {
    fn default() -> Self {
        State::Observing(ObservingState::new())
    }
}

impl Phase for State {
    fn enter(&mut self, random: &mut dyn RandomSource, events: &mut Vec<Event>) {
        match self {
            State::Observing(s) => s.enter(random, events),
            State::Existing(s) => s.enter(random, events),
        }
    }

    fn execute(
        &mut self,
        fatigue: &mut Fatigue,
        random: &mut dyn RandomSource,
        events: &mut Vec<Event>,
    ) -> Option<State> {
        match self {
            State::Observing(s) => s.execute(fatigue, random, events),
            State::Existing(s) => s.execute(fatigue, random, events),
        }
    }

    fn render(&self, fatigue: Fatigue) -> String {
        match self {
            State::Observing(s) => s.render(fatigue),
            State::Existing(s) => s.render(fatigue),
        }
    }
}

// =============================================================================
// Texture
// =============================================================================

const OBSERVING_SALT: u64 = 0x6f62_7365_7276_6521;
const EXISTING_SALT: u64 = 0x6578_6973_7469_6e67;

/// Deterministic speckle: the same fatigue always draws the same line.
/// Roughly `sparse_ratio` of the cells get `sparse`, the rest `dense`.
fn texture(fatigue: Fatigue, salt: u64, dense: char, sparse: char, sparse_ratio: f64) -> String {
    let mut seed = fatigue.value().to_bits() ^ salt;
    (0..TEXTURE_WIDTH)
        .map(|_| {
            seed = splitmix64(seed);
            let unit = (seed >> 11) as f64 / (1u64 << 53) as f64;
            if unit < sparse_ratio {
                sparse
            } else {
                dense
            }
        })
        .collect()
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
