//! What a run leaves behind
//!
//! Every run, however it ends, produces exactly one [`RunSummary`].

use chrono::{DateTime, Utc};
use pendulum_core::{Anchor, Event, Mode};
use serde::Serialize;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// All planned ticks ran
    Completed,
    /// The shutdown signal fired between ticks
    Interrupted,
    /// The run was dropped or unwound before it could finish normally
    Abandoned,
}

/// Counters accumulated from the event stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub meta_loops: u32,
    pub existing_episodes: u32,
    pub rituals: u32,
    pub sensations: u32,
    pub loops_broken: u32,
    pub peak_fatigue: f64,
}

impl RunStats {
    pub fn starting_at(fatigue: f64) -> Self {
        Self {
            peak_fatigue: fatigue,
            ..Self::default()
        }
    }

    pub fn observe(&mut self, event: &Event) {
        match event {
            Event::MetaLoopStarted { .. } => self.meta_loops += 1,
            Event::EnteredExisting { .. } => self.existing_episodes += 1,
            Event::Anchored {
                anchor,
                loop_broken,
                ..
            } => {
                match anchor {
                    Anchor::Ritual => self.rituals += 1,
                    Anchor::Sensation { .. } => self.sensations += 1,
                }
                if *loop_broken {
                    self.loops_broken += 1;
                }
            }
            _ => {}
        }
        if let Some(f) = event.fatigue() {
            self.peak_fatigue = self.peak_fatigue.max(f);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub ticks_planned: u32,
    pub ticks_completed: u32,
    pub final_fatigue: f64,
    pub final_mode: Mode,
    pub stats: RunStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// `Final Fatigue: x.y`
    pub fn final_line(&self) -> String {
        format!("Final Fatigue: {:.1}", self.final_fatigue)
    }

    pub fn interrupted(&self) -> bool {
        self.outcome != Outcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_count_events() {
        let mut stats = RunStats::starting_at(20.0);
        stats.observe(&Event::MetaLoopStarted { fatigue: 40.0 });
        stats.observe(&Event::Anchored {
            anchor: Anchor::Ritual,
            fatigue: 30.0,
            loop_broken: true,
        });
        stats.observe(&Event::Anchored {
            anchor: Anchor::Sensation {
                record: "steam".into(),
            },
            fatigue: 22.0,
            loop_broken: false,
        });
        stats.observe(&Event::EnteredExisting { duration: 3 });

        assert_eq!(stats.meta_loops, 1);
        assert_eq!(stats.rituals, 1);
        assert_eq!(stats.sensations, 1);
        assert_eq!(stats.loops_broken, 1);
        assert_eq!(stats.existing_episodes, 1);
        assert_eq!(stats.peak_fatigue, 40.0);
    }

    #[test]
    fn test_final_line_format() {
        let now = Utc::now();
        let summary = RunSummary {
            outcome: Outcome::Interrupted,
            ticks_planned: 150,
            ticks_completed: 12,
            final_fatigue: 26.0,
            final_mode: Mode::Observing,
            stats: RunStats::default(),
            started_at: now,
            finished_at: now,
        };
        assert_eq!(summary.final_line(), "Final Fatigue: 26.0");
        assert!(summary.interrupted());
    }
}
