//! Integration tests for pendulum_sim
//!
//! Cover the driver contract end to end:
//! - fixed tick count and pacing
//! - anchor policy only acting inside the meta-loop
//! - exactly one summary on completion, interruption and abandonment
//! - reproducibility from a seed

use pendulum_core::{
    Consciousness, Event, Mode, PendulumConfig, ScriptedRandom, StdRandom,
};
use pendulum_sim::{
    AnchorPolicy, EventSink, HeartbeatConfig, Outcome, RecordingSink, RunSummary, Simulation,
};
use proptest::prelude::*;
use std::time::Duration;

fn immediate(ticks: u32, policy: AnchorPolicy) -> Simulation {
    Simulation::new(ticks, HeartbeatConfig::immediate(), policy)
}

// ============================================================
// Completion
// ============================================================

#[tokio::test]
async fn reference_run_completes_with_one_summary() {
    let mut c = Consciousness::new(StdRandom::seeded(42));
    let mut sink = RecordingSink::new();
    let sim = immediate(150, AnchorPolicy::default());

    let summary = sim.run(&mut c, &mut sink, std::future::pending()).await;

    assert_eq!(summary.outcome, Outcome::Completed);
    assert_eq!(summary.ticks_planned, 150);
    assert_eq!(summary.ticks_completed, 150);
    assert_eq!(summary.final_fatigue, c.fatigue().value());
    assert_eq!(summary.final_mode, c.mode());
    assert_eq!(sink.summaries.len(), 1);
    assert!(summary.finished_at >= summary.started_at);
}

#[tokio::test]
async fn slow_climb_reaches_existing_on_tick_161() {
    let mut c = Consciousness::new(ScriptedRandom::never().with_ints([6]));
    let mut sink = RecordingSink::new();

    immediate(160, AnchorPolicy::default())
        .run(&mut c, &mut sink, std::future::pending())
        .await;
    assert_eq!(c.fatigue().value(), 100.0);
    assert_eq!(c.mode(), Mode::Observing);

    immediate(1, AnchorPolicy::default())
        .run(&mut c, &mut sink, std::future::pending())
        .await;
    assert_eq!(c.fatigue().value(), 100.5);
    assert_eq!(c.mode(), Mode::Existing);
    assert_eq!(sink.summaries.len(), 2);
    assert_eq!(sink.summaries[1].stats.existing_episodes, 1);
}

#[tokio::test]
async fn config_drives_the_run() {
    let mut cfg = PendulumConfig::default();
    cfg.simulation.ticks = 7;
    cfg.simulation.tick_interval_ms = 0;
    cfg.simulation.intro_pause_ms = 0;
    cfg.anchors.sensation_record = "The fridge hums.".into();
    let sim = Simulation::from_config(&cfg);
    assert_eq!(sim.ticks(), 7);
    assert_eq!(sim.heartbeat(), &HeartbeatConfig::immediate());
    assert_eq!(sim.policy().sensation_record, "The fridge hums.");

    // Loop on tick 1, then anchor: trigger 0.0 < 0.2, choice 0.9 ≥ 0.5 → sensation
    let mut c = Consciousness::new(ScriptedRandom::never().with_floats([0.0, 0.0, 0.9]));
    let mut sink = RecordingSink::new();
    let summary = sim.run(&mut c, &mut sink, std::future::pending()).await;

    assert_eq!(summary.ticks_completed, 7);
    assert_eq!(summary.stats.sensations, 1);
    let record = sink.events.iter().find_map(|e| match e {
        Event::Anchored {
            anchor: pendulum_core::Anchor::Sensation { record },
            ..
        } => Some(record.clone()),
        _ => None,
    });
    assert_eq!(record.as_deref(), Some("The fridge hums."));
    // 20.5 - 8 = 12.5, then six normal ticks
    assert_eq!(summary.final_fatigue, 15.5);
}

// ============================================================
// Interruption
// ============================================================

#[tokio::test(start_paused = true)]
async fn shutdown_between_ticks_interrupts() {
    let mut c = Consciousness::new(ScriptedRandom::never());
    let mut sink = RecordingSink::new();
    let sim = Simulation::new(150, HeartbeatConfig::testing(), AnchorPolicy::never());

    // Ticks land at t = 0, 10, 20, 30, 40, 50; the signal at 55 stops the 7th.
    let shutdown = tokio::time::sleep(Duration::from_millis(55));
    let summary = sim.run(&mut c, &mut sink, shutdown).await;

    assert_eq!(summary.outcome, Outcome::Interrupted);
    assert_eq!(summary.ticks_completed, 6);
    assert_eq!(summary.final_fatigue, 23.0);
    assert_eq!(summary.final_line(), "Final Fatigue: 23.0");
    assert_eq!(sink.summaries.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_intro_runs_no_ticks() {
    let mut c = Consciousness::new(ScriptedRandom::never());
    let mut sink = RecordingSink::new();
    let heartbeat = HeartbeatConfig {
        interval: Duration::from_millis(300),
        intro_pause: Duration::from_secs(4),
    };
    let sim = Simulation::new(150, heartbeat, AnchorPolicy::never());

    let summary = sim
        .run(&mut c, &mut sink, tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert_eq!(summary.outcome, Outcome::Interrupted);
    assert_eq!(summary.ticks_completed, 0);
    assert_eq!(summary.final_fatigue, 20.0);
    // Construction event is still delivered
    assert_eq!(sink.events, vec![Event::EnteredObserving]);
}

#[tokio::test(start_paused = true)]
async fn abandoned_run_summarizes_once() {
    let mut c = Consciousness::new(ScriptedRandom::never());
    let mut sink = RecordingSink::new();
    let sim = Simulation::new(150, HeartbeatConfig::testing(), AnchorPolicy::never());

    let result = tokio::time::timeout(
        Duration::from_millis(25),
        sim.run(&mut c, &mut sink, std::future::pending()),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(sink.summaries.len(), 1);
    let summary = &sink.summaries[0];
    assert_eq!(summary.outcome, Outcome::Abandoned);
    assert!(summary.interrupted());
    assert_eq!(summary.final_fatigue, c.fatigue().value());
}

/// A sink that panics mid-run still gets its summary on unwind.
struct PanickingSink {
    emitted: usize,
    panic_after: usize,
    finished: std::sync::Arc<std::sync::Mutex<Vec<RunSummary>>>,
}

impl EventSink for PanickingSink {
    fn emit(&mut self, _event: &Event) {
        self.emitted += 1;
        if self.emitted == self.panic_after {
            panic!("sink failure");
        }
    }

    fn finish(&mut self, summary: &RunSummary) {
        if let Ok(mut f) = self.finished.lock() {
            f.push(summary.clone());
        }
    }
}

#[test]
fn unwinding_run_summarizes_once() {
    let finished = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let handle = finished.clone();

    let outcome = std::panic::catch_unwind(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async move {
            let mut c = Consciousness::new(ScriptedRandom::never());
            let mut sink = PanickingSink {
                emitted: 0,
                panic_after: 5,
                finished: handle,
            };
            immediate(150, AnchorPolicy::never())
                .run(&mut c, &mut sink, std::future::pending())
                .await
        })
    });
    assert!(outcome.is_err());

    let finished = finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].outcome, Outcome::Abandoned);
    assert_eq!(finished[0].ticks_completed, 3);
}

// ============================================================
// Reproducibility
// ============================================================

#[tokio::test]
async fn same_seed_same_story() {
    async fn story(seed: u64) -> (Vec<Event>, f64) {
        let mut c = Consciousness::new(StdRandom::seeded(seed));
        let mut sink = RecordingSink::new();
        let summary = immediate(300, AnchorPolicy::default())
            .run(&mut c, &mut sink, std::future::pending())
            .await;
        (sink.events, summary.final_fatigue)
    }

    let a = story(7).await;
    let b = story(7).await;
    assert_eq!(a, b);
}

// ============================================================
// Properties
// ============================================================

fn run_blocking(seed: u64, ticks: u32, policy: AnchorPolicy) -> (RecordingSink, RunSummary) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    rt.block_on(async {
        let mut c = Consciousness::new(StdRandom::seeded(seed));
        let mut sink = RecordingSink::new();
        let summary = immediate(ticks, policy)
            .run(&mut c, &mut sink, std::future::pending())
            .await;
        (sink, summary)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The policy only anchors inside the meta-loop, so every anchor breaks one.
    #[test]
    fn driver_anchors_only_inside_loop(seed in any::<u64>(), ticks in 1u32..400) {
        let (sink, summary) = run_blocking(seed, ticks, AnchorPolicy::default());
        for ev in &sink.events {
            if let Event::Anchored { loop_broken, .. } = ev {
                prop_assert!(*loop_broken);
            }
        }
        prop_assert_eq!(summary.stats.loops_broken, summary.stats.rituals + summary.stats.sensations);
        prop_assert!(summary.stats.loops_broken <= summary.stats.meta_loops);
    }

    /// Fatigue reported anywhere in a run is never negative, and the summary
    /// agrees with the peak seen in the event stream.
    #[test]
    fn driver_fatigue_non_negative(seed in any::<u64>(), ticks in 1u32..400) {
        let (sink, summary) = run_blocking(seed, ticks, AnchorPolicy::default());
        let mut peak = 20.0f64;
        for f in sink.events.iter().filter_map(|e| e.fatigue()) {
            prop_assert!(f >= 0.0);
            peak = peak.max(f);
        }
        prop_assert_eq!(summary.stats.peak_fatigue, peak);
        prop_assert!(summary.final_fatigue >= 0.0);
        prop_assert_eq!(summary.ticks_completed, ticks);
    }
}
