//! The simulation driver
//!
//! Runs a fixed number of ticks against one [`Consciousness`]:
//! - paces ticks with the heartbeat (cosmetic only)
//! - while the meta-loop runs, lets the [`AnchorPolicy`] reach for an anchor
//! - stops early when the shutdown future resolves
//! - always hands the sink exactly one [`RunSummary`]
//!
//! The summary is owned by a scope guard: finishing normally, being
//! interrupted, and having the run future dropped mid-tick all go through it.

use crate::heartbeat::HeartbeatConfig;
use crate::policy::{AnchorChoice, AnchorPolicy};
use crate::sink::EventSink;
use crate::summary::{Outcome, RunStats, RunSummary};
use chrono::{DateTime, Utc};
use pendulum_core::{Consciousness, Event, PendulumConfig, RandomSource};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Simulation {
    ticks: u32,
    heartbeat: HeartbeatConfig,
    policy: AnchorPolicy,
}

impl Simulation {
    pub fn new(ticks: u32, heartbeat: HeartbeatConfig, policy: AnchorPolicy) -> Self {
        Self {
            ticks,
            heartbeat,
            policy,
        }
    }

    pub fn from_config(config: &PendulumConfig) -> Self {
        Self::new(
            config.simulation.ticks,
            HeartbeatConfig::from(&config.simulation),
            AnchorPolicy::from(&config.anchors),
        )
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn heartbeat(&self) -> &HeartbeatConfig {
        &self.heartbeat
    }

    pub fn policy(&self) -> &AnchorPolicy {
        &self.policy
    }

    /// Drive `consciousness` for the configured number of ticks.
    ///
    /// `shutdown` is raced against every pause; once it resolves no further
    /// tick starts. Pass `std::future::pending()` to run to completion.
    pub async fn run<R, S, F>(
        &self,
        consciousness: &mut Consciousness<R>,
        sink: &mut S,
        shutdown: F,
    ) -> RunSummary
    where
        R: RandomSource,
        S: EventSink + ?Sized,
        F: Future<Output = ()>,
    {
        let mut guard = RunGuard::new(consciousness, sink, self.ticks);
        let pending = guard.consciousness.drain_events();
        guard.deliver(pending);
        tokio::pin!(shutdown);

        info!(
            ticks = self.ticks,
            interval_ms = self.heartbeat.interval.as_millis() as u64,
            "simulation started"
        );

        for tick in 0..self.ticks {
            let pause = if tick == 0 {
                self.heartbeat.intro_pause
            } else {
                self.heartbeat.interval
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!(ticks_completed = guard.ticks_completed, "simulation interrupted");
                    return guard.finish(Outcome::Interrupted);
                }
                _ = pace(pause) => {}
            }

            guard.tick(&self.policy);
        }

        guard.finish(Outcome::Completed)
    }
}

/// Wait out a pause. A zero pause still yields once so a ready shutdown is seen.
async fn pace(pause: Duration) {
    if pause.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(pause).await;
    }
}

/// Owns the run's borrows and emits the summary exactly once.
struct RunGuard<'a, R: RandomSource, S: EventSink + ?Sized> {
    consciousness: &'a mut Consciousness<R>,
    sink: &'a mut S,
    ticks_planned: u32,
    ticks_completed: u32,
    stats: RunStats,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl<'a, R: RandomSource, S: EventSink + ?Sized> RunGuard<'a, R, S> {
    fn new(consciousness: &'a mut Consciousness<R>, sink: &'a mut S, ticks_planned: u32) -> Self {
        let stats = RunStats::starting_at(consciousness.fatigue().value());
        Self {
            consciousness,
            sink,
            ticks_planned,
            ticks_completed: 0,
            stats,
            started_at: Utc::now(),
            finished: false,
        }
    }

    fn deliver(&mut self, events: Vec<Event>) {
        for event in &events {
            self.stats.observe(event);
            self.sink.emit(event);
        }
    }

    fn tick(&mut self, policy: &AnchorPolicy) {
        let events = self.consciousness.update();
        self.deliver(events);

        if self.consciousness.in_meta_loop() {
            if let Some(choice) = policy.choose(self.consciousness.random_mut()) {
                let events = match choice {
                    AnchorChoice::Ritual => self.consciousness.perform_ritual(),
                    AnchorChoice::Sensation => self
                        .consciousness
                        .record_sensation(policy.sensation_record.clone()),
                };
                self.deliver(events);
            }
        }

        self.ticks_completed += 1;
    }

    fn summarize(&self, outcome: Outcome) -> RunSummary {
        RunSummary {
            outcome,
            ticks_planned: self.ticks_planned,
            ticks_completed: self.ticks_completed,
            final_fatigue: self.consciousness.fatigue().value(),
            final_mode: self.consciousness.mode(),
            stats: self.stats.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    fn conclude(&mut self, outcome: Outcome) -> RunSummary {
        let summary = self.summarize(outcome);
        self.finished = true;
        self.sink.finish(&summary);
        info!(
            outcome = ?summary.outcome,
            ticks_completed = summary.ticks_completed,
            final_fatigue = summary.final_fatigue,
            "simulation finished"
        );
        summary
    }

    fn finish(mut self, outcome: Outcome) -> RunSummary {
        self.conclude(outcome)
    }
}

impl<'a, R: RandomSource, S: EventSink + ?Sized> Drop for RunGuard<'a, R, S> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                ticks_completed = self.ticks_completed,
                "simulation abandoned before finishing"
            );
            self.conclude(Outcome::Abandoned);
        }
    }
}
