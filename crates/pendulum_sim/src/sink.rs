//! Where the driver sends what happens
//!
//! A sink receives every event in order and, exactly once per run, the final
//! summary. The console is one sink; tests record into [`RecordingSink`].

use crate::summary::RunSummary;
use pendulum_core::Event;

pub trait EventSink {
    fn emit(&mut self, event: &Event);

    /// Called exactly once per run, on every exit path
    fn finish(&mut self, summary: &RunSummary);
}

/// Keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
    pub summaries: Vec<RunSummary>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &Event) {
        self.events.push(event.clone());
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }
}
