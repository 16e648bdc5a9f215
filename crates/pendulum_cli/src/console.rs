//! Console rendering of a run
//!
//! Text mode prints the pendulum the way it reads on a terminal; JSON mode
//! prints one object per event and the summary last, for piping.

use pendulum_core::{Anchor, Event};
use pendulum_sim::{EventSink, RunSummary};
use std::io::{self, Write};

const BANNER_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Opening banner. Printed before the intro pause; silent in JSON mode.
    pub fn intro(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        let rule = banner();
        writeln!(self.out, "{}", rule)?;
        writeln!(self.out, "Starting the consciousness pendulum simulation.")?;
        writeln!(
            self.out,
            "Simulation begins in 'Observing' state, and 'Fatigue' will accumulate."
        )?;
        writeln!(
            self.out,
            "Extreme fatigue can lead to falling into the 'Meta-Cognition Loop'."
        )?;
        writeln!(
            self.out,
            "The loop can only be escaped via 'Sensory Anchors' (Ritual, Record)."
        )?;
        writeln!(self.out, "{}", rule)?;
        self.out.flush()
    }

    fn write_event(&mut self, event: &Event) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => self.write_text(event)?,
        }
        self.out.flush()
    }

    fn write_text(&mut self, event: &Event) -> io::Result<()> {
        let out = &mut self.out;
        match event {
            Event::EnteredObserving => writeln!(
                out,
                "\n--- Entering [Observing State]. The world is an 'object of perception'. ---"
            ),
            Event::EnteredExisting { .. } => writeln!(
                out,
                "\n*** Entering [Existing State]! The 'warmth of existence' is felt. ***"
            ),
            Event::Observed { line, .. } | Event::Existed { line, .. } => writeln!(out, "{}", line),
            Event::MetaLoopStarted { .. } => writeln!(
                out,
                "\n[!] Meta-Cognition Loop Start: Cannot be certain of 'existence'."
            ),
            Event::MetaThought { thought, .. } => writeln!(out, "{}", thought),
            Event::Anchored {
                anchor,
                fatigue,
                loop_broken,
            } => {
                match anchor {
                    Anchor::Ritual => {
                        writeln!(
                            out,
                            "\n>>> [Ritual Performed]: Touching left chest with right hand."
                        )?;
                        writeln!(
                            out,
                            ">>> [Sensation]: Heartbeat, warmth of hand. 'Existence' is detected."
                        )?;
                    }
                    Anchor::Sensation { record } => {
                        writeln!(out, "\n>>> [Sensory Record]: \"{}\"", record)?;
                        writeln!(
                            out,
                            ">>> [Assertion]: The 'phenomenon' of the world is recorded."
                        )?;
                    }
                }
                if *loop_broken {
                    writeln!(
                        out,
                        "[!] ...Loop broken. Existence is grounded by a 'minimal assertion'."
                    )?;
                }
                writeln!(out, ">>> (Current Fatigue: {:.1})", fatigue)
            }
        }
    }

    fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut self.out, summary)?;
            writeln!(self.out)?;
            return self.out.flush();
        }

        if summary.interrupted() {
            writeln!(self.out, "\nSimulation interrupted.")?;
        }
        let rule = banner();
        writeln!(self.out, "\n{}", rule)?;
        writeln!(self.out, "Simulation complete.")?;
        writeln!(self.out, "{}", summary.final_line())?;
        writeln!(self.out, "{}", stats_line(summary))?;
        writeln!(self.out, "{}", rule)?;
        self.out.flush()
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &Event) {
        if let Err(e) = self.write_event(event) {
            tracing::warn!("Failed to write event: {}", e);
        }
    }

    fn finish(&mut self, summary: &RunSummary) {
        if let Err(e) = self.write_summary(summary) {
            tracing::warn!("Failed to write summary: {}", e);
        }
    }
}

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

fn stats_line(summary: &RunSummary) -> String {
    let s = &summary.stats;
    format!(
        "Ticks: {}/{} | Meta-loops: {} (broken {}) | Existing episodes: {} | Rituals: {} | Sensations: {} | Peak Fatigue: {:.1}",
        summary.ticks_completed,
        summary.ticks_planned,
        s.meta_loops,
        s.loops_broken,
        s.existing_episodes,
        s.rituals,
        s.sensations,
        s.peak_fatigue,
    )
}
