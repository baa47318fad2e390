//! Phase 2: sweep down and capture.
//!
//! Starts from the top, captures, then repeatedly scrolls forward by
//! `max(sweep_min_step_px, sweep_step_ratio * viewport)` and captures what
//! got mounted. At the bottom it waits once more and nudges past the
//! boundary so late rows are not missed.

use tracing::{debug, info};

use super::{absorb, current_metrics, scroll_to_top, visible_height};
use crate::dom::NodeId;
use crate::host::HostPage;
use crate::options::Options;
use crate::progress::{sweep_progress, Phase, ProgressReporter};
use crate::result::{SweepExit, SweepOutcome};
use crate::session::StopHandle;

/// Scroll positions closer than this count as "did not move".
const ADVANCE_EPSILON_PX: f64 = 0.5;

/// Stagnation state of phase 2, independent of any page.
///
/// An iteration is stagnant when neither the captured count grew nor the
/// scroll position advanced.
///
/// This replaces the stricter "no new messages for the limit AND bottom
/// reached" exit: bottom detection is handled separately by the driver, so
/// the tracker also ends sweeps whose scroll position is stuck short of the
/// bottom.
#[derive(Debug, Clone)]
pub struct SweepTracker {
    limit: u32,
    max_iterations: u32,
    last_count: usize,
    last_top: f64,
    stagnant: u32,
    iterations: u32,
}

impl SweepTracker {
    /// Tracker starting after the initial capture at the top.
    #[must_use]
    pub fn new(options: &Options, initial_count: usize, initial_top: f64) -> Self {
        Self {
            limit: options.stagnant_sweep_limit,
            max_iterations: options.max_sweep_iterations,
            last_count: initial_count,
            last_top: initial_top,
            stagnant: 0,
            iterations: 0,
        }
    }

    /// Record one forward step; `Some` when the phase should end.
    pub fn observe(&mut self, count: usize, scroll_top: f64) -> Option<SweepExit> {
        self.iterations += 1;

        let grew = count > self.last_count;
        let advanced = scroll_top > self.last_top + ADVANCE_EPSILON_PX;
        if grew || advanced {
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
        }
        self.last_count = self.last_count.max(count);
        self.last_top = scroll_top;

        if self.limit > 0 && self.stagnant >= self.limit {
            Some(SweepExit::Stalled)
        } else if self.iterations >= self.max_iterations {
            Some(SweepExit::IterationCap)
        } else {
            None
        }
    }

    /// Consecutive stagnant iterations.
    #[must_use]
    pub fn stagnant(&self) -> u32 {
        self.stagnant
    }

    /// Forward steps observed.
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Phase statistics with the given exit reason.
    #[must_use]
    pub fn outcome(&self, exit: SweepExit) -> SweepOutcome {
        SweepOutcome {
            iterations: self.iterations,
            exit,
        }
    }
}

/// Run phase 2 against `scroller`.
///
/// `capture` harvests the currently mounted messages and returns how many
/// have been kept so far.
pub fn sweep<P, F>(
    page: &mut P,
    scroller: NodeId,
    options: &Options,
    stop: &StopHandle,
    progress: &mut ProgressReporter<'_>,
    mut capture: F,
) -> SweepOutcome
where
    P: HostPage + ?Sized,
    F: FnMut(&P) -> usize,
{
    scroll_to_top(page, scroller);
    page.wait(options.sweep_scroll_settle());
    let count = capture(page);

    let start = current_metrics(page, scroller);
    let mut tracker = SweepTracker::new(options, count, start.scroll_top);
    let mut scrolled = 0.0;
    progress.emit(Phase::Extracting, format!("Captured {count} messages"), 50.0, Some(count));

    if options.max_sweep_iterations == 0 {
        return tracker.outcome(SweepExit::IterationCap);
    }

    loop {
        if stop.is_stopped() {
            info!("sweep cancelled");
            return tracker.outcome(SweepExit::Cancelled);
        }

        let before = current_metrics(page, scroller).scroll_top;
        let step = options.sweep_step(page.viewport_height());
        absorb(page.scroll_by(scroller, step), "scroll_by");
        page.wait(options.sweep_scroll_settle());
        absorb(page.simulate_user_scroll(scroller), "simulate_user_scroll");
        page.wait(options.sweep_event_settle());
        let count = capture(page);

        let metrics = current_metrics(page, scroller);
        scrolled += (metrics.scroll_top - before).max(0.0);
        progress.emit(
            Phase::Extracting,
            format!("Captured {count} messages"),
            sweep_progress(scrolled, metrics.scroll_height),
            Some(count),
        );

        let exit = tracker.observe(count, metrics.scroll_top);
        debug!(
            iteration = tracker.iterations(),
            count,
            top = metrics.scroll_top,
            height = metrics.scroll_height,
            stagnant = tracker.stagnant(),
            "sweep iteration"
        );

        let viewport = visible_height(page, &metrics);
        let exit = if metrics.is_at_bottom(viewport, options.bottom_tolerance_px) {
            Some(finish_at_bottom(page, scroller, options, stop, &mut capture))
        } else {
            exit
        };
        if let Some(exit) = exit {
            let outcome = tracker.outcome(exit);
            info!(iterations = outcome.iterations, ?exit, "sweep finished");
            return outcome;
        }
    }
}

/// One more settle-and-capture, then a nudge past the boundary and a final
/// capture.
fn finish_at_bottom<P, F>(page: &mut P, scroller: NodeId, options: &Options, stop: &StopHandle, capture: &mut F) -> SweepExit
where
    P: HostPage + ?Sized,
    F: FnMut(&P) -> usize,
{
    if stop.is_stopped() {
        return SweepExit::Cancelled;
    }
    page.wait(options.sweep_scroll_settle());
    capture(page);

    if stop.is_stopped() {
        return SweepExit::Cancelled;
    }
    absorb(page.scroll_by(scroller, options.boundary_nudge_px), "scroll_by");
    absorb(page.simulate_user_scroll(scroller), "simulate_user_scroll");
    page.wait(options.sweep_event_settle());
    let count = capture(page);
    debug!(count, "bottom boundary re-checked");
    SweepExit::Bottom
}
