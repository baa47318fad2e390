//! Phase 1: load the full history.
//!
//! Virtualized lists drop older rows as the user scrolls forward, so the
//! whole scrollback has to be loaded before the sweep starts. Each iteration
//! clicks a load-more control if one is visible, forces the scroller to the
//! top, waits, pokes the page with synthetic scroll input, and compares
//! height and position with the previous iteration.
//!
//! Exit rules, checked after every iteration:
//!
//! - stable for `settled_exit_threshold` iterations: [`HistoryExit::Settled`]
//! - stable for `quick_exit_threshold` iterations with no load-more control
//!   left: [`HistoryExit::SettledNoLoadMore`]
//! - `max_history_iterations` reached: [`HistoryExit::IterationCap`]
//!
//! An iteration is stable when the height did not change, the position is
//! at the top (within `top_tolerance_px`) and nothing was clicked.

use tracing::{debug, info};

use super::{absorb, current_metrics, scroll_to_top};
use crate::dom::NodeId;
use crate::host::{HostPage, ScrollMetrics};
use crate::locator::find_load_more;
use crate::options::Options;
use crate::profile::PlatformProfile;
use crate::progress::{history_progress, Phase, ProgressReporter};
use crate::result::{HistoryExit, HistoryOutcome};
use crate::session::StopHandle;

/// Termination state of phase 1, independent of any page.
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    settled_threshold: u32,
    quick_threshold: u32,
    top_tolerance: f64,
    max_iterations: u32,
    prev_height: f64,
    stable: u32,
    iterations: u32,
    clicks: u32,
}

impl HistoryTracker {
    /// Tracker starting from the height observed before the first iteration.
    #[must_use]
    pub fn new(options: &Options, initial_height: f64) -> Self {
        Self {
            settled_threshold: options.settled_exit_threshold,
            quick_threshold: options.quick_exit_threshold,
            top_tolerance: options.top_tolerance_px,
            max_iterations: options.max_history_iterations,
            prev_height: initial_height,
            stable: 0,
            iterations: 0,
            clicks: 0,
        }
    }

    /// Record one iteration; `Some` when the phase should end.
    pub fn observe(&mut self, metrics: ScrollMetrics, clicked: bool, load_more_visible: bool) -> Option<HistoryExit> {
        self.iterations += 1;
        if clicked {
            self.clicks += 1;
        }

        let unchanged = metrics.scroll_height == self.prev_height;
        if unchanged && metrics.is_near_top(self.top_tolerance) && !clicked {
            self.stable += 1;
        } else {
            self.stable = 0;
        }
        self.prev_height = metrics.scroll_height;

        if self.stable >= self.settled_threshold {
            Some(HistoryExit::Settled)
        } else if self.stable >= self.quick_threshold && !load_more_visible {
            Some(HistoryExit::SettledNoLoadMore)
        } else if self.iterations >= self.max_iterations {
            Some(HistoryExit::IterationCap)
        } else {
            None
        }
    }

    /// Consecutive stable iterations.
    #[must_use]
    pub fn stable(&self) -> u32 {
        self.stable
    }

    /// Iterations observed.
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Phase statistics with the given exit reason.
    #[must_use]
    pub fn outcome(&self, exit: HistoryExit) -> HistoryOutcome {
        HistoryOutcome {
            iterations: self.iterations,
            clicks: self.clicks,
            exit,
        }
    }
}

/// Run phase 1 against `scroller`.
pub fn load_history<P: HostPage + ?Sized>(
    page: &mut P,
    scroller: NodeId,
    profile: &PlatformProfile,
    options: &Options,
    stop: &StopHandle,
    progress: &mut ProgressReporter<'_>,
) -> HistoryOutcome {
    let mut tracker = HistoryTracker::new(options, current_metrics(page, scroller).scroll_height);
    progress.emit(Phase::Scrolling, "Loading conversation history", history_progress(0, options.max_history_iterations), None);

    if options.max_history_iterations == 0 {
        return tracker.outcome(HistoryExit::IterationCap);
    }

    loop {
        if stop.is_stopped() {
            info!(iterations = tracker.iterations(), "history loading cancelled");
            return tracker.outcome(HistoryExit::Cancelled);
        }

        let clicked = find_load_more(page, profile).is_some_and(|button| absorb(page.click(button), "click"));
        scroll_to_top(page, scroller);
        page.wait(options.history_settle(clicked));
        absorb(page.simulate_user_scroll(scroller), "simulate_user_scroll");

        let metrics = current_metrics(page, scroller);
        let load_more_visible = find_load_more(page, profile).is_some();
        let exit = tracker.observe(metrics, clicked, load_more_visible);

        debug!(
            iteration = tracker.iterations(),
            clicked,
            stable = tracker.stable(),
            height = metrics.scroll_height,
            top = metrics.scroll_top,
            load_more_visible,
            "history iteration"
        );

        let iteration = tracker.iterations();
        if options.history_progress_every > 0 && iteration % options.history_progress_every == 0 {
            progress.emit(
                Phase::Scrolling,
                format!("Loading conversation history (iteration {iteration})"),
                history_progress(iteration, options.max_history_iterations),
                None,
            );
        }

        if let Some(exit) = exit {
            let outcome = tracker.outcome(exit);
            info!(iterations = outcome.iterations, clicks = outcome.clicks, ?exit, "history loading finished");
            return outcome;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(top: f64, height: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: top,
            scroll_height: height,
            client_height: 600.0,
        }
    }

    #[test]
    fn test_quick_exit_without_load_more() {
        let mut t = HistoryTracker::new(&Options::default(), 4000.0);
        assert_eq!(t.observe(at(0.0, 4000.0), false, false), None);
        assert_eq!(t.observe(at(0.0, 4000.0), false, false), None);
        assert_eq!(t.observe(at(0.0, 4000.0), false, false), Some(HistoryExit::SettledNoLoadMore));
        assert_eq!(t.iterations(), 3);
    }

    #[test]
    fn test_visible_load_more_needs_full_threshold() {
        let mut t = HistoryTracker::new(&Options::default(), 1000.0);
        for _ in 0..4 {
            assert_eq!(t.observe(at(3.0, 1000.0), false, true), None);
        }
        assert_eq!(t.observe(at(3.0, 1000.0), false, true), Some(HistoryExit::Settled));
    }

    #[test]
    fn test_click_height_change_or_position_resets() {
        let mut t = HistoryTracker::new(&Options::default(), 1000.0);
        t.observe(at(0.0, 1000.0), false, true);
        t.observe(at(0.0, 1000.0), false, true);
        assert_eq!(t.stable(), 2);

        t.observe(at(0.0, 1000.0), true, true);
        assert_eq!(t.stable(), 0);
        t.observe(at(0.0, 1000.0), false, true);
        assert_eq!(t.stable(), 1);
        t.observe(at(0.0, 1500.0), false, true);
        assert_eq!(t.stable(), 0);
        t.observe(at(6.0, 1500.0), false, true);
        assert_eq!(t.stable(), 0);

        let outcome = t.outcome(HistoryExit::Cancelled);
        assert_eq!(outcome.clicks, 1);
        assert_eq!(outcome.iterations, 6);
    }

    #[test]
    fn test_iteration_cap_with_growing_height() {
        let options = Options {
            max_history_iterations: 10,
            ..Options::default()
        };
        let mut t = HistoryTracker::new(&options, 0.0);
        let mut exit = None;
        for i in 1..=10 {
            exit = t.observe(at(0.0, f64::from(i) * 100.0), false, false);
            if exit.is_some() {
                break;
            }
        }
        assert_eq!(exit, Some(HistoryExit::IterationCap));
        assert_eq!(t.iterations(), 10);
    }
}
