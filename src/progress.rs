//! Progress reporting.
//!
//! Phase 1 covers the first half of the 0-100 range, the sweep the second.
//! [`ProgressReporter`] clamps every value so consumers only ever see
//! non-decreasing progress.

use serde::Serialize;

/// Capture phase named in progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Locating the chat surface.
    Initializing,
    /// Loading history (phase 1).
    Scrolling,
    /// Sweeping and capturing (phase 2).
    Extracting,
    /// Deduplicating and ordering.
    Finalizing,
    /// Done.
    Complete,
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// Current phase.
    pub phase: Phase,
    /// Human-readable status line.
    pub message: String,
    /// Overall progress, 0 to 100.
    pub progress: f64,
    /// Messages captured so far, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Receiver of progress events.
pub trait ProgressSink {
    /// Handle one event.
    fn report(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Forwards events to a sink with monotonic, clamped progress.
pub struct ProgressReporter<'a> {
    sink: &'a mut dyn ProgressSink,
    last: f64,
}

impl<'a> ProgressReporter<'a> {
    /// Wrap a sink.
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink, last: 0.0 }
    }

    /// Emit an event; `progress` is clamped to `[last, 100]`.
    pub fn emit(&mut self, phase: Phase, message: impl Into<String>, progress: f64, count: Option<usize>) {
        let progress = if progress.is_nan() { self.last } else { progress.clamp(self.last, 100.0) };
        self.last = progress;
        self.sink.report(&ProgressEvent {
            phase,
            message: message.into(),
            progress,
            count,
        });
    }
}

/// Phase 2 progress: `50 + min(45, scrolled / scroll_height * 45)`.
#[must_use]
pub fn sweep_progress(scrolled: f64, scroll_height: f64) -> f64 {
    if scroll_height <= 0.0 {
        return 50.0;
    }
    50.0 + (scrolled / scroll_height * 45.0).clamp(0.0, 45.0)
}

/// Phase 1 progress, creeping toward (never reaching) 50.
#[must_use]
pub fn history_progress(iteration: u32, max_iterations: u32) -> f64 {
    if max_iterations == 0 {
        return 5.0;
    }
    5.0 + 45.0 * f64::from(iteration.min(max_iterations)) / f64::from(max_iterations + 1)
}
