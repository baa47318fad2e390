//! Configuration options for a capture run.
//!
//! The `Options` struct carries every timing constant and threshold used by
//! the two scroll phases and the hasher. Defaults are tuned for real chat
//! pages; tests and benches shrink nothing, they use a virtual clock instead.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Configuration options for a capture run.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings, or [`Options::from_json`] to override a subset.
///
/// # Example
///
/// ```rust
/// use chat_capture::Options;
///
/// let options = Options {
///     max_history_iterations: 50,
///     include_debug: true,
///     ..Options::default()
/// };
/// assert_eq!(options.click_settle_ms, 1200);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    // === Phase 1: drive to top ===
    /// Hard cap on history-loading iterations.
    ///
    /// Default: `300`
    pub max_history_iterations: u32,

    /// Wait after an iteration that clicked a load-more control (ms).
    ///
    /// Default: `1200`
    pub click_settle_ms: u64,

    /// Wait after an iteration without a click (ms).
    ///
    /// Default: `400`
    pub idle_settle_ms: u64,

    /// Stable iterations needed to stop while a load-more control is visible.
    ///
    /// Default: `5`
    pub settled_exit_threshold: u32,

    /// Stable iterations needed to stop when no load-more control is visible.
    ///
    /// Default: `3`
    pub quick_exit_threshold: u32,

    /// A scroll position at or below this many pixels counts as "at top".
    ///
    /// Default: `5.0`
    pub top_tolerance_px: f64,

    /// Emit a progress event every N history iterations.
    ///
    /// Default: `10`
    pub history_progress_every: u32,

    // === Phase 2: sweep and capture ===
    /// Minimum forward scroll step (px).
    ///
    /// Default: `200.0`
    pub sweep_min_step_px: f64,

    /// Forward scroll step as a fraction of the viewport height.
    ///
    /// Default: `0.6`
    pub sweep_step_ratio: f64,

    /// Wait after each forward scroll (ms).
    ///
    /// Default: `250`
    pub sweep_scroll_settle_ms: u64,

    /// Wait after synthetic scroll events, before capturing (ms).
    ///
    /// Default: `100`
    pub sweep_event_settle_ms: u64,

    /// Distance from the end of content that counts as "at bottom" (px).
    ///
    /// Default: `20.0`
    pub bottom_tolerance_px: f64,

    /// Extra forward nudge after reaching bottom (px).
    ///
    /// Default: `100.0`
    pub boundary_nudge_px: f64,

    /// Iterations without new messages before a stuck sweep gives up.
    ///
    /// Default: `8`
    pub stagnant_sweep_limit: u32,

    /// Hard cap on sweep iterations.
    ///
    /// Default: `2000`
    pub max_sweep_iterations: u32,

    // === Fingerprinting ===
    /// Leading characters of normalized text fed to the content hash.
    ///
    /// Default: `300`
    pub fingerprint_text_chars: usize,

    /// Leading characters of the class attribute fed to the content hash.
    ///
    /// Default: `50`
    pub fingerprint_class_chars: usize,

    /// Attach a [`MessageDebug`](crate::MessageDebug) to each message while capturing.
    ///
    /// The payload is always stripped during finalization.
    ///
    /// Default: `false`
    pub include_debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_history_iterations: 300,
            click_settle_ms: 1200,
            idle_settle_ms: 400,
            settled_exit_threshold: 5,
            quick_exit_threshold: 3,
            top_tolerance_px: 5.0,
            history_progress_every: 10,
            sweep_min_step_px: 200.0,
            sweep_step_ratio: 0.6,
            sweep_scroll_settle_ms: 250,
            sweep_event_settle_ms: 100,
            bottom_tolerance_px: 20.0,
            boundary_nudge_px: 100.0,
            stagnant_sweep_limit: 8,
            max_sweep_iterations: 2000,
            fingerprint_text_chars: 300,
            fingerprint_class_chars: 50,
            include_debug: false,
        }
    }
}

impl Options {
    /// Parse options from a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Options)
    }

    /// Settle time for one history iteration.
    #[must_use]
    pub fn history_settle(&self, clicked: bool) -> Duration {
        Duration::from_millis(if clicked {
            self.click_settle_ms
        } else {
            self.idle_settle_ms
        })
    }

    /// Wait after a sweep scroll step.
    #[must_use]
    pub fn sweep_scroll_settle(&self) -> Duration {
        Duration::from_millis(self.sweep_scroll_settle_ms)
    }

    /// Wait after synthetic scroll input during the sweep.
    #[must_use]
    pub fn sweep_event_settle(&self) -> Duration {
        Duration::from_millis(self.sweep_event_settle_ms)
    }

    /// Forward step for one sweep iteration given the viewport height.
    #[must_use]
    pub fn sweep_step(&self, viewport_height: f64) -> f64 {
        self.sweep_min_step_px
            .max(viewport_height * self.sweep_step_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let o = Options::default();
        assert_eq!(o.max_history_iterations, 300);
        assert_eq!(o.settled_exit_threshold, 5);
        assert_eq!(o.quick_exit_threshold, 3);
        assert_eq!(o.stagnant_sweep_limit, 8);
        assert_eq!(o.fingerprint_text_chars, 300);
        assert!(!o.include_debug);
    }

    #[test]
    fn test_history_settle() {
        let o = Options::default();
        assert_eq!(o.history_settle(true), Duration::from_millis(1200));
        assert_eq!(o.history_settle(false), Duration::from_millis(400));
    }

    #[test]
    fn test_sweep_step_has_floor() {
        let o = Options::default();
        assert_eq!(o.sweep_step(1000.0), 600.0);
        assert_eq!(o.sweep_step(100.0), 200.0);
    }

    #[test]
    fn test_from_json_overrides_subset() {
        let o = Options::from_json(r#"{"idle_settle_ms": 50, "include_debug": true}"#).unwrap();
        assert_eq!(o.idle_settle_ms, 50);
        assert!(o.include_debug);
        assert_eq!(o.click_settle_ms, 1200);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = Options::from_json(r#"{"idle_settle": 50}"#).unwrap_err();
        assert!(matches!(err, Error::Options(_)));
    }
}
