//! Capture sessions.
//!
//! A [`CaptureSession`] owns everything one capture needs: options, the
//! cancellation flag and (while running) the accumulator. Sessions share
//! nothing, so several can run one after another or side by side on
//! different pages.
//!
//! # Example
//!
//! ```rust
//! use chat_capture::host::SnapshotPage;
//! use chat_capture::{CaptureSession, Options, PlatformProfile, ProgressEvent, Role};
//!
//! let mut page = SnapshotPage::new(
//!     r#"<main>
//!          <div data-message-id="1" data-message-author-role="user">Hello</div>
//!          <div data-message-id="2" data-message-author-role="assistant">Hi! How can I help?</div>
//!        </main>"#,
//! );
//!
//! let mut phases = Vec::new();
//! let report = CaptureSession::new(Options::default()).run(
//!     &mut page,
//!     &PlatformProfile::generic(),
//!     &mut |e: &ProgressEvent| phases.push(e.phase),
//! )?;
//!
//! assert_eq!(report.messages.len(), 2);
//! assert_eq!(report.messages[0].role, Role::User);
//! assert_eq!(report.messages[1].order, 1);
//! # Ok::<(), chat_capture::Error>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::accumulator::MessageAccumulator;
use crate::dom::{self, NodeId};
use crate::error::Result;
use crate::extractor::Extractor;
use crate::hasher::fingerprint_element;
use crate::host::HostPage;
use crate::locator;
use crate::options::Options;
use crate::profile::PlatformProfile;
use crate::progress::{NoProgress, Phase, ProgressReporter, ProgressSink};
use crate::result::{CaptureReport, CapturedMessage, HistoryExit};
use crate::scroll;

/// Cooperative cancellation flag shared with a running session.
///
/// Clones observe the same flag; [`StopHandle::stop`] may be called from any
/// thread, any number of times.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// New, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the session to stop at its next check.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One capture run.
#[derive(Debug)]
pub struct CaptureSession {
    options: Options,
    stop: StopHandle,
}

impl CaptureSession {
    /// Session with the given options.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            stop: StopHandle::new(),
        }
    }

    /// Handle that cancels this session.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Load the full history, sweep the page and return the finalized
    /// messages.
    ///
    /// Fails only when no chat container can be found. A stopped session
    /// returns normally with `cancelled` set and whatever was captured.
    pub fn run<P: HostPage + ?Sized>(
        self,
        page: &mut P,
        profile: &PlatformProfile,
        progress: &mut dyn ProgressSink,
    ) -> Result<CaptureReport> {
        let options = &self.options;
        let mut reporter = ProgressReporter::new(progress);
        reporter.emit(Phase::Initializing, "Locating chat container", 0.0, None);

        let mut container = locator::find_container(page.document(), profile)?;
        let scroller = locator::find_scrollable_element(page, container);
        info!(profile = profile.label(), "capture started");

        let history = scroll::load_history(page, scroller, profile, options, &self.stop, &mut reporter);

        let mut accumulator = MessageAccumulator::new();
        let sweep = if history.exit == HistoryExit::Cancelled {
            None
        } else {
            let extractor = Extractor::new(profile, options, page.location());
            Some(scroll::sweep(page, scroller, options, &self.stop, &mut reporter, |page| {
                capture_visible(page, &mut container, profile, options, &extractor, &mut accumulator)
            }))
        };

        let cancelled = self.stop.is_stopped();
        reporter.emit(
            Phase::Finalizing,
            "Ordering and deduplicating messages",
            96.0,
            Some(accumulator.len()),
        );
        let messages = accumulator.finalize();
        reporter.emit(
            Phase::Complete,
            format!("Captured {} messages", messages.len()),
            100.0,
            Some(messages.len()),
        );
        info!(count = messages.len(), cancelled, "capture finished");

        Ok(CaptureReport {
            messages,
            cancelled,
            history,
            sweep,
        })
    }
}

/// Capture with default options and no progress reporting.
pub fn capture<P: HostPage + ?Sized>(page: &mut P, profile: &PlatformProfile) -> Result<Vec<CapturedMessage>> {
    CaptureSession::new(Options::default())
        .run(page, profile, &mut NoProgress)
        .map(|report| report.messages)
}

/// Harvest the currently mounted messages; returns the accumulator size.
fn capture_visible<P: HostPage + ?Sized>(
    page: &P,
    container: &mut NodeId,
    profile: &PlatformProfile,
    options: &Options,
    extractor: &Extractor<'_>,
    accumulator: &mut MessageAccumulator,
) -> usize {
    let doc = page.document();
    if !dom::is_mounted(doc, *container) {
        match locator::find_container(doc, profile) {
            Ok(found) => {
                debug!("chat container remounted, located again");
                *container = found;
            }
            Err(err) => debug!(%err, "chat container missing during capture"),
        }
    }

    for id in locator::find_message_elements(doc, *container, profile) {
        let Some(el) = dom::node(doc, id) else {
            continue;
        };
        let fingerprint = fingerprint_element(&el, options);
        if accumulator.contains(&fingerprint.key) {
            continue;
        }
        let message = extractor.extract(&el, fingerprint, accumulator.len());
        let id = message.id.clone();
        if accumulator.insert(message) {
            trace!(%id, "message captured");
        }
    }
    accumulator.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::host::SnapshotPage;

    #[test]
    fn test_stop_handle_is_shared_and_idempotent() {
        let session = CaptureSession::new(Options::default());
        let handle = session.stop_handle();
        let clone = handle.clone();

        assert!(!handle.is_stopped());
        clone.stop();
        clone.stop();
        assert!(handle.is_stopped());
        assert!(session.stop_handle().is_stopped());
    }

    #[test]
    fn test_stopped_before_run_returns_empty_cancelled_report() {
        let mut page = SnapshotPage::new(r#"<main><article>hello</article></main>"#);
        let session = CaptureSession::new(Options::default());
        session.stop_handle().stop();

        let report = session.run(&mut page, &PlatformProfile::generic(), &mut NoProgress).unwrap();
        assert!(report.cancelled);
        assert!(report.messages.is_empty());
        assert_eq!(report.history.exit, HistoryExit::Cancelled);
        assert!(report.sweep.is_none());
    }

    #[test]
    fn test_snapshot_capture() {
        let mut page = SnapshotPage::new(
            r#"<main>
                 <article class="user-turn">What is 2+2?</article>
                 <article class="bot-turn"><p>It is <b>4</b>.</p></article>
                 <article class="bot-turn"> </article>
               </main>"#,
        );
        let messages = capture(&mut page, &PlatformProfile::generic()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, crate::result::Role::User);
        assert_eq!(messages[1].content, "It is 4.");
        assert_eq!(messages[1].order, 1);
    }

    #[test]
    fn test_missing_container_is_the_only_failure() {
        let mut page = SnapshotPage::new(r#"<div class="landing">Sign in</div>"#);
        let err = capture(&mut page, &PlatformProfile::generic()).unwrap_err();
        assert!(matches!(err, Error::ContainerNotFound { .. }));
    }
}
