//! # chat-capture
//!
//! Scroll-driven transcript capture for chat pages that virtualize their
//! message lists.
//!
//! Virtualized lists only keep rows near the viewport mounted, so reading
//! the page once misses most of a long conversation. This library drives the
//! page instead: it first scrolls to the top until all history has loaded
//! (clicking "load more" controls along the way), then sweeps back down in
//! viewport-sized steps and captures every message that gets mounted,
//! deduplicating rows that are unmounted and remounted.
//!
//! ## Quick Start
//!
//! ```rust
//! use chat_capture::host::SnapshotPage;
//! use chat_capture::{capture, PlatformProfile};
//!
//! let mut page = SnapshotPage::new(
//!     r#"<div role="log">
//!          <div data-message-id="a" data-message-author-role="user">Hi</div>
//!          <div data-message-id="b" data-message-author-role="assistant">Hello!</div>
//!        </div>"#,
//! );
//!
//! let messages = capture(&mut page, &PlatformProfile::generic())?;
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[1].content, "Hello!");
//! # Ok::<(), chat_capture::Error>(())
//! ```
//!
//! ## Pieces
//!
//! - **Host page**: everything the engine needs from a browser goes through
//!   [`host::HostPage`]; [`host::SnapshotPage`] and [`host::SimulatedPage`]
//!   ship with the crate.
//! - **Locator**: container, scroller, message and load-more discovery through
//!   ordered selector fallback chains.
//! - **Scroll controller**: history loading and the capture sweep, each with
//!   explicit exit rules.
//! - **Extractor**: role, cleaned text, code blocks, artifacts, timestamps.
//! - **Accumulator**: fingerprint dedup while capturing, content dedup and
//!   dense ordering at the end.

mod accumulator;
mod error;
mod options;
mod patterns;
mod profile;
mod result;
mod session;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Host-page capability and the bundled page adapters.
pub mod host;

/// Selector fallback chains and generic patterns.
pub mod selector;

/// Visibility and interaction checks.
pub mod probe;

/// Container, scroller, message and load-more discovery.
pub mod locator;

/// Message fingerprints and content keys.
pub mod hasher;

/// Message content extraction.
pub mod extractor;

/// History loading and the capture sweep.
pub mod scroll;

/// Progress events and sinks.
pub mod progress;

// Public API - re-exports
pub use accumulator::MessageAccumulator;
pub use error::{Error, HostError, Result};
pub use options::Options;
pub use profile::PlatformProfile;
pub use progress::{NoProgress, Phase, ProgressEvent, ProgressSink};
pub use result::{
    CaptureReport, CapturedMessage, CodeBlock, HistoryExit, HistoryOutcome, MessageDebug, Role, SweepExit,
    SweepOutcome,
};
pub use session::{capture, CaptureSession, StopHandle};
