//! Result types for capture output.
//!
//! This module defines the structured messages produced by a capture run and
//! the report that wraps them.

use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the chat.
    User,
    /// The model or bot answering.
    Assistant,
}

impl Role {
    /// Lowercase name as used in markup and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A code block found inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Identifier unique within the capture (`<message id>-code-<n>`).
    pub id: String,

    /// Best-effort language tag, empty when unknown.
    pub language: String,

    /// Raw code text.
    pub content: String,
}

/// How a message was located and fingerprinted.
///
/// Only attached when [`Options::include_debug`](crate::Options::include_debug)
/// is set, and always stripped before messages are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDebug {
    /// Tag name of the message element.
    pub tag: String,

    /// Leading part of the element's class attribute.
    pub class_snippet: String,

    /// `"id"` for page-supplied identifiers, `"content"` for content hashes.
    pub fingerprint_source: &'static str,
}

/// One captured chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMessage {
    /// Message identifier; equal to the fingerprint it was captured under.
    pub id: String,

    /// Who wrote the message.
    pub role: Role,

    /// Cleaned text, with code kept as fenced blocks.
    pub content: String,

    /// Timestamp as found on the page (RFC 3339 when machine-readable).
    pub timestamp: Option<String>,

    /// Code blocks in document order.
    pub code_blocks: Vec<CodeBlock>,

    /// Artifact references in document order.
    pub artifacts: Vec<String>,

    /// Capture sequence; dense `0..N` after finalization.
    pub order: usize,

    /// Debug-only payload; never serialized.
    #[serde(skip)]
    pub debug: Option<MessageDebug>,
}

/// Why the history-loading phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryExit {
    /// Stable for the full threshold with a load-more control still visible.
    Settled,
    /// Stable for the quick threshold and no load-more control left.
    SettledNoLoadMore,
    /// The iteration cap was reached.
    IterationCap,
    /// The session was stopped.
    Cancelled,
}

/// Why the sweep phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepExit {
    /// The end of content was reached and the boundary re-checked.
    Bottom,
    /// No new messages and no forward progress for the stagnation limit.
    Stalled,
    /// The iteration cap was reached.
    IterationCap,
    /// The session was stopped.
    Cancelled,
}

/// Statistics of the history-loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryOutcome {
    /// Iterations run.
    pub iterations: u32,
    /// Successful load-more clicks.
    pub clicks: u32,
    /// Exit reason.
    pub exit: HistoryExit,
}

/// Statistics of the sweep phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    /// Forward-scroll iterations run.
    pub iterations: u32,
    /// Exit reason.
    pub exit: SweepExit,
}

/// Everything a capture run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    /// Finalized messages: sorted, deduplicated, renumbered.
    pub messages: Vec<CapturedMessage>,

    /// The run was stopped before completing; `messages` holds what had
    /// been captured up to that point.
    pub cancelled: bool,

    /// Phase 1 statistics.
    pub history: HistoryOutcome,

    /// Phase 2 statistics; `None` when the run was stopped during phase 1.
    pub sweep: Option<SweepOutcome>,
}
