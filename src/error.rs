//! Error types for chat-capture.
//!
//! Only [`Error::ContainerNotFound`] can come out of a capture run. Host-page
//! faults are reported as [`HostError`] and absorbed by the step that hit them.

use dom_query::NodeId;

/// Error type for capture and configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No chat container matched the profile override or any generic pattern.
    #[error("No chat container found (profile: {profile})")]
    ContainerNotFound {
        /// Identifier of the profile that was in effect.
        profile: String,
    },

    /// A platform profile document could not be parsed.
    #[error("Invalid platform profile: {0}")]
    Profile(#[source] serde_json::Error),

    /// An options document could not be parsed.
    #[error("Invalid capture options: {0}")]
    Options(#[source] serde_json::Error),

    /// Reading a snapshot or configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A fault raised by a host page while performing one step.
///
/// These never abort a capture: the caller logs them and moves on to the
/// next mechanism or strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The page does not support this operation (e.g. smooth scrolling).
    #[error("operation not supported by host page: {0}")]
    Unsupported(&'static str),

    /// The node is no longer mounted in the live tree.
    #[error("node {0:?} is detached")]
    Detached(NodeId),

    /// The page rejected an interaction.
    #[error("interaction failed: {0}")]
    Interaction(String),
}
