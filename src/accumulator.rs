//! Message accumulator and finalization.
//!
//! Collects messages keyed by fingerprint during a capture, then produces
//! the final ordered list.

use std::collections::HashSet;

use tracing::debug;

use crate::hasher::content_key;
use crate::result::CapturedMessage;

/// Fingerprint-keyed message store, insertion order preserved.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    seen: HashSet<String>,
    messages: Vec<CapturedMessage>,
}

impl MessageAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a message with this fingerprint has been kept.
    #[must_use]
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Keep `message` if its fingerprint is new and its content is not blank.
    ///
    /// The message's `order` is set to its capture sequence. Blank messages
    /// do not mark their fingerprint as seen, so a row that renders before
    /// its text arrives can still be captured later.
    pub fn insert(&mut self, mut message: CapturedMessage) -> bool {
        if message.content.trim().is_empty() || self.seen.contains(&message.id) {
            return false;
        }
        message.order = self.messages.len();
        self.seen.insert(message.id.clone());
        self.messages.push(message);
        true
    }

    /// Messages kept so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// No messages kept yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sort by capture order, fold duplicate content, drop blanks, renumber
    /// from zero and strip debug payloads.
    #[must_use]
    pub fn finalize(self) -> Vec<CapturedMessage> {
        let captured = self.messages.len();
        let mut messages = self.messages;
        messages.sort_by_key(|m| m.order);

        let mut content_seen = HashSet::new();
        let mut out: Vec<CapturedMessage> = messages
            .into_iter()
            .filter(|m| !m.content.trim().is_empty())
            .filter(|m| content_seen.insert(content_key(&m.content)))
            .collect();

        for (order, message) in out.iter_mut().enumerate() {
            message.order = order;
            message.debug = None;
        }

        debug!(captured, kept = out.len(), "messages finalized");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MessageDebug, Role};

    fn msg(id: &str, content: &str) -> CapturedMessage {
        CapturedMessage {
            id: id.to_string(),
            role: Role::User,
            content: content.to_string(),
            timestamp: None,
            code_blocks: vec![],
            artifacts: vec![],
            order: 99,
            debug: Some(MessageDebug {
                tag: "div".to_string(),
                class_snippet: String::new(),
                fingerprint_source: "id",
            }),
        }
    }

    #[test]
    fn test_insert_only_unseen() {
        let mut acc = MessageAccumulator::new();
        assert!(acc.insert(msg("id:a", "one")));
        assert!(!acc.insert(msg("id:a", "changed")));
        assert!(acc.insert(msg("id:b", "two")));

        assert_eq!(acc.len(), 2);
        assert!(acc.contains("id:a"));
    }

    #[test]
    fn test_blank_message_not_marked_seen() {
        let mut acc = MessageAccumulator::new();
        assert!(!acc.insert(msg("id:a", "  \n ")));
        assert!(!acc.contains("id:a"));
        assert!(acc.is_empty());

        assert!(acc.insert(msg("id:a", "arrived")));
    }

    #[test]
    fn test_finalize_dedups_content_and_renumbers() {
        let mut acc = MessageAccumulator::new();
        acc.insert(msg("id:a", "hello"));
        acc.insert(msg("id:b", "world"));
        acc.insert(msg("id:c", "hello "));
        acc.insert(msg("id:d", "again"));

        let out = acc.finalize();
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        let orders: Vec<usize> = out.iter().map(|m| m.order).collect();

        assert_eq!(ids, vec!["id:a", "id:b", "id:d"]);
        assert_eq!(orders, vec![0, 1, 2]);
        assert!(out.iter().all(|m| m.debug.is_none()));
    }
}
