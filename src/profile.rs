//! Platform profiles: per-site selector overrides.
//!
//! A profile is supplied by whoever embeds the engine. Every override is
//! optional; a missing one silently falls through to the generic heuristics.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Read-only selector overrides for one target site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProfile {
    /// Stable identifier, e.g. `"claude"`.
    pub id: String,

    /// Human-readable site name.
    pub name: String,

    /// Selector for the chat container.
    pub container: Option<String>,

    /// Selector list for message elements. Comma-separated entries are
    /// tried one at a time.
    pub message: Option<String>,

    /// Selector for the content-bearing part of a message.
    pub content: Option<String>,

    /// Selector for the "load earlier messages" control.
    pub load_more: Option<String>,
}

impl PlatformProfile {
    /// Profile with no overrides; everything goes through generic heuristics.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            id: "generic".to_string(),
            name: "Generic".to_string(),
            ..Self::default()
        }
    }

    /// Parse a profile from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Profile)
    }

    /// Name used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.id.is_empty() {
            "generic"
        } else {
            &self.id
        }
    }
}

/// Split a comma-separated selector list into trimmed, non-empty entries.
///
/// Commas inside brackets or parentheses (`[data-x='a,b']`, `:is(a, b)`)
/// do not split. An unbalanced list splits on every comma instead, so one
/// broken entry cannot swallow the valid ones after it.
#[must_use]
pub fn split_selector_list(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for c in list.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);

    if depth != 0 || quote.is_some() {
        parts = list.split(',').map(str::to_string).collect();
    }

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
