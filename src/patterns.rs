//! Compiled regex patterns and role vocabulary.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Any whitespace run, for text flattening and normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

// =============================================================================
// Code Detection Patterns
// =============================================================================

/// `language-rust` / `lang-py` class tokens (highlight.js, Prism, markdown renderers).
pub static LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([A-Za-z0-9_+#.-]+)").expect("LANGUAGE_CLASS regex")
});

// =============================================================================
// Timestamp Patterns
// =============================================================================

/// Unix epoch in seconds (10 digits) or milliseconds (13 digits).
pub static EPOCH_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}(?:\d{3})?$").expect("EPOCH_TIMESTAMP regex"));

// =============================================================================
// Snapshot Charset Patterns
// =============================================================================

/// `<meta charset="...">` or `<meta http-equiv=... content="...; charset=...">`.
pub static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>/]+)"#).expect("META_CHARSET regex")
});

// =============================================================================
// Role Vocabulary
// =============================================================================

/// Tokens marking a user turn in attribute values and class names.
pub const USER_TOKENS: &[&str] = &["user", "human"];

/// Tokens marking an assistant turn in attribute values and class names.
pub const ASSISTANT_TOKENS: &[&str] = &["assistant", "ai", "bot", "chatbot"];

/// Additional label texts that identify the user ("You said:").
pub const USER_LABELS: &[&str] = &["you", "me"];

/// Words that identify a load-more control by text or aria-label.
pub const LOAD_MORE_VOCABULARY: &[&str] = &[
    "load more",
    "load earlier",
    "show more",
    "view more",
    "see more",
    "older messages",
    "previous messages",
    "load previous",
];

/// Split an identifier-ish string into lowercase word tokens.
///
/// Separators (`-`, `_`, spaces, punctuation) and camelCase humps both
/// start a new token: `"chat-userMessage"` → `["chat", "user", "message"]`.
#[must_use]
pub fn word_tokens(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Check whether any token of `s` is in `vocabulary`.
#[must_use]
pub fn has_token(s: &str, vocabulary: &[&str]) -> bool {
    word_tokens(s).iter().any(|t| vocabulary.contains(&t.as_str()))
}
