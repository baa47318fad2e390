//! Generic selector patterns
//!
//! Ordered fallback lists used when a platform profile has no override (or
//! its override matches nothing). Order matters: earlier entries are more
//! specific and win.

/// Chat container candidates.
pub const CONTAINER_PATTERNS: &[&str] = &[
    "[role='log']",
    "[data-testid*='conversation']",
    "[class*='conversation-container']",
    "[class*='chat-container']",
    "[class*='messages-container']",
    "[class*='message-list']",
    "[class*='chat-messages']",
    "[class*='conversation']",
    "main [class*='chat']",
    "main",
    "[role='main']",
];

/// Message element candidates.
pub const MESSAGE_PATTERNS: &[&str] = &[
    "[data-message-id]",
    "[data-message-author-role]",
    "[data-testid*='conversation-turn']",
    "[data-testid*='message']",
    "[class*='message-row']",
    "[class*='chat-message']",
    "[class*='message-bubble']",
    "[class*='message']",
    "[role='article']",
    "article",
];

/// Content-bearing parts of a message element.
pub const CONTENT_PATTERNS: &[&str] = &[
    "[data-message-content]",
    "[class*='message-content']",
    "[class*='markdown']",
    "[class*='prose']",
    "[class*='message-text']",
    "[class*='message-body']",
    "[class*='content']",
];

/// Load-more controls recognised by structure.
pub const LOAD_MORE_PATTERNS: &[&str] = &[
    "[data-testid*='load-more']",
    "[data-testid*='load-earlier']",
    "[class*='load-more']",
    "[class*='loadMore']",
    "[class*='load-earlier']",
    "[class*='load-previous']",
    "[class*='show-more']",
];

/// Elements scanned by text and aria-label for the load-more vocabulary.
pub const CLICKABLE_PATTERN: &str = "button, a, [role='button'], [class*='load'], [class*='more']";

/// Time-bearing elements, most machine-readable first.
pub const TIMESTAMP_PATTERNS: &[&str] = &[
    "time[datetime]",
    "[data-timestamp]",
    "[data-time]",
    "time",
    "[class*='timestamp']",
    "[class*='message-time']",
];

/// Attributes holding a machine-readable time, preferred over element text.
pub const TIMESTAMP_ATTRS: &[&str] = &["datetime", "data-timestamp", "data-time", "title"];

/// Page-supplied stable message identifiers.
pub const STABLE_ID_ATTRS: &[&str] = &["data-message-id", "data-msg-id", "data-item-id", "data-id"];

/// Attributes whose values may name the author role.
pub const ROLE_ATTRS: &[&str] = &[
    "data-message-author-role",
    "data-author-role",
    "data-role",
    "data-author",
    "data-sender",
    "data-testid",
    "role",
];

/// Avatar-like elements nested in a message.
pub const AVATAR_PATTERN: &str = "[class*='avatar'], [data-testid*='avatar'], img[alt]";

/// Sub-elements labelling the author.
pub const AUTHOR_LABEL_PATTERN: &str =
    "[class*='author'], [class*='sender'], [class*='role'], [data-testid*='author']";

/// Elements never part of message text.
pub const HIDDEN_PATTERN: &str = "[hidden], [aria-hidden='true'], [style*='display: none'], \
    [style*='display:none'], script, style, template, noscript";

/// Interface chrome inside messages (action bars, menus, copy buttons).
pub const CHROME_PATTERN: &str = "nav, aside, button, [role='navigation'], [role='button'], \
    [role='toolbar'], [role='menu'], [class*='sidebar'], [class*='toolbar']";

/// Markup that marks real content; chrome containing it is kept.
pub const CONTENT_MARKUP_PATTERN: &str = "p, pre, code, ul, ol, table, blockquote, \
    [class*='content'], [class*='message'], [class*='markdown']";

/// Code-bearing elements.
pub const CODE_PATTERN: &str = "pre, [class*='code-block']";

/// Artifact-referencing elements.
pub const ARTIFACT_PATTERN: &str = "[data-artifact-id], [data-artifact], \
    a[href*='/artifacts/'], a[href*='artifact']";
