//! Author role detection.
//!
//! Signals are checked strongest first: role-bearing attributes, class
//! names, labelled descendants, avatar elements, then author labels. Chat UIs show two roles and
//! unlabeled turns are far more often the assistant's, so that is the
//! fallback.

use tracing::trace;

use crate::dom::{self, Selection};
use crate::patterns::{has_token, word_tokens, ASSISTANT_TOKENS, USER_LABELS, USER_TOKENS};
use crate::result::Role;
use crate::selector::generic::{AUTHOR_LABEL_PATTERN, AVATAR_PATTERN, ROLE_ATTRS};
use crate::selector::try_query;

/// Author labels longer than this are message text, not labels.
const MAX_LABEL_CHARS: usize = 40;

/// Avatar attributes that may name the author.
const AVATAR_ATTRS: &[&str] = &["class", "alt", "data-testid", "aria-label", "title"];

/// Role named by a token string, user first.
#[must_use]
pub fn role_from_tokens(s: &str) -> Option<Role> {
    if has_token(s, USER_TOKENS) {
        Some(Role::User)
    } else if has_token(s, ASSISTANT_TOKENS) {
        Some(Role::Assistant)
    } else {
        None
    }
}

/// Detect who wrote a message element.
#[must_use]
pub fn detect_role(sel: &Selection) -> Role {
    if let Some(role) = from_own_attributes(sel) {
        trace!(?role, "role from attributes");
        return role;
    }
    if let Some(role) = role_from_tokens(&dom::class_name(sel)) {
        trace!(?role, "role from class names");
        return role;
    }
    if let Some(role) = from_nested_attributes(sel) {
        trace!(?role, "role from nested attributes");
        return role;
    }
    if let Some(role) = from_avatars(sel) {
        trace!(?role, "role from avatar");
        return role;
    }
    if let Some(role) = from_author_label(sel) {
        trace!(?role, "role from author label");
        return role;
    }
    Role::Assistant
}

fn from_own_attributes(sel: &Selection) -> Option<Role> {
    ROLE_ATTRS
        .iter()
        .filter_map(|name| dom::attr(sel, name))
        .find_map(|v| role_from_tokens(&v))
}

/// Role attributes of the first labelled descendant.
fn from_nested_attributes(sel: &Selection) -> Option<Role> {
    ROLE_ATTRS.iter().find_map(|name| {
        let nested = sel.select(&format!("[{name}]"));
        nested
            .nodes()
            .iter()
            .filter_map(|n| dom::attr(&Selection::from(*n), name))
            .find_map(|v| role_from_tokens(&v))
    })
}

fn from_avatars(sel: &Selection) -> Option<Role> {
    let avatars = try_query(sel, AVATAR_PATTERN)?;
    avatars.nodes().iter().find_map(|n| {
        let avatar = Selection::from(*n);
        AVATAR_ATTRS
            .iter()
            .filter_map(|name| dom::attr(&avatar, name))
            .find_map(|v| role_from_tokens(&v))
    })
}

fn from_author_label(sel: &Selection) -> Option<Role> {
    let labels = try_query(sel, AUTHOR_LABEL_PATTERN)?;
    labels.nodes().iter().find_map(|n| {
        let text = Selection::from(*n).text();
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_LABEL_CHARS {
            return None;
        }
        let tokens = word_tokens(text);
        if tokens.iter().any(|t| USER_LABELS.contains(&t.as_str())) {
            return Some(Role::User);
        }
        role_from_tokens(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(html: &str) -> Role {
        let doc = dom::parse(html);
        detect_role(&doc.select("#m"))
    }

    #[test]
    fn test_role_from_own_and_nested_attributes() {
        assert_eq!(role(r#"<div id="m" data-message-author-role="user">x</div>"#), Role::User);
        assert_eq!(role(r#"<div id="m" data-role="assistant">x</div>"#), Role::Assistant);
        assert_eq!(
            role(r#"<div id="m" data-testid="turn-3"><div data-author="human">x</div></div>"#),
            Role::User
        );
    }

    #[test]
    fn test_role_from_class_tokens() {
        assert_eq!(role(r#"<div id="m" class="msg userMessage">x</div>"#), Role::User);
        assert_eq!(role(r#"<div id="m" class="msg bot-reply">x</div>"#), Role::Assistant);
        // "main" and "detail" contain "ai" but are not tokens.
        assert_eq!(role(r#"<div id="m" class="main detail"><span class="author">You</span>x</div>"#), Role::User);
    }

    #[test]
    fn test_own_class_beats_nested_attributes() {
        assert_eq!(
            role(r#"<div id="m" class="turn user-turn"><div data-author="assistant">quoted reply</div></div>"#),
            Role::User
        );
        assert_eq!(
            role(r#"<div id="m" class="turn"><div data-author="human">x</div></div>"#),
            Role::User
        );
    }

    #[test]
    fn test_role_from_avatar() {
        assert_eq!(
            role(r#"<div id="m"><img alt="User avatar" src="a.png"><p>x</p></div>"#),
            Role::User
        );
        assert_eq!(
            role(r#"<div id="m"><span class="avatar assistant-avatar"></span><p>x</p></div>"#),
            Role::Assistant
        );
    }

    #[test]
    fn test_role_from_author_label() {
        assert_eq!(role(r#"<div id="m"><div class="sender">Me</div><p>x</p></div>"#), Role::User);
        assert_eq!(role(r#"<div id="m"><div class="author-name">AI</div><p>x</p></div>"#), Role::Assistant);
    }

    #[test]
    fn test_default_is_assistant() {
        assert_eq!(role(r#"<div id="m"><p>Just text</p></div>"#), Role::Assistant);
    }

    #[test]
    fn test_user_checked_before_assistant() {
        assert_eq!(role_from_tokens("user ai"), Some(Role::User));
        assert_eq!(role_from_tokens("system"), None);
    }
}
