//! Content extraction for message elements.
//!
//! # Module Structure
//!
//! - `role`: author detection from attributes, classes, avatars and labels
//! - `text`: cleaning and flattening message text (code kept as fences)
//! - `code`: code block detection and language tagging
//! - `artifacts`: artifact references
//! - `timestamp`: timestamp lookup and normalization
//!
//! The sub-extractors scan the element independently; none of them consumes
//! what another one found.
//!
//! # Usage
//!
//! ```rust
//! use chat_capture::dom;
//! use chat_capture::extractor::Extractor;
//! use chat_capture::hasher::fingerprint_element;
//! use chat_capture::{Options, PlatformProfile, Role};
//!
//! let doc = dom::parse(r#"<div data-message-author-role="user"><p>Hi there</p></div>"#);
//! let el = doc.select("div");
//! let (options, profile) = (Options::default(), PlatformProfile::generic());
//!
//! let extractor = Extractor::new(&profile, &options, None);
//! let msg = extractor.extract(&el, fingerprint_element(&el, &options), 0);
//! assert_eq!(msg.role, Role::User);
//! assert_eq!(msg.content, "Hi there");
//! ```

pub mod artifacts;
pub mod code;
pub mod role;
pub mod text;
pub mod timestamp;

use url::Url;

use crate::dom::{self, Selection};
use crate::hasher::Fingerprint;
use crate::options::Options;
use crate::profile::PlatformProfile;
use crate::result::{CapturedMessage, MessageDebug};
use crate::selector::generic::CONTENT_PATTERNS;
use crate::selector::SelectorChain;

pub use artifacts::extract_artifacts;
pub use code::extract_code_blocks;
pub use role::detect_role;
pub use text::clean_text;
pub use timestamp::extract_timestamp;

/// Turns message elements into [`CapturedMessage`]s.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    profile: &'a PlatformProfile,
    options: &'a Options,
    base: Option<Url>,
}

impl<'a> Extractor<'a> {
    /// Extractor for one capture run; `base` resolves relative artifact links.
    #[must_use]
    pub fn new(profile: &'a PlatformProfile, options: &'a Options, base: Option<Url>) -> Self {
        Self { profile, options, base }
    }

    /// Extract one message element.
    ///
    /// Never fails: a sub-extractor that finds nothing yields an empty
    /// value, and an empty `content` is filtered by the accumulator.
    #[must_use]
    pub fn extract(&self, sel: &Selection, fingerprint: Fingerprint, order: usize) -> CapturedMessage {
        let id = fingerprint.key;
        let debug = self.options.include_debug.then(|| MessageDebug {
            tag: dom::tag_name(sel).unwrap_or_default(),
            class_snippet: dom::class_name(sel)
                .chars()
                .take(self.options.fingerprint_class_chars)
                .collect(),
            fingerprint_source: fingerprint.source.as_str(),
        });

        CapturedMessage {
            role: detect_role(sel),
            content: self.content(sel),
            timestamp: extract_timestamp(sel),
            code_blocks: extract_code_blocks(sel, &id),
            artifacts: extract_artifacts(sel, self.base.as_ref()),
            order,
            debug,
            id,
        }
    }

    /// Cleaned content: platform content selector, then generic content
    /// patterns, then the whole element.
    #[must_use]
    pub fn content(&self, sel: &Selection) -> String {
        let chain = SelectorChain::new()
            .platform(self.profile.content.as_deref())
            .generic(CONTENT_PATTERNS);

        chain
            .find_map(sel, |m| {
                let matched: Vec<Selection> = m
                    .selection
                    .nodes()
                    .iter()
                    .map(|n| Selection::from(*n))
                    .collect();
                let parts: Vec<String> = outermost_parts(&matched)
                    .iter()
                    .map(clean_text)
                    .filter(|t| !t.is_empty())
                    .collect();
                (!parts.is_empty()).then(|| parts.join("\n\n"))
            })
            .unwrap_or_else(|| clean_text(sel))
    }
}

/// Drop selections nested inside an earlier one.
fn outermost_parts<'a>(parts: &[Selection<'a>]) -> Vec<Selection<'a>> {
    let ids: Vec<_> = parts.iter().filter_map(dom::node_id).collect();
    parts
        .iter()
        .filter(|part| {
            !dom::ancestors(part)
                .iter()
                .filter_map(dom::node_id)
                .any(|a| ids.contains(&a))
        })
        .cloned()
        .collect()
}
