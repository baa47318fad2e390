//! Stable fingerprints and content keys.
//!
//! A fingerprint identifies one logical message across re-renders. Pages
//! that tag rows with their own ids get `id:<value>`; everything else is
//! hashed from its leading text and class attribute.
//!
//! The content key is a second, independent key over normalized text alone,
//! used by finalization to fold remounted rows whose structure differs.

use sha2::{Digest, Sha256};

use crate::dom::{self, Selection};
use crate::options::Options;
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::selector::generic::STABLE_ID_ATTRS;

/// Where a fingerprint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintSource {
    /// A page-supplied identifier attribute.
    Id,
    /// A hash of text and class information.
    Content,
}

impl FingerprintSource {
    /// Short name used in debug payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Content => "content",
        }
    }
}

/// Deduplication key of a message element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// `id:<value>` or `h<8 hex digits>`.
    pub key: String,
    /// How `key` was derived.
    pub source: FingerprintSource,
}

/// Multiply-by-31 rolling hash over UTF-16 code units, with 32-bit signed
/// overflow.
#[must_use]
pub fn rolling_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Collapse whitespace runs to one space and trim.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text.trim(), " ").into_owned()
}

/// Fingerprint from already-extracted parts.
///
/// A non-blank `stable_id` wins. Otherwise the first `text_chars` characters
/// of normalized `text` and the first `class_chars` characters of `class`
/// are hashed.
#[must_use]
pub fn fingerprint(stable_id: Option<&str>, text: &str, class: &str, options: &Options) -> Fingerprint {
    if let Some(id) = stable_id.map(str::trim).filter(|id| !id.is_empty()) {
        return Fingerprint {
            key: format!("id:{id}"),
            source: FingerprintSource::Id,
        };
    }

    let mut input: String = normalize_text(text)
        .chars()
        .take(options.fingerprint_text_chars)
        .collect();
    input.extend(class.trim().chars().take(options.fingerprint_class_chars));

    Fingerprint {
        key: format!("h{:08x}", rolling_hash(&input) as u32),
        source: FingerprintSource::Content,
    }
}

/// Fingerprint a live message element.
#[must_use]
pub fn fingerprint_element(sel: &Selection, options: &Options) -> Fingerprint {
    let stable_id = STABLE_ID_ATTRS.iter().find_map(|name| dom::attr(sel, name));
    if stable_id.is_some() {
        return fingerprint(stable_id.as_deref(), "", "", options);
    }
    fingerprint(None, &dom::text_content(sel), &dom::class_name(sel), options)
}

/// SHA-256 over normalized content, hex encoded.
#[must_use]
pub fn content_key(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(content).as_bytes());
    format!("{:x}", hasher.finalize())
}
