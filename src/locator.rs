//! Element locator.
//!
//! Finds the chat container, the element that actually scrolls, the message
//! elements and the load-more control, each through an ordered fallback
//! chain: platform override first, generic structure second, and (for
//! load-more) visible text as the last resort.

use dom_query::{Document, NodeId};
use tracing::{debug, trace};

use crate::dom;
use crate::error::{Error, Result};
use crate::host::HostPage;
use crate::patterns::LOAD_MORE_VOCABULARY;
use crate::probe;
use crate::profile::PlatformProfile;
use crate::selector::generic::{
    CLICKABLE_PATTERN, CONTAINER_PATTERNS, LOAD_MORE_PATTERNS, MESSAGE_PATTERNS,
};
use crate::selector::{document_root, try_query, SelectorChain};

/// Descendant levels searched for a scrolling element below the container.
const SCROLLABLE_SEARCH_DEPTH: usize = 3;

/// Longer texts are message bodies, not controls.
const MAX_CONTROL_TEXT_CHARS: usize = 60;

/// Locate the chat container.
pub fn find_container(doc: &Document, profile: &PlatformProfile) -> Result<NodeId> {
    let chain = SelectorChain::new()
        .platform(profile.container.as_deref())
        .generic(CONTAINER_PATTERNS);

    let found = chain.first_match(&document_root(doc));
    if let Some(m) = &found {
        debug!(pattern = %m.pattern, strategy = ?m.strategy, "chat container located");
    }
    found
        .and_then(|m| dom::node_id(&m.selection))
        .ok_or_else(|| Error::ContainerNotFound {
            profile: profile.label().to_string(),
        })
}

/// Scrolls vertically: `overflow-y` is auto/scroll and content overflows.
#[must_use]
pub fn is_scrollable<P: HostPage + ?Sized>(page: &P, node: NodeId) -> bool {
    page.overflow_y(node).is_scrollable()
        && page.scroll_metrics(node).is_ok_and(|m| m.overflows())
}

/// Locate the element whose scroll position drives the chat.
///
/// Checks the container, then its descendants breadth-first up to three
/// levels, then its ancestors up to `<body>`. Falls back to the container
/// itself, in which case scrolling is simply a no-op.
#[must_use]
pub fn find_scrollable_element<P: HostPage + ?Sized>(page: &P, container: NodeId) -> NodeId {
    if is_scrollable(page, container) {
        return container;
    }

    let doc = page.document();
    let mut frontier = vec![container];
    for depth in 1..=SCROLLABLE_SEARCH_DEPTH {
        let next: Vec<NodeId> = frontier
            .iter()
            .filter_map(|id| dom::node(doc, *id))
            .flat_map(|sel| dom::node_ids(&sel.children()))
            .collect();
        if let Some(found) = next.iter().copied().find(|id| is_scrollable(page, *id)) {
            debug!(depth, "scrollable element found below container");
            return found;
        }
        frontier = next;
    }

    if let Some(sel) = dom::node(doc, container) {
        for ancestor in dom::ancestors(&sel) {
            let tag = dom::tag_name(&ancestor).unwrap_or_default();
            if tag == "html" {
                break;
            }
            if let Some(id) = dom::node_id(&ancestor) {
                if is_scrollable(page, id) {
                    debug!(tag, "scrollable element found above container");
                    return id;
                }
            }
            if tag == "body" {
                break;
            }
        }
    }

    debug!("no scrollable element found, using container");
    container
}

/// Locate message elements under the container.
///
/// Tries each platform entry, then the generic patterns, and returns the
/// first non-empty set with nested matches removed.
#[must_use]
pub fn find_message_elements(doc: &Document, container: NodeId, profile: &PlatformProfile) -> Vec<NodeId> {
    let root = dom::node(doc, container)
        .filter(|_| dom::is_mounted(doc, container))
        .unwrap_or_else(|| document_root(doc));

    let chain = SelectorChain::new()
        .platform(profile.message.as_deref())
        .generic(MESSAGE_PATTERNS);

    chain
        .first_match(&root)
        .map(|m| {
            trace!(pattern = %m.pattern, count = m.selection.length(), "message elements matched");
            dom::outermost(doc, &dom::node_ids(&m.selection))
        })
        .unwrap_or_default()
}

/// Locate a visible, enabled load-more control.
///
/// Structural patterns first; then any clickable-looking element whose text
/// or `aria-label` contains the load-more vocabulary.
#[must_use]
pub fn find_load_more<P: HostPage + ?Sized>(page: &P, profile: &PlatformProfile) -> Option<NodeId> {
    let doc = page.document();
    let root = document_root(doc);

    let structural = SelectorChain::new()
        .platform(profile.load_more.as_deref())
        .generic(LOAD_MORE_PATTERNS)
        .find_map(&root, |m| {
            dom::node_ids(&m.selection)
                .into_iter()
                .find(|id| probe::is_interactable(page, *id))
        });
    if structural.is_some() {
        return structural;
    }

    let candidates = try_query(&root, CLICKABLE_PATTERN)?;
    dom::node_ids(&candidates).into_iter().find(|id| {
        dom::node(doc, *id).is_some_and(|sel| is_load_more_label(&sel))
            && probe::is_interactable(page, *id)
    })
}

/// Text or aria-label names a load-more action.
fn is_load_more_label(sel: &dom::Selection) -> bool {
    let text = sel.text();
    let text = text.trim();
    let label = dom::attr(sel, "aria-label").unwrap_or_default();

    [text, label.as_str()].iter().any(|s| {
        !s.is_empty() && s.chars().count() <= MAX_CONTROL_TEXT_CHARS && {
            let lower = s.to_lowercase();
            LOAD_MORE_VOCABULARY.iter().any(|w| lower.contains(w))
        }
    })
}
