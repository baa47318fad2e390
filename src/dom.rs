//! DOM Operations Adapter
//!
//! Thin helpers over `dom_query` used by the locator, probe and extractor.
//! Elements are addressed by [`NodeId`] across host-page steps and turned
//! back into [`Selection`]s only while the tree is borrowed.

pub use dom_query::{Document, NodeId, NodeRef, Selection};
pub use tendril::StrTendril;

/// Tags whose boundaries produce a line break when flattening text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "tr", "ul",
];

// === Parsing / Identity ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Resolve a node id back into a single-element selection.
///
/// Returns `None` when the id does not name an element of `doc`.
#[must_use]
pub fn node(doc: &Document, id: NodeId) -> Option<Selection<'_>> {
    let node = doc.tree.get(&id)?;
    node.is_element().then(|| Selection::from(node))
}

/// Id of the first node in a selection.
#[inline]
#[must_use]
pub fn node_id(sel: &Selection) -> Option<NodeId> {
    sel.nodes().first().map(|n| n.id)
}

/// Ids of every node in a selection, in document order.
#[must_use]
pub fn node_ids(sel: &Selection) -> Vec<NodeId> {
    sel.nodes().iter().map(|n| n.id).collect()
}

/// Whether the node is still attached under the document's `<html>` element.
#[must_use]
pub fn is_mounted(doc: &Document, id: NodeId) -> bool {
    let Some(mut current) = doc.tree.get(&id) else {
        return false;
    };
    loop {
        match current.parent() {
            Some(parent) => {
                if parent.is_document() {
                    return true;
                }
                current = parent;
            }
            None => return false,
        }
    }
}

// === Attribute Operations ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Get a non-empty, trimmed attribute value.
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get element class attribute (empty string if missing)
#[inline]
#[must_use]
pub fn class_name(sel: &Selection) -> String {
    sel.attr("class").map(|s| s.to_string()).unwrap_or_default()
}

/// Check whether an attribute equals `value`, ignoring ASCII case.
#[must_use]
pub fn attr_eq(sel: &Selection, name: &str, value: &str) -> bool {
    sel.attr(name)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
}

/// Read one property from the inline `style` attribute (lowercased value).
///
/// `style_property(sel, "display")` on `style="color:red; DISPLAY: None"`
/// yields `Some("none")`.
#[must_use]
pub fn style_property(sel: &Selection, property: &str) -> Option<String> {
    let style = sel.attr("style")?;
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim().trim_end_matches("!important").trim().to_ascii_lowercase())
    })
}

/// Tags that never produce a layout box.
const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript", "meta", "link"];

/// Whether the element itself is hidden by its markup: the `hidden`
/// attribute, inline `display:none` / `visibility:hidden`, or a tag that is
/// never rendered. Ancestors are not consulted.
#[must_use]
pub fn is_hidden_by_markup(sel: &Selection) -> bool {
    if sel.has_attr("hidden") {
        return true;
    }
    if tag_name(sel).is_some_and(|t| NON_RENDERED_TAGS.contains(&t.as_str())) {
        return true;
    }
    style_property(sel, "display").as_deref() == Some("none")
        || style_property(sel, "visibility").as_deref() == Some("hidden")
}

// === Text Content ===

/// Get all text content of node and descendants
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Check whether a tag starts a new line when flattened.
#[inline]
#[must_use]
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

// === Tree Navigation ===

/// Walk element ancestors from the parent up to (and including) `<html>`.
#[must_use]
pub fn ancestors<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    let mut out = Vec::new();
    let mut current = sel.parent();
    while current.exists() {
        out.push(current.clone());
        if tag_name(&current).as_deref() == Some("html") {
            break;
        }
        current = current.parent();
    }
    out
}

/// Whether `inner` is a strict descendant of `outer`.
#[must_use]
pub fn is_descendant_of(doc: &Document, inner: NodeId, outer: NodeId) -> bool {
    let Some(mut current) = doc.tree.get(&inner) else {
        return false;
    };
    while let Some(parent) = current.parent() {
        if parent.id == outer {
            return true;
        }
        current = parent;
    }
    false
}

/// Keep only nodes that are not nested inside another node of the set.
///
/// Generic message patterns such as `[class*='message']` match both a row
/// and its `message-content` child; the row is what we want.
#[must_use]
pub fn outermost(doc: &Document, ids: &[NodeId]) -> Vec<NodeId> {
    ids.iter()
        .copied()
        .filter(|id| !ids.iter().any(|other| other != id && is_descendant_of(doc, *id, *other)))
        .collect()
}

// === Copies ===

/// Clone an element with all descendants into a standalone document.
///
/// The copy can be pruned freely without touching the live page. Select
/// its root with [`copy_root`].
#[must_use]
pub fn detached_copy(sel: &Selection) -> Document {
    Document::from(sel.html().to_string())
}

/// Root element of a document produced by [`detached_copy`].
#[must_use]
pub fn copy_root(copy: &Document) -> Selection<'_> {
    copy.select("body > *").first()
}
