//! Visibility and interaction probe.
//!
//! Decides whether an element is actually on screen and whether clicking it
//! is safe. Markup checks run first (they are cheap and catch collapsed
//! sections); the host page's layout answer has the final word.

use dom_query::NodeId;

use crate::dom::{self, Selection};
use crate::host::HostPage;

/// Whether the element is mounted, not hidden by its own or an ancestor's
/// markup, and has a layout box.
#[must_use]
pub fn is_visible<P: HostPage + ?Sized>(page: &P, node: NodeId) -> bool {
    let doc = page.document();
    if !dom::is_mounted(doc, node) {
        return false;
    }
    let Some(sel) = dom::node(doc, node) else {
        return false;
    };
    if dom::is_hidden_by_markup(&sel) || dom::ancestors(&sel).iter().any(dom::is_hidden_by_markup) {
        return false;
    }
    page.has_layout_box(node)
}

/// Whether the element is disabled through `disabled` or `aria-disabled`.
#[must_use]
pub fn is_disabled(sel: &Selection) -> bool {
    sel.has_attr("disabled") || dom::attr_eq(sel, "aria-disabled", "true")
}

/// Visible and enabled: safe to click.
#[must_use]
pub fn is_interactable<P: HostPage + ?Sized>(page: &P, node: NodeId) -> bool {
    if !is_visible(page, node) {
        return false;
    }
    dom::node(page.document(), node).is_some_and(|sel| !is_disabled(&sel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SnapshotPage;

    fn id(page: &SnapshotPage, selector: &str) -> NodeId {
        dom::node_id(&page.document().select(selector)).unwrap()
    }

    #[test]
    fn test_visible_and_interactable() {
        let page = SnapshotPage::new(r#"<button id="ok">Load more</button>"#);
        let ok = id(&page, "#ok");

        assert!(is_visible(&page, ok));
        assert!(is_interactable(&page, ok));
    }

    #[test]
    fn test_disabled_is_visible_but_not_interactable() {
        let page = SnapshotPage::new(
            r#"<button id="a" disabled>Load more</button><a id="b" aria-disabled="true">More</a>"#,
        );
        for sel in ["#a", "#b"] {
            let node = id(&page, sel);
            assert!(is_visible(&page, node));
            assert!(!is_interactable(&page, node));
        }
    }

    #[test]
    fn test_hidden_by_ancestor() {
        let page = SnapshotPage::new(
            r#"<div style="visibility: hidden"><button id="x">Show more</button></div>"#,
        );
        assert!(!is_visible(&page, id(&page, "#x")));
    }

    #[test]
    fn test_detached_is_not_visible() {
        let page = SnapshotPage::new(r#"<div><button id="x">Show more</button></div>"#);
        let x = id(&page, "#x");
        page.document().select("#x").remove();

        assert!(!is_visible(&page, x));
        assert!(!is_interactable(&page, x));
    }
}
