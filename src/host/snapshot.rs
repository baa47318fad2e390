//! Static snapshot adapter.
//!
//! Wraps a saved, fully rendered page. Nothing scrolls and nothing loads:
//! every element that is not hidden by its markup (or an ancestor's) has a
//! layout box, scroll operations succeed as no-ops, waits return at once and
//! clicks are rejected. A capture against a snapshot therefore settles in the
//! minimum number of history iterations and sweeps once.

use std::time::Duration;

use dom_query::{Document, NodeId};
use encoding_rs::{Encoding, UTF_8};
use url::Url;

use super::{HostPage, Overflow, ScrollBehavior, ScrollMetrics};
use crate::dom;
use crate::error::HostError;
use crate::patterns::META_CHARSET;

/// Viewport height assumed when none is given.
const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;

/// A static HTML snapshot exposed as a host page.
pub struct SnapshotPage {
    document: Document,
    location: Option<Url>,
    viewport_height: f64,
}

impl SnapshotPage {
    /// Parse a snapshot from UTF-8 HTML.
    #[must_use]
    pub fn new(html: &str) -> Self {
        Self {
            document: dom::parse(html),
            location: None,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }

    /// Parse a snapshot from raw bytes, honouring a `<meta>` charset
    /// declaration in the first kilobyte and defaulting to UTF-8.
    #[must_use]
    pub fn from_bytes(html: &[u8]) -> Self {
        Self::new(&transcode(html))
    }

    /// Set the page URL used to resolve relative artifact links.
    #[must_use]
    pub fn with_location(mut self, location: Url) -> Self {
        self.location = Some(location);
        self
    }

    /// Override the assumed viewport height.
    #[must_use]
    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    fn element(&self, node: NodeId) -> Result<dom::Selection<'_>, HostError> {
        dom::node(&self.document, node)
            .filter(|_| dom::is_mounted(&self.document, node))
            .ok_or(HostError::Detached(node))
    }
}

/// Decode snapshot bytes to a UTF-8 string, replacing invalid sequences.
fn transcode(html: &[u8]) -> String {
    let head = String::from_utf8_lossy(&html[..html.len().min(1024)]);
    let encoding = META_CHARSET
        .captures(&head)
        .and_then(|c| Encoding::for_label(c[1].as_bytes()))
        .unwrap_or(UTF_8);

    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}

impl HostPage for SnapshotPage {
    fn document(&self) -> &Document {
        &self.document
    }

    fn location(&self) -> Option<Url> {
        self.location.clone()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_metrics(&self, node: NodeId) -> Result<ScrollMetrics, HostError> {
        self.element(node)?;
        Ok(ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: self.viewport_height,
            client_height: self.viewport_height,
        })
    }

    fn overflow_y(&self, node: NodeId) -> Overflow {
        self.element(node)
            .ok()
            .and_then(|sel| {
                dom::style_property(&sel, "overflow-y")
                    .or_else(|| dom::style_property(&sel, "overflow"))
            })
            .map(|v| Overflow::from_css(&v))
            .unwrap_or_default()
    }

    fn has_layout_box(&self, node: NodeId) -> bool {
        let Ok(sel) = self.element(node) else {
            return false;
        };
        !dom::is_hidden_by_markup(&sel)
            && !dom::ancestors(&sel).iter().any(dom::is_hidden_by_markup)
    }

    fn scroll_to(&mut self, node: NodeId, _top: f64, _behavior: ScrollBehavior) -> Result<(), HostError> {
        self.element(node).map(|_| ())
    }

    fn set_scroll_top(&mut self, node: NodeId, _top: f64) -> Result<(), HostError> {
        self.element(node).map(|_| ())
    }

    fn scroll_by(&mut self, node: NodeId, _dy: f64) -> Result<(), HostError> {
        self.element(node).map(|_| ())
    }

    fn click(&mut self, _node: NodeId) -> Result<(), HostError> {
        Err(HostError::Unsupported("click on a static snapshot"))
    }

    fn simulate_user_scroll(&mut self, node: NodeId) -> Result<(), HostError> {
        self.element(node).map(|_| ())
    }

    fn wait(&mut self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_windows_1252() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>\x93Hi\x94 Caf\xE9</body></html>";
        let page = SnapshotPage::from_bytes(html);
        let text = page.document().select("body").text().to_string();

        assert!(text.contains("\u{201C}Hi\u{201D}"));
        assert!(text.contains("Café"));
    }

    #[test]
    fn test_transcode_defaults_to_utf8() {
        let page = SnapshotPage::from_bytes("<p>naïve</p>".as_bytes());
        assert_eq!(page.document().select("p").text().to_string(), "naïve");
    }

    #[test]
    fn test_layout_box_respects_hidden_ancestors() {
        let page = SnapshotPage::new(
            r#"<div id="shown">a</div>
               <div style="display:none"><p id="inner">b</p></div>
               <p id="attr" hidden>c</p>"#,
        );
        let doc = page.document();
        let shown = dom::node_id(&doc.select("#shown")).unwrap();
        let inner = dom::node_id(&doc.select("#inner")).unwrap();
        let attr = dom::node_id(&doc.select("#attr")).unwrap();

        assert!(page.has_layout_box(shown));
        assert!(!page.has_layout_box(inner));
        assert!(!page.has_layout_box(attr));
    }

    #[test]
    fn test_overflow_from_inline_style() {
        let page = SnapshotPage::new(
            r#"<div id="a" style="overflow-y: auto">x</div><div id="b" style="overflow: scroll">y</div><div id="c">z</div>"#,
        );
        let doc = page.document();
        let id = |s: &str| dom::node_id(&doc.select(s)).unwrap();

        assert_eq!(page.overflow_y(id("#a")), Overflow::Auto);
        assert_eq!(page.overflow_y(id("#b")), Overflow::Scroll);
        assert_eq!(page.overflow_y(id("#c")), Overflow::Visible);
    }

    #[test]
    fn test_snapshot_never_overflows_and_rejects_clicks() {
        let mut page = SnapshotPage::new(r#"<main id="m"><button>Load more</button></main>"#);
        let main = dom::node_id(&page.document().select("#m")).unwrap();
        let button = dom::node_id(&page.document().select("button")).unwrap();

        assert!(!page.scroll_metrics(main).unwrap().overflows());
        assert!(page.click(button).is_err());
        assert!(page.scroll_by(main, 100.0).is_ok());
    }
}
