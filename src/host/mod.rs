//! Host-page capability.
//!
//! The capture engine never touches a browser directly. Everything it needs
//! from the page (the rendered tree, layout metrics, scrolling, clicking,
//! synthetic scroll input and waiting) goes through [`HostPage`]. The live
//! tree is a `dom_query` document; element handles are [`NodeId`]s, which stay
//! valid while a node remains mounted.
//!
//! Two adapters ship with the crate: [`SnapshotPage`] for a static, fully
//! rendered HTML snapshot, and [`SimulatedPage`] for a deterministic
//! virtualized chat page driven by a virtual clock.

use std::time::Duration;

use dom_query::{Document, NodeId};
use url::Url;

use crate::error::HostError;

pub mod simulated;
pub mod snapshot;

pub use simulated::{SimulatedPage, SimulatedPageBuilder};
pub use snapshot::SnapshotPage;

/// Computed vertical overflow of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// `overflow-y: visible` (the initial value).
    #[default]
    Visible,
    /// `overflow-y: hidden` or `clip`.
    Hidden,
    /// `overflow-y: auto` or `overlay`.
    Auto,
    /// `overflow-y: scroll`.
    Scroll,
}

impl Overflow {
    /// Whether this overflow value lets the user scroll the element.
    #[must_use]
    pub fn is_scrollable(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }

    /// Parse a CSS `overflow-y` keyword.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "overlay" => Self::Auto,
            "scroll" => Self::Scroll,
            "hidden" | "clip" => Self::Hidden,
            _ => Self::Visible,
        }
    }
}

/// How a programmatic scroll should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Jump immediately.
    Instant,
    /// Let the page animate the scroll.
    Smooth,
}

/// Scroll geometry of one element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current `scrollTop`.
    pub scroll_top: f64,
    /// Total scrollable content height (`scrollHeight`).
    pub scroll_height: f64,
    /// Visible height (`clientHeight`).
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Content is taller than the visible box.
    #[must_use]
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Within `tolerance` pixels of the top.
    #[must_use]
    pub fn is_near_top(&self, tolerance: f64) -> bool {
        self.scroll_top <= tolerance
    }

    /// `scrollTop + viewport >= scrollHeight - tolerance`.
    #[must_use]
    pub fn is_at_bottom(&self, viewport_height: f64, tolerance: f64) -> bool {
        self.scroll_top + viewport_height >= self.scroll_height - tolerance
    }
}

/// The capabilities a rendered page must expose to the capture engine.
///
/// Implementations own the live element tree. Methods that act on the page
/// may fail with a [`HostError`]; the engine treats every such failure as
/// "this mechanism did nothing" and carries on.
pub trait HostPage {
    /// The live rendered tree.
    fn document(&self) -> &Document;

    /// URL of the page, used to resolve relative artifact links.
    fn location(&self) -> Option<Url> {
        None
    }

    /// Height of the browser viewport (`window.innerHeight`).
    fn viewport_height(&self) -> f64;

    /// Scroll geometry of an element.
    fn scroll_metrics(&self, node: NodeId) -> Result<ScrollMetrics, HostError>;

    /// Computed `overflow-y` of an element.
    fn overflow_y(&self, node: NodeId) -> Overflow;

    /// Whether the element currently produces a layout box with non-zero size.
    fn has_layout_box(&self, node: NodeId) -> bool;

    /// `element.scrollTo({ top, behavior })`.
    fn scroll_to(
        &mut self,
        node: NodeId,
        top: f64,
        behavior: ScrollBehavior,
    ) -> Result<(), HostError>;

    /// `element.scrollTop = top`.
    fn set_scroll_top(&mut self, node: NodeId, top: f64) -> Result<(), HostError>;

    /// `element.scrollBy(0, dy)`.
    fn scroll_by(&mut self, node: NodeId, dy: f64) -> Result<(), HostError>;

    /// Activate a clickable element.
    fn click(&mut self, node: NodeId) -> Result<(), HostError>;

    /// Simulate user scroll/wheel input at the element so listeners that
    /// react to events (rather than polling position) get a chance to run.
    fn simulate_user_scroll(&mut self, node: NodeId) -> Result<(), HostError>;

    /// Suspend until the page had `duration` to settle.
    fn wait(&mut self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_from_css() {
        assert_eq!(Overflow::from_css("auto"), Overflow::Auto);
        assert_eq!(Overflow::from_css(" SCROLL "), Overflow::Scroll);
        assert_eq!(Overflow::from_css("clip"), Overflow::Hidden);
        assert_eq!(Overflow::from_css("inherit"), Overflow::Visible);
        assert!(Overflow::Auto.is_scrollable());
        assert!(!Overflow::Hidden.is_scrollable());
    }

    #[test]
    fn test_metrics_boundaries() {
        let m = ScrollMetrics {
            scroll_top: 980.0,
            scroll_height: 1600.0,
            client_height: 600.0,
        };
        assert!(m.overflows());
        assert!(!m.is_near_top(5.0));
        assert!(m.is_at_bottom(600.0, 20.0));
        assert!(!m.is_at_bottom(590.0, 20.0));
    }
}
