//! Scroll controller.
//!
//! Two explicit phases drive the page:
//!
//! - [`history`]: scroll to the top repeatedly, clicking load-more controls,
//!   until the page stops producing older messages.
//! - [`sweep`]: walk back down in viewport-sized steps, capturing whatever is
//!   mounted after each step.
//!
//! Each phase separates its termination logic (a pure tracker fed with
//! observations) from the driver that talks to the page.

pub mod history;
pub mod sweep;

use tracing::debug;

use crate::dom::NodeId;
use crate::error::HostError;
use crate::host::{HostPage, ScrollBehavior, ScrollMetrics};

pub use history::{load_history, HistoryTracker};
pub use sweep::{sweep, SweepTracker};

/// Pixels of negative overscroll applied after the top-scroll assignments.
const TOP_OVERSCROLL_PX: f64 = -100.0;

/// Log and drop a host fault; the step simply had no effect.
pub(crate) fn absorb(result: Result<(), HostError>, op: &'static str) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(op, %err, "host operation failed, continuing");
            false
        }
    }
}

/// Force the element to the top with every mechanism available.
pub fn scroll_to_top<P: HostPage + ?Sized>(page: &mut P, node: NodeId) {
    if !absorb(page.scroll_to(node, 0.0, ScrollBehavior::Smooth), "scroll_to") {
        absorb(page.scroll_to(node, 0.0, ScrollBehavior::Instant), "scroll_to");
    }
    absorb(page.set_scroll_top(node, 0.0), "set_scroll_top");
    absorb(page.scroll_by(node, TOP_OVERSCROLL_PX), "scroll_by");
}

/// Current metrics, or zeros if the element cannot report them.
#[must_use]
pub fn current_metrics<P: HostPage + ?Sized>(page: &P, node: NodeId) -> ScrollMetrics {
    page.scroll_metrics(node).unwrap_or_else(|err| {
        debug!(%err, "scroll metrics unavailable");
        ScrollMetrics::default()
    })
}

/// Visible height used for the bottom test: the element's own client
/// height, or the viewport when the element reports none.
#[must_use]
pub fn visible_height<P: HostPage + ?Sized>(page: &P, metrics: &ScrollMetrics) -> f64 {
    if metrics.client_height > 0.0 {
        metrics.client_height
    } else {
        page.viewport_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::host::SimulatedPage;
    use crate::result::Role;

    fn scroller(page: &SimulatedPage) -> NodeId {
        dom::node_id(&page.document().select("#scroller")).unwrap()
    }

    #[test]
    fn test_scroll_to_top_survives_unsupported_method() {
        let mut page = SimulatedPage::builder()
            .rows((0..30).map(|i| (Role::User, format!("r{i}"))))
            .without_smooth_scroll()
            .build();
        let node = scroller(&page);
        assert!(current_metrics(&page, node).scroll_top > 0.0);

        scroll_to_top(&mut page, node);
        assert_eq!(current_metrics(&page, node).scroll_top, 0.0);
    }

    #[test]
    fn test_absorb_reports_failure() {
        assert!(absorb(Ok(()), "op"));
        assert!(!absorb(Err(HostError::Unsupported("scrollTo")), "op"));
    }

    #[test]
    fn test_visible_height_falls_back_to_viewport() {
        let page = SimulatedPage::builder().viewport_height(700.0).build();
        let none = ScrollMetrics::default();
        let some = ScrollMetrics {
            client_height: 300.0,
            ..ScrollMetrics::default()
        };
        assert_eq!(visible_height(&page, &none), 700.0);
        assert_eq!(visible_height(&page, &some), 300.0);
    }
}
