//! Deterministic virtualized chat page.
//!
//! `SimulatedPage` renders a chat log the way windowing libraries do: only
//! rows near the viewport are mounted, and every re-render mounts rows afresh
//! (new node ids). Time is virtual; [`HostPage::wait`] advances the clock and
//! lets pending page work (history loads, growth, scheduled actions) happen.
//!
//! It exists so the engine can be exercised end-to-end without a browser, in
//! tests, benches and demos.
//!
//! # Example
//!
//! ```rust
//! use chat_capture::host::SimulatedPage;
//! use chat_capture::{CaptureSession, NoProgress, Options, PlatformProfile, Role};
//!
//! let mut page = SimulatedPage::builder()
//!     .rows((0..12).map(|i| (Role::User, format!("message {i}"))))
//!     .build();
//!
//! let report = CaptureSession::new(Options::default())
//!     .run(&mut page, &PlatformProfile::generic(), &mut NoProgress)?;
//! assert_eq!(report.messages.len(), 12);
//! # Ok::<(), chat_capture::Error>(())
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use dom_query::{Document, NodeId};
use url::Url;

use super::{HostPage, Overflow, ScrollBehavior, ScrollMetrics};
use crate::dom;
use crate::error::HostError;
use crate::result::Role;

/// One logical row of the simulated chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRow {
    /// Value of `data-message-id`; rows without one force content hashing.
    pub message_id: Option<String>,
    /// Author, rendered as `data-message-author-role`.
    pub role: Role,
    /// Inner HTML of the row's content element.
    pub body_html: String,
}

impl SimRow {
    /// Row with a plain-text body and a generated id.
    #[must_use]
    pub fn text(id: impl Into<String>, role: Role, text: &str) -> Self {
        Self {
            message_id: Some(id.into()),
            role,
            body_html: format!("<p>{}</p>", escape_html(text)),
        }
    }

    /// Row with raw HTML body and no page-supplied id.
    #[must_use]
    pub fn anonymous(role: Role, body_html: impl Into<String>) -> Self {
        Self {
            message_id: None,
            role,
            body_html: body_html.into(),
        }
    }
}

/// How older history becomes available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    /// Clicking a "Load earlier messages" button prepends a batch.
    Button,
    /// Scroll events while at the top prepend a batch.
    ScrollToTop,
}

type Scheduled = (Duration, Box<dyn FnOnce()>);

/// Builder for [`SimulatedPage`].
pub struct SimulatedPageBuilder {
    rows: Vec<SimRow>,
    hidden_history: usize,
    batch: usize,
    mode: HistoryMode,
    row_height: f64,
    viewport_height: f64,
    overscan: f64,
    virtualized: bool,
    growth_per_wait: f64,
    smooth_scroll_supported: bool,
    location: Option<Url>,
}

impl Default for SimulatedPageBuilder {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            hidden_history: 0,
            batch: 10,
            mode: HistoryMode::Button,
            row_height: 100.0,
            viewport_height: 600.0,
            overscan: 200.0,
            virtualized: true,
            growth_per_wait: 0.0,
            smooth_scroll_supported: true,
            location: None,
        }
    }
}

impl SimulatedPageBuilder {
    /// Append plain-text rows with generated ids `m0`, `m1`, ...
    #[must_use]
    pub fn rows(mut self, rows: impl IntoIterator<Item = (Role, String)>) -> Self {
        for (role, text) in rows {
            let id = format!("m{}", self.rows.len());
            self.rows.push(SimRow::text(id, role, &text));
        }
        self
    }

    /// Append a fully specified row.
    #[must_use]
    pub fn row(mut self, row: SimRow) -> Self {
        self.rows.push(row);
        self
    }

    /// The first `count` rows start unloaded and arrive `batch` at a time
    /// through a "Load earlier messages" button.
    #[must_use]
    pub fn load_more_button(mut self, count: usize, batch: usize) -> Self {
        self.hidden_history = count;
        self.batch = batch.max(1);
        self.mode = HistoryMode::Button;
        self
    }

    /// The first `count` rows start unloaded and arrive `batch` at a time
    /// when the page sees scroll events while at the top.
    #[must_use]
    pub fn lazy_history(mut self, count: usize, batch: usize) -> Self {
        self.hidden_history = count;
        self.batch = batch.max(1);
        self.mode = HistoryMode::ScrollToTop;
        self
    }

    /// Row height in pixels.
    #[must_use]
    pub fn row_height(mut self, px: f64) -> Self {
        self.row_height = px;
        self
    }

    /// Viewport (and scroller client) height in pixels.
    #[must_use]
    pub fn viewport_height(mut self, px: f64) -> Self {
        self.viewport_height = px;
        self
    }

    /// Mount every loaded row instead of a window around the viewport.
    #[must_use]
    pub fn without_virtualization(mut self) -> Self {
        self.virtualized = false;
        self
    }

    /// Grow the scroll height by `px` on every wait, forever.
    #[must_use]
    pub fn perpetual_growth(mut self, px: f64) -> Self {
        self.growth_per_wait = px;
        self
    }

    /// Reject `scroll_to` as unsupported; `scrollTop` assignment still works.
    #[must_use]
    pub fn without_smooth_scroll(mut self) -> Self {
        self.smooth_scroll_supported = false;
        self
    }

    /// Page URL reported through [`HostPage::location`].
    #[must_use]
    pub fn location(mut self, url: Url) -> Self {
        self.location = Some(url);
        self
    }

    /// Build the page, initially scrolled to the bottom as chat apps open.
    #[must_use]
    pub fn build(self) -> SimulatedPage {
        let document = dom::parse(
            r#"<html><head><title>Chat</title></head><body>
            <div id="app">
              <nav class="sidebar"><a href="/new">New chat</a><button>Settings</button></nav>
              <div id="scroller" class="chat-scroll" style="overflow-y: auto">
                <div id="history-slot"></div>
                <div id="messages" class="messages" role="log"></div>
              </div>
            </div></body></html>"#,
        );
        let id_of = |selector: &str| dom::node_id(&document.select(selector));
        let (Some(scroller), Some(slot), Some(messages)) =
            (id_of("#scroller"), id_of("#history-slot"), id_of("#messages"))
        else {
            unreachable!("simulated page template is static");
        };

        let hidden = self.hidden_history.min(self.rows.len());
        let mut page = SimulatedPage {
            document,
            scroller,
            slot,
            messages,
            rows: self.rows,
            loaded_from: hidden,
            mode: self.mode,
            batch: self.batch,
            pending_loads: 0,
            row_height: self.row_height,
            viewport_height: self.viewport_height,
            overscan: self.overscan,
            virtualized: self.virtualized,
            growth_per_wait: self.growth_per_wait,
            extra_height: 0.0,
            smooth_scroll_supported: self.smooth_scroll_supported,
            location: self.location,
            scroll_top: 0.0,
            now: Duration::ZERO,
            scheduled: Vec::new(),
            button: None,
            mounted: None,
            clicks: 0,
            scroll_events: 0,
            renders: 0,
        };
        page.scroll_top = page.max_scroll_top();
        page.render();
        page
    }
}

/// A virtualized chat page with a virtual clock.
pub struct SimulatedPage {
    document: Document,
    scroller: NodeId,
    slot: NodeId,
    messages: NodeId,
    rows: Vec<SimRow>,
    loaded_from: usize,
    mode: HistoryMode,
    batch: usize,
    pending_loads: usize,
    row_height: f64,
    viewport_height: f64,
    overscan: f64,
    virtualized: bool,
    growth_per_wait: f64,
    extra_height: f64,
    smooth_scroll_supported: bool,
    location: Option<Url>,
    scroll_top: f64,
    now: Duration,
    scheduled: Vec<Scheduled>,
    button: Option<NodeId>,
    mounted: Option<(usize, usize, bool)>,
    clicks: u32,
    scroll_events: u32,
    renders: u32,
}

impl SimulatedPage {
    /// Start building a page.
    #[must_use]
    pub fn builder() -> SimulatedPageBuilder {
        SimulatedPageBuilder::default()
    }

    /// Virtual time elapsed so far.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Load-more clicks the page accepted.
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Synthetic scroll interactions received.
    #[must_use]
    pub fn scroll_events(&self) -> u32 {
        self.scroll_events
    }

    /// Times the message list was re-rendered.
    #[must_use]
    pub fn renders(&self) -> u32 {
        self.renders
    }

    /// Rows currently loaded (mounted or not).
    #[must_use]
    pub fn loaded_rows(&self) -> usize {
        self.rows.len() - self.loaded_from
    }

    /// Run `action` once the virtual clock reaches `at`.
    pub fn schedule(&mut self, at: Duration, action: impl FnOnce() + 'static) {
        self.scheduled.push((at, Box::new(action)));
    }

    fn scroll_height(&self) -> f64 {
        (self.loaded_rows() as f64 * self.row_height + self.extra_height).max(self.viewport_height)
    }

    fn max_scroll_top(&self) -> f64 {
        (self.scroll_height() - self.viewport_height).max(0.0)
    }

    fn set_top(&mut self, top: f64) {
        self.scroll_top = top.clamp(0.0, self.max_scroll_top());
    }

    /// Range of loaded-row indices that should be mounted.
    fn window(&self) -> (usize, usize) {
        let loaded = self.loaded_rows();
        if !self.virtualized {
            return (0, loaded);
        }
        let top = (self.scroll_top - self.overscan).max(0.0);
        let bottom = self.scroll_top + self.viewport_height + self.overscan;
        let first = (top / self.row_height).floor() as usize;
        let last = ((bottom / self.row_height).ceil() as usize).min(loaded);
        (first.min(last), last)
    }

    fn has_more_history(&self) -> bool {
        self.loaded_from > 0
    }

    /// Re-render the message list and the history slot when the mounted
    /// window or the loaded set changed.
    fn render(&mut self) {
        let (first, last) = self.window();
        let show_button = self.mode == HistoryMode::Button && self.has_more_history();
        let key = (self.loaded_from + first, self.loaded_from + last, show_button);
        if self.mounted == Some(key) {
            return;
        }
        self.mounted = Some(key);
        self.renders += 1;

        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="spacer" style="height: {}px"></div>"#,
            first as f64 * self.row_height
        );
        for row in &self.rows[self.loaded_from + first..self.loaded_from + last] {
            let role = row.role.as_str();
            let id_attr = row
                .message_id
                .as_ref()
                .map(|id| format!(r#" data-message-id="{}""#, escape_html(id)))
                .unwrap_or_default();
            let _ = write!(
                html,
                r#"<div class="message-row {role}-turn"{id_attr} data-message-author-role="{role}"><div class="message-content">{}</div></div>"#,
                row.body_html
            );
        }

        if let Some(messages) = dom::node(&self.document, self.messages) {
            messages.set_html(html.as_str());
        }
        if let Some(slot) = dom::node(&self.document, self.slot) {
            if show_button {
                slot.set_html(r#"<button class="load-more-button" type="button">Load earlier messages</button>"#);
                self.button = dom::node_id(&slot.select("button"));
            } else {
                slot.set_html("");
                self.button = None;
            }
        }
    }

    /// Apply queued history loads, keeping the visible rows in place the
    /// way browser scroll anchoring does.
    fn apply_pending_loads(&mut self) {
        while self.pending_loads > 0 && self.has_more_history() {
            let added = self.batch.min(self.loaded_from);
            self.loaded_from -= added;
            self.scroll_top += added as f64 * self.row_height;
            self.pending_loads -= 1;
        }
        self.pending_loads = 0;
    }

    fn run_scheduled(&mut self) {
        let now = self.now;
        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.scheduled = later;
        for (_, action) in due {
            action();
        }
    }

    fn check_mounted(&self, node: NodeId) -> Result<(), HostError> {
        if dom::is_mounted(&self.document, node) {
            Ok(())
        } else {
            Err(HostError::Detached(node))
        }
    }
}

impl HostPage for SimulatedPage {
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
        self.check_mounted(node)?;
        if node == self.scroller {
            return Ok(ScrollMetrics {
                scroll_top: self.scroll_top,
                scroll_height: self.scroll_height(),
                client_height: self.viewport_height,
            });
        }
        let height = if node == self.messages {
            self.scroll_height()
        } else {
            self.row_height
        };
        Ok(ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: height,
            client_height: height,
        })
    }

    fn overflow_y(&self, node: NodeId) -> Overflow {
        if node == self.scroller {
            Overflow::Auto
        } else {
            Overflow::Visible
        }
    }

    fn has_layout_box(&self, node: NodeId) -> bool {
        if !dom::is_mounted(&self.document, node) {
            return false;
        }
        dom::node(&self.document, node).is_some_and(|sel| {
            !dom::is_hidden_by_markup(&sel)
                && !dom::ancestors(&sel).iter().any(dom::is_hidden_by_markup)
        })
    }

    fn scroll_to(&mut self, node: NodeId, top: f64, behavior: ScrollBehavior) -> Result<(), HostError> {
        self.check_mounted(node)?;
        if behavior == ScrollBehavior::Smooth && !self.smooth_scroll_supported {
            return Err(HostError::Unsupported("scrollTo"));
        }
        if node == self.scroller {
            self.set_top(top);
        }
        Ok(())
    }

    fn set_scroll_top(&mut self, node: NodeId, top: f64) -> Result<(), HostError> {
        self.check_mounted(node)?;
        if node == self.scroller {
            self.set_top(top);
        }
        Ok(())
    }

    fn scroll_by(&mut self, node: NodeId, dy: f64) -> Result<(), HostError> {
        self.check_mounted(node)?;
        if node == self.scroller {
            self.set_top(self.scroll_top + dy);
        }
        Ok(())
    }

    fn click(&mut self, node: NodeId) -> Result<(), HostError> {
        self.check_mounted(node)?;
        if dom::node(&self.document, node).is_some_and(|sel| sel.has_attr("disabled")) {
            return Err(HostError::Interaction("element is disabled".to_string()));
        }
        if Some(node) == self.button {
            self.clicks += 1;
            self.pending_loads += 1;
        }
        Ok(())
    }

    fn simulate_user_scroll(&mut self, node: NodeId) -> Result<(), HostError> {
        self.check_mounted(node)?;
        self.scroll_events += 1;
        if self.mode == HistoryMode::ScrollToTop && self.scroll_top <= 0.0 && self.has_more_history() {
            self.pending_loads = 1;
        }
        self.render();
        Ok(())
    }

    fn wait(&mut self, duration: Duration) {
        self.now += duration;
        self.apply_pending_loads();
        self.extra_height += self.growth_per_wait;
        self.set_top(self.scroll_top);
        self.render();
        self.run_scheduled();
    }
}

/// Escape text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> impl Iterator<Item = (Role, String)> {
        (0..n).map(|i| (Role::Assistant, format!("row {i}")))
    }

    #[test]
    fn test_opens_at_bottom_with_window_mounted() {
        let page = SimulatedPage::builder().rows(numbered(40)).build();
        let metrics = page.scroll_metrics(page.scroller).unwrap();

        assert_eq!(metrics.scroll_height, 4000.0);
        assert_eq!(metrics.scroll_top, 3400.0);
        let mounted = page.document().select("[data-message-id]").length();
        assert!(mounted < 40);
        assert!(page.document().select("[data-message-id='m39']").exists());
    }

    #[test]
    fn test_scrolling_remounts_rows() {
        let mut page = SimulatedPage::builder().rows(numbered(40)).build();
        let scroller = page.scroller;

        page.set_scroll_top(scroller, 0.0).unwrap();
        page.wait(Duration::from_millis(10));

        assert!(page.document().select("[data-message-id='m0']").exists());
        assert!(!page.document().select("[data-message-id='m39']").exists());
    }

    #[test]
    fn test_button_loads_batch_after_wait() {
        let mut page = SimulatedPage::builder()
            .rows(numbered(30))
            .load_more_button(20, 10)
            .build();
        assert_eq!(page.loaded_rows(), 10);

        let button = page.button.unwrap();
        page.click(button).unwrap();
        assert_eq!(page.loaded_rows(), 10);

        page.wait(Duration::from_millis(1200));
        assert_eq!(page.loaded_rows(), 20);
        assert_eq!(page.clicks(), 1);

        let button = page.button.unwrap();
        page.click(button).unwrap();
        page.wait(Duration::from_millis(1200));
        assert_eq!(page.loaded_rows(), 30);
        assert!(page.button.is_none());
        assert!(!page.document().select("button.load-more-button").exists());
    }

    #[test]
    fn test_lazy_history_needs_scroll_events_at_top() {
        let mut page = SimulatedPage::builder()
            .rows(numbered(30))
            .lazy_history(10, 10)
            .build();
        let scroller = page.scroller;

        page.set_scroll_top(scroller, 0.0).unwrap();
        page.wait(Duration::from_millis(400));
        assert_eq!(page.loaded_rows(), 20);

        page.simulate_user_scroll(scroller).unwrap();
        page.wait(Duration::from_millis(400));
        assert_eq!(page.loaded_rows(), 30);
    }

    #[test]
    fn test_scheduled_action_runs_on_time() {
        use std::cell::Cell;
        use std::rc::Rc;

        let fired = Rc::new(Cell::new(false));
        let mut page = SimulatedPage::builder().rows(numbered(3)).build();
        let flag = Rc::clone(&fired);
        page.schedule(Duration::from_millis(500), move || flag.set(true));

        page.wait(Duration::from_millis(400));
        assert!(!fired.get());
        page.wait(Duration::from_millis(100));
        assert!(fired.get());
    }

    #[test]
    fn test_smooth_scroll_can_be_rejected() {
        let mut page = SimulatedPage::builder()
            .rows(numbered(20))
            .without_smooth_scroll()
            .build();
        let scroller = page.scroller;

        assert_eq!(
            page.scroll_to(scroller, 0.0, ScrollBehavior::Smooth),
            Err(HostError::Unsupported("scrollTo"))
        );
        page.scroll_to(scroller, 0.0, ScrollBehavior::Instant).unwrap();
        assert_eq!(page.scroll_metrics(scroller).unwrap().scroll_top, 0.0);
    }

    #[test]
    fn test_click_on_disabled_element_is_rejected() {
        let mut page = SimulatedPage::builder()
            .rows(numbered(20))
            .load_more_button(10, 5)
            .build();
        let button = page.button.unwrap();
        page.document.select("button.load-more-button").set_attr("disabled", "");

        assert!(matches!(page.click(button), Err(HostError::Interaction(_))));
        assert_eq!(page.clicks(), 0);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
