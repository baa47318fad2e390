//! Selector fallback chains
//!
//! A [`SelectorChain`] is an ordered list of `(strategy, pattern)` steps.
//! Steps are evaluated lazily against a root and the first step that yields
//! a non-empty match wins; results of different steps are never merged, so
//! overlapping patterns cannot produce duplicate or conflicting sets.
//!
//! Patterns come partly from user-supplied profiles, so an invalid one is
//! logged and treated as "no match" rather than failing the run.

use dom_query::{Document, Matcher, Selection};
use tracing::debug;

use crate::profile::split_selector_list;

pub mod generic;

/// Where a chain step came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A platform profile override.
    Platform,
    /// A generic structural pattern.
    Generic,
}

/// A successful chain step.
#[derive(Debug, Clone)]
pub struct ChainMatch<'a> {
    /// Strategy of the winning step.
    pub strategy: Strategy,
    /// Pattern of the winning step.
    pub pattern: String,
    /// Non-empty matched set, in document order.
    pub selection: Selection<'a>,
}

/// Ordered `(strategy, pattern)` steps.
#[derive(Debug, Clone, Default)]
pub struct SelectorChain {
    steps: Vec<(Strategy, String)>,
}

impl SelectorChain {
    /// Empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a platform override; comma-separated entries become separate
    /// steps so one bad entry does not poison the rest.
    #[must_use]
    pub fn platform(mut self, list: Option<&str>) -> Self {
        if let Some(list) = list {
            self.steps.extend(
                split_selector_list(list)
                    .into_iter()
                    .map(|p| (Strategy::Platform, p)),
            );
        }
        self
    }

    /// Append generic patterns.
    #[must_use]
    pub fn generic(mut self, patterns: &[&str]) -> Self {
        self.steps.extend(
            patterns
                .iter()
                .map(|p| (Strategy::Generic, (*p).to_string())),
        );
        self
    }

    /// Steps in evaluation order.
    #[must_use]
    pub fn steps(&self) -> &[(Strategy, String)] {
        &self.steps
    }

    /// First step with a non-empty match under `root` (descendants only).
    #[must_use]
    pub fn first_match<'a>(&self, root: &Selection<'a>) -> Option<ChainMatch<'a>> {
        self.find_map(root, Some)
    }

    /// Run `f` over non-empty step matches until it returns `Some`.
    ///
    /// Lets callers add their own acceptance test (visibility, non-empty
    /// text) while keeping the chain's order and short-circuiting.
    pub fn find_map<'a, T>(
        &self,
        root: &Selection<'a>,
        mut f: impl FnMut(ChainMatch<'a>) -> Option<T>,
    ) -> Option<T> {
        self.steps.iter().find_map(|(strategy, pattern)| {
            let selection = try_query(root, pattern)?;
            f(ChainMatch {
                strategy: *strategy,
                pattern: pattern.clone(),
                selection,
            })
        })
    }
}

/// Query descendants of `root`; `None` if the pattern is invalid or matches nothing.
#[must_use]
pub fn try_query<'a>(root: &Selection<'a>, pattern: &str) -> Option<Selection<'a>> {
    match Matcher::new(pattern) {
        Ok(matcher) => {
            let found = root.select_matcher(&matcher);
            found.exists().then_some(found)
        }
        Err(_) => {
            debug!(pattern, "invalid selector pattern, treating as no match");
            None
        }
    }
}

/// Root for document-wide queries: the `<html>` element.
#[must_use]
pub fn document_root(doc: &Document) -> Selection<'_> {
    doc.select("html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn test_first_non_empty_step_wins_without_merging() {
        let doc = dom::parse(r#"<div class="a">1</div><div class="b">2</div><div class="b">3</div>"#);
        let chain = SelectorChain::new().generic(&[".missing", ".b", ".a"]);

        let m = chain.first_match(&document_root(&doc)).unwrap();
        assert_eq!(m.pattern, ".b");
        assert_eq!(m.strategy, Strategy::Generic);
        assert_eq!(m.selection.length(), 2);
    }

    #[test]
    fn test_platform_steps_come_first_and_are_split() {
        let doc = dom::parse(r#"<div class="x">1</div><div class="y">2</div>"#);
        let chain = SelectorChain::new()
            .platform(Some(".nope, .y"))
            .generic(&[".x"]);

        assert_eq!(chain.steps().len(), 3);
        let m = chain.first_match(&document_root(&doc)).unwrap();
        assert_eq!(m.strategy, Strategy::Platform);
        assert_eq!(m.pattern, ".y");
    }

    #[test]
    fn test_invalid_pattern_falls_through() {
        let doc = dom::parse(r#"<p class="ok">x</p>"#);
        let chain = SelectorChain::new()
            .platform(Some("div[[[broken"))
            .generic(&[".ok"]);

        let m = chain.first_match(&document_root(&doc)).unwrap();
        assert_eq!(m.pattern, ".ok");
        assert!(try_query(&document_root(&doc), "::::").is_none());
    }

    #[test]
    fn test_find_map_applies_acceptance_test() {
        let doc = dom::parse(r#"<p class="a"> </p><p class="b">text</p>"#);
        let chain = SelectorChain::new().generic(&[".a", ".b"]);

        let text = chain.find_map(&document_root(&doc), |m| {
            let t = m.selection.text().trim().to_string();
            (!t.is_empty()).then_some(t)
        });
        assert_eq!(text.as_deref(), Some("text"));
    }

    #[test]
    fn test_empty_chain_matches_nothing() {
        let doc = dom::parse("<p>x</p>");
        assert!(SelectorChain::new().first_match(&document_root(&doc)).is_none());
    }
}
