//! Artifact references.

use url::Url;

use crate::dom::{self, Selection};
use crate::selector::generic::ARTIFACT_PATTERN;
use crate::selector::try_query;

/// Artifact references inside a message, in document order, first
/// occurrence wins.
///
/// Explicit artifact attributes are taken as-is; link targets are resolved
/// against `base` when one is known.
#[must_use]
pub fn extract_artifacts(sel: &Selection, base: Option<&Url>) -> Vec<String> {
    let Some(found) = try_query(sel, ARTIFACT_PATTERN) else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::new();
    for node in found.nodes() {
        let el = Selection::from(*node);
        let reference = dom::attr(&el, "data-artifact-id")
            .or_else(|| dom::attr(&el, "data-artifact"))
            .or_else(|| dom::attr(&el, "href").map(|href| resolve(&href, base)));
        if let Some(reference) = reference {
            if !out.contains(&reference) {
                out.push(reference);
            }
        }
    }
    out
}

fn resolve(href: &str, base: Option<&Url>) -> String {
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| href.to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_and_links_deduplicated() {
        let doc = dom::parse(
            r#"<div id="m">
                 <div data-artifact-id="art-1">Card</div>
                 <a href="/chat/artifacts/42">open</a>
                 <span data-artifact="art-1">again</span>
                 <a href="/chat/artifacts/42">open again</a>
                 <a href="/docs">unrelated</a>
               </div>"#,
        );
        let base = Url::parse("https://chat.example.com/c/abc").unwrap();

        assert_eq!(
            extract_artifacts(&doc.select("#m"), Some(&base)),
            vec!["art-1", "https://chat.example.com/chat/artifacts/42"]
        );
        assert_eq!(
            extract_artifacts(&doc.select("#m"), None),
            vec!["art-1", "/chat/artifacts/42"]
        );
    }

    #[test]
    fn test_no_artifacts() {
        let doc = dom::parse(r#"<div id="m"><p>plain</p></div>"#);
        assert!(extract_artifacts(&doc.select("#m"), None).is_empty());
    }
}
