//! Code block detection and language tagging.

use crate::dom::{self, NodeId, NodeRef, Selection};
use crate::patterns::LANGUAGE_CLASS;
use crate::result::CodeBlock;
use crate::selector::generic::{CHROME_PATTERN, CODE_PATTERN};
use crate::selector::try_query;

/// Attributes naming a code language directly.
const LANGUAGE_ATTRS: &[&str] = &["data-language", "data-lang", "lang"];

/// Whether the element holds a code block: a `<pre>`, or a code-block
/// styled wrapper with no `<pre>` of its own.
#[must_use]
pub fn is_code_container(sel: &Selection) -> bool {
    match dom::tag_name(sel).as_deref() {
        Some("pre") => true,
        _ => dom::class_name(sel).contains("code-block") && !sel.select("pre").exists(),
    }
}

/// Best-effort language of a code element, empty when unknown.
///
/// Looks at the element's own language attributes, then a `language-xxx`
/// class token on it or its first nested `<code>`, then the attributes of
/// an enclosing `<pre>`.
#[must_use]
pub fn detect_language(sel: &Selection) -> String {
    if let Some(lang) = language_of(sel) {
        return lang;
    }
    let inner = sel.select("code").first();
    if inner.exists() {
        if let Some(lang) = language_of(&inner) {
            return lang;
        }
    }
    dom::ancestors(sel)
        .iter()
        .filter(|a| dom::tag_name(a).as_deref() == Some("pre"))
        .find_map(language_of)
        .unwrap_or_default()
}

fn language_of(sel: &Selection) -> Option<String> {
    LANGUAGE_ATTRS
        .iter()
        .find_map(|name| dom::attr(sel, name))
        .or_else(|| {
            LANGUAGE_CLASS
                .captures(&dom::class_name(sel))
                .map(|caps| caps[1].to_string())
        })
        .map(|lang| lang.to_ascii_lowercase())
}

/// Raw code text: leading and trailing blank lines dropped, indentation kept.
///
/// A block wrapping `<code>` yields only that element's text, so headers
/// beside it (language labels, copy buttons) stay out. Without one, chrome
/// descendants are skipped.
#[must_use]
pub fn code_text(sel: &Selection) -> String {
    let inner = sel.select("code");
    let text = if inner.exists() {
        inner.text().to_string()
    } else {
        text_outside_chrome(sel)
    };
    text.trim_matches(|c| c == '\n' || c == '\r').trim_end().to_string()
}

fn text_outside_chrome(sel: &Selection) -> String {
    let chrome = try_query(sel, CHROME_PATTERN)
        .map(|found| dom::node_ids(&found))
        .unwrap_or_default();
    let mut out = String::new();
    for node in sel.nodes() {
        collect_text(*node, &chrome, &mut out);
    }
    out
}

fn collect_text(node: NodeRef, skip: &[NodeId], out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }
    if skip.contains(&node.id) {
        return;
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        collect_text(c, skip, out);
        child = c.next_sibling();
    }
}

/// Code blocks of a message element in document order.
///
/// Ids are `<message_id>-code-<n>`, numbered over the non-empty blocks.
#[must_use]
pub fn extract_code_blocks(sel: &Selection, message_id: &str) -> Vec<CodeBlock> {
    let Some(found) = try_query(sel, CODE_PATTERN) else {
        return Vec::new();
    };

    let containers: Vec<Selection> = found
        .nodes()
        .iter()
        .map(|n| Selection::from(*n))
        .filter(is_code_container)
        .collect();
    let ids: Vec<NodeId> = containers.iter().filter_map(dom::node_id).collect();

    let mut blocks = Vec::new();
    for block in &containers {
        let Some(node) = block.nodes().first() else {
            continue;
        };
        if ids.iter().any(|outer| is_inside(node, *outer)) {
            continue;
        }
        let content = code_text(block);
        if content.is_empty() {
            continue;
        }
        blocks.push(CodeBlock {
            id: format!("{message_id}-code-{}", blocks.len()),
            language: detect_language(block),
            content,
        });
    }
    blocks
}

fn is_inside(inner: &NodeRef, outer: NodeId) -> bool {
    let mut current = inner.parent();
    while let Some(node) = current {
        if node.id == outer {
            return true;
        }
        current = node.parent();
    }
    false
}
