//! Message text cleaning.
//!
//! Works on a detached copy so the live page is never touched. Hidden
//! elements and interface chrome are pruned, then the tree is flattened with
//! block-aware line breaks; code comes out as fenced blocks so it stays
//! recognizable in the flat string.

use tracing::trace;

use crate::dom::{self, NodeRef, Selection};
use crate::extractor::code;
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::selector::generic::{CHROME_PATTERN, CONTENT_MARKUP_PATTERN, HIDDEN_PATTERN};
use crate::selector::try_query;

const FENCE: &str = "```";

/// Clean text of an element.
#[must_use]
pub fn clean_text(sel: &Selection) -> String {
    let copy = dom::detached_copy(sel);
    let root = dom::copy_root(&copy);
    if !root.exists() {
        return String::new();
    }

    if let Some(hidden) = try_query(&root, HIDDEN_PATTERN) {
        hidden.remove();
    }
    prune_chrome(&root);

    let mut raw = String::new();
    for node in root.nodes() {
        flatten(*node, &mut raw);
    }
    tidy(&raw)
}

/// Remove chrome unless it nests real content markup.
fn prune_chrome(root: &Selection) {
    let Some(chrome) = try_query(root, CHROME_PATTERN) else {
        return;
    };
    for node in chrome.nodes() {
        let el = Selection::from(*node);
        if el.select(CONTENT_MARKUP_PATTERN).exists() {
            trace!("keeping chrome element that wraps content");
            continue;
        }
        el.remove();
    }
}

fn flatten(node: NodeRef, out: &mut String) {
    if node.is_text() {
        out.push_str(&WHITESPACE_NORMALIZE.replace_all(&node.text(), " "));
        return;
    }
    if !node.is_element() {
        return;
    }

    let sel = Selection::from(node);
    let tag = dom::tag_name(&sel).unwrap_or_default();

    if code::is_code_container(&sel) {
        push_fence(out, &code::detect_language(&sel), &code::code_text(&sel));
        return;
    }
    match tag.as_str() {
        "br" => {
            out.push('\n');
            return;
        }
        "code" => {
            let text = code::code_text(&sel);
            if text.contains('\n') {
                push_fence(out, &code::detect_language(&sel), &text);
            } else if !text.trim().is_empty() {
                out.push('`');
                out.push_str(text.trim());
                out.push('`');
            }
            return;
        }
        _ => {}
    }

    let block = dom::is_block_tag(&tag);
    if block {
        out.push('\n');
    }
    let mut child = node.first_child();
    while let Some(c) = child {
        flatten(c, out);
        child = c.next_sibling();
    }
    if block {
        out.push('\n');
    }
}

fn push_fence(out: &mut String, language: &str, code: &str) {
    if code.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(FENCE);
    out.push_str(language);
    out.push('\n');
    out.push_str(code);
    out.push('\n');
    out.push_str(FENCE);
    out.push('\n');
}

/// Trim lines and collapse blank runs outside fences; fenced lines are kept
/// verbatim.
fn tidy(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in raw.split('\n') {
        if in_fence {
            lines.push(line);
            if line == FENCE {
                in_fence = false;
            }
            continue;
        }
        let trimmed = line.trim();
        if trimmed.starts_with(FENCE) {
            in_fence = true;
            lines.push(trimmed);
            continue;
        }
        if trimmed.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(trimmed);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(html: &str) -> String {
        let doc = dom::parse(html);
        clean_text(&doc.select("#m"))
    }

    #[test]
    fn test_blocks_become_lines() {
        let text = clean(
            r#"<div id="m"><p>Hello   <b>there</b>,
                 friend.</p><ul><li>one</li><li>two</li></ul><p>bye<br>now</p></div>"#,
        );
        assert_eq!(text, "Hello there, friend.\n\none\n\ntwo\n\nbye\nnow");
    }

    #[test]
    fn test_hidden_and_chrome_removed() {
        let text = clean(
            r#"<div id="m">
                 <span aria-hidden="true">icon</span>
                 <p>Answer</p>
                 <div style="display:none">secret</div>
                 <div role="toolbar"><button>Copy</button><button>Retry</button></div>
               </div>"#,
        );
        assert_eq!(text, "Answer");
    }

    #[test]
    fn test_chrome_wrapping_content_is_kept() {
        let text = clean(r#"<div id="m"><aside><p>Quoted note</p></aside></div>"#);
        assert_eq!(text, "Quoted note");
    }

    #[test]
    fn test_code_is_fenced_with_language() {
        let text = clean(
            "<div id=\"m\"><p>Try:</p><pre><code class=\"language-python\">def f():\n    return 1\n</code></pre><p>Use <code>f()</code>.</p></div>",
        );
        assert_eq!(
            text,
            "Try:\n\n```python\ndef f():\n    return 1\n```\n\nUse `f()`."
        );
    }

    #[test]
    fn test_code_header_left_out_of_fence() {
        let text = clean(
            r#"<div id="m"><p>Run:</p><pre><div class="code-header"><span>python</span><button>Copy code</button></div><div><code class="language-python">print(1)</code></div></pre></div>"#,
        );
        assert_eq!(text, "Run:\n\n```python\nprint(1)\n```");
    }

    #[test]
    fn test_live_page_untouched() {
        let doc = dom::parse(r#"<div id="m"><button>Copy</button><p>x</p></div>"#);
        assert_eq!(clean_text(&doc.select("#m")), "x");
        assert!(doc.select("#m button").exists());
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(clean(r#"<div id="m">  <span hidden>gone</span> </div>"#), "");
    }
}
