//! Message timestamps.

use chrono::{DateTime, SecondsFormat};

use crate::dom::{self, Selection};
use crate::patterns::EPOCH_TIMESTAMP;
use crate::selector::generic::{TIMESTAMP_ATTRS, TIMESTAMP_PATTERNS};
use crate::selector::SelectorChain;

/// Find a message timestamp, preferring machine-readable attributes over
/// element text.
#[must_use]
pub fn extract_timestamp(sel: &Selection) -> Option<String> {
    let nested = SelectorChain::new()
        .generic(TIMESTAMP_PATTERNS)
        .find_map(sel, |m| {
            m.selection
                .nodes()
                .iter()
                .find_map(|n| timestamp_of(&Selection::from(*n)))
        });

    nested
        .or_else(|| {
            ["data-timestamp", "data-time"]
                .iter()
                .find_map(|name| dom::attr(sel, name))
        })
        .map(|raw| normalize_timestamp(&raw))
}

fn timestamp_of(sel: &Selection) -> Option<String> {
    TIMESTAMP_ATTRS
        .iter()
        .find_map(|name| dom::attr(sel, name))
        .or_else(|| {
            let text = sel.text();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
}

/// RFC 3339 stays RFC 3339, epoch seconds or milliseconds become RFC 3339
/// UTC, anything else is returned trimmed.
#[must_use]
pub fn normalize_timestamp(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    }

    if EPOCH_TIMESTAMP.is_match(raw) {
        let parsed = raw.parse::<i64>().ok().and_then(|n| {
            if raw.len() == 13 {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            }
        });
        if let Some(dt) = parsed {
            return dt.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp("2024-05-01T10:00:00Z"), "2024-05-01T10:00:00Z");
        assert_eq!(
            normalize_timestamp("2024-05-01T12:00:00+02:00"),
            "2024-05-01T12:00:00+02:00"
        );
        assert_eq!(normalize_timestamp("1700000000"), "2023-11-14T22:13:20Z");
        assert_eq!(normalize_timestamp("1700000000123"), "2023-11-14T22:13:20.123Z");
        assert_eq!(normalize_timestamp("  Yesterday 4:05 PM "), "Yesterday 4:05 PM");
    }

    #[test]
    fn test_attribute_preferred_over_text() {
        let doc = dom::parse(
            r#"<div id="m"><p>hi</p><time datetime="2024-05-01T10:00:00Z">10:00</time></div>"#,
        );
        assert_eq!(
            extract_timestamp(&doc.select("#m")).as_deref(),
            Some("2024-05-01T10:00:00Z")
        );
    }

    #[test]
    fn test_text_fallback_and_own_attribute() {
        let doc = dom::parse(
            r#"<div id="a"><span class="timestamp">3:41 PM</span></div>
               <div id="b" data-timestamp="1700000000"><p>x</p></div>
               <div id="c"><p>none</p></div>"#,
        );
        assert_eq!(extract_timestamp(&doc.select("#a")).as_deref(), Some("3:41 PM"));
        assert_eq!(
            extract_timestamp(&doc.select("#b")).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
        assert_eq!(extract_timestamp(&doc.select("#c")), None);
    }
}
