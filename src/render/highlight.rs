//! Match segmentation and HTML escaping
//!
//! Matching always runs on the raw cell text. Escaping is applied per
//! segment afterwards, which keeps highlight markup out of the escaper and
//! the escaper out of the markup.

use crate::core::pattern::Matcher;
use tracing::debug;

/// A piece of cell text, either outside or inside a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Hit(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(s) | Segment::Hit(s) => s,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Segment::Hit(_))
    }
}

/// Escape text for embedding in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Split `text` into plain and hit segments.
///
/// Empty matches are not reported as hits, and after one the scan moves
/// forward by a character so the loop always terminates.
pub fn highlight_segments<'a>(text: &'a str, matcher: Option<&Matcher>) -> Vec<Segment<'a>> {
    let Some(rx) = matcher else {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Plain(text)]
        };
    };

    let mut segments = Vec::new();
    let mut last = 0;
    let mut pos = 0;
    while pos <= text.len() {
        let m = match rx.find_from_pos(text, pos) {
            Ok(Some(m)) => m,
            Ok(None) => break,
            Err(e) => {
                debug!("Stopping highlight scan: {}", e);
                break;
            }
        };
        if m.start() == m.end() {
            // Zero-length match: step over one char and keep scanning
            pos = match text[m.end()..].chars().next() {
                Some(ch) => m.end() + ch.len_utf8(),
                None => break,
            };
            continue;
        }
        if m.start() > last {
            segments.push(Segment::Plain(&text[last..m.start()]));
        }
        segments.push(Segment::Hit(m.as_str()));
        last = m.end();
        pos = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(&text[last..]));
    }
    segments
}

/// Number of non-empty matches in `text`
pub fn count_hits(text: &str, matcher: &Matcher) -> usize {
    highlight_segments(text, Some(matcher))
        .iter()
        .filter(|s| s.is_hit())
        .count()
}

/// Escaped HTML with every hit wrapped in `<mark>`
pub fn highlight_html(text: &str, matcher: Option<&Matcher>) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for segment in highlight_segments(text, matcher) {
        match segment {
            Segment::Plain(s) => out.push_str(&escape_html(s)),
            Segment::Hit(s) => {
                out.push_str("<mark>");
                out.push_str(&escape_html(s));
                out.push_str("</mark>");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>a&b</b> "q" 'x'"#),
            "&lt;b&gt;a&amp;b&lt;/b&gt; &quot;q&quot; &#39;x&#39;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_markup_in_cell_is_never_interpreted() {
        let html = highlight_html("<b>a&b</b>", None);
        assert_eq!(html, "&lt;b&gt;a&amp;b&lt;/b&gt;");
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_hits_are_escaped_inside_marks() {
        let rx = Matcher::new("a&b").unwrap();
        let html = highlight_html("<b>a&b</b>", Some(&rx));
        assert_eq!(html, "&lt;b&gt;<mark>a&amp;b</mark>&lt;/b&gt;");
    }

    #[test]
    fn test_segments_cover_text() {
        let rx = Matcher::new(r"\d+").unwrap();
        let segs = highlight_segments("a1b22c", Some(&rx));
        assert_eq!(
            segs,
            vec![
                Segment::Plain("a"),
                Segment::Hit("1"),
                Segment::Plain("b"),
                Segment::Hit("22"),
                Segment::Plain("c"),
            ]
        );
        let rebuilt: String = segs.iter().map(|s| s.text()).collect();
        assert_eq!(rebuilt, "a1b22c");
    }

    #[test]
    fn test_zero_length_pattern_terminates() {
        let rx = Matcher::new("x*").unwrap();
        let segs = highlight_segments("abxxc", Some(&rx));
        assert_eq!(
            segs,
            vec![Segment::Plain("ab"), Segment::Hit("xx"), Segment::Plain("c")]
        );

        let empty = Matcher::new("").unwrap();
        assert_eq!(highlight_segments("héllo", Some(&empty)), vec![Segment::Plain("héllo")]);
        assert_eq!(count_hits("héllo", &empty), 0);
    }

    #[test]
    fn test_anchor_only_pattern_marks_nothing() {
        let rx = Matcher::new("^").unwrap();
        assert_eq!(highlight_html("<a>", Some(&rx)), "&lt;a&gt;");
    }

    #[test]
    fn test_empty_text() {
        let rx = Matcher::new("a").unwrap();
        assert!(highlight_segments("", Some(&rx)).is_empty());
        assert!(highlight_segments("", None).is_empty());
    }

    #[test]
    fn test_lookahead_highlights_only_the_consumed_text() {
        let rx = crate::core::pattern::build_matcher(Some(r"\d+(?=px)"), Some("i")).unwrap();
        assert_eq!(
            highlight_html("12px 3em 40px", Some(&rx)),
            "<mark>12</mark>px 3em <mark>40</mark>px"
        );
    }

    #[test]
    fn test_count_hits() {
        let rx = Matcher::new("(?i)a").unwrap();
        assert_eq!(count_hits("Banana", &rx), 3);
    }
}
