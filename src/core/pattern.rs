//! Regex adapter
//!
//! Turns a backend-supplied pattern and foreign flag string into a local
//! [`Matcher`]. Backend patterns may use lookarounds, so matchers are built
//! with `fancy_regex`, which hands plain patterns to the `regex` engine.
//! Construction failures are swallowed: callers get `None` and fall back to
//! plain, escaped rendering.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Compiled highlight pattern
pub type Matcher = fancy_regex::Regex;

/// Flag characters the adapter understands, in canonical order
pub const SUPPORTED_FLAGS: [char; 4] = ['i', 'm', 's', 'u'];

/// Used when no recognized flag survives translation
pub const DEFAULT_FLAGS: &str = "i";

lazy_static! {
    static ref MATCH_ALL_RE: Regex =
        Regex::new(r"^\s*\^?\.\*\$?\s*$").expect("match-all sentinel regex is valid");
}

/// Keep only `i`, `m`, `s`, `u`, deduplicated in first-seen order.
///
/// Returns [`DEFAULT_FLAGS`] when the input is absent or yields nothing.
pub fn translate_flags(flags: Option<&str>) -> String {
    let mut out = String::new();
    for ch in flags.unwrap_or_default().chars() {
        if SUPPORTED_FLAGS.contains(&ch) && !out.contains(ch) {
            out.push(ch);
        }
    }
    if out.is_empty() {
        DEFAULT_FLAGS.to_string()
    } else {
        out
    }
}

/// Build a matcher from an optional pattern and flag string.
///
/// `None` for a missing or empty pattern, or one the regex engine rejects.
pub fn build_matcher(pattern: Option<&str>, flags: Option<&str>) -> Option<Matcher> {
    let pattern = pattern.filter(|p| !p.is_empty())?;
    // Unicode is always on for &str haystacks, so 'u' adds nothing here
    let inline: String = translate_flags(flags)
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's'))
        .collect();
    let source = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", inline, pattern)
    };

    match Matcher::new(&source) {
        Ok(rx) => Some(rx),
        Err(e) => {
            debug!("Discarding unusable pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// True for "match everything" sentinels such as `.*` or `^.*$`
pub fn is_match_all_regex(pattern: &str) -> bool {
    MATCH_ALL_RE.is_match(pattern)
}

/// Pattern to highlight with.
///
/// The executable pattern wins unless it is a match-all sentinel and a
/// distinct display pattern exists (row-filter-derived descriptions).
pub fn effective_highlight_pattern<'a>(
    pattern: Option<&'a str>,
    display_pattern: Option<&'a str>,
) -> Option<&'a str> {
    match (pattern, display_pattern) {
        (Some(p), Some(d)) if is_match_all_regex(p) && !d.is_empty() => Some(d),
        (Some(p), _) if !p.is_empty() => Some(p),
        (_, Some(d)) if !d.is_empty() => Some(d),
        _ => None,
    }
}

/// A matcher suitable for highlighting: absent for match-all patterns
pub fn highlight_matcher(pattern: Option<&str>, flags: Option<&str>) -> Option<Matcher> {
    match pattern {
        Some(p) if is_match_all_regex(p) => None,
        other => build_matcher(other, flags),
    }
}
