//! Ordered-preference resolution of response fields
//!
//! The backend has moved several values between keys over time. Each
//! function here names one semantic value and walks its candidate keys in
//! preference order, so rendering code never has to know about the legacy
//! shapes.

use crate::core::models::ExecuteResponse;
use std::collections::BTreeSet;

/// First candidate holding a non-empty string
fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Active row filter: normalized, then original, then the legacy stats field
pub fn row_filter(resp: &ExecuteResponse) -> String {
    first_non_empty([
        resp.row_filter_normalized.as_deref(),
        resp.row_filter.as_deref(),
        resp.stats.as_ref().and_then(|s| s.row_filter.as_deref()),
    ])
    .unwrap_or_default()
    .to_string()
}

/// Result row count: explicit count, then the legacy `rows_with_hits` stat
pub fn result_rows_count(resp: &ExecuteResponse) -> Option<u64> {
    resp.result_rows_count
        .or_else(|| resp.stats.as_ref().and_then(|s| s.rows_with_hits))
}

/// Unified head-level hit mask, when the server sends one
pub fn unified_head_mask(resp: &ExecuteResponse) -> Option<BTreeSet<usize>> {
    resp.mask_row_indices_head
        .as_ref()
        .map(|v| v.iter().copied().collect())
}

/// Head hits for a find result; `None` means the client must derive them
pub fn find_head_hits(resp: &ExecuteResponse) -> Option<BTreeSet<usize>> {
    unified_head_mask(resp)
        .or_else(|| {
            resp.stats
                .as_ref()
                .and_then(|s| s.head_hit_row_indices.as_ref())
                .map(|v| v.iter().copied().collect())
        })
        .or_else(|| {
            resp.head_hit_row_indices
                .as_ref()
                .map(|v| v.iter().copied().collect())
        })
}

/// Head hits for a replace result.
///
/// Unified mask, then `head_hit_row_indices`, then the stats copy, then the
/// changed rows that fall inside the processed head.
pub fn replace_head_hits(resp: &ExecuteResponse) -> BTreeSet<usize> {
    if let Some(mask) = unified_head_mask(resp) {
        return mask;
    }
    if let Some(hits) = &resp.head_hit_row_indices {
        return hits.iter().copied().collect();
    }
    if let Some(hits) = resp
        .stats
        .as_ref()
        .and_then(|s| s.head_hit_row_indices.as_ref())
    {
        return hits.iter().copied().collect();
    }
    let head_len = resp.head.len();
    resp.changed_row_indices
        .as_deref()
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|&i| i < head_len)
        .collect()
}

/// Executable pattern and its source label
pub fn pattern(resp: &ExecuteResponse) -> (Option<String>, Option<String>) {
    (
        resp.regex.clone().filter(|p| !p.is_empty()),
        resp.regex_source.clone(),
    )
}

/// Display-only pattern, kept only when it differs from the executable one
pub fn display_pattern(resp: &ExecuteResponse) -> Option<(String, Option<String>)> {
    let display = resp.display_regex.as_deref().filter(|d| !d.is_empty())?;
    if resp.regex.as_deref() == Some(display) {
        return None;
    }
    Some((display.to_string(), resp.display_regex_source.clone()))
}

/// Columns the pattern was applied to; falls back to the response columns
pub fn applied_columns(resp: &ExecuteResponse) -> Vec<String> {
    if resp.columns_applied.is_empty() {
        resp.columns.clone()
    } else {
        resp.columns_applied.clone()
    }
}

/// Per-column counts: top-level for replace, nested stats for find
pub fn per_column(resp: &ExecuteResponse) -> std::collections::BTreeMap<String, u64> {
    match &resp.stats {
        Some(stats) if !stats.per_column.is_empty() => stats.per_column.clone(),
        _ => resp.per_column.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: serde_json::Value) -> ExecuteResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_row_filter_preference_order() {
        let resp = parse(serde_json::json!({
            "mode": "find",
            "row_filter": "Age > 3",
            "row_filter_normalized": "`Age` > 3",
            "stats": {"row_filter": "legacy"}
        }));
        assert_eq!(row_filter(&resp), "`Age` > 3");

        let resp = parse(serde_json::json!({
            "mode": "find",
            "row_filter": "Age > 3",
            "row_filter_normalized": null,
            "stats": {"row_filter": "legacy"}
        }));
        assert_eq!(row_filter(&resp), "Age > 3");

        let resp = parse(serde_json::json!({"mode": "find", "stats": {"row_filter": "legacy"}}));
        assert_eq!(row_filter(&resp), "legacy");

        let resp = parse(serde_json::json!({"mode": "find", "row_filter": "  "}));
        assert_eq!(row_filter(&resp), "");
    }

    #[test]
    fn test_result_rows_count_fallback() {
        let resp = parse(serde_json::json!({
            "mode": "find", "result_rows_count": 4, "stats": {"rows_with_hits": 9}
        }));
        assert_eq!(result_rows_count(&resp), Some(4));

        let resp = parse(serde_json::json!({"mode": "find", "stats": {"rows_with_hits": 9}}));
        assert_eq!(result_rows_count(&resp), Some(9));

        let resp = parse(serde_json::json!({"mode": "find"}));
        assert_eq!(result_rows_count(&resp), None);
    }

    #[test]
    fn test_find_head_hits_prefers_unified_mask() {
        let resp = parse(serde_json::json!({
            "mode": "find",
            "mask_row_indices_head": [1],
            "stats": {"head_hit_row_indices": [0, 2]}
        }));
        assert_eq!(find_head_hits(&resp), Some([1].into_iter().collect()));

        let resp = parse(serde_json::json!({
            "mode": "find", "stats": {"head_hit_row_indices": [0, 2]}
        }));
        assert_eq!(find_head_hits(&resp), Some([0, 2].into_iter().collect()));

        let resp = parse(serde_json::json!({"mode": "find", "head_hit_row_indices": [5]}));
        assert_eq!(find_head_hits(&resp), Some([5].into_iter().collect()));

        let resp = parse(serde_json::json!({"mode": "find", "stats": {"total_matches": 0}}));
        assert_eq!(find_head_hits(&resp), None);
    }

    #[test]
    fn test_replace_head_hits_chain() {
        let resp = parse(serde_json::json!({
            "mode": "replace", "head_hit_row_indices": [3], "changed_row_indices": [3, 4]
        }));
        assert_eq!(replace_head_hits(&resp), [3].into_iter().collect());

        let resp = parse(serde_json::json!({
            "mode": "replace",
            "head": [{"a": "1"}, {"a": "2"}],
            "changed_row_indices": [1, 2, 900]
        }));
        assert_eq!(replace_head_hits(&resp), [1].into_iter().collect());

        let resp = parse(serde_json::json!({"mode": "replace"}));
        assert!(replace_head_hits(&resp).is_empty());
    }

    #[test]
    fn test_display_pattern_only_when_distinct() {
        let resp = parse(serde_json::json!({
            "mode": "find", "regex": "^.*$", "display_regex": "(?:Male|Female)",
            "display_regex_source": "row_filter-derived"
        }));
        assert_eq!(
            display_pattern(&resp),
            Some(("(?:Male|Female)".to_string(), Some("row_filter-derived".to_string())))
        );

        let resp = parse(serde_json::json!({
            "mode": "find", "regex": "a+", "display_regex": "a+"
        }));
        assert_eq!(display_pattern(&resp), None);
    }

    #[test]
    fn test_applied_columns_fallback() {
        let resp = parse(serde_json::json!({"mode": "find", "columns": ["email"]}));
        assert_eq!(applied_columns(&resp), vec!["email".to_string()]);
    }

    #[test]
    fn test_per_column_source() {
        let resp = parse(serde_json::json!({
            "mode": "find", "stats": {"per_column": {"email": 2}}
        }));
        assert_eq!(per_column(&resp)["email"], 2);

        let resp = parse(serde_json::json!({"mode": "replace", "per_column": {"url": 5}}));
        assert_eq!(per_column(&resp)["url"], 5);
    }
}
