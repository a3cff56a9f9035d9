//! HTML table renderers and the standalone report page

use crate::core::pattern::Matcher;
use crate::core::state::{PageView, ViewState};
use crate::core::types::{ExecutionResult, Row};
use crate::render::highlight::{escape_html, highlight_html};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Inputs for the highlighting table
#[derive(Debug, Clone, Copy)]
pub struct HighlightTable<'a> {
    pub rows: &'a [&'a Row],
    pub columns: &'a [String],
    pub matcher: Option<&'a Matcher>,
    /// Columns the matcher applies to
    pub match_columns: &'a [String],
    /// Row positions to mark; `None` means every row is eligible
    pub marked_rows: Option<&'a BTreeSet<usize>>,
    /// Mark whole rows instead of matched spans
    pub whole_row: bool,
}

impl<'a> HighlightTable<'a> {
    pub fn from_page(page: &'a PageView<'a>) -> Self {
        Self {
            rows: &page.rows,
            columns: page.columns,
            matcher: page.matcher,
            match_columns: &page.match_columns,
            marked_rows: Some(&page.mask),
            whole_row: page.whole_row,
        }
    }

    fn is_marked(&self, pos: usize) -> bool {
        self.marked_rows.is_none_or(|m| m.contains(&pos))
    }

    /// Render the table as an HTML fragment
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table class=\"preview\">\n");
        push_header(&mut out, self.columns);
        out.push_str("<tbody>\n");
        for (pos, row) in self.rows.iter().enumerate() {
            let marked = self.is_marked(pos);
            let row_hit = self.whole_row && marked && self.marked_rows.is_some();
            if row_hit {
                out.push_str("<tr class=\"hit\">");
            } else {
                out.push_str("<tr>");
            }
            for col in self.columns {
                let text = row.text(col);
                // Whole-row marking and span marking never mix within a row
                let matcher = if self.whole_row || !marked || !self.match_columns.contains(col) {
                    None
                } else {
                    self.matcher
                };
                let _ = write!(out, "<td>{}</td>", highlight_html(&text, matcher));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        out
    }
}

fn push_header(out: &mut String, columns: &[String]) {
    out.push_str("<thead><tr>");
    for col in columns {
        let _ = write!(out, "<th>{}</th>", escape_html(col));
    }
    out.push_str("</tr></thead>\n");
}

/// Plain escaped table without any marking
pub fn render_table_html(rows: &[&Row], columns: &[String]) -> String {
    let mut out = String::from("<table class=\"preview\">\n");
    push_header(&mut out, columns);
    out.push_str("<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        for col in columns {
            let _ = write!(out, "<td>{}</td>", escape_html(&row.text(col)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

const REPORT_STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#1f2933}\
table{border-collapse:collapse;margin-top:1rem}\
th,td{border:1px solid #cbd2d9;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#f0f4f8}\
tr.hit{background:#fff3c4}\
mark{background:#ffe066;padding:0 1px}\
.chip{display:inline-block;border-radius:12px;background:#e4e7eb;padding:2px 10px;margin:2px 4px 2px 0;font-family:monospace}\
.muted{color:#7b8794}";

fn chip(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<span class=\"chip\">{}: {}</span>",
        escape_html(label),
        escape_html(value)
    );
}

/// Standalone HTML page describing the current state
pub fn render_report_html(state: &ViewState) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    out.push_str("<title>sheetrx report</title>\n");
    let _ = writeln!(out, "<style>{}</style>", REPORT_STYLE);
    out.push_str("</head>\n<body>\n");

    match &state.upload {
        Some(upload) => {
            let _ = writeln!(
                out,
                "<h1>{}</h1>\n<p class=\"muted\">file {} &middot; {} columns &middot; {} preview rows{}</p>",
                escape_html(&upload.filename),
                escape_html(&upload.file_id.to_string()),
                upload.columns.len(),
                upload.head.len(),
                if upload.is_excel { " &middot; excel" } else { "" }
            );
        }
        None => out.push_str("<h1>No file uploaded</h1>\n"),
    }

    if let Some(view) = &state.result {
        let _ = writeln!(
            out,
            "<h2>{}</h2>\n<p>{}</p>",
            escape_html(&view.mode().to_string()),
            escape_html(&view.instruction)
        );
        out.push_str("<div class=\"chips\">");
        if let Some(p) = &view.pattern {
            chip(&mut out, "regex", p);
        }
        chip(&mut out, "flags", view.flags.as_deref().unwrap_or("i"));
        if let Some(src) = &view.pattern_source {
            chip(&mut out, "source", src);
        }
        if let Some(d) = &view.display_pattern {
            chip(&mut out, "display", d);
        }
        if let Some(intent) = &view.intent {
            chip(&mut out, "intent", &intent.intent.to_string());
            if let Some(rep) = &intent.replacement {
                chip(&mut out, "replacement", rep);
            }
        }
        if !view.row_filter.is_empty() {
            chip(&mut out, "row filter", &view.row_filter);
        }
        out.push_str("</div>\n");

        match &view.result {
            ExecutionResult::Find(find) => {
                let _ = writeln!(
                    out,
                    "<p>{} matches in {} rows</p>",
                    find.stats.total_matches,
                    view.result_rows_count.unwrap_or(find.stats.rows_with_hits)
                );
                if !find.stats.per_column.is_empty() {
                    out.push_str("<ul>");
                    for (col, n) in &find.stats.per_column {
                        let _ = write!(out, "<li>{}: {}</li>", escape_html(col), n);
                    }
                    out.push_str("</ul>\n");
                }
            }
            ExecutionResult::Replace(replace) => {
                let _ = writeln!(out, "<p>{} replacements</p>", replace.replacements_count);
                if let Some(url) = &replace.download_url {
                    let label = replace.download_filename.as_deref().unwrap_or("Download CSV");
                    let _ = writeln!(
                        out,
                        "<p><a href=\"{}\">{}</a></p>",
                        escape_html(url),
                        escape_html(label)
                    );
                }
            }
        }
        if let Some(desc) = &view.result_rows_description {
            let _ = writeln!(out, "<p class=\"muted\">{}</p>", escape_html(desc));
        }
    }

    let page = state.page_view();
    let _ = writeln!(
        out,
        "<p class=\"muted\">page {} of {} &middot; {} rows</p>",
        page.page, page.page_count, page.total
    );
    out.push_str(&HighlightTable::from_page(&page).to_html());
    out.push_str("</body>\n</html>\n");
    out
}
