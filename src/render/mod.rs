pub mod highlight;
pub mod html;

pub use highlight::{Segment, escape_html, highlight_html, highlight_segments};
pub use html::{HighlightTable, render_report_html, render_table_html};
