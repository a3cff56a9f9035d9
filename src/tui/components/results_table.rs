use crate::core::state::PageView;
use crate::render::highlight::{Segment, highlight_segments};
use crate::tui::{Action, Component, Focusable, RenderContext, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

/// Paged preview with match highlighting and a row cursor
pub struct ResultsTable {
    state: TableState,
    /// Rows on the page at the last render
    page_len: usize,
    focused: bool,
    supported_actions: Vec<Action>,
}

impl Default for ResultsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsTable {
    pub fn new() -> Self {
        Self {
            state: TableState::default().with_selected(Some(0)),
            page_len: 0,
            focused: true,
            supported_actions: vec![Action::MoveUp, Action::MoveDown],
        }
    }

    pub fn cursor(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    /// Back to the first row, e.g. after a page change
    pub fn reset_cursor(&mut self) {
        self.state = TableState::default().with_selected(Some(0));
    }

    fn move_up(&mut self) {
        let cur = self.cursor();
        self.state.select(Some(cur.saturating_sub(1)));
    }

    fn move_down(&mut self) {
        let cur = self.cursor();
        if cur + 1 < self.page_len {
            self.state.select(Some(cur + 1));
        }
    }

    fn cell_line<'a>(
        page: &PageView<'_>,
        pos: usize,
        column: &str,
        text: &'a str,
        theme: &Theme,
    ) -> Line<'a> {
        let matcher = if page.whole_row || !page.mask.contains(&pos) {
            None
        } else if page.match_columns.iter().any(|c| c == column) {
            page.matcher
        } else {
            None
        };
        let spans: Vec<Span<'a>> = highlight_segments(text, matcher)
            .into_iter()
            .map(|seg| match seg {
                Segment::Plain(s) => Span::raw(s),
                Segment::Hit(s) => Span::styled(s, theme.mark_style()),
            })
            .collect();
        Line::from(spans)
    }

    fn title(page: &PageView<'_>, page_size: usize) -> String {
        format!(
            " Preview · page {}/{} · {} rows · {}/page ",
            page.page, page.page_count, page.total, page_size
        )
    }
}

impl Component for ResultsTable {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => {
                self.move_up();
                Ok(true)
            }
            Action::MoveDown => {
                self.move_down();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let page = ctx.state.page_view();
        self.page_len = page.rows.len();
        if self.cursor() >= self.page_len {
            self.state.select(Some(self.page_len.saturating_sub(1)));
        }

        let block = Block::default()
            .title(Self::title(&page, ctx.state.pager.page_size()))
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });

        if page.columns.is_empty() {
            let hint = Paragraph::new(Line::from(Span::styled(
                "No file loaded. Press o to upload a CSV or Excel file.",
                theme.muted_style(),
            )))
            .block(block);
            frame.render_widget(hint, area);
            return;
        }

        let header = Row::new(page.columns.iter().map(|c| Cell::from(c.as_str())))
            .style(theme.header_style());

        let texts: Vec<Vec<String>> = page
            .rows
            .iter()
            .map(|row| page.columns.iter().map(|c| row.text(c)).collect())
            .collect();

        let rows: Vec<Row> = texts
            .iter()
            .enumerate()
            .map(|(pos, values)| {
                let cells: Vec<Cell> = page
                    .columns
                    .iter()
                    .zip(values)
                    .map(|(col, text)| Cell::from(Self::cell_line(&page, pos, col, text, theme)))
                    .collect();
                let style = if page.whole_row && page.mask.contains(&pos) {
                    theme.hit_row_style()
                } else if pos % 2 == 1 {
                    theme.alt_row_style()
                } else {
                    theme.normal_style()
                };
                Row::new(cells).style(style)
            })
            .collect();

        let widths = vec![Constraint::Fill(1); page.columns.len()];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme.selected_style());
        frame.render_stateful_widget(table, area, &mut self.state);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "ResultsTable"
    }
}

impl Focusable for ResultsTable {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
