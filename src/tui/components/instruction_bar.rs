use crate::core::state::BusyKind;
use crate::tui::components::text_input::TextInput;
use crate::tui::{Action, Component, Focusable, RenderContext};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const PLACEHOLDER: &str = "e.g. find email addresses in the contact column";

/// The natural-language instruction editor
pub struct InstructionBar {
    input: TextInput,
    focused: bool,
    supported_actions: Vec<Action>,
}

impl Default for InstructionBar {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionBar {
    pub fn new() -> Self {
        Self {
            input: TextInput::default(),
            focused: false,
            supported_actions: vec![Action::Cancel],
        }
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.input.set_text(text);
    }

    /// Raw key input while focused; returns true if the key was consumed
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        self.focused && self.input.handle_key(key)
    }
}

impl Component for InstructionBar {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Cancel if self.focused => {
                self.focused = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let mut title = vec![Span::raw(" Instruction ")];
        match ctx.state.busy_kind() {
            Some(BusyKind::Execute) => title.push(Span::styled("running… ", theme.info_style())),
            Some(BusyKind::Upload) => title.push(Span::styled("uploading… ", theme.info_style())),
            None => {}
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });

        let line = if self.input.text().is_empty() && !self.focused {
            Line::from(Span::styled(PLACEHOLDER, theme.muted_style()))
        } else {
            self.input
                .line(theme.normal_style(), theme.selected_style(), self.focused)
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "InstructionBar"
    }
}

impl Focusable for InstructionBar {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
