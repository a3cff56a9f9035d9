use crate::core::state::Confirmation;
use crate::tui::components::centered_rect;
use crate::tui::{Action, Component, RenderContext};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

/// Outcome of a key press inside the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Accept,
    Decline,
}

/// Modal yes/no prompt for a pending [`Confirmation`]
pub struct ConfirmDialog {
    supported_actions: Vec<Action>,
    choice: Option<ConfirmChoice>,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self {
            supported_actions: vec![Action::Confirm, Action::Cancel],
            choice: None,
        }
    }

    /// The choice made by the last handled action, if any
    pub fn take_choice(&mut self) -> Option<ConfirmChoice> {
        self.choice.take()
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext, pending: Confirmation) {
        let theme = ctx.theme;
        let rect = centered_rect(50, 7, area);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme.warning_style());
        let lines = vec![
            Line::from(pending.prompt()),
            Line::default(),
            Line::from(vec![
                Span::styled("[y/Enter] ", theme.success_style()),
                Span::raw("enable   "),
                Span::styled("[n/Esc] ", theme.error_style()),
                Span::raw("keep off"),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            rect,
        );
    }
}

impl Component for ConfirmDialog {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        self.choice = match action {
            Action::Confirm => Some(ConfirmChoice::Accept),
            Action::Cancel => Some(ConfirmChoice::Decline),
            _ => return Ok(false),
        };
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        if let Some(pending) = ctx.state.pending_confirmation {
            self.draw(frame, area, ctx, pending);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "ConfirmDialog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_is_taken_once() {
        let mut dialog = ConfirmDialog::new();
        assert!(dialog.handle_action(Action::Confirm).unwrap());
        assert_eq!(dialog.take_choice(), Some(ConfirmChoice::Accept));
        assert_eq!(dialog.take_choice(), None);
        assert!(dialog.handle_action(Action::Cancel).unwrap());
        assert_eq!(dialog.take_choice(), Some(ConfirmChoice::Decline));
        assert!(!dialog.handle_action(Action::NextPage).unwrap());
    }
}
