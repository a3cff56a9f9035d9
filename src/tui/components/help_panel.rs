use crate::tui::action::ActionCategory;
use crate::tui::components::centered_rect;
use crate::tui::{Action, Component, KeyBindings, RenderContext};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

/// Key reference overlay, grouped by category
pub struct HelpPanel {
    visible: bool,
    supported_actions: Vec<Action>,
}

impl Default for HelpPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// `(category, [(keys, description)])` for every action
pub fn help_sections(keys: &KeyBindings) -> Vec<(ActionCategory, Vec<(String, &'static str)>)> {
    ActionCategory::all()
        .into_iter()
        .map(|category| {
            let entries = Action::all()
                .into_iter()
                .filter(|a| a.category() == category)
                .map(|a| (keys.get_keys_for_action(a).join(" / "), a.description()))
                .collect();
            (category, entries)
        })
        .collect()
}

impl HelpPanel {
    pub fn new() -> Self {
        Self {
            visible: false,
            supported_actions: vec![Action::ToggleHelp, Action::Cancel],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Component for HelpPanel {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
                Ok(true)
            }
            Action::Cancel if self.visible => {
                self.visible = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        if !self.visible {
            return;
        }
        let theme = ctx.theme;
        let mut lines = Vec::new();
        for (category, entries) in help_sections(ctx.keybindings) {
            lines.push(Line::from(Span::styled(category.to_string(), theme.header_style())));
            for (keys, desc) in entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<18}", keys), theme.info_style()),
                    Span::raw(desc),
                ]));
            }
            lines.push(Line::default());
        }
        let height = (lines.len() as u16 + 2).min(area.height);
        let rect = centered_rect(60, height, area);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(theme.focused_border_style()),
            ),
            rect,
        );
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "HelpPanel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_cover_all_actions() {
        let sections = help_sections(&KeyBindings::default());
        let total: usize = sections.iter().map(|(_, e)| e.len()).sum();
        assert_eq!(total, Action::all().len());
        let requests = &sections[0];
        assert_eq!(requests.0, ActionCategory::Requests);
        assert!(requests.1.iter().any(|(k, d)| k == "o / Ctrl+o" && *d == "Upload a file"));
    }

    #[test]
    fn test_toggle_and_cancel() {
        let mut help = HelpPanel::new();
        assert!(!help.handle_action(Action::Cancel).unwrap());
        help.handle_action(Action::ToggleHelp).unwrap();
        assert!(help.is_visible());
        assert!(help.handle_action(Action::Cancel).unwrap());
        assert!(!help.is_visible());
    }
}
