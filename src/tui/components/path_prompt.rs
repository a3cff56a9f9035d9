use crate::tui::components::centered_rect;
use crate::tui::components::text_input::TextInput;
use crate::tui::{Action, Component, RenderContext};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::path::PathBuf;

/// What the entered path will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PathPurpose {
    #[strum(to_string = "Upload file")]
    Upload,
    #[strum(to_string = "Save downloaded CSV")]
    Download,
    #[strum(to_string = "Export preview CSV")]
    Export,
    #[strum(to_string = "Save HTML report")]
    Report,
}

impl PathPurpose {
    pub fn default_path(&self) -> &'static str {
        match self {
            PathPurpose::Upload => "",
            PathPurpose::Download => "result.csv",
            PathPurpose::Export => "preview.csv",
            PathPurpose::Report => "report.html",
        }
    }
}

/// Modal path entry
pub struct PathPrompt {
    purpose: PathPurpose,
    input: TextInput,
    error: Option<String>,
    supported_actions: Vec<Action>,
}

impl PathPrompt {
    pub fn new(purpose: PathPurpose) -> Self {
        Self {
            purpose,
            input: TextInput::new(purpose.default_path()),
            error: None,
            supported_actions: vec![Action::Confirm, Action::Cancel],
        }
    }

    pub fn purpose(&self) -> PathPurpose {
        self.purpose
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let consumed = self.input.handle_key(key);
        if consumed {
            self.error = None;
        }
        consumed
    }

    /// The entered path, or an inline error when blank or missing on upload
    pub fn submit(&mut self) -> Option<PathBuf> {
        let text = self.input.text().trim();
        if text.is_empty() {
            self.error = Some("Enter a path".to_string());
            return None;
        }
        let path = PathBuf::from(text);
        if self.purpose == PathPurpose::Upload && !path.is_file() {
            self.error = Some(format!("No such file: {}", text));
            return None;
        }
        Some(path)
    }
}

impl Component for PathPrompt {
    /// Confirm and cancel are resolved by the owner, which reads `submit`
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let rect = centered_rect(60, 7, area);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .title(format!(" {} ", self.purpose))
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme.focused_border_style());

        let mut lines = vec![
            Line::from(Span::styled("Path:", theme.header_style())),
            self.input
                .line(theme.normal_style(), theme.selected_style(), true),
            Line::default(),
        ];
        match &self.error {
            Some(err) => lines.push(Line::from(Span::styled(err.clone(), theme.error_style()))),
            None => lines.push(Line::from(Span::styled(
                "Enter to confirm · Esc to cancel",
                theme.muted_style(),
            ))),
        }
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "PathPrompt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_upload_requires_existing_file() {
        let mut prompt = PathPrompt::new(PathPurpose::Upload);
        assert!(prompt.submit().is_none());
        assert_eq!(prompt.error.as_deref(), Some("Enter a path"));

        for c in "/definitely/missing.csv".chars() {
            prompt.handle_key(&KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert!(prompt.submit().is_none());
        assert!(prompt.error.as_deref().unwrap().starts_with("No such file"));

        let file = tempfile::NamedTempFile::new().unwrap();
        let mut prompt = PathPrompt::new(PathPurpose::Upload);
        prompt.input.set_text(file.path().to_str().unwrap());
        assert_eq!(prompt.submit(), Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_save_targets_have_defaults() {
        let mut prompt = PathPrompt::new(PathPurpose::Report);
        assert_eq!(prompt.submit(), Some(PathBuf::from("report.html")));
        assert_eq!(PathPurpose::Export.to_string(), "Export preview CSV");
    }
}
