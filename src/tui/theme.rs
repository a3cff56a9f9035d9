use crate::config::ThemeName;
use crate::core::types::ToastLevel;
use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the terminal front end
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub row_alt_bg: Color,

    // Regex matches and changed rows
    pub mark_fg: Color,
    pub mark_bg: Color,
    pub hit_row_bg: Color,
    pub chip_fg: Color,
    pub chip_bg: Color,

    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            header_fg: Color::Cyan,
            header_bg: Color::Reset,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            row_alt_bg: Color::Rgb(25, 25, 35),
            mark_fg: Color::Black,
            mark_bg: Color::Yellow,
            hit_row_bg: Color::Rgb(60, 52, 20),
            chip_fg: Color::White,
            chip_bg: Color::Rgb(50, 55, 70),
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Blue,
            header_fg: Color::Blue,
            header_bg: Color::Rgb(240, 240, 240),
            selected_fg: Color::White,
            selected_bg: Color::Blue,
            row_alt_bg: Color::Rgb(250, 250, 250),
            mark_fg: Color::Black,
            mark_bg: Color::Rgb(255, 224, 102),
            hit_row_bg: Color::Rgb(255, 243, 196),
            chip_fg: Color::Black,
            chip_bg: Color::Rgb(228, 231, 235),
            success: Color::Green,
            error: Color::Red,
            warning: Color::Rgb(200, 150, 0),
            info: Color::Blue,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn alt_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.row_alt_bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// A regex match inside a cell
    pub fn mark_style(&self) -> Style {
        Style::default()
            .fg(self.mark_fg)
            .bg(self.mark_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// A row changed by a replace
    pub fn hit_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.hit_row_bg)
    }

    pub fn chip_style(&self) -> Style {
        Style::default().fg(self.chip_fg).bg(self.chip_bg)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }

    pub fn toast_style(&self, level: ToastLevel) -> Style {
        match level {
            ToastLevel::Info => self.info_style(),
            ToastLevel::Success => self.success_style(),
            ToastLevel::Warning => self.warning_style(),
            ToastLevel::Error => self.error_style(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_themes() {
        assert_eq!(Theme::from_name(ThemeName::Dark).name, "Dark");
        assert_eq!(Theme::from_name(ThemeName::Light).background, Color::White);
    }

    #[test]
    fn test_mark_differs_from_hit_row() {
        let theme = Theme::default();
        assert!(theme.mark_style().add_modifier.contains(Modifier::BOLD));
        assert_ne!(theme.mark_style().bg, theme.hit_row_style().bg);
    }

    #[test]
    fn test_toast_styles_follow_level() {
        let theme = Theme::light();
        assert_eq!(theme.toast_style(ToastLevel::Error).fg, Some(theme.error));
        assert_eq!(theme.toast_style(ToastLevel::Warning).fg, Some(theme.warning));
    }
}
