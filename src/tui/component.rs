use crate::core::state::ViewState;
use crate::tui::action::Action;
use crate::tui::keybindings::KeyBindings;
use crate::tui::theme::Theme;
use color_eyre::Result;
use ratatui::{Frame, layout::Rect};

/// Read-only view of the application handed to components while rendering
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub state: &'a ViewState,
    pub theme: &'a Theme,
    pub keybindings: &'a KeyBindings,
}

/// Base trait for all TUI components
pub trait Component {
    /// Handle an action
    ///
    /// Returns Ok(true) if the action was consumed, Ok(false) if it should
    /// propagate to the next handler.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Render within `area`
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderContext);

    /// Actions this component responds to
    fn supported_actions(&self) -> &[Action];

    fn name(&self) -> &str;

    /// Called on every tick
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that take keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
