pub mod confirm_dialog;
pub mod help_panel;
pub mod instruction_bar;
pub mod path_prompt;
pub mod regex_chips;
pub mod results_table;
pub mod text_input;
pub mod toast_stack;

pub use confirm_dialog::{ConfirmChoice, ConfirmDialog};
pub use help_panel::HelpPanel;
pub use instruction_bar::InstructionBar;
pub use path_prompt::{PathPrompt, PathPurpose};
pub use regex_chips::RegexChips;
pub use results_table::ResultsTable;
pub use text_input::TextInput;
pub use toast_stack::ToastStack;

use ratatui::layout::Rect;

/// Rectangle centered in `area`, `percent_w` wide and `height` rows tall
pub fn centered_rect(percent_w: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_w) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
