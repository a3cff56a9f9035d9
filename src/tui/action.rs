use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a key can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Table navigation
    MoveUp,
    MoveDown,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    CyclePageSize,

    // Requests
    Upload,
    Execute,
    RemoveFile,
    Download,
    Export,
    SaveReport,

    // View
    ToggleHitsOnly,
    ToggleRegexInfo,
    ToggleAutoChain,
    ToggleHelp,
    FocusNext,

    // Application
    Quit,
    Confirm,
    Cancel,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move cursor up",
            Action::MoveDown => "Move cursor down",
            Action::FirstPage => "First page",
            Action::PrevPage => "Previous page",
            Action::NextPage => "Next page",
            Action::LastPage => "Last page",
            Action::CyclePageSize => "Cycle page size",
            Action::Upload => "Upload a file",
            Action::Execute => "Edit and run an instruction",
            Action::RemoveFile => "Remove the current file",
            Action::Download => "Download the replaced CSV",
            Action::Export => "Export preview rows to CSV",
            Action::SaveReport => "Save an HTML report",
            Action::ToggleHitsOnly => "Show only changed rows",
            Action::ToggleRegexInfo => "Show regex details",
            Action::ToggleAutoChain => "Toggle auto-chain",
            Action::ToggleHelp => "Toggle help",
            Action::FocusNext => "Switch focus",
            Action::Quit => "Quit",
            Action::Confirm => "Confirm",
            Action::Cancel => "Cancel",
        }
    }

    /// Grouping for the help panel
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::FirstPage
            | Action::PrevPage
            | Action::NextPage
            | Action::LastPage
            | Action::CyclePageSize => ActionCategory::Navigation,

            Action::Upload
            | Action::Execute
            | Action::RemoveFile
            | Action::Download
            | Action::Export
            | Action::SaveReport => ActionCategory::Requests,

            Action::ToggleHitsOnly
            | Action::ToggleRegexInfo
            | Action::ToggleAutoChain
            | Action::ToggleHelp
            | Action::FocusNext => ActionCategory::View,

            Action::Quit | Action::Confirm | Action::Cancel => ActionCategory::Application,
        }
    }

    pub fn all() -> Vec<Action> {
        vec![
            Action::MoveUp,
            Action::MoveDown,
            Action::FirstPage,
            Action::PrevPage,
            Action::NextPage,
            Action::LastPage,
            Action::CyclePageSize,
            Action::Upload,
            Action::Execute,
            Action::RemoveFile,
            Action::Download,
            Action::Export,
            Action::SaveReport,
            Action::ToggleHitsOnly,
            Action::ToggleRegexInfo,
            Action::ToggleAutoChain,
            Action::ToggleHelp,
            Action::FocusNext,
            Action::Quit,
            Action::Confirm,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionCategory {
    Navigation,
    Requests,
    View,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 4] {
        [
            ActionCategory::Requests,
            ActionCategory::Navigation,
            ActionCategory::View,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Requests => write!(f, "Requests"),
            ActionCategory::View => write!(f, "View"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}
