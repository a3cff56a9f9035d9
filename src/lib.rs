pub mod config;
pub mod core;
pub mod logging;
pub mod render;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use crate::core::{ExecuteRequest, ExecuteResponse, ResultMode, StateEvent, ViewState};
pub use services::{ApiClient, ApiConfig, ApiError, Session};
pub use tui::{Action, ActionCategory, App};
