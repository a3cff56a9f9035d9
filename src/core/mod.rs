pub mod models;
pub mod pagination;
pub mod pattern;
pub mod resolve;
pub mod state;
pub mod types;

pub use models::{ExecuteRequest, ExecuteResponse, UploadResponse};
pub use pagination::{PageNav, Pager};
pub use state::{Confirmation, PageView, Preview, ResultView, StateEvent, ViewState};
pub use types::*;
