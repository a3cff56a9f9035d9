pub mod api_client;
pub mod session;

pub use api_client::{ApiClient, ApiConfig, ApiError};
pub use session::Session;
