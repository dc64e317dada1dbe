mod auth;
mod error_handler;
mod ownership;

pub use auth::{Authenticated, extract_token, resolve_identity};
pub use error_handler::log_errors;
pub use ownership::{authorize_creation, authorize_mutation};
