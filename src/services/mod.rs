pub mod auth;
pub mod users;

pub use auth::{AuthService, GoogleLogin};
pub use users::UserService;
