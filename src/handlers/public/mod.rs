// handlers/public/mod.rs - endpoints reachable without a token

pub mod auth;
pub mod password;
pub mod system;

pub use auth::login;
pub use password::set_password;
pub use system::{fallback, health, panic_response, root};
