//! Business operations between the HTTP handlers and the repositories.

pub mod auth_service;
pub mod bootstrap;
pub mod product_service;
pub mod profile_service;
pub mod user_service;

use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::PasswordError;
use crate::repository::RepositoryError;

pub use auth_service::{AuthError, AuthService};
pub use product_service::ProductService;
pub use profile_service::ProfileService;
pub use user_service::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Password and confirmation are missing or differ")]
    PasswordMismatch,

    #[error("User already has a password")]
    UserHasPassword,
}
