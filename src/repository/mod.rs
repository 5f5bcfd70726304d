//! Persistence boundary for users, profiles and products.

pub mod memory;
pub mod product;
pub mod profile;
pub mod user;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::database::models::{Product, Profile, User};
use crate::filter::{Filter, FilterError, UserFilter};

pub use memory::MemoryStore;
pub use product::PgProductRepository;
pub use profile::PgProfileRepository;
pub use user::PgUserRepository;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNDEFINED_COLUMN: &str = "42703";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicated key: {0}")]
    DuplicatedKey(String),

    #[error("Foreign key violated: {0}")]
    ForeignKeyViolated(String),

    #[error("Undefined column: {0}")]
    UndefinedColumn(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned());
                let detail = db
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db.message().to_string());
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => RepositoryError::DuplicatedKey(detail),
                    Some(FOREIGN_KEY_VIOLATION) => RepositoryError::ForeignKeyViolated(detail),
                    Some(UNDEFINED_COLUMN) => RepositoryError::UndefinedColumn(db.message().to_string()),
                    _ => RepositoryError::Database(sqlx::Error::Database(db)),
                }
            }
            other => RepositoryError::Database(other),
        }
    }
}

impl From<FilterError> for RepositoryError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidColumn(column) => RepositoryError::UndefinedColumn(column),
            other => RepositoryError::InvalidQuery(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn count_products(&self, filter: &Filter) -> Result<i64, RepositoryError>;
    async fn get_products(&self, filter: &Filter) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product_by_id(&self, id: i64) -> Result<Product, RepositoryError>;
    async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError>;
    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError>;
    async fn delete_product(&self, product: &Product) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn count_profiles(&self, filter: &Filter) -> Result<i64, RepositoryError>;
    async fn get_profiles(&self, filter: &Filter) -> Result<Vec<Profile>, RepositoryError>;
    async fn get_profile_by_id(&self, id: i64) -> Result<Profile, RepositoryError>;
    async fn get_profile_by_name(&self, name: &str) -> Result<Profile, RepositoryError>;
    /// Stores the profile together with its permissions.
    async fn create_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError>;
    async fn update_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError>;
    /// Removes the profile and its permissions.
    async fn delete_profile(&self, profile: &Profile) -> Result<(), RepositoryError>;
}

/// Users are always returned with their profile and permissions loaded.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count_users(&self, filter: &UserFilter) -> Result<i64, RepositoryError>;
    async fn get_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError>;
    async fn get_user_by_id(&self, id: i64) -> Result<User, RepositoryError>;
    async fn get_user_by_mail(&self, mail: &str) -> Result<User, RepositoryError>;
    async fn get_user_by_token(&self, token: &str) -> Result<User, RepositoryError>;
    /// Inserts a user that has no password yet (`new` set, no token).
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError>;
    async fn update_user(&self, user: &User) -> Result<User, RepositoryError>;
    async fn delete_user(&self, user: &User) -> Result<(), RepositoryError>;
    /// Clears password and session token and marks the user as new.
    async fn reset_user_password(&self, user: &User) -> Result<(), RepositoryError>;
    /// Stores a password hash with a fresh session token and clears `new`.
    async fn set_user_password(&self, user: &User, token: &str, hash: &str) -> Result<(), RepositoryError>;
}

/// The repositories a running application works with.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool)),
        }
    }

    /// In-process store enforcing the same keys and references.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            profiles: Arc::new(store.clone()),
            products: Arc::new(store),
        }
    }
}
