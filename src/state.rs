use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenKeys, TokenLifetimes};
use crate::config::AppConfig;
use crate::i18n::Translations;
use crate::middleware::ratelimit::RateLimiter;
use crate::repository::Repositories;
use crate::services::{AuthService, ProductService, ProfileService, UserService};

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub translations: Arc<Translations>,
    pub keys: Arc<TokenKeys>,
    pub limiter: Arc<RateLimiter>,
    pub repos: Repositories,
    pub auth: AuthService,
    pub users: UserService,
    pub profiles: ProfileService,
    pub products: ProductService,
    /// Present when backed by PostgreSQL; used by the health check.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        translations: Arc<Translations>,
        keys: Arc<TokenKeys>,
        repos: Repositories,
        db: Option<PgPool>,
    ) -> Self {
        let hasher = PasswordHasher::new();
        let lifetimes = TokenLifetimes::from_config(&config.security);
        let limiter = Arc::new(RateLimiter::new(
            config.api.rate_limit_requests,
            config.api.rate_limit_window_secs,
        ));

        Self {
            auth: AuthService::new(repos.users.clone(), keys.clone(), lifetimes, hasher),
            users: UserService::new(repos.users.clone(), hasher),
            profiles: ProfileService::new(repos.profiles.clone()),
            products: ProductService::new(repos.products.clone()),
            config,
            translations,
            keys,
            limiter,
            repos,
            db,
        }
    }
}
