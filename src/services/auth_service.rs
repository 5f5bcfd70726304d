use std::sync::Arc;

use thiserror::Error;

use crate::auth::{Claims, JwtError, PasswordError, PasswordHasher, TokenKeys, TokenKind, TokenLifetimes};
use crate::database::models::User;
use crate::dto::{AuthInput, AuthOutput, UserOutput};
use crate::repository::{RepositoryError, UserRepository};

const TRACING_TARGET_AUTH: &str = "msaada_backend::services::auth";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("User is disabled or has no password yet")]
    DisabledUser,

    #[error("User has no session token")]
    MissingSessionToken,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Password(PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

/// Issues and renews token pairs.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: Arc<TokenKeys>,
    lifetimes: TokenLifetimes,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        keys: Arc<TokenKeys>,
        lifetimes: TokenLifetimes,
        hasher: PasswordHasher,
    ) -> Self {
        Self { users, keys, lifetimes, hasher }
    }

    pub async fn login(&self, credentials: &AuthInput, ip: &str) -> Result<AuthOutput, AuthError> {
        let user = self
            .users
            .get_user_by_mail(&credentials.login)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        let hash = user.password.as_deref().ok_or(AuthError::IncorrectPassword)?;
        self.hasher
            .verify_password(&credentials.password, hash)
            .map_err(|e| match e {
                PasswordError::Mismatch | PasswordError::InvalidHash(_) => AuthError::IncorrectPassword,
                other => AuthError::Password(other),
            })?;

        if !user.can_login() {
            return Err(AuthError::DisabledUser);
        }

        tracing::info!(
            target: TRACING_TARGET_AUTH,
            user_id = user.id,
            expire = credentials.expire,
            "session opened"
        );
        self.issue(&user, credentials.expire, ip)
    }

    pub fn me(&self, user: &User) -> UserOutput {
        UserOutput::from_user(user, true)
    }

    /// New token pair keeping the expiry policy of the presented token.
    pub fn refresh(&self, user: &User, expire: bool, ip: &str) -> Result<AuthOutput, AuthError> {
        self.issue(user, expire, ip)
    }

    fn issue(&self, user: &User, expire: bool, ip: &str) -> Result<AuthOutput, AuthError> {
        let token = user.token.as_deref().ok_or(AuthError::MissingSessionToken)?;
        let lifetimes = self.lifetimes.for_session(expire);

        let access = Claims::new(token, ip, lifetimes.access);
        let refresh = Claims::new(token, ip, lifetimes.refresh);

        Ok(AuthOutput {
            user: Some(self.me(user)),
            accesstoken: self.keys.sign(TokenKind::Access, &access)?,
            refreshtoken: self.keys.sign(TokenKind::Refresh, &refresh)?,
        })
    }
}
