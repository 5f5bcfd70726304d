use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use super::extract::ClientIp;
use crate::auth::{JwtError, TokenKind};
use crate::database::models::User;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::repository::RepositoryError;
use crate::state::AppState;

const TRACING_TARGET_AUTH: &str = "msaada_backend::middleware::auth";

/// The user a valid bearer token belongs to.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    /// Expiry policy recorded in the presented token.
    pub expire: bool,
}

/// Requires a valid access token.
pub async fn require_access(
    State(state): State<AppState>,
    locale: Locale,
    client: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(TokenKind::Access, &state, &locale, client, request, next).await
}

/// Requires a valid refresh token.
pub async fn require_refresh(
    State(state): State<AppState>,
    locale: Locale,
    client: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(TokenKind::Refresh, &state, &locale, client, request, next).await
}

async fn authorize(
    kind: TokenKind,
    state: &AppState,
    locale: &Locale,
    ClientIp(ip): ClientIp,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let invalid = || ApiError::unauthorized(locale.err_invalid_token.clone());

    let token = extract_bearer(request.headers()).ok_or_else(invalid)?;

    let claims = state.keys.verify(kind, token).map_err(|e| match e {
        JwtError::Expired => ApiError::unauthorized(locale.err_expired_token.clone()),
        other => {
            tracing::debug!(target: TRACING_TARGET_AUTH, error = %other, "token rejected");
            invalid()
        }
    })?;

    let user = state
        .repos
        .users
        .get_user_by_token(&claims.token)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => invalid(),
            other => {
                tracing::error!(target: TRACING_TARGET_AUTH, error = %other, "user lookup failed");
                ApiError::internal_server_error(locale.err_generic.clone())
            }
        })?;

    if claims.ip != ip.to_string() {
        tracing::warn!(
            target: TRACING_TARGET_AUTH,
            user_id = user.id,
            token_ip = %claims.ip,
            client_ip = %ip,
            "token presented from another address"
        );
        return Err(ApiError::unauthorized(locale.err_invalid_ip_association.clone()));
    }

    if !user.status {
        return Err(ApiError::unauthorized(locale.err_disabled_user.clone()));
    }

    request.extensions_mut().insert(AuthUser {
        user,
        expire: claims.expire,
    });
    Ok(next.run(request).await)
}

/// Token of an `Authorization: Bearer <token>` header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
