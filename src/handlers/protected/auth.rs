use axum::extract::{Extension, State};

use crate::dto::{AuthOutput, UserOutput};
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ClientIp};
use crate::state::AppState;

const TRACING_TARGET_REFRESH: &str = "msaada_backend::handlers::refresh";

/// GET /auth - the authenticated user with their permissions
pub async fn me(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<UserOutput> {
    Ok(ApiResponse::success(state.auth.me(&auth.user)))
}

/// PUT /auth - new token pair from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    locale: Locale,
    ClientIp(ip): ClientIp,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<AuthOutput> {
    state
        .auth
        .refresh(&auth.user, auth.expire, &ip.to_string())
        .map(ApiResponse::success)
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_REFRESH,
                user_id = auth.user.id,
                error = %e,
                "token refresh failed"
            );
            ApiError::internal_server_error(locale.err_generic.clone())
        })
}
