use axum::extract::State;

use crate::dto::{AuthInput, AuthOutput};
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, ClientIp, Payload};
use crate::services::AuthError;
use crate::state::AppState;

const TRACING_TARGET_LOGIN: &str = "msaada_backend::handlers::login";

/// POST /auth - exchange credentials for an access/refresh token pair
pub async fn login(
    State(state): State<AppState>,
    locale: Locale,
    ClientIp(ip): ClientIp,
    Payload(credentials): Payload<AuthInput>,
) -> ApiResult<AuthOutput> {
    match state.auth.login(&credentials, &ip.to_string()).await {
        Ok(output) => Ok(ApiResponse::success(output)),
        Err(err) => Err(login_error(err, &locale)),
    }
}

fn login_error(err: AuthError, locale: &Locale) -> ApiError {
    match err {
        AuthError::UserNotFound => ApiError::unauthorized(locale.err_user_not_found.clone()),
        AuthError::IncorrectPassword => ApiError::unauthorized(locale.err_incorrect_password.clone()),
        AuthError::DisabledUser => ApiError::unauthorized(locale.err_disabled_user.clone()),
        other => {
            tracing::error!(target: TRACING_TARGET_LOGIN, error = %other, "login failed");
            ApiError::internal_server_error(locale.err_generic.clone())
        }
    }
}
