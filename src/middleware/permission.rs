use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use super::extract::locale_of;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Module;

const TRACING_TARGET_PERMISSION: &str = "msaada_backend::middleware::permission";

/// Lets the request through when the user's profile grants `module`.
///
/// Runs inside [`require_access`](super::auth::require_access).
pub async fn require_module(
    State((state, module)): State<(AppState, Module)>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let allowed = request
        .extensions()
        .get::<AuthUser>()
        .and_then(|auth| auth.user.profile.as_ref())
        .is_some_and(|profile| profile.permissions.allows(module));

    if !allowed {
        let locale = locale_of(request.extensions(), &state);
        tracing::debug!(target: TRACING_TARGET_PERMISSION, %module, "module not granted to user");
        return Err(ApiError::forbidden(locale.err_permission_denied.clone()));
    }

    Ok(next.run(request).await)
}
