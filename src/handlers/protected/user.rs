use axum::extract::{Extension, State};

use crate::database::models::User;
use crate::dto::{ListItemsOutput, UserInput, UserOutput};
use crate::handlers::{service_error, Operation};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, Payload, UserListFilter};
use crate::state::AppState;
use crate::types::Module;

/// GET /user
pub async fn list(
    State(state): State<AppState>,
    locale: Locale,
    UserListFilter(filter): UserListFilter,
) -> ApiResult<ListItemsOutput<UserOutput>> {
    state
        .users
        .list(&filter)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::User, Operation::Read, &locale))
}

/// POST /user - created without a password; the user sets it through `/user/:mail/passw`
pub async fn create(
    State(state): State<AppState>,
    locale: Locale,
    Payload(input): Payload<UserInput>,
) -> ApiResult<UserOutput> {
    state
        .users
        .create(&input)
        .await
        .map(ApiResponse::created)
        .map_err(|e| service_error(e, Module::User, Operation::Write, &locale))
}

/// GET /user/:id
pub async fn get(Extension(user): Extension<User>) -> ApiResult<UserOutput> {
    Ok(ApiResponse::success(UserOutput::from(&user)))
}

/// PUT /user/:id
pub async fn update(
    State(state): State<AppState>,
    locale: Locale,
    Extension(user): Extension<User>,
    Payload(input): Payload<UserInput>,
) -> ApiResult<UserOutput> {
    state
        .users
        .update(&user, &input)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::User, Operation::Write, &locale))
}

/// DELETE /user/:id
pub async fn delete(
    State(state): State<AppState>,
    locale: Locale,
    Extension(user): Extension<User>,
) -> ApiResult<()> {
    state
        .users
        .delete(&user)
        .await
        .map(|()| ApiResponse::<()>::no_content())
        .map_err(|e| service_error(e, Module::User, Operation::Delete, &locale))
}

/// PATCH /user/:id/reset - forget the password so the user picks a new one
pub async fn reset(
    State(state): State<AppState>,
    locale: Locale,
    Extension(user): Extension<User>,
) -> ApiResult<()> {
    state
        .users
        .reset_password(&user)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::User, Operation::Write, &locale))
}
