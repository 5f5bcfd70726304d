use axum::extract::{Path, State};

use crate::dto::PasswordInput;
use crate::error::ApiError;
use crate::handlers::{service_error, Operation};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::repository::RepositoryError;
use crate::services::ServiceError;
use crate::state::AppState;
use crate::types::Module;

/// PATCH /user/:mail/passw - a new user chooses their first password
pub async fn set_password(
    State(state): State<AppState>,
    locale: Locale,
    Path(mail): Path<String>,
    Payload(input): Payload<PasswordInput>,
) -> ApiResult<()> {
    let user = state.users.get_by_mail(&mail).await.map_err(|e| match e {
        ServiceError::Repository(RepositoryError::NotFound) => {
            ApiError::not_found(locale.err_user_not_found.clone())
        }
        other => service_error(other, Module::User, Operation::Read, &locale),
    })?;

    state
        .users
        .set_password(&user, &input)
        .await
        .map_err(|e| service_error(e, Module::User, Operation::Write, &locale))?;

    Ok(ApiResponse::success(()))
}
