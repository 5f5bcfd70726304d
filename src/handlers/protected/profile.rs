use axum::extract::{Extension, State};

use crate::database::models::Profile;
use crate::dto::{ListItemsOutput, ProfileInput, ProfileOutput};
use crate::handlers::{service_error, Operation};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, ListFilter, Payload};
use crate::state::AppState;
use crate::types::Module;

/// GET /profile
pub async fn list(
    State(state): State<AppState>,
    locale: Locale,
    ListFilter(filter): ListFilter,
) -> ApiResult<ListItemsOutput<ProfileOutput>> {
    state
        .profiles
        .list(&filter)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::Profile, Operation::Read, &locale))
}

/// POST /profile
pub async fn create(
    State(state): State<AppState>,
    locale: Locale,
    Payload(input): Payload<ProfileInput>,
) -> ApiResult<ProfileOutput> {
    state
        .profiles
        .create(&input)
        .await
        .map(ApiResponse::created)
        .map_err(|e| service_error(e, Module::Profile, Operation::Write, &locale))
}

/// GET /profile/:id
pub async fn get(Extension(profile): Extension<Profile>) -> ApiResult<ProfileOutput> {
    Ok(ApiResponse::success(ProfileOutput::from(&profile)))
}

/// PUT /profile/:id
pub async fn update(
    State(state): State<AppState>,
    locale: Locale,
    Extension(profile): Extension<Profile>,
    Payload(input): Payload<ProfileInput>,
) -> ApiResult<ProfileOutput> {
    state
        .profiles
        .update(&profile, &input)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::Profile, Operation::Write, &locale))
}

/// DELETE /profile/:id - refused while users still hold the profile
pub async fn delete(
    State(state): State<AppState>,
    locale: Locale,
    Extension(profile): Extension<Profile>,
) -> ApiResult<()> {
    state
        .profiles
        .delete(&profile)
        .await
        .map(|()| ApiResponse::<()>::no_content())
        .map_err(|e| service_error(e, Module::Profile, Operation::Delete, &locale))
}
