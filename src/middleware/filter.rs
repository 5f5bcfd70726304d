use axum::{async_trait, extract::FromRequestParts, extract::Query, http::request::Parts};
use serde::Deserialize;

use super::extract::locale_of;
use crate::error::ApiError;
use crate::filter::{Filter, UserFilter};
use crate::state::AppState;

const TRACING_TARGET_FILTER: &str = "msaada_backend::middleware::filter";

/// `search`, `page`, `limit`, `order` and `sort` from the query string.
#[derive(Debug, Clone)]
pub struct ListFilter(pub Filter);

/// [`ListFilter`] plus the `profile_id` narrowing of the user list.
#[derive(Debug, Clone)]
pub struct UserListFilter(pub UserFilter);

#[derive(Debug, Default, Deserialize)]
struct ProfileScope {
    profile_id: Option<i64>,
}

fn parse<T: serde::de::DeserializeOwned>(parts: &Parts, state: &AppState) -> Result<T, ApiError> {
    Query::<T>::try_from_uri(&parts.uri)
        .map(|Query(value)| value)
        .map_err(|rejection| {
            tracing::debug!(
                target: TRACING_TARGET_FILTER,
                error = %rejection.body_text(),
                "rejected list parameters"
            );
            ApiError::bad_request(locale_of(&parts.extensions, state).err_invalid_datas.clone())
        })
}

fn parse_filter(parts: &Parts, state: &AppState) -> Result<Filter, ApiError> {
    let mut filter: Filter = parse(parts, state)?;
    let settings = &state.config.filter;

    let requested = filter.limit;
    if filter.cap_limit(settings.max_limit) && settings.debug_logging {
        tracing::warn!(
            target: TRACING_TARGET_FILTER,
            requested = ?requested,
            max_limit = ?settings.max_limit,
            "list limit capped"
        );
    }
    Ok(filter)
}

#[async_trait]
impl FromRequestParts<AppState> for ListFilter {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ListFilter(parse_filter(parts, state)?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserListFilter {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let filter = parse_filter(parts, state)?;
        let scope: ProfileScope = parse(parts, state)?;

        Ok(UserListFilter(UserFilter {
            filter,
            profile_id: scope.profile_id,
        }))
    }
}
