//! Loaders for the `/:id` routes: the addressed record is placed in the
//! request extensions before the handler runs.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::i18n::Locale;
use crate::repository::RepositoryError;
use crate::services::ServiceError;
use crate::state::AppState;
use crate::types::Module;

const TRACING_TARGET_REQUEST: &str = "msaada_backend::middleware::request";

fn parse_id(params: &HashMap<String, String>, locale: &Locale) -> Result<i64, ApiError> {
    params
        .get("id")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(|| ApiError::bad_request(locale.err_invalid_id.clone()))
}

fn lookup_error(err: ServiceError, module: Module, locale: &Locale) -> ApiError {
    match err {
        ServiceError::Repository(RepositoryError::NotFound) => {
            ApiError::not_found(locale.not_found(module).to_string())
        }
        other => {
            tracing::error!(
                target: TRACING_TARGET_REQUEST,
                %module,
                error = %other,
                "record lookup failed"
            );
            ApiError::internal_server_error(locale.err_generic.clone())
        }
    }
}

pub async fn load_user(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, &locale)?;
    let user = state
        .users
        .get(id)
        .await
        .map_err(|e| lookup_error(e, Module::User, &locale))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn load_profile(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, &locale)?;
    let profile = state
        .profiles
        .get(id)
        .await
        .map_err(|e| lookup_error(e, Module::Profile, &locale))?;

    request.extensions_mut().insert(profile);
    Ok(next.run(request).await)
}

pub async fn load_product(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, &locale)?;
    let product = state
        .products
        .get(id)
        .await
        .map_err(|e| lookup_error(e, Module::Product, &locale))?;

    request.extensions_mut().insert(product);
    Ok(next.run(request).await)
}
