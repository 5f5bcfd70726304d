use std::any::Any;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const TRACING_TARGET_SYSTEM: &str = "msaada_backend::handlers::system";

/// GET / - service identification
pub async fn root(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": state.config.server.version,
        "environment": state.config.environment,
    })))
}

/// GET /health - 503 when the database does not answer
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    let Some(pool) = &state.db else {
        return ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "memory",
        }))
        .into_response();
    };

    match DatabaseManager::health_check(pool).await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok",
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(target: TRACING_TARGET_SYSTEM, error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable",
                    }
                })),
            )
                .into_response()
        }
    }
}

/// Any route that is not registered.
pub async fn fallback(locale: Locale) -> ApiError {
    ApiError::not_found(locale.err_nonexistent_route.clone())
}

/// Turns a handler panic into a plain 500 response.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(target: TRACING_TARGET_SYSTEM, panic = %detail, "handler panicked");

    ApiError::internal_server_error("Internal server error").into_response()
}
