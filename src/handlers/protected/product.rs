use axum::extract::{Extension, State};

use crate::database::models::Product;
use crate::dto::{ListItemsOutput, ProductInput, ProductOutput};
use crate::handlers::{service_error, Operation};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, ListFilter, Payload};
use crate::state::AppState;
use crate::types::Module;

/// GET /product
pub async fn list(
    State(state): State<AppState>,
    locale: Locale,
    ListFilter(filter): ListFilter,
) -> ApiResult<ListItemsOutput<ProductOutput>> {
    state
        .products
        .list(&filter)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::Product, Operation::Read, &locale))
}

/// POST /product
pub async fn create(
    State(state): State<AppState>,
    locale: Locale,
    Payload(input): Payload<ProductInput>,
) -> ApiResult<ProductOutput> {
    state
        .products
        .create(&input)
        .await
        .map(ApiResponse::created)
        .map_err(|e| service_error(e, Module::Product, Operation::Write, &locale))
}

/// GET /product/:id
pub async fn get(Extension(product): Extension<Product>) -> ApiResult<ProductOutput> {
    Ok(ApiResponse::success(ProductOutput::from(&product)))
}

/// PUT /product/:id
pub async fn update(
    State(state): State<AppState>,
    locale: Locale,
    Extension(product): Extension<Product>,
    Payload(input): Payload<ProductInput>,
) -> ApiResult<ProductOutput> {
    state
        .products
        .update(&product, &input)
        .await
        .map(ApiResponse::success)
        .map_err(|e| service_error(e, Module::Product, Operation::Write, &locale))
}

/// DELETE /product/:id
pub async fn delete(
    State(state): State<AppState>,
    locale: Locale,
    Extension(product): Extension<Product>,
) -> ApiResult<()> {
    state
        .products
        .delete(&product)
        .await
        .map(|()| ApiResponse::<()>::no_content())
        .map_err(|e| service_error(e, Module::Product, Operation::Delete, &locale))
}
