pub mod auth;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod repository;
pub mod services;
pub mod state;
pub mod types;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::{
    lang, load_product, load_profile, load_user, rate_limit, require_access, require_module,
    require_refresh,
};
use crate::types::Module;

pub use crate::state::AppState;

/// Builds the complete HTTP application.
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .nest("/auth", auth_routes(&state))
        .nest("/user", user_routes(&state))
        .nest("/profile", profile_routes(&state))
        .nest("/product", product_routes(&state))
        .fallback(public::fallback);

    if api.enable_rate_limiting {
        router = router.layer(from_fn_with_state(state.clone(), rate_limit));
    }

    router = router
        .layer(from_fn_with_state(state.clone(), lang))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security.cors_origins));

    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(public::panic_response))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers(Any)
        .max_age(Duration::from_secs(1))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        post(public::login)
            .get(protected::auth::me.layer(from_fn_with_state(state.clone(), require_access)))
            .put(protected::auth::refresh.layer(from_fn_with_state(state.clone(), require_refresh))),
    )
}

/// Collection and item routes of a module, guarded by access token and permission.
fn guarded(state: &AppState, module: Module, collection: Router<AppState>, items: Router<AppState>) -> Router<AppState> {
    collection
        .merge(items)
        .route_layer(from_fn_with_state((state.clone(), module), require_module))
        .route_layer(from_fn_with_state(state.clone(), require_access))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use protected::user;

    let collection = Router::new().route("/", get(user::list).post(user::create));
    let items = Router::new()
        .route("/:id", get(user::get).put(user::update).delete(user::delete))
        .route("/:id/reset", patch(user::reset))
        .route_layer(from_fn_with_state(state.clone(), load_user));

    Router::new()
        .route("/:id/passw", patch(public::set_password))
        .merge(guarded(state, Module::User, collection, items))
}

fn profile_routes(state: &AppState) -> Router<AppState> {
    use protected::profile;

    let collection = Router::new().route("/", get(profile::list).post(profile::create));
    let items = Router::new()
        .route("/:id", get(profile::get).put(profile::update).delete(profile::delete))
        .route_layer(from_fn_with_state(state.clone(), load_profile));

    guarded(state, Module::Profile, collection, items)
}

fn product_routes(state: &AppState) -> Router<AppState> {
    use protected::product;

    let collection = Router::new().route("/", get(product::list).post(product::create));
    let items = Router::new()
        .route("/:id", get(product::get).put(product::update).delete(product::delete))
        .route_layer(from_fn_with_state(state.clone(), load_product));

    guarded(state, Module::Product, collection, items)
}
