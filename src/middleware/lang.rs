use axum::{
    async_trait,
    extract::{FromRequestParts, Query, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::i18n::Locale;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Attaches the translation chosen by `?lang=` to the request.
pub async fn lang(
    State(state): State<AppState>,
    query: Option<Query<LangQuery>>,
    mut req: Request,
    next: Next,
) -> Response {
    let requested = query.and_then(|Query(q)| q.lang);
    let locale = state.translations.resolve(requested.as_deref());
    req.extensions_mut().insert(locale);
    next.run(req).await
}

#[async_trait]
impl FromRequestParts<AppState> for Locale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Locale>()
            .cloned()
            .unwrap_or_else(|| state.translations.default_locale()))
    }
}
