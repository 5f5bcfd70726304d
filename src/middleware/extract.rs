use std::net::{IpAddr, SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{request::Parts, Extensions},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::i18n::Locale;
use crate::state::AppState;

const TRACING_TARGET_EXTRACT: &str = "msaada_backend::middleware::extract";

/// The request's locale, or the default one when the lang layer did not run.
pub(crate) fn locale_of(extensions: &Extensions, state: &AppState) -> Locale {
    extensions
        .get::<Locale>()
        .cloned()
        .unwrap_or_else(|| state.translations.default_locale())
}

/// JSON body whose rejection is reported as localized invalid data.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for Payload<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let locale = locale_of(req.extensions(), state);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                tracing::debug!(
                    target: TRACING_TARGET_EXTRACT,
                    error = %rejection.body_text(),
                    "rejected request body"
                );
                Err(ApiError::bad_request(locale.err_invalid_datas.clone()))
            }
        }
    }
}

/// Address of the TCP peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl FromRequestParts<AppState> for ClientIp {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Ok(ClientIp(addr.ip())),
            None => {
                tracing::error!(target: TRACING_TARGET_EXTRACT, "connection info missing from request");
                Err(ApiError::internal_server_error(
                    locale_of(&parts.extensions, state).err_generic.clone(),
                ))
            }
        }
    }
}
