#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use msaada_backend::auth::{PasswordHasher, TokenKeys};
use msaada_backend::config::{AdminConfig, AppConfig};
use msaada_backend::database::models::{Permissions, Profile, User};
use msaada_backend::i18n::Translations;
use msaada_backend::repository::Repositories;
use msaada_backend::services::bootstrap;
use msaada_backend::{app, AppState};

pub const ADMIN_MAIL: &str = "admin@msaada.test";
pub const ADMIN_PASSWORD: &str = "admin-pass-123";

const ACCESS_PRIVATE: &[u8] = include_bytes!("../fixtures/access_private.pem");
const ACCESS_PUBLIC: &[u8] = include_bytes!("../fixtures/access_public.pem");
const REFRESH_PRIVATE: &[u8] = include_bytes!("../fixtures/refresh_private.pem");
const REFRESH_PUBLIC: &[u8] = include_bytes!("../fixtures/refresh_public.pem");

pub fn token_keys() -> TokenKeys {
    TokenKeys::from_pem(ACCESS_PRIVATE, ACCESS_PUBLIC, REFRESH_PRIVATE, REFRESH_PUBLIC)
        .expect("fixture keys are valid")
}

/// Configuration used by the test servers: rate limiting off, quiet logs.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config.api.enable_request_logging = false;
    config.filter.debug_logging = false;
    config.admin = AdminConfig {
        name: "Administrator".to_string(),
        mail: ADMIN_MAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    config
}

/// An application served in-process on a free local port, backed by the
/// in-memory repositories.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(test_config()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let translations = Translations::load(&config.i18n).context("loading translations")?;
        let state = AppState::new(
            config,
            Arc::new(translations),
            Arc::new(token_keys()),
            Repositories::memory(),
            None,
        );

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            state,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Creates the ROOT profile and the administrator.
    pub async fn seed_defaults(&self) -> Result<User> {
        let admin = self.state.config.admin.clone();
        bootstrap::create_defaults(&self.state.repos, &admin, &PasswordHasher::new())
            .await
            .context("creating defaults")
    }

    /// Logs in and returns the raw response.
    pub async fn login_response(&self, mail: &str, password: &str, expire: bool) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/auth"))
            .json(&json!({ "login": mail, "password": password, "expire": expire }))
            .send()
            .await?)
    }

    /// Access and refresh token of a successful login.
    pub async fn login(&self, mail: &str, password: &str, expire: bool) -> Result<(String, String)> {
        let res = self.login_response(mail, password, expire).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        let access = body["data"]["accesstoken"].as_str().context("no access token")?;
        let refresh = body["data"]["refreshtoken"].as_str().context("no refresh token")?;
        Ok((access.to_string(), refresh.to_string()))
    }

    /// Seeds the defaults and returns an administrator access token.
    pub async fn admin_token(&self) -> Result<String> {
        self.seed_defaults().await?;
        Ok(self.login(ADMIN_MAIL, ADMIN_PASSWORD, false).await?.0)
    }

    /// A user with a password whose profile carries `permissions`.
    pub async fn user_with(&self, mail: &str, password: &str, permissions: Permissions) -> Result<User> {
        let repos = &self.state.repos;
        let profile = repos
            .profiles
            .create_profile(&Profile {
                name: format!("Profile for {}", mail),
                permissions,
                ..Profile::default()
            })
            .await?;
        let user = repos
            .users
            .create_user(&User {
                name: "Test Person".to_string(),
                mail: mail.to_string(),
                status: true,
                profile_id: profile.id,
                ..User::default()
            })
            .await?;

        let hash = PasswordHasher::new().hash_password(password)?;
        repos
            .users
            .set_user_password(&user, &format!("session-{}", user.id), &hash)
            .await?;
        Ok(repos.users.get_user_by_id(user.id).await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, path: &str, token: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).json(body).send().await?)
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self.client.put(self.url(path)).bearer_auth(token).json(body).send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }
}

/// Status and JSON body of a response; an empty body reads as `null`.
pub async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let text = res.text().await?;
    let body = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
    Ok((status, body))
}
