mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, token_keys, TestServer, ADMIN_MAIL, ADMIN_PASSWORD};
use msaada_backend::auth::{Claims, TokenKind};
use msaada_backend::database::models::Permissions;

#[tokio::test]
async fn login_returns_tokens_and_permissions() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_defaults().await?;

    let (status, body) = read(server.login_response(ADMIN_MAIL, ADMIN_PASSWORD, false).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], ADMIN_MAIL);
    assert_eq!(body["data"]["user"]["profile"]["name"], "ROOT");
    assert_eq!(body["data"]["user"]["profile"]["permissions"]["product_module"], true);
    assert!(body["data"]["accesstoken"].is_string());
    assert!(body["data"]["refreshtoken"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_failures_are_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_defaults().await?;

    let (status, body) = read(server.login_response("ghost@msaada.test", "x", false).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");

    let (status, body) = read(server.login_response(ADMIN_MAIL, "wrong-password", false).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect password");

    let user = server.user_with("off@msaada.test", "secret-1", Permissions::default()).await?;
    let mut disabled = user.clone();
    disabled.status = false;
    server.state.repos.users.update_user(&disabled).await?;

    let (status, body) = read(server.login_response("off@msaada.test", "secret-1", false).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Disabled user");
    Ok(())
}

#[tokio::test]
async fn malformed_login_body_is_invalid_data() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/auth"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data submitted");
    Ok(())
}

#[tokio::test]
async fn me_requires_an_access_token() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_defaults().await?;
    let (access, refresh) = server.login(ADMIN_MAIL, ADMIN_PASSWORD, false).await?;

    let (status, body) = read(server.client.get(server.url("/auth")).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or missing token");

    let (status, _) = read(server.get("/auth", &refresh).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = read(server.get("/auth", &access).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_MAIL);
    assert_eq!(body["data"]["profile"]["permissions"]["user_module"], true);
    Ok(())
}

#[tokio::test]
async fn refresh_keeps_the_expiry_policy() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_defaults().await?;
    let keys = token_keys();

    let (access, refresh) = server.login(ADMIN_MAIL, ADMIN_PASSWORD, false).await?;
    assert_eq!(keys.verify(TokenKind::Access, &access)?.exp, None);

    let res = server.client.put(server.url("/auth")).bearer_auth(&access).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.put(server.url("/auth")).bearer_auth(&refresh).send().await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["data"]["accesstoken"].as_str().unwrap_or_default();
    let claims = keys.verify(TokenKind::Access, renewed)?;
    assert_eq!(claims.exp, None);
    assert!(!claims.expire);

    let (_, refresh) = server.login(ADMIN_MAIL, ADMIN_PASSWORD, true).await?;
    let res = server.client.put(server.url("/auth")).bearer_auth(&refresh).send().await?;
    let (_, body) = read(res).await?;
    let renewed = body["data"]["accesstoken"].as_str().unwrap_or_default();
    let claims = keys.verify(TokenKind::Access, renewed)?;
    assert!(claims.exp.is_some());
    assert!(claims.expire);
    Ok(())
}

#[tokio::test]
async fn tokens_are_pinned_to_the_client_address() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.seed_defaults().await?;
    let session = admin.token.clone().unwrap_or_default();

    let foreign = Claims::new(session, "10.9.9.9", None);
    let token = token_keys().sign(TokenKind::Access, &foreign)?;

    let (status, body) = read(server.get("/auth", &token).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not associated with this IP address");
    Ok(())
}

#[tokio::test]
async fn expired_and_unknown_tokens_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.seed_defaults().await?;
    let session = admin.token.clone().unwrap_or_default();
    let keys = token_keys();

    let now = Utc::now().timestamp();
    let expired = Claims {
        token: session,
        ip: "127.0.0.1".to_string(),
        iat: now - 120,
        exp: Some(now - 60),
        expire: true,
    };
    let token = keys.sign(TokenKind::Access, &expired)?;
    let (status, body) = read(server.get("/auth", &token).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Expired token");

    let unknown = keys.sign(TokenKind::Access, &Claims::new("no-such-session", "127.0.0.1", None))?;
    let (status, body) = read(server.get("/auth", &unknown).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or missing token");
    Ok(())
}

#[tokio::test]
async fn password_reset_ends_the_session() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let user = server.user_with("clerk@msaada.test", "clerk-pass", Permissions::default()).await?;
    let (clerk_access, _) = server.login("clerk@msaada.test", "clerk-pass", false).await?;

    let res = server
        .client
        .patch(server.url(&format!("/user/{}/reset", user.id)))
        .bearer_auth(&token)
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(null));

    let (status, _) = read(server.get("/auth", &clerk_access).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = read(server.login_response("clerk@msaada.test", "clerk-pass", false).await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
