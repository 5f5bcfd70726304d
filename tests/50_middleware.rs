mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{read, test_config, TestServer};

#[tokio::test]
async fn unknown_routes_are_localized() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = read(server.client.get(server.url("/nowhere")).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Nonexistent route");

    let (_, body) = read(server.client.get(server.url("/nowhere?lang=pt")).send().await?).await?;
    assert_eq!(body["message"], "Rota inexistente");

    let (_, body) = read(server.client.get(server.url("/nowhere?lang=sw")).send().await?).await?;
    assert_eq!(body["message"], "Njia haipo");

    let (_, body) = read(server.client.get(server.url("/nowhere?lang=xx")).send().await?).await?;
    assert_eq!(body["message"], "Nonexistent route");
    Ok(())
}

#[tokio::test]
async fn health_and_identification() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert!(res.headers().contains_key("x-request-id"));
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "memory");

    let (status, body) = read(server.client.get(server.url("/")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "msaada-backend");
    Ok(())
}

#[tokio::test]
async fn request_ids_are_propagated() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "trace-me-42")
        .send()
        .await?;
    assert_eq!(
        res.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-me-42")
    );
    Ok(())
}

#[tokio::test]
async fn clients_over_the_limit_get_429() -> Result<()> {
    let mut config = test_config();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 2;
    config.api.rate_limit_window_secs = 60;
    let server = TestServer::start_with(config).await?;

    for remaining in ["1", "0"] {
        let res = server.client.get(server.url("/health")).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-ratelimit-limit"], "2");
        assert_eq!(res.headers()["x-ratelimit-remaining"], remaining);
    }

    let res = server.client.get(server.url("/health?lang=pt")).send().await?;
    assert!(res.headers().contains_key("retry-after"));
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "TOO_MANY_REQUESTS");
    assert_eq!(body["message"], "Muitas requisições, aguarde um momento");
    Ok(())
}
