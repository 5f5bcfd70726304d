mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, TestServer};

#[tokio::test]
async fn profile_lifecycle_with_permissions() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = read(
        server
            .post(
                "/profile",
                &token,
                &json!({ "name": "Warehouse", "permissions": { "product_module": true } }),
            )
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Warehouse");
    assert_eq!(
        body["data"]["permissions"],
        json!({ "user_module": false, "profile_module": false, "product_module": true })
    );
    let id = body["data"]["id"].as_i64().unwrap_or_default();

    let (status, body) = read(
        server
            .put(
                &format!("/profile/{}", id),
                &token,
                &json!({ "permissions": { "user_module": true } }),
            )
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Warehouse");
    assert_eq!(body["data"]["permissions"]["user_module"], true);
    assert_eq!(body["data"]["permissions"]["product_module"], true);

    let (status, body) = read(server.get(&format!("/profile/{}", id), &token).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["permissions"]["user_module"], true);

    let (status, _) = read(server.delete(&format!("/profile/{}", id), &token).await?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn profiles_in_use_and_duplicates() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = read(server.delete("/profile/1", &token).await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Profile is in use");

    let (status, body) = read(server.post("/profile", &token, &json!({ "name": "ROOT" })).await?).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Profile already registered");

    let (status, body) = read(server.post("/profile", &token, &json!({ "name": "abc" })).await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["name"]
        .as_str()
        .unwrap_or_default()
        .starts_with("name does not meet the 'length"));

    let (status, body) = read(server.get("/profile/77", &token).await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Profile not found");
    Ok(())
}
