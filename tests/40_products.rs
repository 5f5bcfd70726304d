mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, TestServer};
use msaada_backend::database::models::Permissions;

#[tokio::test]
async fn product_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = read(server.post("/product", &token, &json!({ "name": "Maize flour" })).await?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let (status, body) = read(server.post("/product", &token, &json!({ "name": "Maize flour" })).await?).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Product already registered");

    let (status, body) = read(
        server
            .put(&format!("/product/{}", id), &token, &json!({ "name": "Sifted maize flour" }))
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": id, "name": "Sifted maize flour" }));

    let (status, _) = read(server.delete(&format!("/product/{}", id), &token).await?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = read(server.delete(&format!("/product/{}", id), &token).await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
    Ok(())
}

#[tokio::test]
async fn modules_require_the_matching_permission() -> Result<()> {
    let server = TestServer::start().await?;
    server.seed_defaults().await?;
    let permissions = Permissions {
        product_module: true,
        ..Permissions::default()
    };
    server.user_with("stock@msaada.test", "stock-pass", permissions).await?;
    let (token, _) = server.login("stock@msaada.test", "stock-pass", false).await?;

    let (status, _) = read(server.get("/product", &token).await?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = read(server.get("/user", &token).await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not allowed to access this resource");

    let (status, _) = read(server.get("/profile/1", &token).await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = read(server.client.get(server.url("/product")).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unparsable_bodies_are_invalid_data() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let res = server
        .client
        .post(server.url("/product?lang=pt"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("[1, 2")
        .send()
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}
