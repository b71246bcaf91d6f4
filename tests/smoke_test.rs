//! End-to-end walk through the public API: health, create, list, get,
//! update, search, stats, delete.

mod common;

use axum::http::StatusCode;
use common::{app, delete, get, with_json};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn api_smoke_flow() {
    let app = app();

    let (status, health) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "OK");
    assert_eq!(health["message"], "Book Library API is running");

    let (status, created) = with_json(
        &app,
        "POST",
        "/api/books",
        json!({
            "title": "Test Book",
            "author": "Test Author",
            "publishedYear": 2023,
            "image": "assets/test.jpg"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, listing) = get(&app, "/api/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["pagination"]["totalBooks"], 1);

    let (status, fetched) = get(&app, &format!("/api/books/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["title"], "Test Book");

    let (status, updated) = with_json(
        &app,
        "PUT",
        &format!("/api/books/{id}"),
        json!({
            "title": "Updated Test Book",
            "author": "Updated Test Author",
            "publishedYear": 2024
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Updated Test Book");
    assert_eq!(updated["data"]["publishedYear"], 2024);

    let (status, found) = get(&app, "/api/books/search?q=test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["total"], 1);

    let (status, stats) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["totalBooks"], 1);

    let (status, _) = delete(&app, &format!("/api/books/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = get(&app, "/api/books").await;
    assert_eq!(listing["data"], json!([]));
}

#[tokio::test]
async fn openapi_document_lists_module_paths() {
    let app = app();

    let (status, doc) = get(&app, "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/api/health",
        "/api/books",
        "/api/books/{id}",
        "/api/books/bulk",
        "/api/books/search",
        "/api/stats",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
