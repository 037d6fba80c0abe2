use std::sync::Arc;

use api::{passwords::Passwords, routes::create_router, state::AppState};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use common::store::{MemoryStore, Storage};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let storage = Storage::new(Arc::new(MemoryStore::new()));
    let passwords = Passwords::with_params(8, 1, 1).unwrap();
    create_router(AppState::new(storage, passwords))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = post(
        app,
        "/api/users/register",
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let app = app();
    let (status, body) = get(&app, "/api/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
}

#[tokio::test]
async fn test_purchase_select_and_gift_walkthrough() {
    let app = app();
    let ana = register(&app, "ana").await;
    let bob = register(&app, "bob").await;

    let (status, body) = post(
        &app,
        "/api/characters/purchase",
        json!({
            "userId": ana,
            "characterId": "panda",
            "characterData": {"price": 50, "name": "Panda", "icon": "🐼"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], 100);
    assert_eq!(body["ownedCharacters"], json!(["kitty", "panda"]));

    let (_, body) = post(
        &app,
        "/api/characters/select",
        json!({"userId": ana, "characterId": "panda"}),
    )
    .await;
    assert_eq!(body["currentCharacter"], "panda");

    let (status, _) = post(
        &app,
        "/api/mailbox/send-gift",
        json!({
            "senderId": ana,
            "recipientId": bob,
            "giftType": "character",
            "giftData": {"characterId": "panda", "name": "Panda"},
            "message": "for you",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/mailbox/{bob}")).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["claimed"], false);
    let gift_id = items[0]["id"].as_str().unwrap().to_string();

    let claim = json!({"userId": bob, "giftId": gift_id, "action": "accept"});
    let (status, body) = post(&app, "/api/mailbox/claim-gift", claim.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gift"]["claimed"], true);

    let (_, body) = get(&app, &format!("/api/users/{bob}")).await;
    assert_eq!(body["user"]["ownedCharacters"], json!(["kitty", "panda"]));

    let (status, body) = post(&app, "/api/mailbox/claim-gift", claim).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = get(&app, &format!("/api/inventory/{bob}")).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gift_data_keys_do_not_break_inventory() {
    let app = app();
    let ana = register(&app, "ana").await;
    let bob = register(&app, "bob").await;

    let (status, _) = post(
        &app,
        "/api/mailbox/send-gift",
        json!({
            "senderId": ana,
            "recipientId": bob,
            "giftType": "character",
            "giftData": {"characterId": "panda", "id": "not-a-uuid", "type": "hat"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/mailbox/{bob}")).await;
    let gift_id = body["items"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = post(
        &app,
        "/api/mailbox/claim-gift",
        json!({"userId": bob, "giftId": gift_id, "action": "accept"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &format!("/api/inventory/{bob}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["type"], "character");
    assert_ne!(body["items"][0]["id"], "not-a-uuid");

    let (status, body) = post(
        &app,
        "/api/characters/purchase",
        json!({"userId": bob, "characterId": "owl", "characterData": {"price": 10}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], 140);
}

#[tokio::test]
async fn test_duplicate_registration_is_409() {
    let app = app();
    register(&app, "ana").await;

    let (status, body) = post(
        &app,
        "/api/users/register",
        json!({"username": "other", "email": "ana@example.com", "password": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_status_codes() {
    let app = app();
    register(&app, "ana").await;

    let (status, body) = post(
        &app,
        "/api/users/login",
        json!({"email": "ana@example.com", "password": "secret"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ana");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, _) = post(
        &app,
        "/api/login",
        json!({"username": "ana", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(
        &app,
        "/api/login",
        json!({"username": "ana@example.com", "password": "secret"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ana");

    let (status, _) = post(&app, "/api/users/login", json!({"password": "secret"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_with_empty_query_returns_nobody() {
    let app = app();
    register(&app, "ana").await;

    let (_, body) = get(&app, "/api/users/search?query=").await;
    assert_eq!(body["users"], json!([]));

    let (_, body) = get(&app, "/api/users/search").await;
    assert_eq!(body["users"], json!([]));

    let (_, body) = get(&app, "/api/users/search?query=AN").await;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_credit_updates_and_insufficient_funds() {
    let app = app();
    let ana = register(&app, "ana").await;

    let (status, body) = post(
        &app,
        "/api/credits/update",
        json!({"userId": ana, "amount": 200, "operation": "subtract"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = post(
        &app,
        "/api/credits/update",
        json!({"userId": ana, "amount": 25, "operation": "add"}),
    )
    .await;
    assert_eq!(body["newBalance"], 175);

    let (status, _) = post(
        &app,
        "/api/credits/update",
        json!({"userId": ana, "amount": 25, "operation": "multiply"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, &format!("/api/credits/transactions/{ana}")).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_input_is_400_envelope() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);

    let (status, body) = get(&app, "/api/inventory/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_messages_games_and_admin() {
    let app = app();
    let ana = register(&app, "ana").await;
    let bob = register(&app, "bob").await;

    let (status, body) = post(
        &app,
        "/api/messages/send",
        json!({"senderId": ana, "recipientId": bob, "content": "hi"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], "hi");

    let (_, body) = get(&app, &format!("/api/messages/conversations/{bob}")).await;
    assert_eq!(body["conversations"][0]["messages"].as_array().unwrap().len(), 1);

    let (_, body) = post(
        &app,
        "/api/games/play",
        json!({"userId": ana, "gameType": "sky-race", "earnedCredits": 10}),
    )
    .await;
    assert_eq!(body["newBalance"], 160);

    let (_, body) = get(&app, "/api/admin/stats").await;
    assert_eq!(body["stats"]["totalUsers"], 2);
    assert_eq!(body["stats"]["totalGameSessions"], 1);
    assert_eq!(body["stats"]["totalCreditsInCirculation"], 310);

    let (_, body) = get(&app, "/api/admin/backup").await;
    let backup = body["backup"].clone();
    assert!(backup.get("users").is_some());
    assert!(backup.get("conversations").is_some());

    let fresh = self::app();
    let (status, body) = post(&fresh, "/api/admin/restore", json!({"backup": backup})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["restored"].as_u64().unwrap() >= 6);

    let (_, body) = get(&fresh, &format!("/api/users/{ana}")).await;
    assert_eq!(body["user"]["gameCredits"], 160);
}
