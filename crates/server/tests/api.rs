use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let app = server::router(Arc::new(engine));

    for (id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        let (status, _) = send(
            &app,
            "POST",
            "/users",
            Some(id),
            Some(json!({ "display_name": name, "phone": null })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("lekka-user-id", user);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn lend(app: &Router, friend_name: &str, minor: i64) -> Value {
    let (status, lekka) = send(
        app,
        "POST",
        "/lekkas",
        Some("alice"),
        Some(json!({
            "friend_name": friend_name,
            "kind": "lent",
            "amount_minor": minor,
            "description": "dinner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    lekka
}

#[tokio::test]
async fn unknown_caller_is_unauthorized() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/lekkas", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/lekkas", Some("mallory"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = send(&app, "GET", "/users/me", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["display_name"], "Alice");
}

#[tokio::test]
async fn confirmation_link_confirms_once() {
    let app = app().await;
    let lekka = lend(&app, "Ravi", 200_000).await;
    assert_eq!(lekka["status"], "pending");
    assert_eq!(lekka["amount"], json!({ "minor": 200000, "currency": "INR" }));
    let token = lekka["confirmation_token"].as_str().unwrap().to_string();
    let confirm_uri = format!("/confirm/{token}");

    for _ in 0..2 {
        let (status, view) = send(&app, "GET", &confirm_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["creator_name"], "Alice");
        assert_eq!(view["friend_name"], "Ravi");
        assert_eq!(view["kind"], "lent");
    }

    let (_, dashboard) = send(&app, "GET", "/stats/dashboard", Some("alice"), None).await;
    assert_eq!(dashboard["pending_lekkas"], 1);
    assert_eq!(dashboard["net_balance"]["minor"], 0);

    let (status, confirmed) = send(
        &app,
        "POST",
        &confirm_uri,
        None,
        Some(json!({ "display_name": "Ravi Kumar" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");
    assert_eq!(confirmed["friend_name"], "Ravi Kumar");
    assert!(confirmed["confirmation_token"].is_null());

    let (status, body) = send(&app, "POST", &confirm_uri, None, None).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["operation"], "redeem_confirmation");
    let (status, _) = send(&app, "GET", &confirm_uri, None, None).await;
    assert_eq!(status, StatusCode::GONE);

    let (_, dashboard) = send(&app, "GET", "/stats/dashboard", Some("alice"), None).await;
    assert_eq!(dashboard["net_balance"]["minor"], 200_000);

    let id = lekka["id"].as_str().unwrap();
    let (status, detail) = send(&app, "GET", &format!("/lekkas/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<_> = detail["timeline"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, ["created", "confirmed"]);
}

#[tokio::test]
async fn lifecycle_errors_map_to_statuses() {
    let app = app().await;
    let lekka = lend(&app, "Ravi", 500).await;
    let id = lekka["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/lekkas/{id}/settle"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["operation"], "settle");

    let (status, _) = send(&app, "GET", &format!("/lekkas/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/lekkas",
        Some("alice"),
        Some(json!({ "friend_name": "Ravi", "kind": "lent", "amount_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["operation"], "create_lekka");

    let (status, _) = send(
        &app,
        "POST",
        "/lekkas",
        Some("alice"),
        Some(json!({ "kind": "lent", "amount_minor": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/lekkas/{id}"),
        Some("alice"),
        Some(json!({ "amount_minor": 750 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"]["minor"], 750);

    let token = lekka["confirmation_token"].as_str().unwrap();
    send(&app, "POST", &format!("/confirm/{token}"), None, None).await;
    let (status, settled) = send(
        &app,
        "POST",
        &format!("/lekkas/{id}/settle"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["status"], "settled");

    let (status, list) = send(&app, "GET", "/lekkas?status=settled", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["lekkas"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/lekkas/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/lekkas/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn friends_and_balances() {
    let app = app().await;
    let (status, friend) = send(
        &app,
        "POST",
        "/friends",
        Some("alice"),
        Some(json!({ "name": "Asha", "phone": "+91 98450 12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let friend_id = friend["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/friends",
        Some("alice"),
        Some(json!({ "name": "Other", "phone": "+919845012345" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, ravi) = send(
        &app,
        "POST",
        "/friends",
        Some("alice"),
        Some(json!({ "name": "Ravi", "phone": "+91 11111" })),
    )
    .await;
    let ravi_id = ravi["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/friends/{ravi_id}"),
        Some("alice"),
        Some(json!({ "phone": "+91 98450 12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["operation"], "update_friend");

    let (_, lekka) = send(
        &app,
        "POST",
        "/lekkas",
        Some("alice"),
        Some(json!({ "friend_id": friend_id, "kind": "borrowed", "amount_minor": 300 })),
    )
    .await;
    let token = lekka["confirmation_token"].as_str().unwrap();
    send(&app, "POST", &format!("/confirm/{token}"), None, None).await;

    let (status, balance) = send(
        &app,
        "GET",
        &format!("/friends/{friend_id}/balance"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["net_balance"]["minor"], -300);

    let (_, owing) = send(&app, "GET", "/friends?filter=owing", Some("alice"), None).await;
    assert_eq!(owing["friends"][0]["name"], "Asha");
    let (_, owed) = send(&app, "GET", "/friends?filter=owed", Some("alice"), None).await;
    assert!(owed["friends"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "GET",
        &format!("/friends/{friend_id}/balance"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, profile) = send(&app, "GET", "/stats/profile", Some("alice"), None).await;
    assert_eq!(profile["total_friends"], 2);
}

#[tokio::test]
async fn pool_closes_one_way() {
    let app = app().await;
    let (status, pool) = send(
        &app,
        "POST",
        "/groups",
        Some("alice"),
        Some(json!({ "name": "Goa trip", "target_minor": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pool["status"], "active");
    let id = pool["id"].as_str().unwrap().to_string();

    let (status, progress) = send(
        &app,
        "POST",
        &format!("/groups/{id}/contribute"),
        Some("bob"),
        Some(json!({ "contributor": "Bob", "amount_minor": 6000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(progress["progress_bps"], 10_000);
    assert_eq!(progress["funded"], true);
    assert_eq!(progress["remaining"]["minor"], 0);

    let (status, _) = send(&app, "POST", &format!("/groups/{id}/close"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, closed) =
        send(&app, "POST", &format!("/groups/{id}/close"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/groups/{id}/contribute"),
        Some("bob"),
        Some(json!({ "contributor": "Bob", "amount_minor": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["operation"], "contribute");

    let (_, detail) = send(&app, "GET", &format!("/groups/{id}"), Some("bob"), None).await;
    assert_eq!(detail["contributions"].as_array().unwrap().len(), 1);
    assert_eq!(detail["progress"]["collected"]["minor"], 6000);
}
