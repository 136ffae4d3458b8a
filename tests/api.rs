use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use lobbychat::{AppState, auth::TokenService, db};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

async fn server() -> Router {
    let db_pool = db::connect("sqlite::memory:", 1).await.unwrap();
    let tokens = TokenService::new("api-test-secret").unwrap();
    lobbychat::app(AppState::new(db_pool, tokens), CorsLayer::new())
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

/// Registers and logs in, returning `(token, user id)`.
async fn sign_up(app: &Router, nickname: &str) -> (String, String) {
    let email = format!("{nickname}@example.com");
    let (status, _) = call(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": email, "nickname": nickname, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], nickname);

    (
        body["accessToken"].as_str().unwrap().to_owned(),
        body["id"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = server().await;
    let (status, _) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn token_is_required_and_checked() {
    let app = server().await;

    let (status, body) = call(&app, "GET", "/api/user/lobbies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, "GET", "/api/user/lobbies", Some("forged.token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (token, _) = sign_up(&app, "ada").await;
    let (status, body) = call(&app, "GET", "/api/user/lobbies", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_authorization_is_forbidden() {
    let app = server().await;

    for header in ["Basic Zm9vOmJhcg==", "Token xyz", "Bearer"] {
        let request = Request::builder()
            .uri("/api/user/lobbies")
            .header(AUTHORIZATION, header)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{header}");
    }
}

#[tokio::test]
async fn token_for_vanished_user_is_forbidden() {
    let app = server().await;
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let ghost = TokenService::new("api-test-secret")
        .unwrap()
        .issue(Uuid::now_v7());

    let create = json!({ "lobbyName": "book club" });
    let (_, body) = call(&app, "POST", "/api/create-lobby", Some(&alice), Some(create)).await;
    let lobby_id = body["lobbyId"].as_str().unwrap().to_owned();

    let join = format!("/api/lobby/{lobby_id}/join");
    let (status, _) = call(&app, "POST", &join, Some(&ghost), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let dm = json!({ "recipientId": alice_id, "message": "boo" });
    let (status, _) = call(&app, "POST", "/api/send-direct-message", Some(&ghost), Some(dm)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let create = json!({ "lobbyName": "haunted" });
    let (status, _) = call(&app, "POST", "/api/create-lobby", Some(&ghost), Some(create)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_failures() {
    let app = server().await;
    sign_up(&app, "ada").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect password");

    let (status, _) = call(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let body = json!({ "email": "ada@example.com" });
    let (status, _) = call(&app, "POST", "/api/login", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = server().await;
    sign_up(&app, "ada").await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": "ada@example.com", "nickname": "other", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn lobby_lifecycle() {
    let app = server().await;
    let (alice, _) = sign_up(&app, "alice").await;
    let (bob, bob_id) = sign_up(&app, "bob").await;

    let create = json!({ "lobbyName": "book club" });
    let (status, body) = call(&app, "POST", "/api/create-lobby", Some(&alice), Some(create)).await;
    assert_eq!(status, StatusCode::OK);
    let lobby_id = body["lobbyId"].as_str().unwrap().to_owned();

    let post = format!("/api/lobby/{lobby_id}/post-message");
    let messages = format!("/api/lobby/{lobby_id}/messages");
    let hello = json!({ "message": "hi all" });
    let (status, _) = call(&app, "POST", &post, Some(&bob), Some(hello.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "GET", &messages, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let join = format!("/api/lobby/{lobby_id}/join");
    let (status, _) = call(&app, "POST", &join, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", &join, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, "POST", &post, Some(&bob), Some(hello)).await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = body["id"].as_str().unwrap().to_owned();

    let (status, body) = call(&app, "GET", &messages, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["messages"][0]["sender"], true);
    assert_eq!(body["messages"][0]["user_id"], bob_id.as_str());
    assert_eq!(body["messages"][0]["user_nickname"], "bob");

    let (_, body) = call(&app, "GET", &messages, Some(&alice), None).await;
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["messages"][0]["sender"], false);

    let edit = format!("/api/message/{message_id}/edit");
    let delete = format!("/api/message/{message_id}/delete");

    let rewrite = json!({ "newMessage": "my own words" });
    let (status, _) = call(&app, "PUT", &edit, Some(&bob), Some(rewrite)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "DELETE", &delete, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let moderated = json!({ "newMessage": "[removed]" });
    let (status, _) = call(&app, "PUT", &edit, Some(&alice), Some(moderated)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, "GET", &messages, Some(&bob), None).await;
    assert_eq!(body["messages"][0]["message"], "[removed]");

    let (status, _) = call(&app, "DELETE", &delete, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "DELETE", &delete, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, "GET", &messages, Some(&alice), None).await;
    assert_eq!(body["messages"], json!([]));

    let (_, body) = call(&app, "GET", "/api/user/lobbies", Some(&bob), None).await;
    assert_eq!(body, json!([{ "id": lobby_id, "name": "book club" }]));
}

#[tokio::test]
async fn bad_requests_are_client_errors() {
    let app = server().await;
    let (token, _) = sign_up(&app, "ada").await;

    let (status, _) = call(&app, "POST", "/api/create-lobby", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", "/api/lobby/not-a-uuid/join", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/lobby/0195b7a4-0000-7000-8000-000000000000/join",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "POST", "/api/create-lobby", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn direct_messages() {
    let app = server().await;
    let (anna, _) = sign_up(&app, "anna").await;
    let (ben, ben_id) = sign_up(&app, "ben").await;

    let (status, body) = call(&app, "GET", "/api/find-user/ben", Some(&anna), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ben_id.as_str());

    let (status, _) = call(&app, "GET", "/api/find-user/nobody", Some(&anna), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/api/send-direct-message",
        Some(&anna),
        Some(json!({ "recipientId": ben_id, "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let no_recipient = json!({ "message": "hi" });
    let (status, _) =
        call(&app, "POST", "/api/send-direct-message", Some(&anna), Some(no_recipient)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/send-direct-message",
        Some(&anna),
        Some(json!({ "recipientId": "0195b7a4-0000-7000-8000-000000000000", "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, "GET", "/api/direct-messages", Some(&anna), None).await;
    assert_eq!(body["sent"][0]["partnerNickname"], "ben");
    assert_eq!(body["sent"][0]["message"], "hi");
    assert_eq!(body["received"], json!([]));

    let (_, body) = call(&app, "GET", "/api/direct-messages", Some(&ben), None).await;
    assert_eq!(body["received"][0]["partnerNickname"], "anna");
    assert_eq!(body["sent"], json!([]));
}
