mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn messaging_requires_a_session() {
    let app = TestApp::new().await;

    let (status, _, body) = app.request("GET", "/api/messages/chats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "please log in");

    let (status, _, _) = app
        .request("POST", "/api/messages", None, Some(json!({ "recipient_id": "bob", "text": "hi" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    let (status, cookie, _) = app
        .request("POST", "/api/auth/login", None, Some(json!({ "user_id": "nobody" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(cookie.is_none());
}

#[tokio::test]
async fn profile_round_trip() {
    let app = TestApp::new().await;

    let (status, _, body) = app
        .request("POST", "/api/user/new", None, Some(json!({ "name": "  ", "avatar_url": null })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "please give a name");

    let alice = app.new_user("alice").await;
    let (status, _, body) = app.request("GET", &format!("/api/user/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "alice");
    assert_eq!(body["avatar_url"], Value::Null);

    let (status, _, _) = app.request("GET", "/api/user/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cookie = app.login(&alice).await;
    let (status, _, body) = app.request("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice.as_str());

    let (status, _, _) = app.request("POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = app.request("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_list_and_read_history() {
    let app = TestApp::new().await;
    let alice = app.new_user("alice").await;
    let bob = app.new_user("bob").await;
    let alice_cookie = app.login(&alice).await;
    let bob_cookie = app.login(&bob).await;

    let (status, _, body) = app
        .request("GET", &format!("/api/messages/{bob}"), Some(&alice_cookie), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "no chat with user");

    let (status, _, sent) = app
        .request("POST", "/api/messages", Some(&alice_cookie), Some(json!({ "recipient_id": &bob, "text": "hi" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["sender_id"], alice.as_str());
    assert_eq!(sent["text"], "hi");

    let (status, _, chats) = app.request("GET", "/api/messages/chats", Some(&bob_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chats.as_array().unwrap().len(), 1);
    assert_eq!(chats[0]["id"], sent["conversation_id"]);
    assert_eq!(chats[0]["users"], json!([{ "id": &alice, "name": "alice", "avatar_url": null }]));
    assert_eq!(chats[0]["latest_message"]["text"], "hi");
    assert_eq!(chats[0]["latest_message"]["sender_id"], alice.as_str());

    let (status, _, history) = app
        .request("GET", &format!("/api/messages/{alice}"), Some(&bob_cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([sent]));
}

#[tokio::test]
async fn send_without_recipient_is_bad_request() {
    let app = TestApp::new().await;
    let alice = app.new_user("alice").await;
    let cookie = app.login(&alice).await;

    let (status, _, body) = app
        .request("POST", "/api/messages", Some(&cookie), Some(json!({ "text": "hi" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "please give receiver id");

    let (_, _, chats) = app.request("GET", "/api/messages/chats", Some(&cookie), None).await;
    assert_eq!(chats, json!([]));
}

#[tokio::test]
async fn online_users_reflect_the_registry() {
    let app = TestApp::new().await;

    let (status, _, body) = app.request("GET", "/api/messages/online", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (connection_id, _rx) = app.state.presence.connect("alice");
    let (_, _, body) = app.request("GET", "/api/messages/online", None, None).await;
    assert_eq!(body, json!(["alice"]));

    app.state.presence.unregister(connection_id);
    let (_, _, body) = app.request("GET", "/api/messages/online", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_bodies_answer_with_json_errors() {
    let app = TestApp::new().await;
    let alice = app.new_user("alice").await;
    let cookie = app.login(&alice).await;

    let (status, _, body) = app
        .request("POST", "/api/messages", Some(&cookie), Some(json!({ "recipient_id": 5, "text": "hi" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("recipient_id"), "{body}");

    let (status, _, body) = app
        .request("POST", "/api/auth/login", None, Some(json!({ "user": alice })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("user_id"), "{body}");

    let (status, _, body) = app
        .request("POST", "/api/user/new", None, Some(json!(["not", "an", "object"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (_, _, chats) = app.request("GET", "/api/messages/chats", Some(&cookie), None).await;
    assert_eq!(chats, json!([]));
}

#[tokio::test]
async fn history_path_ignores_surrounding_whitespace() {
    let app = TestApp::new().await;
    let alice = app.new_user("alice").await;
    let bob = app.new_user("bob").await;
    let cookie = app.login(&alice).await;

    let (status, _, sent) = app
        .request("POST", "/api/messages", Some(&cookie), Some(json!({ "recipient_id": format!(" {bob} "), "text": "hi" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, history) = app
        .request("GET", &format!("/api/messages/%20{bob}%20"), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([sent]));
}
