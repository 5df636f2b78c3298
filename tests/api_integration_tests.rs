use banter::api::auth::{AuthClient, AuthError};
use banter::api::client::{ApiError, ChatApi};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn session_body() -> serde_json::Value {
    json!({
        "session": {
            "accessToken": "jwt-abc",
            "refreshToken": "ref-def",
            "user": { "id": "u1", "email": "a@b.c" }
        }
    })
}

fn graphql_data(data: serde_json::Value) -> serde_json::Value {
    json!({ "data": data })
}

// ============================================================================
// Auth Service Tests
// ============================================================================

#[tokio::test]
async fn test_sign_in_parses_session() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signin/email-password"))
        .and(body_partial_json(json!({ "email": "a@b.c" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .mount(&mock_server)
        .await;

    let client = AuthClient::new(mock_server.uri());
    let session = client.sign_in("a@b.c", "pw").await.unwrap();
    assert_eq!(session.access_token, "jwt-abc");
    assert_eq!(session.refresh_token, "ref-def");
    assert_eq!(session.user_id, "u1");
    assert_eq!(session.email, "a@b.c");
}

#[tokio::test]
async fn test_sign_up_hits_signup_route() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signup/email-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AuthClient::new(mock_server.uri());
    client.sign_up("a@b.c", "pw").await.unwrap();
}

#[tokio::test]
async fn test_rejected_credentials_surface_provider_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signin/email-password"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "message": "Incorrect email or password",
            "error": "invalid-email-password"
        })))
        .mount(&mock_server)
        .await;

    let client = AuthClient::new(mock_server.uri());
    match client.sign_in("a@b.c", "bad").await {
        Err(AuthError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_null_session_is_rejected_not_parse_error() {
    // Sign-up with verification enabled: 200 with a null session.
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signup/email-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session": null })))
        .mount(&mock_server)
        .await;

    let client = AuthClient::new(mock_server.uri());
    assert!(matches!(
        client.sign_up("a@b.c", "pw").await,
        Err(AuthError::Rejected { .. })
    ));
}

#[tokio::test]
async fn test_sign_out_posts_refresh_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signout"))
        .and(body_partial_json(json!({ "refreshToken": "ref-def" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AuthClient::new(mock_server.uri());
    client.sign_out("ref-def").await.unwrap();
}

// ============================================================================
// GraphQL Client Tests
// ============================================================================

#[tokio::test]
async fn test_list_chats_sends_bearer_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(graphql_data(json!({
            "chats": [{
                "id": "c1",
                "title": "First",
                "created_at": "2024-06-01T12:00:00+00:00",
                "updated_at": "2024-06-01T12:05:00+00:00",
                "messages": [{
                    "content": "latest",
                    "is_bot": false,
                    "created_at": "2024-06-01T12:05:00+00:00"
                }]
            }]
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    let chats = api.list_chats("jwt-abc").await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].preview().unwrap().content, "latest");
}

#[tokio::test]
async fn test_chat_messages_null_pk_yields_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(graphql_data(json!({ "chats_by_pk": null }))),
        )
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    let messages = api.chat_messages("jwt-abc", "missing").await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_graphql_errors_become_api_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "field 'chats' not found" }]
        })))
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    match api.list_chats("jwt-abc").await {
        Err(ApiError::GraphQL(msg)) => assert!(msg.contains("not found")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_chat_returns_new_row() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({
            "variables": { "title": "Chat 2024-06-01 12:00" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(graphql_data(json!({
            "insert_chats_one": {
                "id": "fresh",
                "title": "Chat 2024-06-01 12:00",
                "created_at": "2024-06-01T12:00:00+00:00"
            }
        }))))
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    let chat = api
        .create_chat("jwt-abc", "Chat 2024-06-01 12:00")
        .await
        .unwrap();
    assert_eq!(chat.id, "fresh");
}

#[tokio::test]
async fn test_send_runs_insert_then_action() {
    let mock_server = MockServer::start().await;

    // Step one: the insert mutation, writing the row as a user message.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("insert_messages_one"))
        .and(body_string_contains("is_bot: false"))
        .and(body_partial_json(json!({
            "variables": { "chatId": "c1", "content": "hello" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(graphql_data(json!({
            "insert_messages_one": {
                "id": "m1",
                "content": "hello",
                "is_bot": false,
                "created_at": "2024-06-01T12:00:00+00:00"
            }
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Step two: the sendMessage action takes the text as `content`.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("sendMessage(chat_id: $chatId, content: $content)"))
        .and(body_partial_json(json!({
            "variables": { "chatId": "c1", "content": "hello" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(graphql_data(json!({
            "sendMessage": { "success": true, "message": "queued" }
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    let reply = api.send_user_message("jwt-abc", "c1", "hello").await.unwrap();
    assert!(reply.success);
}

#[tokio::test]
async fn test_insert_failure_skips_action() {
    let mock_server = MockServer::start().await;

    // First request (the insert) fails; the action must never be attempted,
    // so exactly one request total reaches the server.
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    assert!(matches!(
        api.send_user_message("jwt-abc", "c1", "hello").await,
        Err(ApiError::Http { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_action_reply_failure_is_not_an_error() {
    // `success: false` is data, not a transport error; the caller decides
    // what to do with it.
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "insert_messages_one": {
                    "id": "m1",
                    "content": "hello",
                    "is_bot": false,
                    "created_at": "2024-06-01T12:00:00+00:00"
                },
                "sendMessage": { "success": false, "message": "bot offline" }
            }
        })))
        .mount(&mock_server)
        .await;

    let api = ChatApi::new(mock_server.uri());
    let reply = api.send_user_message("jwt-abc", "c1", "hello").await.unwrap();
    assert!(!reply.success);
    assert_eq!(reply.message, "bot offline");
}
