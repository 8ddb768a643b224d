//! Handler tests for the messages routes

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum_helpers::{JwtAuth, JwtConfig, jwt_auth_middleware};
use domain_messages::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    jwt: JwtAuth,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtAuth::new(&JwtConfig::new("handler-test-secret-with-32-characters"));
        let service = MessageService::new(InMemoryMessageRepository::new());
        let router = Router::new()
            .nest("/messages", handlers::router(service))
            .layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));
        Self { router, jwt }
    }

    fn token(&self, id: Uuid, role: &str) -> String {
        self.jwt
            .create_token(&id.to_string(), &format!("{id}@agronet.test"), role)
            .unwrap()
    }

    async fn send(&self, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[tokio::test]
async fn test_conversation_round_trip() {
    let app = TestApp::new();
    let builder = TestDataBuilder::from_test_name("conversation_round_trip");
    let (buyer, farmer) = (builder.id("buyer"), builder.id("farmer"));
    let (buyer_token, farmer_token) = (app.token(buyer, "buyer"), app.token(farmer, "farmer"));

    let (status, sent) = app
        .send(
            "POST",
            "/messages",
            &buyer_token,
            Some(json!({
                "buyer_id": buyer,
                "farmer_id": farmer,
                "receiver_id": farmer,
                "content": "Is the maize dry?"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["read"], false);
    let thread_id = sent["thread_id"].as_str().unwrap().to_string();

    let (_, unread) = app
        .send("GET", "/messages/unread/count", &farmer_token, None)
        .await;
    assert_eq!(unread["count"], 1);

    let (status, reply) = app
        .send(
            "POST",
            "/messages",
            &farmer_token,
            Some(json!({
                "thread_id": thread_id,
                "receiver_id": buyer,
                "content": "Yes, sun dried last week"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["thread_id"], thread_id);

    let (status, messages) = app
        .send(
            "GET",
            &format!("/messages/thread/{thread_id}/messages"),
            &buyer_token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages[0]["content"], "Is the maize dry?");
    assert_eq!(messages[1]["content"], "Yes, sun dried last week");

    let (status, marked) = app
        .send(
            "PATCH",
            &format!("/messages/thread/{thread_id}/mark-read"),
            &farmer_token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["updated"], 1);

    let (_, threads) = app.send("GET", "/messages/threads", &farmer_token, None).await;
    assert_eq!(threads.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_target_is_400_with_message() {
    let app = TestApp::new();
    let caller = Uuid::now_v7();

    let (status, body) = app
        .send(
            "POST",
            "/messages",
            &app.token(caller, "buyer"),
            Some(json!({
                "buyer_id": caller,
                "receiver_id": Uuid::now_v7(),
                "content": "hello"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Either thread_id or buyer_id and farmer_id must be provided"
    );
}

#[tokio::test]
async fn test_create_thread_is_idempotent() {
    let app = TestApp::new();
    let (buyer, farmer) = (Uuid::now_v7(), Uuid::now_v7());
    let token = app.token(buyer, "buyer");
    let body = json!({ "buyer_id": buyer, "farmer_id": farmer });

    let (status, first) = app
        .send("POST", "/messages/thread", &token, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app
        .send("POST", "/messages/thread", &token, Some(body))
        .await;
    assert_eq!(first["_id"], second["_id"]);
}

#[tokio::test]
async fn test_outsiders_are_forbidden() {
    let app = TestApp::new();
    let (buyer, farmer) = (Uuid::now_v7(), Uuid::now_v7());
    let outsider = app.token(Uuid::now_v7(), "buyer");

    let (status, _) = app
        .send(
            "POST",
            "/messages/thread",
            &outsider,
            Some(json!({ "buyer_id": buyer, "farmer_id": farmer })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, thread) = app
        .send(
            "POST",
            "/messages/thread",
            &app.token(buyer, "buyer"),
            Some(json!({ "buyer_id": buyer, "farmer_id": farmer })),
        )
        .await;
    let uri = format!("/messages/thread/{}", thread["_id"].as_str().unwrap());

    let (status, _) = app.send("GET", &uri, &outsider, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.token(Uuid::now_v7(), "admin");
    let (status, _) = app.send("GET", &uri, &admin, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_message_read_and_delete() {
    let app = TestApp::new();
    let (buyer, farmer) = (Uuid::now_v7(), Uuid::now_v7());
    let (buyer_token, farmer_token) = (app.token(buyer, "buyer"), app.token(farmer, "farmer"));

    let (_, sent) = app
        .send(
            "POST",
            "/messages",
            &buyer_token,
            Some(json!({
                "buyer_id": buyer,
                "farmer_id": farmer,
                "receiver_id": farmer,
                "content": "Price for 10 crates?"
            })),
        )
        .await;
    let id = sent["_id"].as_str().unwrap().to_string();

    let (status, read) = app
        .send("PATCH", &format!("/messages/{id}/read"), &farmer_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);

    let (status, _) = app
        .send("DELETE", &format!("/messages/{id}"), &farmer_token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("DELETE", &format!("/messages/{id}"), &buyer_token, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send("GET", &format!("/messages/{id}"), &buyer_token, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Message not found");
}

#[tokio::test]
async fn test_unknown_thread_is_404() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            "GET",
            &format!("/messages/thread/{}", Uuid::now_v7()),
            &app.token(Uuid::now_v7(), "buyer"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Thread not found");
}
