use super::*;
use crate::net::types::Room;
use crate::test_helpers::{dead_base_url, stub_client};
use axum::Json;
use axum::http::{HeaderMap as AxumHeaderMap, StatusCode as AxumStatus};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

fn rooms_json() -> Value {
    json!([
        {"id": 1, "name": "general", "description": "everyone", "users": [{"id": 1, "name": "Alice"}]},
        {"id": 2, "name": "random", "description": "", "users": null}
    ])
}

// =============================================================
// join_url
// =============================================================

#[test]
fn join_url_inserts_single_slash() {
    assert_eq!(join_url("http://h.test/api", "/rooms"), "http://h.test/api/rooms");
    assert_eq!(join_url("http://h.test/api/", "rooms"), "http://h.test/api/rooms");
}

#[test]
fn join_url_empty_base_is_relative() {
    assert_eq!(join_url("", "/rooms/3"), "/rooms/3");
}

// =============================================================
// ApiError
// =============================================================

#[test]
fn from_status_uses_body_text() {
    let err = ApiError::from_status(StatusCode::NOT_FOUND, "not found");
    assert_eq!(err, ApiError::Status { status: 404, message: "not found".into() });
    assert_eq!(err.to_string(), "404 not found");
}

#[test]
fn from_status_empty_body_falls_back_to_reason() {
    let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
    assert_eq!(err.message(), "Internal Server Error");
}

#[test]
fn retryable_only_for_transport_and_server_side() {
    assert!(ApiError::Transport("refused".into()).retryable());
    assert!(ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "").retryable());
    assert!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "").retryable());
    assert!(!ApiError::from_status(StatusCode::NOT_FOUND, "").retryable());
    assert!(!ApiError::Decode("bad".into()).retryable());
}

#[test]
fn unauthorized_detected_by_status() {
    assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
    assert!(!ApiError::Transport("x".into()).is_unauthorized());
}

#[test]
fn decode_body_no_content_yields_unit_and_none() {
    decode_body::<()>(StatusCode::NO_CONTENT, "").unwrap();
    let none: Option<Room> = decode_body(StatusCode::NO_CONTENT, "").unwrap();
    assert!(none.is_none());
}

#[test]
fn decode_body_no_content_for_concrete_type_is_decode_error() {
    let err = decode_body::<Room>(StatusCode::NO_CONTENT, "").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================
// ApiClient against a stub server
// =============================================================

#[tokio::test]
async fn get_decodes_collection() {
    let api = stub_client(Router::new().route("/rooms", get(|| async { Json(rooms_json()) }))).await;

    let rooms: Vec<Room> = api.get("/rooms").await.unwrap();
    let expected: Vec<Room> = serde_json::from_value(rooms_json()).unwrap();
    assert_eq!(rooms, expected);
}

#[tokio::test]
async fn no_content_returns_unit() {
    let api = stub_client(Router::new().route("/rooms/1", axum::routing::delete(|| async { AxumStatus::NO_CONTENT })))
        .await;

    api.delete::<()>("/rooms/1").await.unwrap();
}

#[tokio::test]
async fn not_found_carries_status_and_body() {
    let api = stub_client(Router::new().route("/rooms/9", get(|| async { (AxumStatus::NOT_FOUND, "not found") }))).await;

    let err = api.get::<Room>("/rooms/9").await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 404, message: "not found".into() });
}

#[tokio::test]
async fn empty_server_error_uses_reason_phrase() {
    let api = stub_client(Router::new().route("/rooms", get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }))).await;

    let err = api.get::<Vec<Room>>("/rooms").await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 500, message: "Internal Server Error".into() });
}

#[tokio::test]
async fn unreachable_server_is_transport_failure() {
    let api = ApiClient::new(&ClientConfig::new(dead_base_url().await)).unwrap();

    let err = api.get::<Vec<Room>>("/rooms").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn relative_base_without_origin_is_transport_failure() {
    let api = ApiClient::new(&ClientConfig::new("")).unwrap();

    let err = api.get::<Vec<Room>>("/rooms").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_success_body_is_decode_failure() {
    let api = stub_client(Router::new().route("/rooms", get(|| async { "not json" }))).await;

    let err = api.get::<Vec<Room>>("/rooms").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn every_request_declares_json_content_type() {
    async fn echo_content_type(headers: AxumHeaderMap) -> Json<Value> {
        let content_type = headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        Json(json!({ "content_type": content_type }))
    }
    let api = stub_client(
        Router::new().route("/echo", get(echo_content_type).post(echo_content_type).delete(echo_content_type)),
    )
    .await;

    let get_reply: Value = api.get("/echo").await.unwrap();
    let post_reply: Value = api.post::<_, ()>("/echo", None).await.unwrap();
    let delete_reply: Value = api.delete("/echo").await.unwrap();
    for reply in [get_reply, post_reply, delete_reply] {
        assert_eq!(reply["content_type"], "application/json");
    }
}

#[tokio::test]
async fn post_and_put_send_json_body() {
    let api = stub_client(
        Router::new().route(
            "/echo",
            axum::routing::post(|Json(body): Json<Value>| async move { Json(body) })
                .put(|Json(body): Json<Value>| async move { Json(json!({"put": body})) }),
        ),
    )
    .await;

    let posted: Value = api.post("/echo", Some(&json!({"name": "lobby"}))).await.unwrap();
    assert_eq!(posted, json!({"name": "lobby"}));

    let put: Value = api.put("/echo", &json!({"name": "hall"})).await.unwrap();
    assert_eq!(put, json!({"put": {"name": "hall"}}));
}

// =============================================================
// Ordering
// =============================================================

fn ordering_router() -> Router {
    Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Json(json!("slow"))
            }),
        )
        .route("/fast", get(|| async { Json(json!("fast")) }))
}

#[tokio::test]
async fn unawaited_calls_may_complete_out_of_issue_order() {
    let api = stub_client(ordering_router()).await;
    let completed = Mutex::new(Vec::new());

    let slow = async {
        let value: String = api.get("/slow").await.unwrap();
        completed.lock().expect("order mutex should lock").push(value);
    };
    let fast = async {
        let value: String = api.get("/fast").await.unwrap();
        completed.lock().expect("order mutex should lock").push(value);
    };
    tokio::join!(slow, fast);

    assert_eq!(*completed.lock().unwrap(), vec!["fast".to_owned(), "slow".to_owned()]);
}

#[tokio::test]
async fn awaited_calls_complete_in_issue_order() {
    let api = stub_client(ordering_router()).await;
    let mut completed = Vec::new();

    completed.push(api.get::<String>("/slow").await.unwrap());
    completed.push(api.get::<String>("/fast").await.unwrap());

    assert_eq!(completed, vec!["slow".to_owned(), "fast".to_owned()]);
}
