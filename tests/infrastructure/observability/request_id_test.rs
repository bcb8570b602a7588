use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router, middleware};
use tower::ServiceExt;

use reelcut::infrastructure::observability::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

fn echo_router() -> Router {
    Router::new()
        .route(
            "/echo",
            get(|Extension(id): Extension<RequestId>| async move { id.0 }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[test]
fn given_header_values_when_parsed_then_only_safe_ids_are_kept() {
    let kept = RequestId::from_header(Some(&HeaderValue::from_static("batch-call_1.a")));
    assert_eq!(kept.as_str(), "batch-call_1.a");

    let spaced = RequestId::from_header(Some(&HeaderValue::from_static("two words")));
    assert!(uuid::Uuid::parse_str(spaced.as_str()).is_ok());

    let long = "a".repeat(200);
    let too_long = RequestId::from_header(Some(&HeaderValue::from_str(&long).unwrap()));
    assert!(uuid::Uuid::parse_str(too_long.as_str()).is_ok());

    let missing = RequestId::from_header(None);
    assert!(uuid::Uuid::parse_str(missing.as_str()).is_ok());
}

#[tokio::test]
async fn given_incoming_request_id_when_handled_then_same_id_is_echoed() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "batch-call-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "batch-call-1");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"batch-call-1");
}

#[tokio::test]
async fn given_no_request_id_when_handled_then_uuid_is_generated() {
    let response = echo_router()
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn given_unsafe_request_id_when_handled_then_it_is_replaced() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "id;drop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert_ne!(id, "id;drop");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
