use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use audioscribe::infrastructure::observability::{
    REQUEST_ID_HEADER, RequestId, request_id_middleware,
};

fn app() -> Router {
    Router::new()
        .route(
            "/echo",
            get(|Extension(id): Extension<RequestId>| async move { id.0 }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_client_request_id_when_handled_then_echoed_to_handler_and_response() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "client-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "client-42");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"client-42");
}

#[tokio::test]
async fn given_no_request_id_when_handled_then_uuid_generated() {
    let response = app()
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let header = response.headers()[REQUEST_ID_HEADER]
        .to_str()
        .unwrap()
        .to_string();
    assert!(uuid::Uuid::parse_str(&header).is_ok());
}

#[tokio::test]
async fn given_empty_request_id_when_handled_then_replaced() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response.headers()[REQUEST_ID_HEADER].is_empty());
}

#[test]
fn given_oversized_or_non_ascii_header_when_reading_then_fresh_id_generated() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(REQUEST_ID_HEADER, "x".repeat(200).parse().unwrap());
    let long = RequestId::from_headers(&headers);
    assert!(uuid::Uuid::parse_str(&long.0).is_ok());

    headers.insert(REQUEST_ID_HEADER, "has space".parse().unwrap());
    let spaced = RequestId::from_headers(&headers);
    assert!(uuid::Uuid::parse_str(&spaced.0).is_ok());

    headers.insert(REQUEST_ID_HEADER, "  upload-7 ".parse().unwrap());
    assert_eq!(RequestId::from_headers(&headers), RequestId("upload-7".to_string()));
}
