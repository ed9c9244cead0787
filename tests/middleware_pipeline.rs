//! C9 MiddlewarePipeline (§4.9) composition: registration order, and the
//! always-on WebSocket rejection (§8 scenario 5).

use impersonate::request::Request;
use impersonate::response::{Headers, Response};
use impersonate::middleware::{BasicAuth, BearerAuth, ContentTypeOverride, Pipeline};

fn request() -> Request {
    Request::new(http::Method::POST, url::Url::parse("https://example.com/upload").unwrap())
}

fn response(status: u16) -> Response {
    Response { status, headers: Headers::new(), body: Vec::new(), tls_info: None, request_summary: "POST https://example.com/upload".to_string() }
}

#[test]
fn later_middleware_wins_when_both_set_authorization() {
    let mut pipeline = Pipeline::new();
    pipeline.push(Box::new(BasicAuth::new("alice", "hunter2")));
    pipeline.push(Box::new(BearerAuth::new("replacement-token")));

    let mut req = request();
    pipeline.run_request(&mut req).unwrap();

    assert_eq!(req.headers.get("authorization"), Some("Bearer replacement-token"));
}

#[test]
fn content_type_override_runs_alongside_auth_middlewares() {
    let mut pipeline = Pipeline::new();
    pipeline.push(Box::new(BearerAuth::new("tok")));
    pipeline.push(Box::new(ContentTypeOverride::new("application/json")));

    let mut req = request();
    pipeline.run_request(&mut req).unwrap();

    assert_eq!(req.headers.get("authorization"), Some("Bearer tok"));
    assert_eq!(req.headers.get("content-type"), Some("application/json"));
}

#[test]
fn websocket_rejection_is_active_even_with_no_user_middlewares_registered() {
    let pipeline = Pipeline::new();
    let err = pipeline.run_response(&response(101)).unwrap_err();
    assert!(err.to_string().contains("switching protocols to WebSocket"));
}

#[test]
fn ordinary_status_codes_pass_through_a_populated_pipeline() {
    let mut pipeline = Pipeline::new();
    pipeline.push(Box::new(BearerAuth::new("tok")));
    assert!(pipeline.run_response(&response(200)).is_ok());
    assert!(pipeline.run_response(&response(404)).is_ok());
}
