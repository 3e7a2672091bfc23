#![allow(dead_code)]

use axum::body::{Body, BoxBody};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use rainbow_pulse::config::Config;
use rainbow_pulse::models::user::User;
use rainbow_pulse::routes;
use rainbow_pulse::services::auth::SESSION_COOKIE;
use rainbow_pulse::state::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Production wiring over a fresh store.
pub async fn test_state() -> Arc<AppState> {
    let config = Config::from_env().expect("test config");
    AppState::initialize(config).await.expect("test state")
}

pub fn app(state: Arc<AppState>) -> Router {
    routes::app_router(state)
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<BoxBody> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail")
}

pub async fn get(router: &Router, uri: &str) -> Response<BoxBody> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    send(router, request).await
}

pub async fn get_as(router: &Router, uri: &str, cookie: &str) -> Response<BoxBody> {
    let request = Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request");
    send(router, request).await
}

pub async fn post_form(
    router: &Router,
    uri: &str,
    body: &str,
    cookie: Option<&str>,
) -> Response<BoxBody> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    send(router, request).await
}

pub async fn body_text(response: Response<BoxBody>) -> String {
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response<BoxBody>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn assert_redirects_to(response: &Response<BoxBody>, target: &str) {
    assert!(
        response.status().is_redirection(),
        "expected a redirect, got {}",
        response.status()
    );
    assert_eq!(location(response), target);
}

pub fn assert_ok(response: &Response<BoxBody>) {
    assert_eq!(response.status(), StatusCode::OK);
}

/// Registers a user and opens a session, returning the user and a Cookie
/// header value for authenticated requests.
pub async fn login_user(state: &Arc<AppState>, username: &str) -> (User, String) {
    let user = state
        .auth_service
        .register(username, "password123")
        .await
        .expect("register");
    let token = state
        .auth_service
        .login(username, "password123")
        .await
        .expect("login");
    (user, format!("{}={}", SESSION_COOKIE, token))
}

pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
