use crate::{
    error::{AppError, Result},
    models::user::{LoginForm, SignupForm},
    routes::posts::username_of,
    state::AppState,
    utils::middleware::{
        session_clear_cookie, session_cookie_value, session_set_cookie, OptionalAuth,
    },
    utils::validation::{self, FieldErrors},
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// 登录页
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    // 已登录用户直接回首页
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let html = render_login(&state, query.next.as_deref(), "", None)?;
    Ok(Html(html).into_response())
}

/// 提交登录
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth_service.login(&form.username, &form.password).await {
        Ok(token) => {
            let target = safe_next(form.next.as_deref());
            debug!("Login succeeded, redirecting to {}", target);
            Ok(redirect_with_cookie(
                &target,
                &session_set_cookie(&token, state.config.session_ttl),
            ))
        }
        Err(AppError::Authentication(_)) => {
            let html = render_login(
                &state,
                form.next.as_deref(),
                &form.username,
                Some("Invalid username or password"),
            )?;
            Ok(Html(html).into_response())
        }
        Err(e) => Err(e),
    }
}

/// 注销并回到首页
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = session_cookie_value(&headers) {
        state.auth_service.logout(&token).await;
    }
    Ok(redirect_with_cookie("/", &session_clear_cookie()))
}

/// 注册页
pub async fn signup_form(
    State(state): State<Arc<AppState>>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let html = render_signup(&state, "", None)?;
    Ok(Html(html).into_response())
}

/// 提交注册；成功后自动登录并回到首页
pub async fn signup_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    if let Err(errors) = validation::validate_signup_form(&form) {
        let html = render_signup(&state, &form.username, Some(&errors))?;
        return Ok(Html(html).into_response());
    }

    match state
        .auth_service
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            let token = state
                .auth_service
                .login(&form.username, &form.password)
                .await?;
            Ok(redirect_with_cookie(
                "/",
                &session_set_cookie(&token, state.config.session_ttl),
            ))
        }
        Err(AppError::Conflict(_)) => {
            let mut errors = FieldErrors::new();
            errors
                .entry("username".to_string())
                .or_default()
                .push("Username already taken".to_string());
            let html = render_signup(&state, &form.username, Some(&errors))?;
            Ok(Html(html).into_response())
        }
        Err(e) => Err(e),
    }
}

// 辅助函数

/// 只接受站内路径，防止开放重定向
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") => n.to_string(),
        _ => "/".to_string(),
    }
}

fn redirect_with_cookie(target: &str, cookie: &str) -> Response {
    let mut response = Redirect::to(target).into_response();
    if let Ok(value) = cookie.parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn render_login(
    state: &AppState,
    next: Option<&str>,
    username: &str,
    error: Option<&str>,
) -> Result<String> {
    state.render_service.render(
        "login",
        &json!({
            "title": "Log in",
            "current_user": username_of(None),
            "next": next,
            "username": username,
            "error": error,
        }),
    )
}

fn render_signup(state: &AppState, username: &str, errors: Option<&FieldErrors>) -> Result<String> {
    state.render_service.render(
        "signup",
        &json!({
            "title": "Sign up",
            "current_user": username_of(None),
            "username": username,
            "errors": errors.map(crate::services::render::flatten_errors),
        }),
    )
}
