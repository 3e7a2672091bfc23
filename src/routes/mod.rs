use crate::{error::AppError, state::AppState, utils};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod auth;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod profiles;

/// 组装完整路由
///
/// The auth middleware and the not-found fallback are part of the router so
/// integration tests exercise the same stack as production; the outer
/// tracing/compression/timeout/rate-limit layers are added in `main`.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(posts::index))
        .route(
            "/create/",
            get(posts::post_create_form).post(posts::post_create_submit),
        )
        .route("/posts/:id/", get(posts::post_detail))
        .route("/posts/:id/comment/", post(posts::add_comment))
        .route(
            "/posts/:id/edit/",
            get(posts::post_edit_form).post(posts::post_edit_submit),
        )
        .route("/group/:slug/", get(groups::group_list))
        .route("/profile/:username/", get(profiles::profile))
        .route("/profile/:username/follow", get(follows::profile_follow))
        .route("/profile/:username/unfollow", get(follows::profile_unfollow))
        .route("/follow/", get(follows::follow_index))
        .route(
            "/auth/login/",
            get(auth::login_form).post(auth::login_submit),
        )
        .route("/auth/logout/", get(auth::logout))
        .route(
            "/auth/signup/",
            get(auth::signup_form).post(auth::signup_submit),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            utils::middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(utils::middleware::request_id_middleware))
        .with_state(state)
}

/// 未知路由统一返回 404 页面
async fn not_found() -> AppError {
    AppError::NotFound("Page".to_string())
}
