use crate::{
    error::Result,
    state::AppState,
    utils::middleware::RequireLogin,
    utils::pagination::PageQuery,
};
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// 关注作者；完成后跳回对方主页
pub async fn profile_follow(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    RequireLogin(user): RequireLogin,
) -> Result<Response> {
    debug!("User {} following {}", user.username, username);

    state.follow_service.follow_user(user.id, &username).await?;
    Ok(Redirect::to(&format!("/profile/{}/", username)).into_response())
}

/// 取消关注；完成后跳回对方主页
pub async fn profile_unfollow(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    RequireLogin(user): RequireLogin,
) -> Result<Response> {
    debug!("User {} unfollowing {}", user.username, username);

    state
        .follow_service
        .unfollow_user(user.id, &username)
        .await?;
    Ok(Redirect::to(&format!("/profile/{}/", username)).into_response())
}

/// 关注流：我关注的作者们的帖子
pub async fn follow_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    RequireLogin(user): RequireLogin,
) -> Result<Html<String>> {
    let page = state
        .feed_service
        .list_followed(user.id, query.number())
        .await?;

    let html = state.render_service.render(
        "follow",
        &json!({
            "title": "Authors you follow",
            "current_user": user.username,
            "page_obj": page,
        }),
    )?;
    Ok(Html(html))
}
