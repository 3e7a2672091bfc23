use crate::{
    error::Result,
    routes::posts::username_of,
    state::AppState,
    utils::middleware::OptionalAuth,
    utils::pagination::PageQuery,
};
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// 作者主页；未知用户名返回 404
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Html<String>> {
    debug!("Profile page for: {}", username);

    let viewer_id = user.as_ref().map(|u| u.id);
    let profile = state.user_service.get_profile(&username, viewer_id).await?;
    let page = state
        .feed_service
        .list_by_author(&username, query.number())
        .await?;

    let html = state.render_service.render(
        "profile",
        &json!({
            "title": profile.username.clone(),
            "current_user": username_of(user.as_ref()),
            "profile": profile,
            "page_obj": page,
        }),
    )?;
    Ok(Html(html))
}
