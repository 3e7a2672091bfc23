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

/// 分组页；未知 slug 返回 404
pub async fn group_list(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Html<String>> {
    debug!("Group page for: {}", slug);

    let group = state.group_service.get_by_slug(&slug).await?;
    let page = state.feed_service.list_by_group(&slug, query.number()).await?;

    let html = state.render_service.render(
        "group_list",
        &json!({
            "title": group.title.clone(),
            "current_user": username_of(user.as_ref()),
            "group": group,
            "page_obj": page,
        }),
    )?;
    Ok(Html(html))
}
