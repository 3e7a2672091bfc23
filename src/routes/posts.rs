use crate::{
    error::{AppError, Result},
    models::post::PostForm,
    models::user::User,
    state::AppState,
    utils::cache,
    utils::middleware::{OptionalAuth, RequireLogin},
    utils::pagination::PageQuery,
    utils::validation::{self, FieldErrors},
};
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::models::comment::CommentForm;

/// 首页：全部帖子
///
/// The rendered feed fragment is the cached unit; the page shell around it
/// stays per-request so the cache is never user-specific. Within the TTL
/// window the stored fragment is served verbatim even if posts changed.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Html<String>> {
    let page_number = query.number();
    let cache_key = cache::index_page_key(page_number);

    let feed = match state.page_cache.get(&cache_key) {
        Some(fragment) => {
            debug!("Index feed served from cache (page {})", page_number);
            fragment
        }
        None => {
            let page = state.feed_service.list_all(page_number).await?;
            let fragment = state
                .render_service
                .render("post_list", &json!({ "page_obj": page }))?;
            state.page_cache.set(cache_key, fragment.clone());
            fragment
        }
    };

    let html = state.render_service.render(
        "index",
        &json!({
            "title": "Latest posts",
            "current_user": username_of(user.as_ref()),
            "feed": feed,
        }),
    )?;
    Ok(Html(html))
}

/// 帖子详情
pub async fn post_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Html<String>> {
    let post_id = parse_post_id(&id)?;
    render_detail(&state, post_id, user.as_ref(), None).await
}

/// 发表评论
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let post_id = parse_post_id(&id)?;

    match validation::validate_comment_form(&form, state.config.max_comment_length) {
        Ok(text) => {
            state
                .comment_service
                .add_comment(user.id, post_id, &text)
                .await?;
            Ok(Redirect::to(&format!("/posts/{}/", post_id)).into_response())
        }
        Err(errors) => Ok(render_detail(&state, post_id, Some(&user), Some(&errors))
            .await?
            .into_response()),
    }
}

/// 发帖表单
pub async fn post_create_form(
    State(state): State<Arc<AppState>>,
    RequireLogin(user): RequireLogin,
) -> Result<Html<String>> {
    render_post_form(&state, &user, &PostForm::default(), None, None).await
}

/// 提交新帖；成功后跳转到自己的主页
pub async fn post_create_submit(
    State(state): State<Arc<AppState>>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    match validation::validate_post_form(&form, state.config.max_post_length) {
        Ok(validated) => match state.post_service.create_post(user.id, validated).await {
            Ok(_) => Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response()),
            Err(AppError::NotFound(_)) => {
                let errors = unknown_group_errors();
                Ok(render_post_form(&state, &user, &form, Some(&errors), None)
                    .await?
                    .into_response())
            }
            Err(e) => Err(e),
        },
        Err(errors) => Ok(render_post_form(&state, &user, &form, Some(&errors), None)
            .await?
            .into_response()),
    }
}

/// 编辑表单；非作者会被重定向回详情页
pub async fn post_edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RequireLogin(user): RequireLogin,
) -> Result<Html<String>> {
    let post_id = parse_post_id(&id)?;
    let post = state.post_service.get_post_for_author(post_id, user.id).await?;

    let form = PostForm {
        text: Some(post.text),
        group: post.group_id.map(|g| g.to_string()),
        image: post.image,
    };
    render_post_form(&state, &user, &form, None, Some(post_id)).await
}

/// 提交编辑；成功后回到详情页
pub async fn post_edit_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let post_id = parse_post_id(&id)?;

    match validation::validate_post_form(&form, state.config.max_post_length) {
        Ok(validated) => match state
            .post_service
            .update_post(post_id, user.id, validated)
            .await
        {
            Ok(_) => Ok(Redirect::to(&format!("/posts/{}/", post_id)).into_response()),
            Err(AppError::NotFound(_)) => {
                let errors = unknown_group_errors();
                Ok(
                    render_post_form(&state, &user, &form, Some(&errors), Some(post_id))
                        .await?
                        .into_response(),
                )
            }
            Err(e) => Err(e),
        },
        Err(errors) => Ok(
            render_post_form(&state, &user, &form, Some(&errors), Some(post_id))
                .await?
                .into_response(),
        ),
    }
}

// 辅助函数

pub(crate) fn username_of(user: Option<&User>) -> Option<String> {
    user.map(|u| u.username.clone())
}

fn parse_post_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| AppError::not_found("Post"))
}

fn unknown_group_errors() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors
        .entry("group".to_string())
        .or_default()
        .push("Select a valid group".to_string());
    errors
}

async fn render_detail(
    state: &AppState,
    post_id: i64,
    user: Option<&User>,
    comment_errors: Option<&FieldErrors>,
) -> Result<Html<String>> {
    let detail = state.post_service.get_post_detail(post_id).await?;
    let is_author = user.map(|u| u.username == detail.post.author).unwrap_or(false);

    let html = state.render_service.render(
        "post_detail",
        &json!({
            "title": format!("Post by {}", detail.post.author),
            "current_user": username_of(user),
            "post": detail.post,
            "comments": detail.comments,
            "is_author": is_author,
            "errors": comment_errors.map(crate::services::render::flatten_errors),
        }),
    )?;
    Ok(Html(html))
}

async fn render_post_form(
    state: &AppState,
    user: &User,
    form: &PostForm,
    errors: Option<&FieldErrors>,
    edit_post_id: Option<i64>,
) -> Result<Html<String>> {
    let selected = form.group.as_deref().unwrap_or("");
    let groups: Vec<_> = state
        .group_service
        .list_groups()
        .await
        .into_iter()
        .map(|group| {
            json!({
                "id": group.id,
                "title": group.title,
                "selected": group.id.to_string() == selected,
            })
        })
        .collect();

    let html = state.render_service.render(
        "create_post",
        &json!({
            "title": if edit_post_id.is_some() { "Edit post" } else { "New post" },
            "current_user": Some(user.username.clone()),
            "is_edit": edit_post_id.is_some(),
            "form": {
                "text": form.text.clone().unwrap_or_default(),
                "image": form.image.clone().unwrap_or_default(),
            },
            "groups": groups,
            "errors": errors.map(crate::services::render::flatten_errors),
        }),
    )?;
    Ok(Html(html))
}
