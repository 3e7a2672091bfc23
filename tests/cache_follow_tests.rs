//! Router-level tests for the index page cache window and the follow
//! graph surface.

mod common;

use axum::http::StatusCode;
use common::*;
use rainbow_pulse::utils::validation::ValidatedPost;

#[tokio::test]
async fn index_serves_stale_content_until_cleared() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    let post = state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "original wording".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state.clone());

    let first = body_text(get(&router, "/").await).await;
    assert!(first.contains("original wording"));

    // 修改帖子正文；缓存窗口内首页内容保持不变
    let mut row = state.db.get_post(post.id).unwrap();
    row.text = "changed wording".to_string();
    state.db.update_post(row).unwrap();

    let second = body_text(get(&router, "/").await).await;
    assert_eq!(first, second, "index must serve the cached snapshot");

    // 显式清除后内容反映修改
    state.page_cache.clear();
    let third = body_text(get(&router, "/").await).await;
    assert_ne!(first, third);
    assert!(third.contains("changed wording"));
    assert!(!third.contains("original wording"));
}

#[tokio::test]
async fn cleared_cache_never_references_deleted_posts() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    let post = state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "doomed post".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state.clone());

    let cached = body_text(get(&router, "/").await).await;
    assert!(cached.contains("doomed post"));

    assert!(state.db.delete_post(post.id));
    state.page_cache.clear();

    let recomputed = body_text(get(&router, "/").await).await;
    assert!(!recomputed.contains("doomed post"));
    assert_ne!(cached, recomputed);
}

#[tokio::test]
async fn new_posts_do_not_invalidate_the_window() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;

    let router = app(state.clone());

    let empty = body_text(get(&router, "/").await).await;
    assert!(empty.contains("No posts yet."));

    state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "invisible for now".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    // 新帖不会提前失效缓存
    let still_empty = body_text(get(&router, "/").await).await;
    assert_eq!(empty, still_empty);

    state.page_cache.clear();
    let refreshed = body_text(get(&router, "/").await).await;
    assert!(refreshed.contains("invisible for now"));
}

#[tokio::test]
async fn follow_and_unfollow_redirect_back_to_profile() {
    let state = test_state().await;
    let (_, alice_cookie) = login_user(&state, "alice").await;
    login_user(&state, "bob").await;

    let router = app(state.clone());

    let response = get_as(&router, "/profile/bob/follow", &alice_cookie).await;
    assert_redirects_to(&response, "/profile/bob/");
    assert_eq!(state.db.follow_count(), 1);

    // 重复关注是幂等的
    let response = get_as(&router, "/profile/bob/follow", &alice_cookie).await;
    assert_redirects_to(&response, "/profile/bob/");
    assert_eq!(state.db.follow_count(), 1);

    let response = get_as(&router, "/profile/bob/unfollow", &alice_cookie).await;
    assert_redirects_to(&response, "/profile/bob/");
    assert_eq!(state.db.follow_count(), 0);

    // 取消不存在的关注也是空操作
    let response = get_as(&router, "/profile/bob/unfollow", &alice_cookie).await;
    assert_redirects_to(&response, "/profile/bob/");
    assert_eq!(state.db.follow_count(), 0);
}

#[tokio::test]
async fn self_follow_never_creates_an_edge() {
    let state = test_state().await;
    let (_, alice_cookie) = login_user(&state, "alice").await;

    let router = app(state.clone());

    let response = get_as(&router, "/profile/alice/follow", &alice_cookie).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.db.follow_count(), 0);
}

#[tokio::test]
async fn followed_feed_contains_posts_from_followed_authors_only() {
    let state = test_state().await;
    let (_, alice_cookie) = login_user(&state, "alice").await;
    let (bob, _) = login_user(&state, "bob").await;
    state
        .post_service
        .create_post(
            bob.id,
            ValidatedPost {
                text: "bob's dispatch".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state.clone());

    // 未关注时 bob 的帖子不在关注流里
    let before = body_text(get_as(&router, "/follow/", &alice_cookie).await).await;
    assert!(!before.contains("bob's dispatch"));

    get_as(&router, "/profile/bob/follow", &alice_cookie).await;

    let after = body_text(get_as(&router, "/follow/", &alice_cookie).await).await;
    assert!(after.contains("bob&#x27;s dispatch") || after.contains("bob's dispatch"));

    get_as(&router, "/profile/bob/unfollow", &alice_cookie).await;
    let removed = body_text(get_as(&router, "/follow/", &alice_cookie).await).await;
    assert!(!removed.contains("dispatch"));
}

#[tokio::test]
async fn follow_routes_require_login() {
    let state = test_state().await;
    login_user(&state, "bob").await;

    let router = app(state);

    let response = get(&router, "/profile/bob/follow").await;
    assert!(response.status().is_redirection());
    assert!(location(&response).starts_with("/auth/login/?next="));
}

#[tokio::test]
async fn guests_and_users_share_the_cached_feed_fragment() {
    let state = test_state().await;
    let (alice, alice_cookie) = login_user(&state, "alice").await;
    state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "shared snapshot".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state.clone());

    // 游客先填充缓存
    let guest = body_text(get(&router, "/").await).await;
    assert!(guest.contains("shared snapshot"));
    assert!(guest.contains("Log in"));

    // 登录用户复用同一片段，但页面外壳仍然是个人化的
    let logged_in = body_text(get_as(&router, "/", &alice_cookie).await).await;
    assert!(logged_in.contains("shared snapshot"));
    assert!(logged_in.contains("Log out"));
}
