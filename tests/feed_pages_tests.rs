//! Router-level tests for the public feed pages: index, group, profile,
//! post detail and pagination behavior.

mod common;

use axum::http::StatusCode;
use common::*;
use rainbow_pulse::models::group::CreateGroupRequest;
use rainbow_pulse::utils::validation::ValidatedPost;

#[tokio::test]
async fn public_pages_respond_ok() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    let group = state
        .group_service
        .create_group(CreateGroupRequest {
            title: "Rust".to_string(),
            slug: Some("rust".to_string()),
            description: "All things Rust".to_string(),
        })
        .await
        .unwrap();
    let post = state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "hello world".to_string(),
                group_id: Some(group.id),
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state);

    for uri in ["/", "/group/rust/", "/profile/alice/"] {
        let response = get(&router, uri).await;
        assert_ok(&response);
        let body = body_text(response).await;
        assert!(body.contains("hello world"), "{} missing post", uri);
    }

    let response = get(&router, &format!("/posts/{}/", post.id)).await;
    assert_ok(&response);
}

#[tokio::test]
async fn group_feed_contains_only_its_posts() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    let rust = state
        .group_service
        .create_group(CreateGroupRequest {
            title: "Rust".to_string(),
            slug: Some("rust".to_string()),
            description: String::new(),
        })
        .await
        .unwrap();
    state
        .group_service
        .create_group(CreateGroupRequest {
            title: "Cooking".to_string(),
            slug: Some("cooking".to_string()),
            description: String::new(),
        })
        .await
        .unwrap();

    state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "rust only".to_string(),
                group_id: Some(rust.id),
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state);

    let body = body_text(get(&router, "/group/rust/").await).await;
    assert!(body.contains("rust only"));

    let body = body_text(get(&router, "/group/cooking/").await).await;
    assert!(!body.contains("rust only"));
    assert!(body.contains("No posts in this group yet."));
}

#[tokio::test]
async fn unknown_slug_username_and_post_return_404() {
    let state = test_state().await;
    let router = app(state);

    for uri in [
        "/group/missing/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/not-a-number/",
        "/unexisting_page/",
    ] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = body_text(response).await;
        assert!(body.contains("Page not found"), "{} should use the 404 page", uri);
    }
}

#[tokio::test]
async fn thirteen_posts_paginate_over_http() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    for i in 0..13 {
        state
            .post_service
            .create_post(
                alice.id,
                ValidatedPost {
                    text: format!("numbered post {}", i),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();
    }

    let router = app(state);

    let first = body_text(get(&router, "/profile/alice/").await).await;
    assert_eq!(count_occurrences(&first, "<article class=\"post\">"), 10);
    assert!(first.contains("Page 1 of 2"));

    let second = body_text(get(&router, "/profile/alice/?page=2").await).await;
    assert_eq!(count_occurrences(&second, "<article class=\"post\">"), 3);

    // 非数字回到第一页，超出范围收敛到最后一页
    let garbage = body_text(get(&router, "/profile/alice/?page=abc").await).await;
    assert_eq!(count_occurrences(&garbage, "<article class=\"post\">"), 10);

    let clamped = body_text(get(&router, "/profile/alice/?page=99").await).await;
    assert_eq!(count_occurrences(&clamped, "<article class=\"post\">"), 3);
    assert!(clamped.contains("Page 2 of 2"));
}

#[tokio::test]
async fn detail_page_lists_comments_oldest_first() {
    let state = test_state().await;
    let (alice, _) = login_user(&state, "alice").await;
    let post = state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "discussion".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();
    state
        .comment_service
        .add_comment(alice.id, post.id, "first comment")
        .await
        .unwrap();
    state
        .comment_service
        .add_comment(alice.id, post.id, "second comment")
        .await
        .unwrap();

    let router = app(state);
    let body = body_text(get(&router, &format!("/posts/{}/", post.id)).await).await;

    let first_at = body.find("first comment").unwrap();
    let second_at = body.find("second comment").unwrap();
    assert!(first_at < second_at, "comments should be oldest first");
    assert!(body.contains("2 comments"));
}

#[tokio::test]
async fn guest_detail_page_offers_login_instead_of_comment_form() {
    let state = test_state().await;
    let (alice, cookie) = login_user(&state, "alice").await;
    let post = state
        .post_service
        .create_post(
            alice.id,
            ValidatedPost {
                text: "a post".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    let router = app(state);
    let uri = format!("/posts/{}/", post.id);

    let guest = body_text(get(&router, &uri).await).await;
    assert!(!guest.contains("<textarea name=\"text\""));
    assert!(guest.contains("Log in"));

    let logged_in = body_text(get_as(&router, &uri, &cookie).await).await;
    assert!(logged_in.contains("<textarea name=\"text\""));
}
