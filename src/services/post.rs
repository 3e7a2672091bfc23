use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::comment::CommentView;
use crate::models::group::GroupRef;
use crate::models::post::{Post, PostDetailView, PostView};
use crate::services::Database;
use crate::utils::validation::ValidatedPost;

/// 日期在页面上的展示格式
const DATE_FORMAT: &str = "%-d %b %Y %H:%M";

#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 创建新帖子
    pub async fn create_post(&self, author_id: i64, form: ValidatedPost) -> Result<Post> {
        debug!("Creating post for user: {}", author_id);

        if let Some(group_id) = form.group_id {
            if self.db.get_group(group_id).is_none() {
                return Err(AppError::not_found("Group"));
            }
        }

        let post = self
            .db
            .create_post(author_id, &form.text, form.group_id, form.image)?;

        info!("Created post: {} by user: {}", post.id, author_id);
        Ok(post)
    }

    /// 更新帖子；只有作者可以编辑，作者字段不可变
    pub async fn update_post(&self, post_id: i64, author_id: i64, form: ValidatedPost) -> Result<Post> {
        debug!("Updating post: {} by user: {}", post_id, author_id);

        let mut post = self
            .db
            .get_post(post_id)
            .ok_or_else(|| AppError::not_found("Post"))?;

        if post.author_id != author_id {
            return Err(AppError::NotAuthor { post_id });
        }

        if let Some(group_id) = form.group_id {
            if self.db.get_group(group_id).is_none() {
                return Err(AppError::not_found("Group"));
            }
        }

        post.text = form.text;
        post.group_id = form.group_id;
        post.image = form.image;

        let updated = self.db.update_post(post)?;
        info!("Updated post: {}", post_id);
        Ok(updated)
    }

    /// 获取帖子，校验作者（编辑表单使用）
    pub async fn get_post_for_author(&self, post_id: i64, author_id: i64) -> Result<Post> {
        let post = self
            .db
            .get_post(post_id)
            .ok_or_else(|| AppError::not_found("Post"))?;

        if post.author_id != author_id {
            return Err(AppError::NotAuthor { post_id });
        }

        Ok(post)
    }

    /// Detail page: the post joined with author/group plus the full
    /// comment thread, oldest first.
    pub async fn get_post_detail(&self, post_id: i64) -> Result<PostDetailView> {
        let post = self
            .db
            .get_post(post_id)
            .ok_or_else(|| AppError::not_found("Post"))?;

        let comments = self
            .db
            .comments_for_post(post_id)
            .into_iter()
            .map(|comment| {
                let author = self
                    .db
                    .get_user(comment.author_id)
                    .map(|u| u.username)
                    .unwrap_or_else(|| "deleted".to_string());
                CommentView {
                    id: comment.id,
                    text: comment.text,
                    created: comment.created.format(DATE_FORMAT).to_string(),
                    author,
                }
            })
            .collect();

        Ok(PostDetailView {
            post: self.build_view(post)?,
            comments,
        })
    }

    /// Joins author and group metadata onto a post row.
    pub fn build_view(&self, post: Post) -> Result<PostView> {
        let author = self
            .db
            .get_user(post.author_id)
            .ok_or_else(|| AppError::internal("Post author missing"))?;

        let group = match post.group_id {
            Some(group_id) => self.db.get_group(group_id).map(|g| GroupRef {
                title: g.title,
                slug: g.slug,
            }),
            None => None,
        };

        Ok(PostView {
            id: post.id,
            text: post.text,
            image: post.image,
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            author: author.username,
            group,
            comment_count: self.db.comment_count(post.id),
        })
    }
}
