use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::comment::Comment;
use crate::services::Database;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
}

impl CommentService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 给帖子添加评论；帖子不存在时返回 NotFound
    pub async fn add_comment(&self, author_id: i64, post_id: i64, text: &str) -> Result<Comment> {
        debug!("Adding comment to post {} by user {}", post_id, author_id);

        let comment = self.db.create_comment(post_id, author_id, text)?;

        info!("Comment {} added to post {}", comment.id, post_id);
        Ok(comment)
    }
}
