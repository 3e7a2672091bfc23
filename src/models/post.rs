use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::comment::CommentView;
use crate::models::group::GroupRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// 可选的配图链接
    pub image: Option<String>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

/// Raw form payload for create and edit. Field checks live in
/// `utils::validation` so the same rules apply to both routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    pub text: Option<String>,
    /// Group id as submitted by the select widget; empty string means none.
    pub group: Option<String>,
    pub image: Option<String>,
}

/// Post joined with author, group and comment count for feed pages.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupRef>,
    pub comment_count: usize,
}

/// Detail page view: the post plus its full comment thread.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}
