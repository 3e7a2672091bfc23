use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// 不提供时根据标题生成
    pub slug: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: String,
}

/// Group fields embedded in a post view.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRef {
    pub title: String,
    pub slug: String,
}
