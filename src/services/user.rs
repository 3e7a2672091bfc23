use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::user::{ProfileView, User};
use crate::services::Database;

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 根据用户名查找用户
    pub async fn get_by_username(&self, username: &str) -> Result<User> {
        self.db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Profile header data: post count plus the viewer's follow state.
    pub async fn get_profile(&self, username: &str, viewer_id: Option<i64>) -> Result<ProfileView> {
        debug!("Building profile view for: {}", username);

        let user = self.get_by_username(username).await?;
        let posts_count = self.db.posts_count_by_author(user.id);

        let (following, is_self) = match viewer_id {
            Some(viewer) => (self.db.is_following(viewer, user.id), viewer == user.id),
            None => (false, false),
        };

        Ok(ProfileView {
            username: user.username,
            posts_count,
            following,
            is_self,
        })
    }
}
