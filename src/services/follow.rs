use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::services::Database;

/// 关注服务
///
/// Maintains the directed subscription edges between users. Mutual follows
/// are valid; duplicate edges are an idempotent no-op and self edges are
/// never created.
#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
}

impl FollowService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 关注用户
    pub async fn follow_user(&self, follower_id: i64, username: &str) -> Result<()> {
        debug!("User {} following {}", follower_id, username);

        let target = self
            .db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::not_found("User"))?;

        // 防止自己关注自己
        if target.id == follower_id {
            return Err(AppError::bad_request("Cannot follow yourself"));
        }

        if self.db.insert_follow(follower_id, target.id) {
            info!("User {} followed user {}", follower_id, target.id);
        } else {
            debug!("User {} already follows user {}", follower_id, target.id);
        }

        Ok(())
    }

    /// 取消关注；边不存在时为空操作
    pub async fn unfollow_user(&self, follower_id: i64, username: &str) -> Result<()> {
        debug!("User {} unfollowing {}", follower_id, username);

        let target = self
            .db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::not_found("User"))?;

        if self.db.remove_follow(follower_id, target.id) {
            info!("User {} unfollowed user {}", follower_id, target.id);
        }

        Ok(())
    }

    /// The set of users the given user follows.
    pub async fn following_set(&self, user_id: i64) -> HashSet<i64> {
        self.db.following_ids(user_id)
    }

    pub async fn is_following(&self, follower_id: i64, username: &str) -> Result<bool> {
        let target = self
            .db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok(self.db.is_following(follower_id, target.id))
    }
}
