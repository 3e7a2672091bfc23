use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::comment::Comment;
use crate::models::follow::Follow;
use crate::models::group::Group;
use crate::models::post::Post;
use crate::models::user::User;

/// 数据库服务
///
/// In-process store presenting the query API the services consume. Each
/// table is a concurrent map with a sequential id counter; username and
/// group slug have unique secondary indexes. List reads come back
/// pre-ordered so feed assembly never re-sorts, and every write touches a
/// single row.
#[derive(Debug, Default)]
pub struct Database {
    users: DashMap<i64, User>,
    users_by_name: DashMap<String, i64>,
    groups: DashMap<i64, Group>,
    groups_by_slug: DashMap<String, i64>,
    posts: DashMap<i64, Post>,
    comments: DashMap<i64, Comment>,
    follows: DashMap<(i64, i64), Follow>,

    user_seq: AtomicI64,
    group_seq: AtomicI64,
    post_seq: AtomicI64,
    comment_seq: AtomicI64,
    follow_seq: AtomicI64,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Users

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        match self.users_by_name.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict("Username already taken".to_string())),
            Entry::Vacant(slot) => {
                let id = self.user_seq.fetch_add(1, Ordering::SeqCst) + 1;
                let user = User {
                    id,
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                };
                self.users.insert(id, user.clone());
                slot.insert(id);
                debug!("Created user {} ({})", username, id);
                Ok(user)
            }
        }
    }

    pub fn get_user(&self, id: i64) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        let id = *self.users_by_name.get(username)?;
        self.get_user(id)
    }

    // ------------------------------------------------------------------
    // Groups

    pub fn create_group(&self, title: &str, slug: &str, description: &str) -> Result<Group> {
        match self.groups_by_slug.entry(slug.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Group slug '{}' already exists",
                slug
            ))),
            Entry::Vacant(slot) => {
                let id = self.group_seq.fetch_add(1, Ordering::SeqCst) + 1;
                let group = Group {
                    id,
                    title: title.to_string(),
                    slug: slug.to_string(),
                    description: description.to_string(),
                };
                self.groups.insert(id, group.clone());
                slot.insert(id);
                debug!("Created group {} ({})", slug, id);
                Ok(group)
            }
        }
    }

    pub fn get_group(&self, id: i64) -> Option<Group> {
        self.groups.get(&id).map(|g| g.value().clone())
    }

    pub fn find_group_by_slug(&self, slug: &str) -> Option<Group> {
        let id = *self.groups_by_slug.get(slug)?;
        self.get_group(id)
    }

    pub fn group_slug_exists(&self, slug: &str) -> bool {
        self.groups_by_slug.contains_key(slug)
    }

    pub fn groups_all(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.groups.iter().map(|g| g.value().clone()).collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        groups
    }

    // ------------------------------------------------------------------
    // Posts

    pub fn create_post(
        &self,
        author_id: i64,
        text: &str,
        group_id: Option<i64>,
        image: Option<String>,
    ) -> Result<Post> {
        // 帖子必须有作者
        if !self.users.contains_key(&author_id) {
            return Err(AppError::not_found("Author"));
        }
        if let Some(gid) = group_id {
            if !self.groups.contains_key(&gid) {
                return Err(AppError::not_found("Group"));
            }
        }

        let id = self.post_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let post = Post {
            id,
            text: text.to_string(),
            image,
            author_id,
            group_id,
            pub_date: Utc::now(),
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    pub fn get_post(&self, id: i64) -> Option<Post> {
        self.posts.get(&id).map(|p| p.value().clone())
    }

    /// 整行覆盖更新；作者不可变的约束由上层维护
    pub fn update_post(&self, post: Post) -> Result<Post> {
        match self.posts.entry(post.id) {
            Entry::Occupied(mut slot) => {
                slot.insert(post.clone());
                Ok(post)
            }
            Entry::Vacant(_) => Err(AppError::not_found("Post")),
        }
    }

    /// 删除帖子并级联删除它的评论
    pub fn delete_post(&self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != post_id);
        }
        removed
    }

    /// All posts, newest first (stable tiebreak on id).
    pub fn posts_all(&self) -> Vec<Post> {
        self.sorted_desc(self.posts.iter().map(|p| p.value().clone()).collect())
    }

    pub fn posts_by_group(&self, group_id: i64) -> Vec<Post> {
        self.sorted_desc(
            self.posts
                .iter()
                .filter(|p| p.group_id == Some(group_id))
                .map(|p| p.value().clone())
                .collect(),
        )
    }

    pub fn posts_by_author(&self, author_id: i64) -> Vec<Post> {
        self.sorted_desc(
            self.posts
                .iter()
                .filter(|p| p.author_id == author_id)
                .map(|p| p.value().clone())
                .collect(),
        )
    }

    pub fn posts_by_authors(&self, author_ids: &HashSet<i64>) -> Vec<Post> {
        self.sorted_desc(
            self.posts
                .iter()
                .filter(|p| author_ids.contains(&p.author_id))
                .map(|p| p.value().clone())
                .collect(),
        )
    }

    pub fn posts_count_by_author(&self, author_id: i64) -> usize {
        self.posts.iter().filter(|p| p.author_id == author_id).count()
    }

    fn sorted_desc(&self, mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    // ------------------------------------------------------------------
    // Comments

    pub fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        // 评论必须挂在存在的帖子和作者上
        if !self.posts.contains_key(&post_id) {
            return Err(AppError::not_found("Post"));
        }
        if !self.users.contains_key(&author_id) {
            return Err(AppError::not_found("Author"));
        }

        let id = self.comment_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let comment = Comment {
            id,
            post_id,
            author_id,
            text: text.to_string(),
            created: Utc::now(),
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    /// Comments of a post, oldest first.
    pub fn comments_for_post(&self, post_id: i64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        comments
    }

    pub fn comment_count(&self, post_id: i64) -> usize {
        self.comments.iter().filter(|c| c.post_id == post_id).count()
    }

    // ------------------------------------------------------------------
    // Follows

    /// Inserts the edge; returns false without writing when it already
    /// exists. Self edges are never stored.
    pub fn insert_follow(&self, follower_id: i64, following_id: i64) -> bool {
        if follower_id == following_id {
            return false;
        }
        match self.follows.entry((follower_id, following_id)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let id = self.follow_seq.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(Follow {
                    id,
                    follower_id,
                    following_id,
                    created_at: Utc::now(),
                });
                true
            }
        }
    }

    pub fn remove_follow(&self, follower_id: i64, following_id: i64) -> bool {
        self.follows.remove(&(follower_id, following_id)).is_some()
    }

    pub fn is_following(&self, follower_id: i64, following_id: i64) -> bool {
        self.follows.contains_key(&(follower_id, following_id))
    }

    pub fn following_ids(&self, user_id: i64) -> HashSet<i64> {
        self.follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id)
            .collect()
    }

    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}
