use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::post::PostView;
use crate::services::{Database, PostService};
use crate::utils::pagination::{Page, Paginator};

/// Feed 组装服务
///
/// The read side of posts: every operation returns one page of fully
/// joined post views, newest first. Filtering happens against the store's
/// pre-ordered reads; the paginator only slices.
#[derive(Clone)]
pub struct FeedService {
    db: Arc<Database>,
    post_service: PostService,
    paginator: Paginator,
}

impl FeedService {
    pub async fn new(db: Arc<Database>, post_service: PostService, page_size: usize) -> Result<Self> {
        Ok(Self {
            db,
            post_service,
            paginator: Paginator::new(page_size),
        })
    }

    /// 全部帖子
    pub async fn list_all(&self, page: usize) -> Result<Page<PostView>> {
        debug!("Listing all posts, page {}", page);
        self.assemble(self.db.posts_all(), page)
    }

    /// 某个分组下的帖子；slug 不存在时返回 NotFound
    pub async fn list_by_group(&self, slug: &str, page: usize) -> Result<Page<PostView>> {
        debug!("Listing posts for group {}, page {}", slug, page);

        let group = self
            .db
            .find_group_by_slug(slug)
            .ok_or_else(|| AppError::not_found("Group"))?;

        self.assemble(self.db.posts_by_group(group.id), page)
    }

    /// 某个作者的帖子；用户名不存在时返回 NotFound
    pub async fn list_by_author(&self, username: &str, page: usize) -> Result<Page<PostView>> {
        debug!("Listing posts for author {}, page {}", username, page);

        let author = self
            .db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::not_found("User"))?;

        self.assemble(self.db.posts_by_author(author.id), page)
    }

    /// 当前用户关注的作者们的帖子
    pub async fn list_followed(&self, user_id: i64, page: usize) -> Result<Page<PostView>> {
        debug!("Listing followed feed for user {}, page {}", user_id, page);

        let following = self.db.following_ids(user_id);
        if following.is_empty() {
            return self.assemble(Vec::new(), page);
        }

        self.assemble(self.db.posts_by_authors(&following), page)
    }

    fn assemble(
        &self,
        posts: Vec<crate::models::post::Post>,
        page: usize,
    ) -> Result<Page<PostView>> {
        let Page {
            items,
            number,
            per_page,
            total_items,
            total_pages,
            has_previous,
            has_next,
            previous_page,
            next_page,
        } = self.paginator.paginate(posts, page);

        // 只为当前页的帖子做关联查询
        let mut views = Vec::with_capacity(items.len());
        for post in items {
            views.push(self.post_service.build_view(post)?);
        }

        Ok(Page {
            items: views,
            number,
            per_page,
            total_items,
            total_pages,
            has_previous,
            has_next,
            previous_page,
            next_page,
        })
    }
}
