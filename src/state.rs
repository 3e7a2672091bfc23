use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::Result,
    services::{
        AuthService, CommentService, Database, FeedService, FollowService, GroupService,
        PostService, RenderService, UserService,
    },
    utils::cache::Cache,
};

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 数据存储
    pub db: Arc<Database>,

    /// 认证服务
    pub auth_service: AuthService,

    /// 用户服务
    pub user_service: UserService,

    /// 分组服务
    pub group_service: GroupService,

    /// 帖子服务
    pub post_service: PostService,

    /// 评论服务
    pub comment_service: CommentService,

    /// 关注服务
    pub follow_service: FollowService,

    /// Feed 组装服务
    pub feed_service: FeedService,

    /// 页面渲染服务
    pub render_service: RenderService,

    /// 首页缓存
    pub page_cache: Cache<String>,
}

impl AppState {
    /// 初始化所有服务
    ///
    /// Tests call this too, so the wiring here is the production wiring.
    pub async fn initialize(config: Config) -> Result<Arc<Self>> {
        let db = Arc::new(Database::new());

        let auth_service = AuthService::new(db.clone(), &config).await?;
        let user_service = UserService::new(db.clone()).await?;
        let group_service = GroupService::new(db.clone()).await?;
        let post_service = PostService::new(db.clone()).await?;
        let comment_service = CommentService::new(db.clone()).await?;
        let follow_service = FollowService::new(db.clone()).await?;
        let feed_service =
            FeedService::new(db.clone(), post_service.clone(), config.page_size).await?;
        let render_service = RenderService::new()?;

        let page_cache = Cache::new(Duration::from_secs(config.cache_ttl));

        Ok(Arc::new(AppState {
            config,
            db,
            auth_service,
            user_service,
            group_service,
            post_service,
            comment_service,
            follow_service,
            feed_service,
            render_service,
            page_cache,
        }))
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
