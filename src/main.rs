use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, middleware};
use tower::{BoxError, ServiceBuilder};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rainbow_pulse::{
    config::Config,
    models::group::CreateGroupRequest,
    routes,
    state::AppState,
    utils::middleware::{rate_limit_middleware, request_logging_middleware},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "rainbow_pulse=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rainbow-Pulse service...");

    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化服务
    let app_state = AppState::initialize(config.clone()).await?;

    // 开发环境预置几个分组，方便发帖表单演示
    if config.is_development() {
        seed_demo_groups(&app_state).await;
    }

    // 启动后台任务
    start_background_tasks(app_state.clone());

    // 构建应用路由
    let app = routes::app_router(app_state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .load_shed()
                .timeout(Duration::from_secs(30)),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(request_logging_middleware));

    // 启动主服务器
    let addr: std::net::SocketAddr =
        format!("{}:{}", config.server_host, config.server_port).parse()?;
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request timed out".to_string(),
        )
    } else if err.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded".to_string(),
        )
    } else {
        error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}

async fn seed_demo_groups(app_state: &Arc<AppState>) {
    for (title, slug, description) in [
        ("General", "general", "Anything goes"),
        ("Announcements", "announcements", "News from the team"),
    ] {
        let request = CreateGroupRequest {
            title: title.to_string(),
            slug: Some(slug.to_string()),
            description: description.to_string(),
        };
        match app_state.group_service.create_group(request).await {
            Ok(group) => info!("Seeded group: {}", group.slug),
            // 已存在时跳过
            Err(e) => tracing::debug!("Skipping seed group {}: {}", slug, e),
        }
    }
}

fn start_background_tasks(app_state: Arc<AppState>) {
    info!("Starting background tasks...");

    // 清理过期会话任务
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;
            let removed = app_state.auth_service.cleanup_expired_sessions();
            if removed > 0 {
                info!("Cleaned up {} expired sessions", removed);
            }
        }
    });
}
