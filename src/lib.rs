use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 启动检查模块
pub mod startup;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 优雅退出信号模块
pub mod shutdown;

/// 请求 ID 与请求日志中间件
pub mod request_id;

/// OpenAPI 文档
pub mod openapi;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 图片本身已压缩，静态脚本/页面/JSON 才值得压缩。
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
}

/// 组装完整路由：页面、上传/状态转发、静态资源、健康检查与 API 文档
pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/health", get(features::health::health_check))
        .merge(features::pages::create_pages_router())
        .merge(features::prediction::create_prediction_router())
        .nest_service("/static", ServeDir::new(config.static_path()))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.upload.max_body_bytes))
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
}
