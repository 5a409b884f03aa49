use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::pages::PageRenderer;
use crate::features::prediction::ReplicateClient;

/// 聚合的应用共享状态（启动后只读）
#[derive(Clone)]
pub struct AppState {
    /// 上游预测 API 客户端（持有注入的凭据）
    pub replicate: Arc<ReplicateClient>,
    /// 页面模板渲染器
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    /// 按配置构建共享状态
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            replicate: Arc::new(ReplicateClient::new(&config.upstream)?),
            pages: Arc::new(PageRenderer::new(&config.templates_path())),
        })
    }
}
