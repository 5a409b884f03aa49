use crate::config::{API_TOKEN_ENV, AppConfig, mask_token};

/// 启动检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// 上游凭据是否已配置
    pub api_token_set: bool,
    /// 模板目录是否存在
    pub templates_present: bool,
    /// 静态资源目录是否存在
    pub static_present: bool,
}

/// 执行启动检查。所有检查都只告警，不阻断启动：
///
/// 1. 上游凭据是否配置（仅打印前 4 个字符）
/// 2. 模板目录与静态资源目录是否存在
pub fn run_startup_checks(config: &AppConfig) -> StartupReport {
    tracing::info!("🔍 开始执行启动检查...");

    let api_token_set = match config.upstream.token() {
        Some(token) => {
            tracing::info!("✅ API token 已设置: {}", mask_token(token));
            true
        }
        None => {
            tracing::warn!(
                "⚠️ API token 未设置，请检查 {} 或 .env 文件；/upload 在配置前会返回 500",
                API_TOKEN_ENV
            );
            false
        }
    };

    let templates_present = check_dir("模板目录", &config.templates_path());
    let static_present = check_dir("静态资源目录", &config.static_path());

    tracing::info!("✅ 启动检查完成");
    StartupReport {
        api_token_set,
        templates_present,
        static_present,
    }
}

fn check_dir(label: &str, path: &std::path::Path) -> bool {
    if path.is_dir() {
        tracing::info!("✅ {}已存在: {:?}", label, path);
        true
    } else {
        tracing::warn!("📁 未找到{}: {:?}（相关页面将返回 500/404）", label, path);
        false
    }
}
