use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 上游凭据所在的环境变量名（与 Replicate 官方 SDK 保持一致）
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        5000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 未设置时生效）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | compact
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }

    /// 未设置 `RUST_LOG` 时使用的默认过滤规则
    pub fn default_filter(&self) -> String {
        format!("cutout_backend={},tower_http=info", self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// 上游推理 API 配置
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API 基地址（测试时可指向本地替身服务）
    #[serde(default = "UpstreamConfig::default_base_url")]
    pub base_url: String,
    /// Bearer 凭据；缺省时 `/upload` 会直接返回配置错误
    #[serde(default)]
    pub api_token: Option<String>,
    /// 请求超时（秒）；缺省表示不设超时
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    fn default_base_url() -> String {
        "https://api.replicate.com/v1".to_string()
    }

    /// 获取去除首尾空白后的非空凭据
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// 获取请求超时
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_token: None,
            timeout_secs: None,
        }
    }
}

// 手写 Debug，避免凭据被完整打印到日志里。
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.token().map(mask_token))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 请求体上限（字节）
    #[serde(default = "UploadConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl UploadConfig {
    fn default_max_body_bytes() -> usize {
        16 * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: Self::default_max_body_bytes(),
        }
    }
}

/// 资源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// 页面模板目录
    #[serde(default = "ResourcesConfig::default_templates_dir")]
    pub templates_dir: String,
    /// 静态资源目录（挂载到 `/static`）
    #[serde(default = "ResourcesConfig::default_static_dir")]
    pub static_dir: String,
}

impl ResourcesConfig {
    fn default_templates_dir() -> String {
        "./resources/templates".to_string()
    }
    fn default_static_dir() -> String {
        "./resources/static".to_string()
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            templates_dir: Self::default_templates_dir(),
            static_dir: Self::default_static_dir(),
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 收到退出信号后等待在途请求完成的最长时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 上游推理 API 配置
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// 上传配置
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 加载配置：`config.toml`（可选）→ `APP__*` 环境变量 → `REPLICATE_API_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件（可选）", config_path);

        let builder = ConfigBuilder::builder()
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP__SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = builder.try_deserialize()?;

        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            config.upstream.api_token = Some(token);
        }

        tracing::debug!("配置加载完成: {:?}", config);

        Ok(config)
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取模板目录
    pub fn templates_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.templates_dir)
    }

    /// 获取静态资源目录
    pub fn static_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.static_dir)
    }
}

/// 仅保留凭据前 4 个字符用于日志
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}...")
}
