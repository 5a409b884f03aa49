use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// 对外统一的“内部错误”文案
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求参数校验失败（如缺少上传文件）
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 必需配置缺失（如上游凭据未设置）
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 上传内容无法解码为图片
    #[error("图片解码错误: {0}")]
    Decode(String),

    /// 上游返回了非成功状态码
    #[error("上游错误: {message} ({details})")]
    Upstream {
        /// 对外错误文案
        message: String,
        /// 上游原始响应体
        details: Value,
    },

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误响应体：`{error, details?}`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 错误概述
    #[schema(example = "No file part")]
    pub error: String,
    /// 可选：上游响应体或内部错误详情
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
}

impl AppError {
    /// 构造上游错误
    pub fn upstream(message: impl Into<String>, details: Value) -> Self {
        AppError::Upstream {
            message: message.into(),
            details,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_)
            | AppError::Decode(_)
            | AppError::Upstream { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 稳定的错误类别标签，用于日志检索
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Configuration(_) => "configuration",
            AppError::Decode(_) => "decode",
            AppError::Upstream { .. } => "upstream",
            AppError::Internal(_) => "internal",
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            AppError::Validation(msg) | AppError::Configuration(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            // 解码失败与兜底错误对外统一为 Internal server error，细节放在 details。
            AppError::Decode(msg) | AppError::Internal(msg) => ErrorBody {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                details: Some(Value::String(msg)),
            },
            AppError::Upstream { message, details } => ErrorBody {
                error: message,
                details: Some(details),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "请求失败: {}", self);
        } else {
            tracing::warn!(kind = self.kind(), "请求被拒绝: {}", self);
        }

        (status, Json(self.into_body())).into_response()
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Internal(format!("上游请求超时: {err}"))
        } else {
            AppError::Internal(format!("上游请求失败: {err}"))
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(format!("页面渲染失败: {err}"))
    }
}
