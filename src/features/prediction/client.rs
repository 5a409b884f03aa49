use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::AppError;

use super::models::{CreatedPrediction, PredictionRequest};

/// 凭据缺失时的对外文案
pub const TOKEN_NOT_SET_MESSAGE: &str = "API token not set";

/// Replicate 预测 API 客户端。
///
/// 启动时创建一次，所有请求共享同一个连接池；凭据在构造时注入，不再逐次读取环境变量。
#[derive(Clone)]
pub struct ReplicateClient {
    client: reqwest::Client,
    predictions_url: Url,
    api_token: Option<String>,
}

impl ReplicateClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cutout-backend/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {e}")))?;

        let base = config.base_url.trim_end_matches('/');
        let predictions_url = Url::parse(&format!("{base}/predictions"))
            .map_err(|e| AppError::Configuration(format!("上游地址无效 {base}: {e}")))?;
        if predictions_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!("上游地址无效: {base}")));
        }

        Ok(Self {
            client,
            predictions_url,
            api_token: config.token().map(str::to_string),
        })
    }

    /// 获取 Bearer 凭据；未配置时返回配置错误
    pub fn api_token(&self) -> Result<&str, AppError> {
        self.api_token
            .as_deref()
            .ok_or_else(|| AppError::Configuration(TOKEN_NOT_SET_MESSAGE.to_string()))
    }

    /// 创建预测任务，返回上游任务 ID。
    ///
    /// 仅 201 视为成功；其余状态码把上游响应体原样放进 `details`。不重试。
    pub async fn create_prediction(&self, request: &PredictionRequest) -> Result<String, AppError> {
        let token = self.api_token()?;

        let resp = self
            .client
            .post(self.predictions_url.clone())
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let details = read_body(resp).await;
            tracing::warn!(status = status.as_u16(), "上游创建预测失败");
            return Err(AppError::upstream("Model prediction failed", details));
        }

        let created: CreatedPrediction = resp
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("解析上游预测响应失败: {e}")))?;
        tracing::info!(prediction_id = %created.id, "上游预测已创建");
        Ok(created.id)
    }

    /// 查询预测任务状态，200 时原样返回上游 JSON
    pub async fn get_prediction(&self, prediction_id: &str) -> Result<Value, AppError> {
        let token = self.api_token()?;
        let url = self.prediction_url(prediction_id)?;

        let resp = self.client.get(url).bearer_auth(token).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let details = read_body(resp).await;
            tracing::warn!(status = status.as_u16(), prediction_id, "上游查询预测失败");
            return Err(AppError::upstream(
                "Failed to get prediction status",
                details,
            ));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Internal(format!("解析上游状态响应失败: {e}")))
    }

    /// `<base>/predictions/<id>`，id 作为单个路径段做百分号编码
    fn prediction_url(&self, prediction_id: &str) -> Result<Url, AppError> {
        let mut url = self.predictions_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("上游地址不能作为 base URL".to_string()))?
            .push(prediction_id);
        Ok(url)
    }
}

/// 读取上游错误响应体：优先 JSON，否则退化为字符串
async fn read_body(resp: reqwest::Response) -> Value {
    match resp.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(e) => Value::String(format!("<body 读取失败: {e}>")),
    }
}
