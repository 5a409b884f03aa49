use serde::{Deserialize, Serialize};

/// 固定调用的上游模型版本
pub const MODEL_VERSION: &str = "b239ea33cff32bb7abb5db39ffe9a09c14cbc2894331d1ef66fe096eed88ebd4";

/// 固定的模型尺寸参数
pub const MODEL_SIZE: &str = "Large";

/// 上传成功后的提示文案
pub const PREDICTION_STARTED_MESSAGE: &str = "Prediction started successfully";

/// 提交给上游的预测请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// 模型版本
    pub version: String,
    /// 模型输入
    pub input: PredictionInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    /// `data:image/jpeg;base64,...` 形式的图片
    pub image: String,
    pub model_size: String,
}

impl PredictionRequest {
    /// 以固定模型版本与尺寸构造请求
    pub fn for_image(data_url: String) -> Self {
        Self {
            version: MODEL_VERSION.to_string(),
            input: PredictionInput {
                image: data_url,
                model_size: MODEL_SIZE.to_string(),
            },
        }
    }
}

/// 上游创建预测成功后的响应（仅关心 id）
#[derive(Debug, Deserialize)]
pub struct CreatedPrediction {
    pub id: String,
}

/// `POST /upload` 成功响应
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// 提示信息
    #[schema(example = "Prediction started successfully")]
    pub message: String,
    /// 上游任务 ID，用于轮询 `/status/{prediction_id}`
    #[schema(example = "ufawqhfynnddngldkgtslldrkq")]
    pub prediction_id: String,
}

/// `POST /upload` 的 multipart 表单（仅用于 OpenAPI 文档）
#[derive(Debug, utoipa::ToSchema)]
pub struct UploadForm {
    /// 待处理图片文件
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
