use axum::{
    Router,
    body::Bytes,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

use super::models::{PREDICTION_STARTED_MESSAGE, PredictionRequest, UploadForm, UploadResponse};
use super::payload;

/// 承载图片的 multipart 字段名
const IMAGE_FIELD: &str = "image";

/// 从 multipart 表单中取出的上传文件
#[derive(Debug)]
struct UploadedImage {
    file_name: String,
    bytes: Bytes,
}

/// 读取 `image` 文件字段。
///
/// 没有 filename 参数的同名字段属于普通表单字段，不算文件。
async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedImage, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(AppError::Validation("No selected file".to_string()));
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedImage { file_name, bytes });
    }
    Err(AppError::Validation("No file part".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation("Uploaded file too large".to_string())
    } else {
        tracing::debug!("multipart 解析失败: {}", err);
        AppError::Validation("Malformed multipart body".to_string())
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    summary = "上传图片并创建预测",
    description = "读取 multipart 字段 `image`，统一转码为 JPEG data URL 后提交给上游模型，返回任务 ID。每次成功上传恰好提交一次，不重试。",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "预测已创建", body = UploadResponse),
        (status = 400, description = "缺少文件或文件名为空", body = ErrorBody),
        (status = 500, description = "凭据未配置、图片无法解码或上游失败", body = ErrorBody)
    ),
    tag = "Prediction"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("请求体不是 multipart: {}", e);
        AppError::Validation("No file part".to_string())
    })?;
    let upload = read_image_field(&mut multipart).await?;

    // 凭据检查先于解码：未配置时无论图片是否有效都直接失败。
    state.replicate.api_token()?;

    tracing::info!(
        file_name = %upload.file_name,
        size = upload.bytes.len(),
        "收到上传图片"
    );

    let data_url = tokio::task::spawn_blocking(move || payload::build_data_url(&upload.bytes))
        .await
        .map_err(|e| AppError::Internal(format!("图片转码任务失败: {e}")))??;

    let prediction_id = state
        .replicate
        .create_prediction(&PredictionRequest::for_image(data_url))
        .await?;

    Ok(Json(UploadResponse {
        message: PREDICTION_STARTED_MESSAGE.to_string(),
        prediction_id,
    }))
}

#[utoipa::path(
    get,
    path = "/status/{prediction_id}",
    summary = "查询预测状态",
    description = "向上游查询任务状态并原样转发 JSON；不做本地缓存，重复调用总会回源。",
    params(("prediction_id" = String, Path, description = "上游任务 ID")),
    responses(
        (status = 200, description = "上游任务 JSON（原样转发）", body = serde_json::Value),
        (status = 500, description = "凭据未配置或上游查询失败", body = ErrorBody)
    ),
    tag = "Prediction"
)]
pub async fn get_prediction_status(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let body = state.replicate.get_prediction(&prediction_id).await?;
    Ok(Json(body))
}

pub fn create_prediction_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/upload", post(upload_image))
        .route("/status/:prediction_id", get(get_prediction_status))
}
